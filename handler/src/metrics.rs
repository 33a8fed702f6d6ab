use std::{error::Error, net::SocketAddr};

use metrics_exporter_prometheus::PrometheusBuilder;

pub(crate) fn install(listen_addr: SocketAddr) -> Result<(), Box<dyn Error>> {
    // install recorder and exporter
    PrometheusBuilder::new()
        .with_http_listener(listen_addr)
        .add_global_label("process", "handler")
        .install()?;

    metrics::describe_counter!(
        "switchboard_events_total",
        "Gateway events handed to the dispatch engine"
    );
    metrics::describe_counter!(
        "switchboard_commands_total",
        "Command invocations routed to a module"
    );

    Ok(())
}
