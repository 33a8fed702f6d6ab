mod config;
mod context;
mod metrics;
mod modules;

use std::{collections::HashSet, sync::Arc};

use twilight_gateway::{EventTypeFlags, Intents, Shard, ShardId, StreamExt as _};

use switchboard_framework::{Client, ClientOptions, HttpPlatform, PutCommandOptions};

use config::Config;
use context::Services;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // load .env into environment vars, ignore if not found
    match dotenvy::dotenv().map(|_| ()) {
        Err(err) if err.not_found() => {
            tracing::warn!("no .env file found");
        }
        result => result?,
    };

    // create config from environment vars
    let config = Config::from_env()?;

    // set-up logging
    tracing_subscriber::fmt::init();

    if let Some(listen_addr) = config.metrics_listen_addr {
        metrics::install(listen_addr)?;
    }

    let mut http = twilight_http::Client::builder().token(config.discord_token.clone());
    if let Some(proxy) = config.discord_proxy.clone() {
        http = http.proxy(proxy, true).ratelimiter(None);
    }
    let http = Arc::new(http.build());

    let app = http.current_user_application().await?.model().await?;
    tracing::info!(application = %app.id, "fetched application");

    let services = Services {
        http: Arc::clone(&http),
        blocked_users: Arc::new(config.blocked_user_ids()?.into_iter().collect::<HashSet<_>>()),
    };
    let client = Client::new(
        ClientOptions::default(),
        Arc::new(HttpPlatform::new(Arc::clone(&http), app.id)),
        services,
    );

    client.add_modules(modules::all()?).await?;

    // register commands
    if config.register_commands {
        tracing::info!("registering commands");
        let outcomes = client
            .put_commands(PutCommandOptions {
                register_guild_restricted_commands: config.register_guild_restricted_commands,
                ..Default::default()
            })
            .await;

        let failed = outcomes.iter().filter(|outcome| outcome.result.is_err()).count();
        if failed > 0 {
            tracing::warn!("couldn't register commands in {} scope(s)", failed);
        }
    }

    // start main loop
    let mut shard = Shard::new(
        ShardId::ONE,
        config.discord_token,
        Intents::GUILDS | Intents::GUILD_MESSAGES | Intents::GUILD_MESSAGE_REACTIONS,
    );

    tracing::info!("starting main loop...");
    while let Some(item) = shard.next_event(EventTypeFlags::all()).await {
        let event = match item {
            Ok(event) => event,
            Err(err) => {
                tracing::error!(?err, "error receiving discord event");
                continue;
            }
        };

        tracing::debug!(event = ?event.kind(), "event received");

        let client = Arc::clone(&client);
        tokio::spawn(async move {
            client.handle(event).await;
        });
    }

    Ok(())
}
