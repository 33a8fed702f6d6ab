use switchboard_framework::{FrameworkError, Node};

use crate::context::Services;

pub(crate) mod blocklist;
pub(crate) mod core;
pub(crate) mod logging;
pub(crate) mod moderation;

/// Every module the handler loads, skip and logging modules first so they see everything after.
pub(crate) fn all() -> Result<Vec<Node<Services>>, FrameworkError> {
    Ok(vec![
        blocklist::build(),
        logging::build(),
        self::core::build()?,
        moderation::build()?,
    ])
}
