use std::net::SocketAddr;

use serde::{Deserialize, Serialize};
use serde_envfile::Error;
use twilight_model::id::{marker::UserMarker, Id};

#[derive(Serialize, Deserialize, Debug)]
pub struct Config {
    pub discord_token: String,
    pub discord_proxy: Option<String>,

    #[serde(default)]
    pub register_commands: bool,
    #[serde(default)]
    pub register_guild_restricted_commands: bool,

    /// Comma-separated user ids the blocklist module skips.
    #[serde(default)]
    pub blocked_users: String,

    pub metrics_listen_addr: Option<SocketAddr>,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        serde_envfile::from_env()
    }

    pub fn blocked_user_ids(&self) -> Result<Vec<Id<UserMarker>>, std::num::ParseIntError> {
        parse_ids(&self.blocked_users)
    }
}

fn parse_ids(list: &str) -> Result<Vec<Id<UserMarker>>, std::num::ParseIntError> {
    list.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| id.parse::<std::num::NonZeroU64>().map(Id::from))
        .collect()
}
