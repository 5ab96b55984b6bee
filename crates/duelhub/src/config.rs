//! Server configuration.

use std::time::Duration;

use duelhub_games::{BlockExchangeConfig, TileDuelConfig};
use duelhub_hub::HubConfig;

/// Everything [`DuelServerBuilder`](crate::DuelServerBuilder) can set.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub bind_addr: String,
    /// Upgrade path for tile duel connections.
    pub tile_duel_path: String,
    /// Upgrade path for block exchange connections.
    pub block_exchange_path: String,
    /// Applied to both hubs.
    pub hub: HubConfig,
    pub tile_duel: TileDuelConfig,
    pub block_exchange: BlockExchangeConfig,
    pub connection: ConnectionSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8003".to_string(),
            tile_duel_path: "/ws/tile-duel".to_string(),
            block_exchange_path: "/ws/block-exchange".to_string(),
            hub: HubConfig::default(),
            tile_duel: TileDuelConfig::default(),
            block_exchange: BlockExchangeConfig::default(),
            connection: ConnectionSettings::default(),
        }
    }
}

/// Per-connection timing.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionSettings {
    /// Keep-alive ping period. Must stay below `pong_wait`.
    pub ping_interval: Duration,
    /// How long the peer may stay completely silent, pongs included,
    /// before the connection is dropped.
    pub pong_wait: Duration,
    /// Upper bound on a single outbound write.
    pub write_timeout: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            ping_interval: Duration::from_secs(54),
            pong_wait: Duration::from_secs(60),
            write_timeout: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:8003");
        assert_eq!(config.tile_duel_path, "/ws/tile-duel");
        assert_eq!(config.block_exchange_path, "/ws/block-exchange");
        assert_eq!(config.connection.ping_interval, Duration::from_secs(54));
        assert_eq!(config.connection.pong_wait, Duration::from_secs(60));
        assert!(config.connection.ping_interval < config.connection.pong_wait);
        assert_eq!(config.tile_duel.wins_needed, 5);
        assert_eq!(config.block_exchange.score_limit, 7);
    }
}
