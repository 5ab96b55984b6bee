//! `DuelServer` builder and accept loop.
//!
//! This is the entry point for running duelhub. It builds one hub per
//! game type, binds a single WebSocket listener and routes each accepted
//! connection to the hub registered for its upgrade path.

use std::time::Duration;

use duelhub_games::{BlockExchange, BlockExchangeConfig, TileDuel, TileDuelConfig};
use duelhub_hub::{HubConfig, HubHandle, spawn_hub};
use duelhub_protocol::{Codec, JsonCodec};
use duelhub_transport::{
    Connection, PendingConnection, PendingWebSocket, Transport, WebSocketTransport,
};

use crate::handler::handle_connection;
use crate::{ConnectionSettings, DuelhubError, ServerConfig};

/// Builder for configuring and starting a duelhub server.
///
/// # Example
///
/// ```rust,no_run
/// use duelhub::prelude::*;
///
/// # async fn run() -> Result<(), DuelhubError> {
/// let server = DuelServer::builder()
///     .bind("127.0.0.1:8003")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct DuelServerBuilder {
    config: ServerConfig,
}

impl DuelServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    pub fn tile_duel_path(mut self, path: &str) -> Self {
        self.config.tile_duel_path = path.to_string();
        self
    }

    pub fn block_exchange_path(mut self, path: &str) -> Self {
        self.config.block_exchange_path = path.to_string();
        self
    }

    /// Sets the hub configuration used by both games.
    pub fn hub_config(mut self, config: HubConfig) -> Self {
        self.config.hub = config;
        self
    }

    pub fn tile_duel_config(mut self, config: TileDuelConfig) -> Self {
        self.config.tile_duel = config;
        self
    }

    pub fn block_exchange_config(mut self, config: BlockExchangeConfig) -> Self {
        self.config.block_exchange = config;
        self
    }

    pub fn ping_interval(mut self, interval: Duration) -> Self {
        self.config.connection.ping_interval = interval;
        self
    }

    /// Sets how long a peer may stay silent before it is dropped.
    pub fn pong_wait(mut self, wait: Duration) -> Self {
        self.config.connection.pong_wait = wait;
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener and starts both hubs.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<DuelServer<JsonCodec>, DuelhubError> {
        let ServerConfig {
            bind_addr,
            tile_duel_path,
            block_exchange_path,
            hub,
            tile_duel,
            block_exchange,
            connection,
        } = self.config;

        let transport = WebSocketTransport::bind(&bind_addr)
            .await?
            .with_paths([tile_duel_path.clone(), block_exchange_path.clone()]);

        Ok(DuelServer {
            transport,
            router: Router {
                tile_duel_path,
                block_exchange_path,
                tile_duel: spawn_hub::<TileDuel>(hub.clone(), tile_duel),
                block_exchange: spawn_hub::<BlockExchange>(hub, block_exchange),
                codec: JsonCodec,
                connection,
            },
        })
    }
}

impl Default for DuelServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound duelhub server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct DuelServer<C: Codec> {
    transport: WebSocketTransport,
    router: Router<C>,
}

/// Everything a connection task needs once its handshake is done.
#[derive(Clone)]
struct Router<C: Codec> {
    tile_duel_path: String,
    block_exchange_path: String,
    tile_duel: HubHandle<TileDuel>,
    block_exchange: HubHandle<BlockExchange>,
    codec: C,
    connection: ConnectionSettings,
}

impl DuelServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> DuelServerBuilder {
        DuelServerBuilder::new()
    }
}

impl<C: Codec + Clone> DuelServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Handle to the tile duel hub.
    pub fn tile_duel_hub(&self) -> HubHandle<TileDuel> {
        self.router.tile_duel.clone()
    }

    /// Handle to the block exchange hub.
    pub fn block_exchange_hub(&self) -> HubHandle<BlockExchange> {
        self.router.block_exchange.clone()
    }

    /// Runs the accept loop until the process is terminated.
    ///
    /// The loop only accepts TCP connections; each WebSocket handshake
    /// runs in the connection's own task.
    pub async fn run(mut self) -> Result<(), DuelhubError> {
        tracing::info!(
            tile_duel = %self.router.tile_duel_path,
            block_exchange = %self.router.block_exchange_path,
            "duelhub server running"
        );

        loop {
            match self.transport.accept().await {
                Ok(pending) => {
                    let router = self.router.clone();
                    tokio::spawn(router.serve(pending));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                }
            }
        }
    }
}

impl<C: Codec + Clone> Router<C> {
    /// Completes the handshake, then hands the connection to the hub
    /// registered for its path.
    async fn serve(self, pending: PendingWebSocket) {
        let peer = pending.peer_addr();
        let conn = match pending.upgrade().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::debug!(%peer, error = %e, "handshake rejected");
                return;
            }
        };

        let conn_id = conn.id();
        let result = if conn.path() == self.tile_duel_path {
            handle_connection::<TileDuel, C>(conn, self.tile_duel, self.codec, self.connection)
                .await
        } else if conn.path() == self.block_exchange_path {
            handle_connection::<BlockExchange, C>(
                conn,
                self.block_exchange,
                self.codec,
                self.connection,
            )
            .await
        } else {
            tracing::debug!(%conn_id, path = conn.path(), "no hub for path");
            return;
        };

        if let Err(e) = result {
            tracing::debug!(%conn_id, error = %e, "connection ended with error");
        }
    }
}
