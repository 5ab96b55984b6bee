//! Per-connection actor: one reader, one writer, both tied to a hub.
//!
//! Each accepted connection gets its own Tokio task running
//! [`handle_connection`]. The flow is:
//!   1. Register with the hub → participant id + outbound queue
//!   2. Spawn the write pump: outbound queue → socket, plus pings
//!   3. Run the read pump: socket → decoded actions → hub, giving up
//!      when the peer stops answering pings
//!   4. Whichever pump stops first, tell the hub the participant left

use std::sync::Arc;

use duelhub_hub::{DuelGame, HubHandle};
use duelhub_protocol::{Codec, ParticipantId};
use duelhub_transport::{Connection, TransportError, WebSocketConnection};
use tokio::sync::mpsc;
use tokio::time::{Instant, interval_at, timeout};

use crate::{ConnectionSettings, DuelhubError};

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<G, C>(
    conn: WebSocketConnection,
    hub: HubHandle<G>,
    codec: C,
    settings: ConnectionSettings,
) -> Result<(), DuelhubError>
where
    G: DuelGame,
    C: Codec + Clone,
{
    let conn = Arc::new(conn.with_idle_limit(settings.pong_wait));
    let conn_id = conn.id();

    let (participant, outbound) = hub.connect().await?;
    tracing::debug!(%conn_id, %participant, game = G::NAME, "connection registered");

    let mut writer = tokio::spawn(write_pump::<G, C>(
        Arc::clone(&conn),
        participant,
        outbound,
        codec.clone(),
        settings,
    ));

    let writer_done = tokio::select! {
        () = read_pump(&conn, &hub, participant, &codec) => false,
        _ = &mut writer => true,
    };

    // The hub drops the outbound sender when it processes this, which
    // lets the writer drain and close the socket.
    let result = hub.disconnect(participant).await;
    if !writer_done {
        let _ = writer.await;
    }
    tracing::debug!(%conn_id, %participant, game = G::NAME, "connection finished");
    result.map_err(DuelhubError::from)
}

/// Socket → hub. Returns on EOF, read error, a peer silent for longer
/// than `pong_wait`, or a stopped hub.
async fn read_pump<G, C>(
    conn: &WebSocketConnection,
    hub: &HubHandle<G>,
    participant: ParticipantId,
    codec: &C,
) where
    G: DuelGame,
    C: Codec,
{
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(%participant, "connection closed by peer");
                return;
            }
            Err(e @ TransportError::IdleTimeout(_)) => {
                tracing::info!(%participant, error = %e, "peer went silent");
                return;
            }
            Err(e) => {
                tracing::debug!(%participant, error = %e, "recv error");
                return;
            }
        };

        let action: G::Action = match codec.decode(&data) {
            Ok(action) => action,
            Err(e) => {
                tracing::debug!(%participant, error = %e, "dropping undecodable frame");
                continue;
            }
        };

        if let Err(e) = hub.act(participant, action).await {
            tracing::warn!(%participant, error = %e, "hub stopped");
            return;
        }
    }
}

/// Hub → socket. Returns when the outbound queue closes or a write
/// fails; closes the socket on a clean exit.
async fn write_pump<G, C>(
    conn: Arc<WebSocketConnection>,
    participant: ParticipantId,
    mut outbound: mpsc::Receiver<G::Event>,
    codec: C,
    settings: ConnectionSettings,
) where
    G: DuelGame,
    C: Codec,
{
    let mut ping = interval_at(
        Instant::now() + settings.ping_interval,
        settings.ping_interval,
    );

    loop {
        tokio::select! {
            event = outbound.recv() => {
                let Some(event) = event else {
                    break;
                };
                let bytes = match codec.encode(&event) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!(%participant, error = %e, "failed to encode event");
                        continue;
                    }
                };
                match timeout(settings.write_timeout, conn.send(&bytes)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        tracing::debug!(%participant, error = %e, "send failed");
                        return;
                    }
                    Err(_) => {
                        tracing::debug!(%participant, "send timed out");
                        return;
                    }
                }
            }
            _ = ping.tick() => {
                if !matches!(timeout(settings.write_timeout, conn.ping()).await, Ok(Ok(()))) {
                    tracing::debug!(%participant, "ping failed");
                    return;
                }
            }
        }
    }

    if let Err(e) = conn.close().await {
        tracing::debug!(%participant, error = %e, "close failed");
    }
}
