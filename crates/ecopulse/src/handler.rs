//! Per-connection event loop.
//!
//! One handler task runs per accepted client. It owns the connection's
//! receive side, drains the client's outbound queue, and applies every
//! decoded client event to the shared session store. All events the
//! server emits for this client go through the outbound queue, so the
//! interval jobs never touch a socket directly.

use std::sync::Arc;

use chrono::Utc;
use ecopulse_protocol::{
    ClientEvent, Codec, NotificationKind, ServerEvent, SessionId,
};
use ecopulse_session::Device;
use ecopulse_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::EcoPulseError;
use crate::registry::ClientSender;
use crate::server::ServerState;

/// Removes the connection's session and outbound queue when the handler
/// task ends, however it ends.
///
/// Cleanup needs the async mutexes, so the `Drop` impl spawns a task to
/// do it.
struct ConnectionGuard<C: Codec> {
    id: SessionId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for ConnectionGuard<C> {
    fn drop(&mut self) {
        let id = self.id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            state.sessions.lock().await.remove(id);
            state.clients.lock().await.remove(id);
            tracing::debug!(%id, "connection cleaned up");
        });
    }
}

/// Drives a single client connection until it closes.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), EcoPulseError> {
    let session_id = SessionId(conn.id().into_inner());
    let (tx, mut rx) = mpsc::unbounded_channel();
    state.clients.lock().await.insert(session_id, tx.clone());

    let _guard = ConnectionGuard {
        id: session_id,
        state: Arc::clone(&state),
    };

    loop {
        tokio::select! {
            outbound = rx.recv() => {
                // The registry holds the only other sender clone, so this
                // is None only after cleanup has already started.
                let Some(event) = outbound else { break };
                let data = state.codec.encode(&event)?;
                if let Err(e) = conn.send(&data).await {
                    tracing::debug!(
                        %session_id, error = %e,
                        "send failed, closing connection"
                    );
                    break;
                }
            }
            inbound = conn.recv() => {
                match inbound {
                    Ok(Some(data)) => {
                        let event: ClientEvent =
                            match state.codec.decode(&data) {
                                Ok(event) => event,
                                Err(e) => {
                                    tracing::debug!(
                                        %session_id, error = %e,
                                        "undecodable client event ignored"
                                    );
                                    continue;
                                }
                            };
                        if handle_event(&state, session_id, &tx, event)
                            .await
                        {
                            break;
                        }
                    }
                    Ok(None) => {
                        tracing::debug!(%session_id, "client closed");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(
                            %session_id, error = %e,
                            "receive failed, closing connection"
                        );
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}

/// Applies one decoded client event. Returns `true` when the client asked
/// to disconnect.
async fn handle_event<C: Codec>(
    state: &Arc<ServerState<C>>,
    session_id: SessionId,
    tx: &ClientSender,
    event: ClientEvent,
) -> bool {
    match event {
        ClientEvent::StudentLogin {
            username,
            user_role,
        } => {
            if user_role != "student" {
                tracing::warn!(
                    %session_id, username, user_role,
                    "non-student login ignored"
                );
                return false;
            }
            state.sessions.lock().await.login(session_id, &username);
            queue(
                tx,
                ServerEvent::StudentLoginAck {
                    session_id,
                    message: "Logged in successfully".to_string(),
                },
            );
        }

        ClientEvent::ChargerToggle { charger_on } => {
            device_toggle(state, session_id, tx, Device::Charger, charger_on)
                .await;
        }

        ClientEvent::LightsToggle { lights_on } => {
            device_toggle(state, session_id, tx, Device::Lights, lights_on)
                .await;
        }

        ClientEvent::RuleViolation { kind, triggered } => {
            let result = state
                .sessions
                .lock()
                .await
                .report_violation(session_id, kind, triggered);
            match result {
                Ok(()) => {
                    queue(
                        tx,
                        ServerEvent::RuleViolationAck { kind, triggered },
                    );
                }
                Err(e) => {
                    tracing::debug!(
                        %session_id, error = %e,
                        "violation report before login ignored"
                    );
                }
            }
        }

        ClientEvent::Disconnect => {
            tracing::info!(%session_id, "client requested disconnect");
            return true;
        }
    }

    false
}

/// Applies a device toggle and queues the resulting events.
///
/// On the off edge the order matters for the dashboard: the points update
/// (if any) first, then the device notification, then the state snapshot.
async fn device_toggle<C: Codec>(
    state: &Arc<ServerState<C>>,
    session_id: SessionId,
    tx: &ClientSender,
    device: Device,
    on: bool,
) {
    let (award, snapshot) = {
        let mut sessions = state.sessions.lock().await;
        let award = match sessions.set_device(session_id, device, on) {
            Ok(award) => award,
            Err(e) => {
                tracing::debug!(
                    %session_id, error = %e,
                    "device toggle before login ignored"
                );
                return;
            }
        };
        // set_device just succeeded, so the session exists.
        let snapshot = sessions
            .snapshot(session_id)
            .expect("session looked up a moment ago");
        (award, snapshot)
    };

    if let Some(award) = award {
        let message = if award.quick {
            format!(
                "+{} eco points earned (bonus for quick action!)",
                award.points
            )
        } else {
            format!("+{} eco points earned", award.points)
        };
        queue(
            tx,
            ServerEvent::EcoPointsUpdate {
                points_awarded: award.points,
                total_points: award.total,
                today_points: award.today,
                message,
            },
        );
    }

    let device_name = match device {
        Device::Charger => "Charger",
        Device::Lights => "Lights",
    };
    let edge = if on { "ON" } else { "OFF" };
    queue(
        tx,
        ServerEvent::Notification {
            kind: NotificationKind::Device,
            message: format!("{device_name} turned {edge}"),
            timestamp: Utc::now().to_rfc3339(),
        },
    );

    queue(tx, ServerEvent::StudentStateUpdate(snapshot));
}

/// Pushes an event onto this client's outbound queue.
fn queue(tx: &ClientSender, event: ServerEvent) {
    if tx.send(event).is_err() {
        // The handler's receive half is gone; the connection is closing.
        tracing::debug!("outbound queue closed, event dropped");
    }
}
