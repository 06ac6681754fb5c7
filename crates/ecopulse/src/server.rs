//! `EcoPulseServer` builder and server loop.
//!
//! This is the entry point for running an EcoPulse dashboard server. It
//! ties the transport, protocol, session, and rules layers together and
//! drives the two fixed-interval jobs (campus broadcast, rule scan).

use std::sync::Arc;
use std::time::Duration;

use chrono::{Timelike, Utc};
use ecopulse_protocol::{
    Codec, JsonCodec, NotificationKind, ServerEvent, ViolationKind,
};
use ecopulse_rules::{RuleConfig, RuleEngine};
use ecopulse_session::{PointsConfig, SessionStore};
use ecopulse_sim::CampusSimulator;
use ecopulse_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::EcoPulseError;
use crate::handler::handle_connection;
use crate::registry::ClientRegistry;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The session
/// store and client registry sit behind their own mutexes; every critical
/// section is short, and the two locks are never held at the same time.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) sessions: Mutex<SessionStore>,
    pub(crate) clients: Mutex<ClientRegistry>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting an EcoPulse server.
///
/// # Example
///
/// ```rust,ignore
/// use ecopulse::prelude::*;
///
/// let server = EcoPulseServerBuilder::new()
///     .bind("0.0.0.0:5000")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct EcoPulseServerBuilder {
    bind_addr: String,
    broadcast_interval: Duration,
    scan_interval: Duration,
    points: PointsConfig,
    rules: RuleConfig,
}

impl EcoPulseServerBuilder {
    /// Creates a new builder with default settings: campus broadcast
    /// every 5 seconds, rule scan every 2 seconds, classroom-default
    /// point values and rule thresholds.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
            broadcast_interval: Duration::from_secs(5),
            scan_interval: Duration::from_secs(2),
            points: PointsConfig::default(),
            rules: RuleConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets how often a campus reading is broadcast to all clients.
    pub fn broadcast_interval(mut self, interval: Duration) -> Self {
        self.broadcast_interval = interval;
        self
    }

    /// Sets how often the rule scanner walks the session store.
    pub fn scan_interval(mut self, interval: Duration) -> Self {
        self.scan_interval = interval;
        self
    }

    /// Sets the eco-point award parameters.
    pub fn points_config(mut self, points: PointsConfig) -> Self {
        self.points = points;
        self
    }

    /// Sets the rule thresholds.
    pub fn rule_config(mut self, rules: RuleConfig) -> Self {
        self.rules = rules;
        self
    }

    /// Builds the server, binding the WebSocket transport.
    ///
    /// Uses `JsonCodec`, the wire format browser dashboards speak.
    pub async fn build(
        self,
    ) -> Result<EcoPulseServer<JsonCodec>, EcoPulseError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            sessions: Mutex::new(SessionStore::new(self.points)),
            clients: Mutex::new(ClientRegistry::new()),
            codec: JsonCodec,
        });

        Ok(EcoPulseServer {
            transport,
            state,
            broadcast_interval: self.broadcast_interval,
            scan_interval: self.scan_interval,
            engine: RuleEngine::new(self.rules),
        })
    }
}

impl Default for EcoPulseServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running EcoPulse dashboard server.
///
/// Call [`run()`](Self::run) to start the interval jobs and accept
/// connections.
pub struct EcoPulseServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
    broadcast_interval: Duration,
    scan_interval: Duration,
    engine: RuleEngine,
}

impl<C: Codec> EcoPulseServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server.
    ///
    /// Spawns the campus broadcast and rule-scan interval tasks, then
    /// accepts incoming connections, spawning a handler task per client.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), EcoPulseError> {
        tracing::info!("EcoPulse server running");

        tokio::spawn(broadcast_loop(
            Arc::clone(&self.state),
            self.broadcast_interval,
        ));
        tokio::spawn(scan_loop(
            Arc::clone(&self.state),
            self.engine.clone(),
            self.scan_interval,
        ));

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection::<C>(conn, state).await
                        {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

/// The campus broadcast job: every interval, generate one simulated
/// reading and fan it out to every connected client.
async fn broadcast_loop<C: Codec>(
    state: Arc<ServerState<C>>,
    period: Duration,
) {
    let sim = CampusSimulator::new();
    let mut interval = tokio::time::interval(period);
    // The first tick of a Tokio interval completes immediately; consume
    // it so the first reading goes out one full period after startup.
    interval.tick().await;

    loop {
        interval.tick().await;
        let reading = sim.generate();
        let delivered = state
            .clients
            .lock()
            .await
            .broadcast(&ServerEvent::CampusData(reading));
        tracing::debug!(delivered, ?reading, "campus data broadcast");
    }
}

/// The rule-scan job: every interval, walk the session store, flag new
/// violations, and alert the affected clients.
async fn scan_loop<C: Codec>(
    state: Arc<ServerState<C>>,
    engine: RuleEngine,
    period: Duration,
) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await;

    loop {
        interval.tick().await;

        // Flag first under the session lock, notify after releasing it.
        let local_hour = chrono::Local::now().hour();
        let hits = {
            let mut sessions = state.sessions.lock().await;
            engine.scan(&mut sessions, local_hour)
        };
        if hits.is_empty() {
            continue;
        }

        let clients = state.clients.lock().await;
        for hit in hits {
            let message = match hit.kind {
                ViolationKind::ChargerDuration => {
                    "Your charger has been plugged in too long! Unplug it \
                     to earn eco points."
                }
                ViolationKind::LightsDaytime => {
                    "Your lights are on during daytime! Turn them off to \
                     earn eco points."
                }
            };
            clients.send_to(
                hit.id,
                ServerEvent::Notification {
                    kind: NotificationKind::Alert,
                    message: message.to_string(),
                    timestamp: Utc::now().to_rfc3339(),
                },
            );
        }
    }
}
