//! The Duello server: accept loop, janitor, and builder.

use std::sync::Arc;
use std::time::Duration;

use duello_engine::{Directory, DuelConfig, DuelManager};
use duello_presence::{Presence, PresenceConfig};
use duello_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::{DuelloError, InMemoryDirectory, handler};

/// Builder for a [`DuelloServer`].
pub struct DuelloServerBuilder {
    addr: String,
    presence_config: PresenceConfig,
    duel_config: DuelConfig,
    directory: Option<Arc<dyn Directory>>,
    sweep_interval: Duration,
}

impl DuelloServerBuilder {
    fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            presence_config: PresenceConfig::default(),
            duel_config: DuelConfig::default(),
            directory: None,
            sweep_interval: Duration::from_secs(300),
        }
    }

    /// Overrides the presence configuration.
    pub fn presence_config(mut self, config: PresenceConfig) -> Self {
        self.presence_config = config;
        self
    }

    /// Overrides the duel configuration.
    pub fn duel_config(mut self, config: DuelConfig) -> Self {
        self.duel_config = config;
        self
    }

    /// Uses a custom directory instead of the default in-memory one.
    pub fn directory(mut self, directory: Arc<dyn Directory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// How often finished sessions are swept out of the manager.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Binds the listener and assembles the server.
    pub async fn build(self) -> Result<DuelloServer, DuelloError> {
        let transport = WebSocketTransport::bind(&self.addr).await?;
        let presence = Presence::new(self.presence_config);
        let directory = self
            .directory
            .unwrap_or_else(|| Arc::new(InMemoryDirectory::new()));
        let manager = Arc::new(Mutex::new(DuelManager::new(
            presence.fabric(),
            directory,
            self.duel_config,
        )));

        Ok(DuelloServer {
            transport,
            presence,
            manager,
            sweep_interval: self.sweep_interval,
        })
    }
}

/// A running (or ready-to-run) Duello server.
pub struct DuelloServer {
    transport: WebSocketTransport,
    presence: Presence,
    manager: Arc<Mutex<DuelManager>>,
    sweep_interval: Duration,
}

impl DuelloServer {
    /// Starts building a server that will listen on `addr`.
    pub fn bind(addr: impl Into<String>) -> DuelloServerBuilder {
        DuelloServerBuilder::new(addr)
    }

    /// The bound listen address.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, DuelloError> {
        Ok(self.transport.local_addr()?)
    }

    /// A handle to the presence service.
    pub fn presence(&self) -> Presence {
        self.presence.clone()
    }

    /// A handle to the duel manager.
    pub fn manager(&self) -> Arc<Mutex<DuelManager>> {
        Arc::clone(&self.manager)
    }

    /// Accepts connections forever.
    pub async fn run(mut self) -> Result<(), DuelloError> {
        let janitor_manager = Arc::clone(&self.manager);
        let sweep_interval = self.sweep_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_interval);
            ticker.tick().await; // first tick is immediate
            loop {
                ticker.tick().await;
                janitor_manager.lock().await.reap_finished();
            }
        });

        tracing::info!("duello server running");
        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let presence = self.presence.clone();
                    let manager = Arc::clone(&self.manager);
                    tokio::spawn(handler::handle_connection(conn, presence, manager));
                }
                Err(err) => {
                    // One bad handshake shouldn't take the bar down.
                    tracing::warn!(%err, "failed to accept connection");
                }
            }
        }
    }
}
