//! Adapter runtime integration
//!
//! Bridges the synchronous board loop with the async TCP server: the server
//! runs on its own tokio runtime and the loop polls commands without blocking.

use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::warn;

use fruit_cascade_core::types::Pos;

use crate::server::{is_disabled, run_server, ServerConfig};

/// Message delivered to the board loop
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone)]
pub enum InboundPayload {
    Command(ClientCommand),
    /// A client subscribed and wants the current state right away
    SnapshotRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    Swap { a: Pos, b: Pos },
    Hint,
}

/// Line to be written by the server
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClient { client_id: usize, line: String },
    /// To every client streaming observations
    Broadcast { line: String },
}

/// Running adapter instance
pub struct Adapter {
    _rt: Runtime,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
}

impl Adapter {
    /// Start the adapter from environment variables.
    ///
    /// Returns `Ok(None)` when `FRUIT_AI_DISABLED` is set.
    pub fn start_from_env() -> std::io::Result<Option<Self>> {
        if is_disabled() {
            return Ok(None);
        }
        Self::start(ServerConfig::from_env()).map(Some)
    }

    pub fn start(config: ServerConfig) -> std::io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(config.max_pending_commands.max(1));
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();

        let rt = Runtime::new()?;
        rt.spawn(async move {
            if let Err(err) = run_server(config, cmd_tx, out_rx, None).await {
                warn!(error = %err, "adapter server stopped");
            }
        });

        Ok(Self {
            _rt: rt,
            cmd_rx,
            out_tx,
        })
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }
}
