//! TCP server for the remote-control adapter
//!
//! Accepts line-delimited JSON clients, enforces handshake, sequencing and
//! controller ownership, and forwards valid commands to the board loop through
//! a bounded queue. Replies produced by the board loop come back through the
//! outbound channel.

use std::hash::Hasher;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};

use fruit_cascade_core::BoardSnapshot;

use crate::protocol::*;
use crate::runtime::{ClientCommand, InboundCommand, InboundPayload, OutboundMessage};

pub const PROTOCOL_VERSION: &str = "2.0.0";

/// Stable 64-bit FNV-1a hasher for `state_hash`.
///
/// `DefaultHasher` output is not guaranteed stable across Rust releases.
#[derive(Debug, Clone)]
struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

/// Pull `"seq": N` out of a line that failed to parse
fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid listen address {addr}: {source}")]
    InvalidAddr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    /// Capacity of the command queue towards the board loop
    pub max_pending_commands: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7777,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 10,
        }
    }
}

impl ServerConfig {
    /// Read `FRUIT_AI_HOST`, `FRUIT_AI_PORT` and `FRUIT_AI_MAX_PENDING`,
    /// falling back to the defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("FRUIT_AI_HOST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = env::var("FRUIT_AI_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = env::var("FRUIT_AI_MAX_PENDING")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_pending_commands);

        Self {
            host,
            port,
            protocol_version: defaults.protocol_version,
            max_pending_commands,
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|source| ConfigError::InvalidAddr { addr, source })
    }
}

/// `FRUIT_AI_DISABLED=1` (or `true`) turns the adapter off
pub fn is_disabled() -> bool {
    std::env::var("FRUIT_AI_DISABLED")
        .map(|v| v.trim() == "1" || v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Shared server state
struct ServerState {
    config: ServerConfig,
    clients: RwLock<Vec<ClientHandle>>,
    controller: RwLock<Option<usize>>,
}

struct ClientHandle {
    id: usize,
    addr: SocketAddr,
    is_controller: bool,
    stream_observations: bool,
    handshaken: bool,
    last_seq: Option<u64>,
    tx: mpsc::UnboundedSender<String>,
}

impl ServerState {
    fn new(config: ServerConfig) -> Self {
        Self {
            config,
            clients: RwLock::new(Vec::new()),
            controller: RwLock::new(None),
        }
    }

    async fn is_handshaken(&self, client_id: usize) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.handshaken)
            .unwrap_or(false)
    }

    async fn is_controller(&self, client_id: usize) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .any(|c| c.id == client_id && c.is_controller)
    }

    /// Accept `seq` only if it is above the last one seen from this client
    async fn check_and_update_seq(&self, client_id: usize, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return true;
        };
        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }

    async fn send_to(&self, client_id: usize, line: String) {
        let clients = self.clients.read().await;
        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
            let _ = c.tx.send(line);
        }
    }

    async fn broadcast(&self, line: String) {
        let clients = self.clients.read().await;
        for c in clients.iter().filter(|c| c.stream_observations) {
            let _ = c.tx.send(line.clone());
        }
    }

    /// Drop a client; if it held control, the lowest remaining id takes over
    async fn remove(&self, client_id: usize) {
        let mut controller = self.controller.write().await;
        let mut clients = self.clients.write().await;

        clients.retain(|c| c.id != client_id);
        if *controller != Some(client_id) {
            return;
        }
        let next_id = clients.iter().filter(|c| c.handshaken).map(|c| c.id).min();
        *controller = next_id;
        if let Some(c) = next_id.and_then(|id| clients.iter_mut().find(|c| c.id == id)) {
            c.is_controller = true;
            info!(client = c.id, addr = %c.addr, "client promoted to controller");
        }
    }
}

fn encode<T: serde::Serialize>(msg: &T) -> Option<String> {
    match serde_json::to_string(msg) {
        Ok(line) => Some(line),
        Err(err) => {
            warn!(error = %err, "failed to encode message");
            None
        }
    }
}

fn reply<T: serde::Serialize>(tx: &mpsc::UnboundedSender<String>, msg: &T) {
    if let Some(line) = encode(msg) {
        let _ = tx.send(line);
    }
}

/// Start the TCP server.
///
/// Sends the bound address on `ready_tx` once listening (useful with port 0).
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    let bound = listener.local_addr()?;
    info!(addr = %bound, "adapter listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(config));

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                match msg {
                    OutboundMessage::ToClient { client_id, line } => {
                        state.send_to(client_id, line).await
                    }
                    OutboundMessage::Broadcast { line } => state.broadcast(line).await,
                }
            }
        });
    }

    let mut next_client_id = 0usize;
    loop {
        let (socket, addr) = listener.accept().await?;
        next_client_id += 1;
        let client_id = next_client_id;
        info!(client = client_id, %addr, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            if let Err(err) = handle_client(socket, addr, client_id, &state, command_tx).await {
                warn!(client = client_id, error = %err, "client error");
            }
            state.remove(client_id).await;
            info!(client = client_id, "client disconnected");
        });
    }
}

async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: &ServerState,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    state.clients.write().await.push(ClientHandle {
        id: client_id,
        addr,
        is_controller: false,
        stream_observations: false,
        handshaken: false,
        last_seq: None,
        tx: tx.clone(),
    });

    let write_task = tokio::spawn(async move {
        while let Some(mut line) = rx.recv().await {
            line.push('\n');
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let keep_open = match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                on_hello(state, client_id, &tx, &command_tx, hello).await
            }
            Ok(ParsedMessage::Command(cmd)) => {
                on_command(state, client_id, &tx, &command_tx, cmd).await;
                true
            }
            Ok(ParsedMessage::Control(ctrl)) => {
                on_control(state, client_id, &tx, ctrl).await;
                true
            }
            Ok(ParsedMessage::Unknown(msg)) => {
                if state.check_sequenced(client_id, &tx, msg.seq).await {
                    reply(
                        &tx,
                        &create_error(msg.seq, ErrorCode::InvalidCommand, "Unknown message type"),
                    );
                }
                true
            }
            Err(err) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                debug!(client = client_id, error = %err, "unparsable line");
                reply(
                    &tx,
                    &create_error(seq, ErrorCode::InvalidCommand, &format!("JSON parse error: {}", err)),
                );
                true
            }
        };
        if !keep_open {
            break;
        }
    }

    // Dropping every sender lets the writer flush queued replies (e.g. a
    // protocol mismatch error) and stop.
    state.remove(client_id).await;
    drop(tx);
    let _ = write_task.await;
    Ok(())
}

impl ServerState {
    /// Sequencing check for handshaken clients; replies with an error on failure
    async fn check_sequenced(
        &self,
        client_id: usize,
        tx: &mpsc::UnboundedSender<String>,
        seq: u64,
    ) -> bool {
        if self.is_handshaken(client_id).await && !self.check_and_update_seq(client_id, seq).await {
            reply(
                tx,
                &create_error(seq, ErrorCode::InvalidCommand, "seq must be strictly increasing"),
            );
            return false;
        }
        true
    }

    /// Handshake and sequencing checks shared by command and control messages
    async fn check_ready(
        &self,
        client_id: usize,
        tx: &mpsc::UnboundedSender<String>,
        seq: u64,
        what: &str,
    ) -> bool {
        if !self.is_handshaken(client_id).await {
            reply(
                tx,
                &create_error(
                    seq,
                    ErrorCode::HandshakeRequired,
                    &format!("Send hello before {}", what),
                ),
            );
            return false;
        }
        self.check_sequenced(client_id, tx, seq).await
    }
}

/// Returns false when the connection should be closed
async fn on_hello(
    state: &ServerState,
    client_id: usize,
    tx: &mpsc::UnboundedSender<String>,
    command_tx: &mpsc::Sender<InboundCommand>,
    hello: HelloMessage,
) -> bool {
    if !state.check_sequenced(client_id, tx, hello.seq).await {
        return true;
    }

    if !hello.protocol_version.starts_with("2.") {
        warn!(client = client_id, version = %hello.protocol_version, "protocol mismatch");
        reply(
            tx,
            &create_error(
                hello.seq,
                ErrorCode::ProtocolMismatch,
                &format!("Protocol version {} not supported", hello.protocol_version),
            ),
        );
        return false;
    }

    // First client to say hello takes control.
    let (role, controller_id) = {
        let mut controller = state.controller.write().await;
        let mut clients = state.clients.write().await;
        let became_controller = controller.is_none() || *controller == Some(client_id);
        if became_controller {
            *controller = Some(client_id);
        }
        if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
            client.handshaken = true;
            client.last_seq = Some(hello.seq);
            client.stream_observations = hello.requested.stream_observations;
            client.is_controller = became_controller;
        }
        let role = if became_controller {
            AssignedRole::Controller
        } else {
            AssignedRole::Observer
        };
        (role, (*controller).map(|id| id as u64))
    };
    info!(client = client_id, name = %hello.client.name, ?role, "handshake complete");

    reply(
        tx,
        &create_welcome(
            hello.seq,
            &state.config.protocol_version,
            client_id as u64,
            role,
            controller_id,
        ),
    );

    if hello.requested.stream_observations {
        let _ = command_tx.try_send(InboundCommand {
            client_id,
            seq: hello.seq,
            payload: InboundPayload::SnapshotRequest,
        });
    }
    true
}

async fn on_command(
    state: &ServerState,
    client_id: usize,
    tx: &mpsc::UnboundedSender<String>,
    command_tx: &mpsc::Sender<InboundCommand>,
    cmd: CommandMessage,
) {
    if !state.check_ready(client_id, tx, cmd.seq, "command").await {
        return;
    }
    if !state.is_controller(client_id).await {
        reply(
            tx,
            &create_error(cmd.seq, ErrorCode::NotController, "Only controller may send commands"),
        );
        return;
    }

    let mapped = match map_command(&cmd) {
        Ok(c) => c,
        Err(message) => {
            reply(tx, &create_error(cmd.seq, ErrorCode::InvalidCommand, message));
            return;
        }
    };

    // The board loop acks once the command is applied.
    let queued = command_tx.try_send(InboundCommand {
        client_id,
        seq: cmd.seq,
        payload: InboundPayload::Command(mapped),
    });
    if queued.is_err() {
        debug!(client = client_id, seq = cmd.seq, "command queue full");
        reply(
            tx,
            &create_error(cmd.seq, ErrorCode::Backpressure, "Command queue is full"),
        );
    }
}

fn map_command(cmd: &CommandMessage) -> Result<ClientCommand, &'static str> {
    match cmd.mode {
        CommandMode::Hint => Ok(ClientCommand::Hint),
        CommandMode::Swap => {
            let (Some(a), Some(b)) = (cmd.a, cmd.b) else {
                return Err("swap needs cells a and b");
            };
            match (a.to_pos(), b.to_pos()) {
                (Some(a), Some(b)) => Ok(ClientCommand::Swap { a, b }),
                _ => Err("cell coordinates out of range"),
            }
        }
    }
}

async fn on_control(
    state: &ServerState,
    client_id: usize,
    tx: &mpsc::UnboundedSender<String>,
    ctrl: ControlMessage,
) {
    if !state.check_ready(client_id, tx, ctrl.seq, "control").await {
        return;
    }

    let mut controller = state.controller.write().await;
    let mut clients = state.clients.write().await;
    match ctrl.action {
        ControlAction::Claim => {
            if controller.is_some() && *controller != Some(client_id) {
                reply(
                    tx,
                    &create_error(ctrl.seq, ErrorCode::ControllerActive, "Controller already assigned"),
                );
                return;
            }
            *controller = Some(client_id);
            if let Some(c) = clients.iter_mut().find(|c| c.id == client_id) {
                c.is_controller = true;
            }
            info!(client = client_id, "control claimed");
        }
        ControlAction::Release => {
            if *controller != Some(client_id) {
                reply(
                    tx,
                    &create_error(ctrl.seq, ErrorCode::NotController, "Only controller may release"),
                );
                return;
            }
            *controller = None;
            if let Some(c) = clients.iter_mut().find(|c| c.id == client_id) {
                c.is_controller = false;
            }
            info!(client = client_id, "control released");
        }
    }
    reply(tx, &create_ack(ctrl.seq, AckStatus::Ok));
}

/// Build an observation from a board snapshot
pub fn build_observation(snapshot: &BoardSnapshot, seq: u64) -> ObservationMessage {
    let width = snapshot.width as usize;
    let rows = |codes: &[u8]| -> Vec<Vec<u8>> {
        if width == 0 {
            return Vec::new();
        }
        codes.chunks(width).map(<[u8]>::to_vec).collect()
    };

    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        playable: snapshot.playable(),
        busy: snapshot.busy,
        game_over: snapshot.game_over,
        phase: snapshot.phase.into(),
        seed: snapshot.seed,
        move_id: snapshot.move_id,
        board: BoardCells {
            width: snapshot.width,
            height: snapshot.height,
            cells: rows(&snapshot.kinds),
            specials: rows(&snapshot.specials),
        },
        score: snapshot.score,
        chain_depth: snapshot.chain_depth,
        pool: snapshot.pool.iter().map(|k| k.as_str().to_string()).collect(),
        state_hash: StateHash(state_hash(snapshot)),
    }
}

/// FNV-1a over everything an observer can see except timing fields
pub fn state_hash(snapshot: &BoardSnapshot) -> u64 {
    let mut h = Fnv1aHasher::new();
    h.write_u8(snapshot.width);
    h.write_u8(snapshot.height);
    h.write(&snapshot.kinds);
    h.write(&snapshot.specials);
    h.write_u32(snapshot.score);
    h.write_u32(snapshot.chain_depth);
    h.write_u8(snapshot.phase as u8);
    h.write_u8(snapshot.game_over as u8);
    for kind in &snapshot.pool {
        h.write_u8(kind.index());
    }
    h.write_u32(snapshot.seed);
    h.write_u32(snapshot.move_id);
    h.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fruit_cascade_core::types::{Phase, TokenKind};

    fn snapshot() -> BoardSnapshot {
        BoardSnapshot {
            width: 3,
            height: 3,
            kinds: vec![0, 1, 0, 2, 3, 4, 0, 5, 0],
            specials: vec![0, 0, 0, 0, 1, 0, 0, 2, 0],
            score: 90,
            chain_depth: 0,
            phase: Phase::Idle,
            busy: false,
            game_over: false,
            pool: vec![TokenKind::Apple, TokenKind::Kiwi, TokenKind::Pear],
            seed: 7,
            move_id: 3,
        }
    }

    #[test]
    fn test_extract_seq_best_effort() {
        assert_eq!(extract_seq_best_effort(r#"{"type":"command","seq": 42,"#), Some(42));
        assert_eq!(extract_seq_best_effort(r#"{"seq":"x"}"#), None);
        assert_eq!(extract_seq_best_effort("garbage"), None);
    }

    #[test]
    fn test_fnv1a_known_vector() {
        let mut h = Fnv1aHasher::new();
        h.write(b"a");
        assert_eq!(h.finish(), 0xaf63dc4c8601ec8c);
    }

    #[test]
    fn test_observation_rows_bottom_up() {
        let obs = build_observation(&snapshot(), 11);
        assert_eq!(obs.seq, 11);
        assert_eq!(obs.board.cells[0], vec![0, 1, 0]);
        assert_eq!(obs.board.specials[2], vec![0, 2, 0]);
        assert_eq!(obs.pool, vec!["Apple", "Kiwi", "Pear"]);
        assert_eq!(obs.phase, PhaseName::Idle);
        assert!(obs.playable);
    }

    #[test]
    fn test_state_hash_tracks_board() {
        let a = snapshot();
        let mut b = snapshot();
        assert_eq!(state_hash(&a), state_hash(&b));
        b.kinds[4] = 1;
        assert_ne!(state_hash(&a), state_hash(&b));
    }

    #[test]
    fn test_map_command() {
        let json = r#"{"type":"command","seq":2,"ts":1,"mode":"swap","a":[1,1]}"#;
        let ParsedMessage::Command(cmd) = parse_message(json).unwrap() else {
            panic!("expected command");
        };
        assert!(map_command(&cmd).is_err());

        let json = r#"{"type":"command","seq":2,"ts":1,"mode":"swap","a":[1,1],"b":[1,2]}"#;
        let ParsedMessage::Command(cmd) = parse_message(json).unwrap() else {
            panic!("expected command");
        };
        assert!(matches!(map_command(&cmd), Ok(ClientCommand::Swap { .. })));
    }

    #[test]
    fn test_socket_addr_error() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..ServerConfig::default()
        };
        assert!(matches!(config.socket_addr(), Err(ConfigError::InvalidAddr { .. })));
        assert!(ServerConfig::default().socket_addr().is_ok());
    }
}
