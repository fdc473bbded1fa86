//! Remote-control adapter - drive a board over TCP with a JSON line protocol
//!
//! Lets an external agent (a solver, a bot, a test harness) play the board
//! and watch it evolve.
//!
//! # Protocol Overview
//!
//! 1. **Connection**: client connects (default `127.0.0.1:7777`)
//! 2. **Handshake**: client sends `hello`, server answers `welcome`
//! 3. **Controller**: the first client to say hello controls the board; on
//!    disconnect the lowest remaining id is promoted
//! 4. **Observations**: subscribed clients receive board snapshots
//! 5. **Commands**: the controller sends swaps or asks for a hint
//!
//! ## Client → Server
//!
//! - **hello**: client info, protocol version, whether to stream observations
//! - **command**: `mode` = `swap` with cells `a` and `b`, or `hint`
//! - **control**: `claim` or `release` controller status
//!
//! ## Server → Client
//!
//! - **welcome**: assigned role and capabilities
//! - **observation**: cells, specials, score, chain depth, phase, state hash
//! - **ack**: `ok` once applied, `ignored` when the board dropped it
//! - **error**: `handshake_required`, `protocol_mismatch`, `not_controller`,
//!   `controller_active`, `invalid_command`, `backpressure`
//!
//! # Environment Variables
//!
//! - `FRUIT_AI_HOST`: bind address (default `127.0.0.1`)
//! - `FRUIT_AI_PORT`: port (default 7777)
//! - `FRUIT_AI_MAX_PENDING`: command queue capacity (default 10)
//! - `FRUIT_AI_DISABLED`: `1` or `true` disables the adapter
//!
//! # Example Flow
//!
//! ```text
//! C: {"type":"hello","seq":1,"ts":0,"client":{"name":"bot","version":"1"},"protocol_version":"2.0.0","requested":{"stream_observations":true}}
//! S: {"type":"welcome","seq":1,"ts":...,"protocol_version":"2.0.0","client_id":1,"role":"controller",...}
//! S: {"type":"observation","seq":1,"ts":...,"board":{"width":8,"height":8,"cells":[[0,3,...],...]},...}
//! C: {"type":"command","seq":2,"ts":0,"mode":"swap","a":[3,4],"b":[4,4]}
//! S: {"type":"ack","seq":2,"ts":...,"status":"ok"}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use fruit_cascade_core as core;

pub use protocol::*;
pub use runtime::{Adapter, ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
pub use server::{build_observation, is_disabled, run_server, state_hash, ConfigError, ServerConfig};
