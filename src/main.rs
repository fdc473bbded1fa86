//! Headless board runner (default binary).
//!
//! With the remote-control adapter enabled, the board runs on a fixed tick and
//! swaps come from the controlling client. With `FRUIT_AI_DISABLED=1` the
//! runner autoplays using move hints and prints the final save record as JSON.
//!
//! Board settings come from `FRUIT_BOARD_WIDTH`, `FRUIT_BOARD_HEIGHT`,
//! `FRUIT_POOL_SIZE`, `FRUIT_SEED` and `FRUIT_AUTOPLAY_MOVES`; `FRUIT_SAVE_PATH`
//! names a save record to resume from. When a game ends, a record for
//! `FRUIT_PLAYER_NAME` is appended to the book at `FRUIT_RECORDS_PATH`, if set.
//! Logs go to stderr (`RUST_LOG`).

use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use fruit_cascade::adapter::{
    build_observation, create_ack, create_hint_ack, state_hash, AckStatus, Adapter,
    ClientCommand, InboundCommand, InboundPayload, OutboundMessage,
};
use fruit_cascade::core::{
    Board, BoardConfig, BoardSnapshot, BuffBook, BuffDef, BuffKind, RecordBook, SaveData,
};
use fruit_cascade::types::{BoardEvent, TokenKind, TICK_MS};

const DEFAULT_AUTOPLAY_MOVES: u32 = 200;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let catalog = buff_catalog();
    let save = load_save();

    let mut board = Board::new(config_from_env(), BuffBook::new());
    if let Some(data) = &save {
        board.modifier_mut().load_entries(&data.buffs, &catalog);
    }
    let resumed = board.init_from(save.as_ref());
    info!(
        resumed,
        seed = board.config().seed,
        pool = ?board.pool().kinds(),
        "board ready"
    );

    match Adapter::start_from_env().context("failed to start the adapter runtime")? {
        Some(adapter) => run_remote(board, adapter, &catalog),
        None => run_autoplay(board, &catalog),
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn config_from_env() -> BoardConfig {
    let defaults = BoardConfig::default();
    BoardConfig {
        width: env_parse("FRUIT_BOARD_WIDTH").unwrap_or(defaults.width),
        height: env_parse("FRUIT_BOARD_HEIGHT").unwrap_or(defaults.height),
        pool_size: env_parse("FRUIT_POOL_SIZE").unwrap_or(defaults.pool_size),
        seed: env_parse("FRUIT_SEED").unwrap_or(defaults.seed),
        ..defaults
    }
}

/// Save record named by `FRUIT_SAVE_PATH`; a missing, unreadable or malformed
/// record means a fresh board.
fn load_save() -> Option<SaveData> {
    load_save_from(&std::env::var("FRUIT_SAVE_PATH").ok()?)
}

fn load_save_from(path: &str) -> Option<SaveData> {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(err) => {
            warn!(%path, error = %err, "cannot read save record, starting fresh");
            return None;
        }
    };
    match SaveData::from_json(&json) {
        Ok(data) => Some(data),
        Err(err) => {
            warn!(%path, error = %err, "ignoring unusable save record");
            None
        }
    }
}

/// Buffs the runner can grant: one fruit bonus per kind plus the special ones
fn buff_catalog() -> Vec<BuffDef> {
    let mut catalog: Vec<BuffDef> = TokenKind::ALL
        .iter()
        .map(|&kind| {
            BuffDef::new(
                format!("fruit-{}", kind.as_str().to_ascii_lowercase()),
                BuffKind::FruitScorePercent {
                    target: kind,
                    percent: 20.0,
                },
            )
            .max_stacks(5)
        })
        .collect();
    catalog.push(BuffDef::new("wide-rows", BuffKind::RowBombExtraWidth { extra: 1 }).max_stacks(3));
    catalog.push(BuffDef::new("bomb-bonus", BuffKind::ColorBombTotalBonus { percent: 50.0 }));
    catalog.push(BuffDef::new("chain-bonus", BuffKind::ChainLayerBonusPercent { percent: 25.0 }).unique());
    catalog
}

/// Answers offer events by granting catalog buffs in rotation
#[derive(Debug, Default)]
struct BuffGranter {
    next: usize,
}

impl BuffGranter {
    /// Returns the final score if the game ended
    fn drain_events(&mut self, board: &mut Board<BuffBook>, catalog: &[BuffDef]) -> Option<u32> {
        let mut final_score = None;
        for event in board.take_events() {
            match event {
                BoardEvent::OfferChoice(reason) => self.grant(board, catalog, reason),
                BoardEvent::GameOver { score } => {
                    info!(score, "game over");
                    final_score = Some(score);
                }
                other => debug!(event = ?other, "board event"),
            }
        }
        final_score
    }

    fn grant(
        &mut self,
        board: &mut Board<BuffBook>,
        catalog: &[BuffDef],
        reason: fruit_cascade::types::OfferReason,
    ) {
        for _ in 0..catalog.len() {
            let def = &catalog[self.next % catalog.len()];
            self.next += 1;
            let usable = match def.kind {
                BuffKind::FruitScorePercent { target, .. } => board.pool().contains(target),
                _ => true,
            };
            if usable && board.modifier_mut().add(def.clone()) {
                info!(buff = %def.id, ?reason, "buff granted");
                return;
            }
        }
        debug!(?reason, "no buff left to grant");
    }
}

/// Append the finished game to the record book, if one is configured
fn record_game(score: u32) {
    let Ok(path) = std::env::var("FRUIT_RECORDS_PATH") else {
        return;
    };
    let player = std::env::var("FRUIT_PLAYER_NAME").unwrap_or_default();
    if let Err(err) = append_record(&path, &player, score) {
        warn!(%path, error = %err, "failed to store game record");
    }
}

fn append_record(path: &str, player: &str, score: u32) -> Result<()> {
    let mut book = match std::fs::read_to_string(path) {
        Ok(json) if json.trim().is_empty() => RecordBook::new(),
        Ok(json) => RecordBook::from_json(&json).with_context(|| format!("parsing {}", path))?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => RecordBook::new(),
        Err(err) => return Err(err).with_context(|| format!("reading {}", path)),
    };
    book.add(player, score);
    std::fs::write(path, book.to_json()?).with_context(|| format!("writing {}", path))?;
    info!(player, score, records = book.len(), "game recorded");
    Ok(())
}

fn run_autoplay(mut board: Board<BuffBook>, catalog: &[BuffDef]) -> Result<()> {
    let max_moves = env_parse("FRUIT_AUTOPLAY_MOVES").unwrap_or(DEFAULT_AUTOPLAY_MOVES);
    let mut granter = BuffGranter::default();

    board.step();
    if let Some(score) = granter.drain_events(&mut board, catalog) {
        record_game(score);
    }
    for _ in 0..max_moves {
        if board.is_game_over() {
            break;
        }
        let Some((a, b)) = board.hint() else {
            break;
        };
        if !board.request_swap(a, b) {
            break;
        }
        board.step();
        if let Some(score) = granter.drain_events(&mut board, catalog) {
            record_game(score);
        }
    }
    info!(
        score = board.score(),
        moves = board.move_id(),
        game_over = board.is_game_over(),
        "autoplay finished"
    );

    let buffs = board.modifier().save_entries();
    let mut save = board.teardown();
    save.buffs = buffs;
    println!("{}", save.to_json()?);
    Ok(())
}

fn run_remote(mut board: Board<BuffBook>, mut adapter: Adapter, catalog: &[BuffDef]) -> Result<()> {
    info!("remote control enabled");
    let tick = Duration::from_millis(TICK_MS as u64);
    let mut granter = BuffGranter::default();
    let mut snapshot = BoardSnapshot::default();
    let mut obs_seq: u64 = 0;
    let mut last_hash: Option<u64> = None;

    loop {
        let started = Instant::now();

        while let Some(cmd) = adapter.try_recv() {
            apply_inbound(&mut board, &adapter, cmd, &mut snapshot);
        }

        board.tick(TICK_MS);
        if let Some(score) = granter.drain_events(&mut board, catalog) {
            record_game(score);
        }

        // Stream only when something visible changed.
        board.snapshot_into(&mut snapshot);
        let hash = state_hash(&snapshot);
        if last_hash != Some(hash) {
            last_hash = Some(hash);
            obs_seq += 1;
            if let Some(line) = encode(&build_observation(&snapshot, obs_seq)) {
                adapter.send(OutboundMessage::Broadcast { line });
            }
        }

        if let Some(rest) = tick.checked_sub(started.elapsed()) {
            std::thread::sleep(rest);
        }
    }
}

fn apply_inbound(
    board: &mut Board<BuffBook>,
    adapter: &Adapter,
    cmd: InboundCommand,
    snapshot: &mut BoardSnapshot,
) {
    let line = match cmd.payload {
        InboundPayload::SnapshotRequest => {
            board.snapshot_into(snapshot);
            encode(&build_observation(snapshot, cmd.seq))
        }
        InboundPayload::Command(ClientCommand::Swap { a, b }) => {
            let status = if board.request_swap(a, b) {
                AckStatus::Ok
            } else {
                AckStatus::Ignored
            };
            debug!(client = cmd.client_id, seq = cmd.seq, ?a, ?b, ?status, "swap");
            encode(&create_ack(cmd.seq, status))
        }
        InboundPayload::Command(ClientCommand::Hint) => {
            if board.is_busy() || board.is_game_over() {
                encode(&create_ack(cmd.seq, AckStatus::Ignored))
            } else {
                encode(&create_hint_ack(cmd.seq, board.hint()))
            }
        }
    };
    if let Some(line) = line {
        adapter.send(OutboundMessage::ToClient {
            client_id: cmd.client_id,
            line,
        });
    }
}

fn encode<T: Serialize>(msg: &T) -> Option<String> {
    serde_json::to_string(msg)
        .map_err(|err| warn!(error = %err, "failed to encode message"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("fruit-cascade-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_missing_or_bad_save_starts_fresh() {
        assert!(load_save_from("/nonexistent/fruit-cascade/save.json").is_none());

        let path = scratch_path("bad-save.json");
        std::fs::write(&path, "{\"score\":").unwrap();
        assert!(load_save_from(path.to_str().unwrap()).is_none());

        std::fs::write(&path, r#"{"score":40,"availableTokenNames":["Kiwi"],"tiles":[]}"#).unwrap();
        assert_eq!(load_save_from(path.to_str().unwrap()).map(|d| d.score), Some(40));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_records_accumulate_across_games() {
        let path = scratch_path("records.json");
        let _ = std::fs::remove_file(&path);
        let path_str = path.to_str().unwrap();

        append_record(path_str, "ana", 1200).unwrap();
        append_record(path_str, "", 3400).unwrap();
        let book = RecordBook::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(book.len(), 2);
        assert_eq!(book.best().map(|r| r.player_name.as_str()), Some("Anonymous"));

        // An unparsable book is left alone.
        std::fs::write(&path, "not json").unwrap();
        assert!(append_record(path_str, "bo", 10).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "not json");
        let _ = std::fs::remove_file(&path);
    }
}
