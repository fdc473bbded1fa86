//! Fruit cascade (workspace facade crate).
//!
//! Re-exports the crates under `crates/` so drivers, tests and benches can
//! reach everything through `fruit_cascade::{types, core, adapter}`.

pub use fruit_cascade_adapter as adapter;
pub use fruit_cascade_core as core;
pub use fruit_cascade_types as types;
