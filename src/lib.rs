//! Blockfall (workspace facade crate).
//!
//! Re-exports the engine crates under `blockfall::{core,types}` and adds the
//! JSON script runner used by the binary and the integration tests.

pub use blockfall_core as core;
pub use blockfall_types as types;

pub mod script;
