//! Game-loop kernel (workspace facade crate).
//!
//! This package keeps the public `game_kernel::{core,term}` surface stable
//! while the implementation lives in dedicated crates under `crates/`.

pub use game_kernel_core as core;
pub use game_kernel_term as term;
