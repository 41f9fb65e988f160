#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! # `digminer-cleos` — Subprocess Layer over the cleos Binary
//!
//! This crate owns every interaction with the external `cleos` client:
//! unlocking the signing wallet once at startup, and pushing contract
//! actions for the rest of the process lifetime.
//!
//! ## Core Concepts
//!
//! ### `CleosHandler`
//! The production handle. Construction via [`CleosHandler::connect`] issues
//! the one-shot `wallet unlock` call; afterwards the handler only runs
//! `push action` subprocesses, each bounded by [`PUSH_TIMEOUT`]. All fields
//! are set once and never mutated.
//!
//! ### `ActionPusher` Trait
//! The seam between the mining loop and the subprocess layer. The loop only
//! needs "push this action as this account"; tests substitute in-memory
//! implementations to observe scheduling without spawning anything.
//!
//! ### `DynActionPusher`
//! A type-erased (`Arc<dyn ActionPusher>`) alias for ergonomic sharing —
//! the mining loop operates over any pusher without knowing which one is
//! in use.
//!
//! ### `PushOutcome`
//! Per-iteration push failures are data, not errors. The mining loop keeps
//! going whatever happened, so a push reports what the subprocess did —
//! success with captured stdout, or a diagnostic saying how it failed —
//! instead of an `Err` the caller would have to swallow.
//!
//! ## Example
//! ```no_run
//! use cleos::{ActionPusher, CleosHandler};
//! use config::CleosConfig;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! # let cfg: CleosConfig = todo!();
//! let handler = CleosHandler::connect(&cfg).await.unwrap();
//! let outcome = handler.push_action("digcoinsmine", "mine", "{}").await;
//! println!("delivered: {}", outcome.is_delivered());
//! # });
//! ```

use std::sync::Arc;

use async_trait::async_trait;

pub mod handler;

pub use handler::{CleosHandler, PUSH_TIMEOUT};

/// Canonical error type for handler construction.
///
/// Only startup can fail loudly; once a handler exists, per-action failures
/// flow through [`PushOutcome`] and never surface as errors.
#[derive(thiserror::Error, Debug)]
pub enum CleosError {
    /// The wallet unlock subprocess could not even be started, most
    /// commonly because the configured binary is missing or not executable.
    #[error("failed to unlock cleos wallet: {0}")]
    WalletUnlock(String),
}

/// Outcome of a single `push action` invocation.
#[derive(Debug)]
#[must_use]
pub enum PushOutcome {
    /// The subprocess exited zero; payload is its raw captured stdout.
    Delivered(Vec<u8>),
    /// The subprocess failed; the loop continues regardless.
    Failed(PushFailure),
}

impl PushOutcome {
    /// True when the action reached the chain client successfully.
    pub fn is_delivered(&self) -> bool {
        matches!(self, PushOutcome::Delivered(_))
    }
}

/// How a push invocation failed.
///
/// Each variant corresponds to a distinct subprocess failure mode, so the
/// log line (and any future caller) can tell a missing binary from a slow
/// node from a rejected transaction.
#[derive(Debug, thiserror::Error)]
pub enum PushFailure {
    /// The binary could not be spawned at all.
    #[error("failed to spawn cleos: {0}")]
    Spawn(String),
    /// The subprocess outlived [`PUSH_TIMEOUT`] and was killed.
    #[error("cleos did not exit within {}s", PUSH_TIMEOUT.as_secs())]
    TimedOut,
    /// The subprocess ran but exited non-zero.
    #[error("cleos exited with status {code:?}: {stderr}")]
    Exited {
        /// Exit code, when the platform reports one.
        code: Option<i32>,
        /// Captured standard error, lossily decoded and trimmed.
        stderr: String,
    },
}

/// The seam between the mining loop and the subprocess layer.
///
/// [`CleosHandler`] is the production implementation; tests use counting or
/// always-failing mocks to pin down loop behavior.
#[async_trait]
pub trait ActionPusher: Send + Sync {
    /// Push a contract action, signed by the configured account's active
    /// permission. Never fails loudly: every subprocess problem is folded
    /// into the returned [`PushOutcome`].
    async fn push_action(&self, contract: &str, action: &str, data: &str) -> PushOutcome;

    /// The account actions are signed with (`-p <account>@active`).
    fn account(&self) -> &str;
}

/// A type-erased, shareable [`ActionPusher`].
///
/// Production code hands the mining loop a [`CleosHandler`] behind this
/// alias; tests hand in recording or always-failing pushers the same way.
pub type DynActionPusher = Arc<dyn ActionPusher>;
