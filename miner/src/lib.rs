#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! # `digminer-miner` — The Mining Loop
//!
//! Builds the fixed `mine` payload for the `digcoinsmine` contract and
//! pushes it over an [`ActionPusher`] on a fixed cadence, forever (or for a
//! bounded number of iterations when a limit is set).
//!
//! ## Core Concepts
//!
//! ### Payload
//! Every attempt submits the same shape of payload: the mining account plus
//! the token symbol, rendered as `<precision>,<code>`. [`mine_payload`]
//! produces it fresh each iteration.
//!
//! ### `MineLoop`
//! The top-level control flow. Each iteration pushes one action, ignores
//! the outcome, and sleeps. Failures are already folded into
//! [`PushOutcome`] by the pusher, so nothing can escape the loop body.
//! [`MineLoop::with_iteration_limit`] bounds a run for tests and for
//! supervised deployments; without it the loop runs until the process dies.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//!
//! use cleos::CleosHandler;
//! use miner::MineLoop;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! # let cfg: config::CleosConfig = todo!();
//! let handler = CleosHandler::connect(&cfg).await.unwrap();
//! MineLoop::new(Arc::new(handler)).run().await;
//! # });
//! ```

use std::time::Duration;

use cleos::{ActionPusher, DynActionPusher, PushOutcome};
use serde::Serialize;
use tracing::trace;

/// Contract the mine action is pushed to.
pub const TOKEN_CONTRACT: &str = "digcoinsmine";

/// Action name on [`TOKEN_CONTRACT`].
pub const MINE_ACTION: &str = "mine";

/// Token symbol code mined by this daemon.
pub const SYMBOL_CODE: &str = "DIG";

/// Decimal precision of [`SYMBOL_CODE`].
pub const SYMBOL_PRECISION: u8 = 4;

/// Pause between consecutive mine attempts.
pub const MINE_INTERVAL: Duration = Duration::from_millis(10);

/// Wire form of the mine action data.
///
/// Serde keeps declaration order, so the rendered string is byte-stable:
/// `miner` always serializes before `symbol`.
#[derive(Serialize)]
struct MinePayload<'a> {
    miner: &'a str,
    symbol: String,
}

/// Render the mine action data for `account`.
///
/// For account `alice` this is exactly
/// `{"miner":"alice","symbol":"4,DIG"}`.
pub fn mine_payload(account: &str) -> String {
    let payload =
        MinePayload { miner: account, symbol: format!("{SYMBOL_PRECISION},{SYMBOL_CODE}") };
    serde_json::to_string(&payload).expect("payload serialization cannot fail")
}

/// Push one mine action for the pusher's account.
///
/// The outcome is returned for observability but every caller in this crate
/// ignores it; a failed push costs nothing but the iteration it happened in.
pub async fn send_mine_action<P: ActionPusher + ?Sized>(pusher: &P) -> PushOutcome {
    let data = mine_payload(pusher.account());
    pusher.push_action(TOKEN_CONTRACT, MINE_ACTION, &data).await
}

/// The mining loop: push, sleep, repeat.
pub struct MineLoop {
    pusher: DynActionPusher,
    interval: Duration,
    iteration_limit: Option<u64>,
}

impl MineLoop {
    /// Build a loop over `pusher` with the default [`MINE_INTERVAL`] cadence
    /// and no iteration bound.
    pub fn new(pusher: DynActionPusher) -> Self {
        MineLoop { pusher, interval: MINE_INTERVAL, iteration_limit: None }
    }

    /// Replace the pause between attempts.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Stop after exactly `limit` attempts instead of running forever.
    pub fn with_iteration_limit(mut self, limit: u64) -> Self {
        self.iteration_limit = Some(limit);
        self
    }

    /// Run the loop, returning the number of attempts made once the
    /// iteration limit (if any) is reached.
    pub async fn run(self) -> u64 {
        let mut iterations: u64 = 0;
        loop {
            if let Some(limit) = self.iteration_limit {
                if iterations >= limit {
                    return iterations;
                }
            }

            let outcome = send_mine_action(self.pusher.as_ref()).await;
            iterations += 1;
            trace!("mine attempt {} delivered={}", iterations, outcome.is_delivered());

            tokio::time::sleep(self.interval).await;
        }
    }
}
