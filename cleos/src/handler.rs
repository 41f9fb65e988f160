//! Cleos subprocess handler.
//!
//! [`CleosHandler::connect`] unlocks the signing wallet once; from then on
//! the handler turns every [`ActionPusher::push_action`] call into a single
//! bounded `cleos push action` subprocess.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use config::CleosConfig;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::{ActionPusher, CleosError, PushFailure, PushOutcome};

/// Ceiling on a single `push action` subprocess.
///
/// When it fires the child is killed and the attempt is reported as
/// [`PushFailure::TimedOut`].
pub const PUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Production [`ActionPusher`] backed by the external `cleos` binary.
///
/// All fields are fixed at construction from [`CleosConfig`]; the handler
/// is cheap to clone and safe to share across tasks.
#[derive(Clone)]
pub struct CleosHandler {
    account: String,
    wallet_name: String,
    wallet_password: String,
    cleos_path: PathBuf,
    api_url: String,
    verbose_errors: bool,
}

// wallet_password stays out of Debug output
impl fmt::Debug for CleosHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CleosHandler")
            .field("account", &self.account)
            .field("wallet_name", &self.wallet_name)
            .field("cleos_path", &self.cleos_path)
            .field("api_url", &self.api_url)
            .field("verbose_errors", &self.verbose_errors)
            .finish_non_exhaustive()
    }
}

impl CleosHandler {
    /// Build a handler and unlock its wallet.
    ///
    /// The unlock subprocess runs exactly once per handler. It talks to the
    /// local wallet daemon, so the chain API URL is deliberately absent from
    /// its arguments. A non-zero exit is logged and tolerated: `cleos` also
    /// exits non-zero when the wallet is already unlocked, which this cannot
    /// distinguish from a bad password.
    pub async fn connect(config: &CleosConfig) -> Result<Self, CleosError> {
        let handler = CleosHandler {
            account: config.account.clone(),
            wallet_name: config.wallet_name.clone(),
            wallet_password: config.wallet_password.clone(),
            cleos_path: config.cleos_path.clone(),
            api_url: config.api_url.clone(),
            verbose_errors: config.verbose_errors,
        };
        handler.unlock_wallet().await?;
        Ok(handler)
    }

    /// Argument vector for the one-shot wallet unlock call.
    pub fn unlock_args(&self) -> Vec<String> {
        vec![
            "wallet".to_string(),
            "unlock".to_string(),
            "--name".to_string(),
            self.wallet_name.clone(),
            "--password".to_string(),
            self.wallet_password.clone(),
        ]
    }

    /// Argument vector for one `push action` call.
    ///
    /// The layout is fixed: `--url=<api>` first so the action reaches the
    /// configured chain API, then the contract/action/data triple, then the
    /// signing permission.
    pub fn push_action_args(&self, contract: &str, action: &str, data: &str) -> Vec<String> {
        vec![
            format!("--url={}", self.api_url),
            "push".to_string(),
            "action".to_string(),
            contract.to_string(),
            action.to_string(),
            data.to_string(),
            "-p".to_string(),
            format!("{}@active", self.account),
        ]
    }

    async fn unlock_wallet(&self) -> Result<(), CleosError> {
        info!("unlocking wallet {}", self.wallet_name);

        let output = Command::new(&self.cleos_path)
            .args(self.unlock_args())
            .output()
            .await
            .map_err(|e| {
                CleosError::WalletUnlock(format!("{}: {e}", self.cleos_path.display()))
            })?;

        if output.status.success() {
            info!("wallet {} unlocked", self.wallet_name);
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                "wallet unlock exited with {}; assuming wallet {} was already unlocked: {}",
                output.status,
                self.wallet_name,
                stderr.trim()
            );
        }

        Ok(())
    }
}

#[async_trait]
impl ActionPusher for CleosHandler {
    async fn push_action(&self, contract: &str, action: &str, data: &str) -> PushOutcome {
        let mut cmd = Command::new(&self.cleos_path);
        cmd.args(self.push_action_args(contract, action, data));
        // Dropping the timed-out future must also kill the child.
        cmd.kill_on_drop(true);

        let outcome = match tokio::time::timeout(PUSH_TIMEOUT, cmd.output()).await {
            Err(_) => PushOutcome::Failed(PushFailure::TimedOut),
            Ok(Err(e)) => PushOutcome::Failed(PushFailure::Spawn(e.to_string())),
            Ok(Ok(output)) if output.status.success() => PushOutcome::Delivered(output.stdout),
            Ok(Ok(output)) => PushOutcome::Failed(PushFailure::Exited {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        };

        if let PushOutcome::Failed(failure) = &outcome {
            if self.verbose_errors {
                warn!("push action {}::{} failed: {}", contract, action, failure);
            } else {
                debug!("push action {}::{} failed: {}", contract, action, failure);
            }
        }

        outcome
    }

    fn account(&self) -> &str {
        &self.account
    }
}
