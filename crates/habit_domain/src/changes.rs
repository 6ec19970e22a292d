use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info};

/// Separator between per-collection timestamps inside a change token.
pub const TOKEN_SEPARATOR: &str = "|";

/// Join per-collection "latest edited" timestamps into one opaque token.
pub fn join_token(timestamps: &[String]) -> String {
    timestamps.join(TOKEN_SEPARATOR)
}

/// Compares the current change token against the one persisted after the
/// last successful update, by exact string equality. Any difference counts
/// as a change; this is deliberately not a chronological comparison.
#[derive(Debug)]
pub struct ChangeDetector {
    state_path: PathBuf,
    pending: Option<String>,
}

impl ChangeDetector {
    pub fn new(state_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
            pending: None,
        }
    }

    /// Whether `current` differs from the persisted token. A first run with
    /// no persisted token always reports changes. When changes are reported
    /// the token is kept for a later [`persist`](Self::persist) call.
    pub fn has_changes(&mut self, current: &str) -> bool {
        if let Ok(previous) = fs::read_to_string(&self.state_path) {
            if previous.trim() == current {
                info!(token = current, "no changes since last update");
                return false;
            }
        }
        info!(token = current, "changes detected");
        self.pending = Some(current.to_string());
        true
    }

    /// Write the token seen by the last `has_changes` call. When detection
    /// was skipped (forced runs), `recompute` supplies a fresh token.
    pub fn persist(&mut self, recompute: impl FnOnce() -> Result<String>) -> Result<()> {
        let token = match self.pending.take() {
            Some(token) => token,
            None => recompute()?,
        };
        debug!(path = %self.state_path.display(), "persisting change token");
        fs::write(&self.state_path, &token).with_context(|| {
            format!(
                "failed to write change token to {}",
                self.state_path.display()
            )
        })
    }
}
