//! User preferences owned by the settings UI and consumed here to decide
//! when a feedback prompt may be shown.

use serde::{Deserialize, Serialize};

/// Prompts per day assumed when the user never picked a frequency.
pub const DEFAULT_PROMPT_FREQ: u32 = 10;
/// Lower bound on the gap between two prompts.
pub const MIN_PROMPT_COOLDOWN_MS: i64 = 60_000;

const DAY_MS: i64 = 86_400_000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub consent: bool,
    /// Target prompts per day. `None` or `0` falls back to [`DEFAULT_PROMPT_FREQ`].
    pub freq: Option<u32>,
    /// Epoch milliseconds of the last prompt shown; `0` when never prompted.
    #[serde(rename = "lastPrompt")]
    pub last_prompt_ms: i64,
}

impl Preferences {
    #[must_use]
    pub fn effective_freq(&self) -> u32 {
        match self.freq {
            Some(f) if f > 0 => f,
            _ => DEFAULT_PROMPT_FREQ,
        }
    }

    /// Minimum gap between prompts: one day spread over `freq` prompts, but
    /// never under a minute.
    #[must_use]
    pub fn prompt_cooldown_ms(&self) -> i64 {
        (DAY_MS / i64::from(self.effective_freq())).max(MIN_PROMPT_COOLDOWN_MS)
    }

    /// Whether a prompt may be shown at `now_ms`.
    #[must_use]
    pub fn prompt_due(&self, now_ms: i64) -> bool {
        self.consent && now_ms.saturating_sub(self.last_prompt_ms) >= self.prompt_cooldown_ms()
    }
}
