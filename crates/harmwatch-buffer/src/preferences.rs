//! Prompt preferences, stored as the separate `consent`, `freq` and
//! `lastPrompt` keys the settings UI writes.

use harmwatch_core::Preferences;
use serde_json::Value;

use crate::error::BufferError;
use crate::store::KeyValueStore;

pub const CONSENT_KEY: &str = "consent";
pub const FREQ_KEY: &str = "freq";
pub const LAST_PROMPT_KEY: &str = "lastPrompt";

/// Reads the current preferences. Missing or mistyped values take their
/// defaults.
///
/// # Errors
///
/// Returns [`BufferError`] if the store cannot be read.
pub async fn load_preferences<S: KeyValueStore>(store: &S) -> Result<Preferences, BufferError> {
    let consent = store
        .get(CONSENT_KEY)
        .await?
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let freq = store
        .get(FREQ_KEY)
        .await?
        .and_then(|v| v.as_u64())
        .and_then(|f| u32::try_from(f).ok());
    let last_prompt_ms = store
        .get(LAST_PROMPT_KEY)
        .await?
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(truncate_ms)))
        .unwrap_or(0);

    Ok(Preferences {
        consent,
        freq,
        last_prompt_ms,
    })
}

/// Writes all three preference keys.
///
/// # Errors
///
/// Returns [`BufferError`] if any key cannot be written.
pub async fn save_preferences<S: KeyValueStore>(
    store: &S,
    prefs: &Preferences,
) -> Result<(), BufferError> {
    store.set(CONSENT_KEY, Value::Bool(prefs.consent)).await?;
    let freq = prefs.freq.map_or(Value::Null, Value::from);
    store.set(FREQ_KEY, freq).await?;
    store
        .set(LAST_PROMPT_KEY, Value::from(prefs.last_prompt_ms))
        .await
}

/// Records that a prompt was shown at `now_ms`.
///
/// # Errors
///
/// Returns [`BufferError`] if the store cannot be written.
pub async fn record_prompt<S: KeyValueStore>(store: &S, now_ms: i64) -> Result<(), BufferError> {
    store.set(LAST_PROMPT_KEY, Value::from(now_ms)).await
}

#[allow(clippy::cast_possible_truncation)]
fn truncate_ms(ms: f64) -> i64 {
    ms as i64
}
