use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Deserializer, Serialize};

/// The persisted draft record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSnapshot {
    pub code: String,
    /// Author name.
    pub name: String,
    /// Milliseconds since the Unix epoch. Missing or non-numeric values
    /// read as `None` and do not invalidate the record.
    #[serde(
        rename = "savedAt",
        default,
        deserialize_with = "lenient_millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub saved_at: Option<u64>,
}

impl DraftSnapshot {
    /// A snapshot stamped with the current wall-clock time.
    pub fn now(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            saved_at: Some(unix_millis()),
        }
    }

    /// Serialize to the stored JSON form.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Result of decoding a cached record at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hydration {
    Restored(DraftSnapshot),
    UseDefaults,
}

/// Validate a raw cached value.
///
/// Anything that is not a JSON object with string `code` and `name` fields
/// decodes to [`Hydration::UseDefaults`].
pub fn decode_snapshot(raw: &str) -> Hydration {
    let value = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value) if value.is_object() => value,
        Ok(_) => {
            tracing::debug!("ignoring draft record that is not an object");
            return Hydration::UseDefaults;
        }
        Err(err) => {
            tracing::debug!(%err, "ignoring unparsable draft record");
            return Hydration::UseDefaults;
        }
    };
    match serde_json::from_value::<DraftSnapshot>(value) {
        Ok(snapshot) => Hydration::Restored(snapshot),
        Err(err) => {
            tracing::debug!(%err, "ignoring malformed draft record");
            Hydration::UseDefaults
        }
    }
}

fn lenient_millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(serde_json::Value::as_u64))
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
