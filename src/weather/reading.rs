use super::Error;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

/// One observation as returned by the API. The document is kept as-is; only
/// `dt` is ever looked at.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading(Value);

impl Reading {
    pub fn parse(body: &str) -> Result<Reading, Error> {
        Ok(Reading(serde_json::from_str(body)?))
    }

    pub fn dt(&self) -> Option<i64> {
        self.0.get("dt").and_then(Value::as_i64)
    }

    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        self.dt().and_then(|dt| Utc.timestamp_opt(dt, 0).single())
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}
