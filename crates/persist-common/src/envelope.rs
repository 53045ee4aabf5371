//! The wire envelope: one newline-delimited JSON message from a scraper.
//! See SPEC_FULL.md §6.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// `update_date` on the wire is `"YYYY-MM-DD HH:MM:SS"` (spec.md §6), not
/// RFC3339 — `chrono`'s default `DateTime<Utc>` deserializer rejects it,
/// so it gets a dedicated parser.
mod wire_date {
    use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
    use serde::{Deserialize, Deserializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|raw| {
            NaiveDateTime::parse_from_str(&raw, FORMAT)
                .map(|naive| Utc.from_utc_datetime(&naive))
                .map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}

/// The `(class_id, variant_id)` pair identifying an envelope's handler,
/// and the fields every parser relies on regardless of payload shape.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(rename = "_id")]
    pub id: String,
    pub class_id: i32,
    pub variant_id: i32,
    #[serde(default, deserialize_with = "wire_date::deserialize")]
    pub update_date: Option<DateTime<Utc>>,
    pub update_count: Option<i32>,
    #[serde(flatten)]
    pub payload: Value,
}

impl Envelope {
    /// Parse a raw line into an envelope. Non-object JSON or JSON
    /// missing `_id`/`class_id`/`variant_id` is rejected here, before
    /// any parser sees it (spec.md §7 item 1).
    pub fn parse(line: &str) -> Result<Envelope, serde_json::Error> {
        serde_json::from_str(line)
    }

    /// `class_id ∥ variant_id ∥ _id`, used to key dead-letter entries.
    pub fn msg_id(&self) -> String {
        format!("{}{}{}", self.class_id, self.variant_id, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_documented_wire_date_format() {
        let line = r#"{"_id":"a1","class_id":1,"variant_id":1,"update_date":"2024-03-05 14:30:00","name":"x"}"#;
        let envelope = Envelope::parse(line).unwrap();
        assert_eq!(
            envelope.update_date.unwrap().to_rfc3339(),
            "2024-03-05T14:30:00+00:00"
        );
    }

    #[test]
    fn missing_update_date_is_none() {
        let line = r#"{"_id":"a1","class_id":1,"variant_id":1,"name":"x"}"#;
        let envelope = Envelope::parse(line).unwrap();
        assert!(envelope.update_date.is_none());
    }

    #[test]
    fn rfc3339_dates_are_rejected() {
        let line = r#"{"_id":"a1","class_id":1,"variant_id":1,"update_date":"2024-03-05T14:30:00Z","name":"x"}"#;
        assert!(Envelope::parse(line).is_err());
    }
}
