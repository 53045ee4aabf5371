//! The six typed parsers and the routing table that selects among them.
//! See SPEC_FULL.md §4.D.

mod conference;
mod dblp_assoc;
mod journal;
mod scholar_author;
mod scholar_citation;
mod scholar_publication;

use crate::EntityStore;
use chrono::{DateTime, Utc};
use persist_common::entities::kind;
use persist_common::envelope::Envelope;
use persist_common::error::{PersistError, Result};
use serde_json::Value;
use sqlx::PgConnection;

/// Dispatches a parsed envelope to its typed parser based on
/// `(class_id, variant_id)`, mirroring the routing table in spec.md §4.D.
pub async fn dispatch(store: &EntityStore, conn: &mut PgConnection, envelope: &Envelope) -> Result<()> {
    match (envelope.class_id, envelope.variant_id) {
        (kind::AUTHOR_CLASS, kind::SCHOLAR_AUTHOR_VARIANT) => {
            scholar_author::process(store, conn, envelope).await
        }
        (kind::PUBLICATION_CLASS, kind::SCHOLAR_PUBLICATION_VARIANT) => {
            scholar_publication::process(store, conn, envelope).await
        }
        (kind::PUBLICATION_CLASS, kind::DBLP_ASSOC_VARIANT) => {
            dblp_assoc::process(store, conn, envelope).await
        }
        (kind::CONFERENCE_CLASS, kind::CONFERENCE_VARIANT) => {
            conference::process(store, conn, envelope).await
        }
        (kind::JOURNAL_CLASS, kind::JOURNAL_VARIANT) => journal::process(store, conn, envelope).await,
        (kind::SCHOLAR_CITATION_CLASS, kind::SCHOLAR_CITATION_VARIANT) => {
            scholar_citation::process(store, conn, envelope).await
        }
        (class_id, variant_id) => Err(PersistError::UnknownKind { class_id, variant_id }),
    }
}

pub(crate) fn effective_update_date(envelope: &Envelope) -> DateTime<Utc> {
    envelope.update_date.unwrap_or_else(Utc::now)
}

pub(crate) fn str_field<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload.get(key).and_then(Value::as_str)
}

pub(crate) fn required_str<'a>(payload: &'a Value, key: &str) -> Result<&'a str> {
    str_field(payload, key).ok_or_else(|| PersistError::Malformed(format!("missing required field '{key}'")))
}

pub(crate) fn i32_field(payload: &Value, key: &str) -> Option<i32> {
    payload.get(key).and_then(|v| v.as_i64()).map(|v| v as i32)
}

pub(crate) fn f64_field(payload: &Value, key: &str) -> Option<f64> {
    payload.get(key).and_then(Value::as_f64)
}

pub(crate) fn bool_field(payload: &Value, key: &str) -> Option<bool> {
    payload.get(key).and_then(Value::as_bool)
}

pub(crate) fn str_list<'a>(payload: &'a Value, key: &str) -> Vec<&'a str> {
    payload
        .get(key)
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

pub(crate) fn object_list<'a>(payload: &'a Value, key: &str) -> Vec<&'a Value> {
    payload
        .get(key)
        .and_then(Value::as_array)
        .map(|arr| arr.iter().collect())
        .unwrap_or_default()
}
