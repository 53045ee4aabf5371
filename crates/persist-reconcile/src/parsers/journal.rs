//! `JournalParser` — Journal. See spec.md §4.D row 5.

use super::{effective_update_date, f64_field, i32_field, required_str, str_field};
use crate::store::JournalFields;
use crate::EntityStore;
use persist_common::envelope::Envelope;
use persist_common::error::Result;
use sqlx::PgConnection;

pub async fn process(store: &EntityStore, conn: &mut PgConnection, envelope: &Envelope) -> Result<()> {
    let payload = &envelope.payload;
    let title = required_str(payload, "title")?;
    let update_date = effective_update_date(envelope);

    store
        .upsert_journal(
            conn,
            title,
            JournalFields {
                r#type: str_field(payload, "type").map(str::to_string),
                link: str_field(payload, "link").map(str::to_string),
                sjr: f64_field(payload, "sjr"),
                q_rank: str_field(payload, "q_rank").map(str::to_string),
                h_index: i32_field(payload, "h_index"),
                total_docs: i32_field(payload, "total_docs"),
                total_docs_3years: i32_field(payload, "total_docs_3years"),
                total_refs: i32_field(payload, "total_refs"),
                total_cites_3years: i32_field(payload, "total_cites_3years"),
                citable_docs_3years: i32_field(payload, "citable_docs_3years"),
                cites_per_doc_2years: f64_field(payload, "cites_per_doc_2years"),
                refs_per_doc: f64_field(payload, "refs_per_doc"),
                female_percent: f64_field(payload, "female_percent"),
                year: i32_field(payload, "year"),
            },
            update_date,
        )
        .await?;

    Ok(())
}
