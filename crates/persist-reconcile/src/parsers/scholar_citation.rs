//! `ScholarCitationParser` — ScholarCitation. See spec.md §4.D row 6.

use super::{effective_update_date, i32_field, object_list, required_str, str_field};
use crate::EntityStore;
use persist_common::envelope::Envelope;
use persist_common::error::{PersistError, Result};
use sqlx::PgConnection;

pub async fn process(store: &EntityStore, conn: &mut PgConnection, envelope: &Envelope) -> Result<()> {
    let payload = &envelope.payload;
    let cites_id = required_str(payload, "cites_id")?;
    let update_date = effective_update_date(envelope);

    let scholar_publication = store
        .find_scholar_publication_by_cites_id(conn, cites_id)
        .await?
        .ok_or_else(|| PersistError::EntityNotFound(format!("ScholarPublication with cites_id '{cites_id}'")))?;

    let fallback_year = match store.get_publication(conn, scholar_publication.publication_key).await? {
        Some(publication) => publication.publication_year.map(|y| y.to_string()),
        None => None,
    };

    for citation in object_list(payload, "citations") {
        let link = required_str(citation, "link")?;
        let citation_cites_id = required_str(citation, "cites_id")?;
        let year = str_field(citation, "year")
            .map(str::to_string)
            .or_else(|| fallback_year.clone())
            .unwrap_or_else(|| "Unknown".to_string());

        store
            .upsert_scholar_citation(
                conn,
                scholar_publication.id,
                citation_cites_id,
                Some(link),
                str_field(citation, "title"),
                Some(link),
                str_field(citation, "summary"),
                str_field(citation, "document_link"),
                Some(&year),
                i32_field(citation, "citations").or(scholar_publication.total_citations),
                update_date,
            )
            .await?;
    }

    Ok(())
}
