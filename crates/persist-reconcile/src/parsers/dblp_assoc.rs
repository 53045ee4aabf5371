//! `PublicationAssociationProcessor` — Publication × variant 100 ("DBLP
//! assoc"). See spec.md §4.D row 3. Never creates publications or authors;
//! only links what already exists.

use super::{effective_update_date, i32_field, required_str, str_field, str_list};
use crate::store::ConferenceFields;
use crate::EntityStore;
use persist_common::envelope::Envelope;
use persist_common::error::Result;
use sqlx::PgConnection;

pub async fn process(store: &EntityStore, conn: &mut PgConnection, envelope: &Envelope) -> Result<()> {
    let payload = &envelope.payload;
    let title = required_str(payload, "title")?;
    let update_date = effective_update_date(envelope);

    let publication = match store.find_publication_by_title(conn, title).await? {
        Some(publication) => publication,
        None => {
            tracing::warn!(title, "dblp assoc: no matching publication, dropping association");
            return Ok(());
        }
    };

    let mut author_ids = Vec::new();
    for author_name in str_list(payload, "authors") {
        if author_name.is_empty() {
            continue;
        }
        match store.find_author_by_name(conn, author_name).await? {
            Some(author) => {
                store.link_publication_author(conn, publication.id, author.id).await?;
                author_ids.push(author.id);
            }
            None => {
                tracing::warn!(author_name, "dblp assoc: author not found, skipping");
            }
        }
    }

    for (i, &a) in author_ids.iter().enumerate() {
        for &b in &author_ids[i + 1..] {
            store.link_coauthors_symmetric(conn, a, b).await?;
        }
    }

    match str_field(payload, "type") {
        Some("Journal") => {
            if let Some(journal_name) = str_field(payload, "journal_name") {
                let journal = store
                    .find_or_create_journal_for_assoc(conn, journal_name, update_date)
                    .await?;
                store.attach_journal(conn, publication.id, journal.id).await?;
            }
        }
        Some("Conference") => {
            if let Some(acronym) = str_field(payload, "conference_acronym") {
                let conference = store
                    .upsert_conference_by_acronym(
                        conn,
                        acronym,
                        None,
                        ConferenceFields {
                            year: i32_field(payload, "conference_year").unwrap_or(0),
                            ..ConferenceFields::default()
                        },
                        update_date,
                    )
                    .await?;
                store.attach_conference(conn, publication.id, conference.id).await?;
            }
        }
        _ => {}
    }

    Ok(())
}
