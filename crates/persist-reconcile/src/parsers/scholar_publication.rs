//! `ScholarPublicationParser` — Publication × ScholarPublication.
//! See spec.md §4.D row 2. The citation graph embedded in this payload is
//! intentionally NOT processed here — that's `ScholarCitationParser`'s job.

use super::{effective_update_date, i32_field, required_str, str_field, str_list};
use crate::store::{AuthorFields, PublicationFields};
use crate::EntityStore;
use persist_common::envelope::Envelope;
use persist_common::error::Result;
use persist_similarity::is_first_word_short;
use sqlx::PgConnection;

pub async fn process(store: &EntityStore, conn: &mut PgConnection, envelope: &Envelope) -> Result<()> {
    let payload = &envelope.payload;
    let title = required_str(payload, "title")?;
    let publication_id = required_str(payload, "publication_id")?;
    let update_date = effective_update_date(envelope);

    let mut author_ids = Vec::new();
    for author_name in str_list(payload, "authors") {
        if author_name.is_empty() || is_first_word_short(author_name) {
            tracing::warn!(author_name, "skipping author with short first token");
            continue;
        }
        let author = store
            .upsert_author(conn, author_name, AuthorFields::default(), update_date)
            .await?;
        author_ids.push(author.id);
    }

    let publication = store
        .upsert_publication(
            conn,
            title,
            PublicationFields {
                url: str_field(payload, "publication_url").map(str::to_string),
                publication_year: i32_field(payload, "publication_date"),
                pages: str_field(payload, "pages").map(str::to_string),
                publisher: str_field(payload, "publisher").map(str::to_string),
                description: str_field(payload, "description").map(str::to_string),
            },
            update_date,
        )
        .await?;

    store
        .upsert_scholar_publication(
            conn,
            publication.id,
            publication_id,
            str_field(payload, "cites_id"),
            str_field(payload, "title_link"),
            str_field(payload, "pdf_link"),
            i32_field(payload, "total_citations"),
            str_field(payload, "related_articles_url"),
            str_field(payload, "all_versions_url"),
            update_date,
        )
        .await?;

    for author_id in author_ids {
        store.link_publication_author(conn, publication.id, author_id).await?;
    }

    Ok(())
}
