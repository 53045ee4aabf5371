//! `ScholarAuthorParser` — Author × ScholarAuthor. See spec.md §4.D row 1.

use super::{bool_field, effective_update_date, i32_field, required_str, str_field, str_list};
use crate::store::AuthorFields;
use crate::EntityStore;
use persist_common::envelope::Envelope;
use persist_common::error::Result;
use sqlx::PgConnection;

pub async fn process(store: &EntityStore, conn: &mut PgConnection, envelope: &Envelope) -> Result<()> {
    let payload = &envelope.payload;
    let name = required_str(payload, "name")?;
    let author_id = required_str(payload, "author_id")?;
    let update_date = effective_update_date(envelope);

    let author = store
        .upsert_author(
            conn,
            name,
            AuthorFields {
                role: str_field(payload, "role").map(str::to_string),
                organization: str_field(payload, "org").map(str::to_string),
                image_url: str_field(payload, "image_url").map(str::to_string),
                homepage_url: str_field(payload, "homepage_url").map(str::to_string),
            },
            update_date,
        )
        .await?;

    store
        .upsert_scholar_author(
            conn,
            author.id,
            author_id,
            str_field(payload, "profile_url"),
            bool_field(payload, "verified"),
            i32_field(payload, "h_index"),
            i32_field(payload, "i10_index"),
            update_date,
        )
        .await?;

    for interest_name in str_list(payload, "interests") {
        if interest_name.is_empty() {
            continue;
        }
        let interest = store.upsert_interest(conn, interest_name, update_date).await?;
        store.link_author_interest(conn, author.id, interest.id).await?;
    }

    for coauthor_name in str_list(payload, "coauthors") {
        if coauthor_name.is_empty() {
            continue;
        }
        let coauthor = store
            .upsert_author(conn, coauthor_name, AuthorFields::default(), update_date)
            .await?;
        store.link_coauthors_symmetric(conn, author.id, coauthor.id).await?;
    }

    Ok(())
}
