//! The similarity-aware entity store. See SPEC_FULL.md §4.C.
//!
//! Every `upsert_*` follows the same shape: probe for a candidate under a
//! cheap `LIKE` prefilter plus the entity's similarity function and
//! threshold, `FOR UPDATE` so the row is locked for the remainder of the
//! caller's transaction, insert if nothing qualifies, otherwise apply the
//! present fields of the payload over the existing row. `update_date` and
//! `update_count` are maintained on every call, matching or creating.
//!
//! All free-text comparisons happen on the lowercased form of both sides;
//! callers are expected to have already lowercased `key` fields per
//! SPEC_FULL.md §3.

use crate::acronym;
use chrono::{DateTime, Utc};
use persist_common::entities::{
    Author, Conference, Interest, Journal, Publication, ScholarAuthor, ScholarCitation,
    ScholarPublication,
};
use persist_common::error::Result;
use persist_config::SimilarityThresholds;
use sqlx::PgConnection;
use uuid::Uuid;

pub struct EntityStore {
    thresholds: SimilarityThresholds,
}

/// Present-or-absent field bag for author upserts: `None` means "leave the
/// existing value intact", matching spec.md §4.D's "missing fields leave
/// existing values intact".
#[derive(Debug, Default, Clone)]
pub struct AuthorFields {
    pub role: Option<String>,
    pub organization: Option<String>,
    pub image_url: Option<String>,
    pub homepage_url: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct PublicationFields {
    pub url: Option<String>,
    pub publication_year: Option<i32>,
    pub pages: Option<String>,
    pub publisher: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct JournalFields {
    pub r#type: Option<String>,
    pub link: Option<String>,
    pub sjr: Option<f64>,
    pub q_rank: Option<String>,
    pub h_index: Option<i32>,
    pub total_docs: Option<i32>,
    pub total_docs_3years: Option<i32>,
    pub total_refs: Option<i32>,
    pub total_cites_3years: Option<i32>,
    pub citable_docs_3years: Option<i32>,
    pub cites_per_doc_2years: Option<f64>,
    pub refs_per_doc: Option<f64>,
    pub female_percent: Option<f64>,
    pub year: Option<i32>,
}

#[derive(Debug, Default, Clone)]
pub struct ConferenceFields {
    pub publisher: Option<String>,
    pub rank: Option<String>,
    pub note: Option<String>,
    pub dblp_link: Option<String>,
    pub primary_for: Option<String>,
    pub comments: Option<String>,
    pub average_rating: Option<f64>,
    pub year: i32,
}

fn author_prefilter(name_lower: &str) -> (String, String) {
    let first_token = name_lower.split_whitespace().next().unwrap_or("");
    let surname = name_lower.split_whitespace().last().unwrap_or("");
    let stripped_first = first_token.replace('.', "");
    let initials: String = if stripped_first.chars().count() > 1 {
        first_token.chars().take(2).collect()
    } else {
        first_token.chars().take(1).collect()
    };
    (initials, surname.to_string())
}

impl EntityStore {
    pub fn new(thresholds: SimilarityThresholds) -> Self {
        Self { thresholds }
    }

    // ------------------------------------------------------------------
    // Author
    // ------------------------------------------------------------------

    pub async fn upsert_author(
        &self,
        conn: &mut PgConnection,
        name: &str,
        fields: AuthorFields,
        update_date: DateTime<Utc>,
    ) -> Result<Author> {
        let name_lower = name.to_lowercase();
        let (initials, surname) = author_prefilter(&name_lower);

        let candidate: Option<Author> = sqlx::query_as(
            r#"
            SELECT * FROM authors
            WHERE name LIKE $1 || '%'
              AND name LIKE '%' || $2
              AND word_similarity(name, $3) >= $4
            ORDER BY word_similarity(name, $3) DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(&initials)
        .bind(&surname)
        .bind(&name_lower)
        .bind(self.thresholds.author_name)
        .fetch_optional(&mut *conn)
        .await?;

        let author = match candidate {
            Some(existing) => {
                sqlx::query_as(
                    r#"
                    UPDATE authors SET
                        role = COALESCE($2, role),
                        organization = COALESCE($3, organization),
                        image_url = COALESCE($4, image_url),
                        homepage_url = COALESCE($5, homepage_url),
                        update_date = $6,
                        update_count = update_count + 1
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(existing.id)
                .bind(&fields.role)
                .bind(&fields.organization)
                .bind(&fields.image_url)
                .bind(&fields.homepage_url)
                .bind(update_date)
                .fetch_one(&mut *conn)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    INSERT INTO authors
                        (name, role, organization, image_url, homepage_url,
                         class_id, variant_id, update_date, update_count)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 1)
                    RETURNING *
                    "#,
                )
                .bind(&name_lower)
                .bind(&fields.role)
                .bind(&fields.organization)
                .bind(&fields.image_url)
                .bind(&fields.homepage_url)
                .bind(persist_common::entities::kind::AUTHOR_CLASS)
                .bind(persist_common::entities::kind::AUTHOR_VARIANT)
                .bind(update_date)
                .fetch_one(&mut *conn)
                .await?
            }
        };

        Ok(author)
    }

    pub async fn upsert_scholar_author(
        &self,
        conn: &mut PgConnection,
        author_key: Uuid,
        author_id: &str,
        profile_url: Option<&str>,
        verified: Option<bool>,
        h_index: Option<i32>,
        i10_index: Option<i32>,
        update_date: DateTime<Utc>,
    ) -> Result<ScholarAuthor> {
        let existing: Option<ScholarAuthor> =
            sqlx::query_as("SELECT * FROM scholar_authors WHERE author_id = $1 FOR UPDATE")
                .bind(author_id)
                .fetch_optional(&mut *conn)
                .await?;

        let row = match existing {
            Some(existing) => {
                sqlx::query_as(
                    r#"
                    UPDATE scholar_authors SET
                        profile_url = COALESCE($2, profile_url),
                        verified = COALESCE($3, verified),
                        h_index = COALESCE($4, h_index),
                        i10_index = COALESCE($5, i10_index),
                        update_date = $6,
                        update_count = update_count + 1
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(existing.id)
                .bind(profile_url)
                .bind(verified)
                .bind(h_index)
                .bind(i10_index)
                .bind(update_date)
                .fetch_one(&mut *conn)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    INSERT INTO scholar_authors
                        (author_key, author_id, profile_url, verified, h_index, i10_index,
                         class_id, variant_id, update_date, update_count)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 1)
                    RETURNING *
                    "#,
                )
                .bind(author_key)
                .bind(author_id)
                .bind(profile_url)
                .bind(verified)
                .bind(h_index)
                .bind(i10_index)
                .bind(persist_common::entities::kind::AUTHOR_CLASS)
                .bind(persist_common::entities::kind::SCHOLAR_AUTHOR_VARIANT)
                .bind(update_date)
                .fetch_one(&mut *conn)
                .await?
            }
        };

        Ok(row)
    }

    /// Name-only lookup (no create), used by `PublicationAssociationProcessor`.
    pub async fn find_author_by_name(
        &self,
        conn: &mut PgConnection,
        name: &str,
    ) -> Result<Option<Author>> {
        let name_lower = name.to_lowercase();
        let (initials, surname) = author_prefilter(&name_lower);

        let row = sqlx::query_as(
            r#"
            SELECT * FROM authors
            WHERE name LIKE $1 || '%'
              AND name LIKE '%' || $2
              AND word_similarity(name, $3) >= $4
            ORDER BY word_similarity(name, $3) DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(&initials)
        .bind(&surname)
        .bind(&name_lower)
        .bind(self.thresholds.author_name)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row)
    }

    // ------------------------------------------------------------------
    // Publication
    // ------------------------------------------------------------------

    pub async fn upsert_publication(
        &self,
        conn: &mut PgConnection,
        title: &str,
        fields: PublicationFields,
        update_date: DateTime<Utc>,
    ) -> Result<Publication> {
        let title_lower = title.to_lowercase();
        let prefilter = persist_similarity::first_after_fifth(&title_lower).unwrap_or("");

        let candidate: Option<Publication> = sqlx::query_as(
            r#"
            SELECT * FROM publications
            WHERE title LIKE '%' || $1 || '%'
              AND jaro_winkler_similarity(title, $2) >= $3
            ORDER BY jaro_winkler_similarity(title, $2) DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(prefilter)
        .bind(&title_lower)
        .bind(self.thresholds.publication_title)
        .fetch_optional(&mut *conn)
        .await?;

        let publication = match candidate {
            Some(existing) => {
                sqlx::query_as(
                    r#"
                    UPDATE publications SET
                        url = COALESCE($2, url),
                        publication_year = COALESCE($3, publication_year),
                        pages = COALESCE($4, pages),
                        publisher = COALESCE($5, publisher),
                        description = COALESCE($6, description),
                        update_date = $7,
                        update_count = update_count + 1
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(existing.id)
                .bind(&fields.url)
                .bind(fields.publication_year)
                .bind(&fields.pages)
                .bind(&fields.publisher)
                .bind(&fields.description)
                .bind(update_date)
                .fetch_one(&mut *conn)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    INSERT INTO publications
                        (title, url, publication_year, pages, publisher, description,
                         class_id, variant_id, update_date, update_count)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 1)
                    RETURNING *
                    "#,
                )
                .bind(&title_lower)
                .bind(&fields.url)
                .bind(fields.publication_year)
                .bind(&fields.pages)
                .bind(&fields.publisher)
                .bind(&fields.description)
                .bind(persist_common::entities::kind::PUBLICATION_CLASS)
                .bind(persist_common::entities::kind::PUBLICATION_VARIANT)
                .bind(update_date)
                .fetch_one(&mut *conn)
                .await?
            }
        };

        Ok(publication)
    }

    /// Title-only lookup (no create), used by `PublicationAssociationProcessor`.
    pub async fn find_publication_by_title(
        &self,
        conn: &mut PgConnection,
        title: &str,
    ) -> Result<Option<Publication>> {
        let title_lower = title.to_lowercase();
        let prefilter = persist_similarity::first_after_fifth(&title_lower).unwrap_or("");

        let row = sqlx::query_as(
            r#"
            SELECT * FROM publications
            WHERE title LIKE '%' || $1 || '%'
              AND jaro_winkler_similarity(title, $2) >= $3
            ORDER BY jaro_winkler_similarity(title, $2) DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(prefilter)
        .bind(&title_lower)
        .bind(self.thresholds.publication_title)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row)
    }

    pub async fn get_publication(&self, conn: &mut PgConnection, id: Uuid) -> Result<Option<Publication>> {
        let row = sqlx::query_as("SELECT * FROM publications WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row)
    }

    pub async fn upsert_scholar_publication(
        &self,
        conn: &mut PgConnection,
        publication_key: Uuid,
        publication_id: &str,
        cites_id: Option<&str>,
        title_link: Option<&str>,
        pdf_link: Option<&str>,
        total_citations: Option<i32>,
        related_articles_url: Option<&str>,
        all_versions_url: Option<&str>,
        update_date: DateTime<Utc>,
    ) -> Result<ScholarPublication> {
        let existing: Option<ScholarPublication> = sqlx::query_as(
            "SELECT * FROM scholar_publications WHERE publication_id = $1 AND cites_id IS NOT DISTINCT FROM $2 FOR UPDATE",
        )
        .bind(publication_id)
        .bind(cites_id)
        .fetch_optional(&mut *conn)
        .await?;

        let row = match existing {
            Some(existing) => {
                sqlx::query_as(
                    r#"
                    UPDATE scholar_publications SET
                        title_link = COALESCE($2, title_link),
                        pdf_link = COALESCE($3, pdf_link),
                        total_citations = COALESCE($4, total_citations),
                        related_articles_url = COALESCE($5, related_articles_url),
                        all_versions_url = COALESCE($6, all_versions_url),
                        update_date = $7,
                        update_count = update_count + 1
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(existing.id)
                .bind(title_link)
                .bind(pdf_link)
                .bind(total_citations)
                .bind(related_articles_url)
                .bind(all_versions_url)
                .bind(update_date)
                .fetch_one(&mut *conn)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    INSERT INTO scholar_publications
                        (publication_key, publication_id, title_link, pdf_link, total_citations,
                         cites_id, related_articles_url, all_versions_url,
                         class_id, variant_id, update_date, update_count)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 1)
                    RETURNING *
                    "#,
                )
                .bind(publication_key)
                .bind(publication_id)
                .bind(title_link)
                .bind(pdf_link)
                .bind(total_citations)
                .bind(cites_id)
                .bind(related_articles_url)
                .bind(all_versions_url)
                .bind(persist_common::entities::kind::PUBLICATION_CLASS)
                .bind(persist_common::entities::kind::SCHOLAR_PUBLICATION_VARIANT)
                .bind(update_date)
                .fetch_one(&mut *conn)
                .await?
            }
        };

        Ok(row)
    }

    pub async fn find_scholar_publication_by_cites_id(
        &self,
        conn: &mut PgConnection,
        cites_id: &str,
    ) -> Result<Option<ScholarPublication>> {
        let row = sqlx::query_as("SELECT * FROM scholar_publications WHERE cites_id = $1 FOR UPDATE")
            .bind(cites_id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row)
    }

    // ------------------------------------------------------------------
    // ScholarCitation
    // ------------------------------------------------------------------

    pub async fn upsert_scholar_citation(
        &self,
        conn: &mut PgConnection,
        publication_key: Uuid,
        cites_id: &str,
        citation_link: Option<&str>,
        title: Option<&str>,
        link: Option<&str>,
        summary: Option<&str>,
        document_link: Option<&str>,
        year: Option<&str>,
        citations: Option<i32>,
        update_date: DateTime<Utc>,
    ) -> Result<ScholarCitation> {
        let existing: Option<ScholarCitation> =
            sqlx::query_as("SELECT * FROM scholar_citations WHERE cites_id = $1 FOR UPDATE")
                .bind(cites_id)
                .fetch_optional(&mut *conn)
                .await?;

        let row = match existing {
            Some(existing) => {
                sqlx::query_as(
                    r#"
                    UPDATE scholar_citations SET
                        citation_link = COALESCE($2, citation_link),
                        title = COALESCE($3, title),
                        link = COALESCE($4, link),
                        summary = COALESCE($5, summary),
                        document_link = COALESCE($6, document_link),
                        year = COALESCE(scholar_citations.year, $7),
                        citations = COALESCE($8, citations),
                        update_date = $9,
                        update_count = update_count + 1
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(existing.id)
                .bind(citation_link)
                .bind(title)
                .bind(link)
                .bind(summary)
                .bind(document_link)
                .bind(year)
                .bind(citations)
                .bind(update_date)
                .fetch_one(&mut *conn)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    INSERT INTO scholar_citations
                        (publication_key, cites_id, citation_link, title, link, summary,
                         document_link, year, citations, class_id, variant_id, update_date, update_count)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 1)
                    RETURNING *
                    "#,
                )
                .bind(publication_key)
                .bind(cites_id)
                .bind(citation_link)
                .bind(title)
                .bind(link)
                .bind(summary)
                .bind(document_link)
                .bind(year)
                .bind(citations)
                .bind(persist_common::entities::kind::SCHOLAR_CITATION_CLASS)
                .bind(persist_common::entities::kind::SCHOLAR_CITATION_VARIANT)
                .bind(update_date)
                .fetch_one(&mut *conn)
                .await?
            }
        };

        Ok(row)
    }

    // ------------------------------------------------------------------
    // Journal
    // ------------------------------------------------------------------

    pub async fn upsert_journal(
        &self,
        conn: &mut PgConnection,
        title: &str,
        fields: JournalFields,
        update_date: DateTime<Utc>,
    ) -> Result<Journal> {
        let title_lower = title.to_lowercase();
        let prefilter = persist_similarity::first_after_fifth(&title_lower).unwrap_or("");

        let candidate: Option<Journal> = sqlx::query_as(
            r#"
            SELECT * FROM journals
            WHERE title LIKE '%' || $1 || '%'
              AND jaro_similarity(title, $2) >= $3
            ORDER BY jaro_similarity(title, $2) DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(prefilter)
        .bind(&title_lower)
        .bind(self.thresholds.journal_title)
        .fetch_optional(&mut *conn)
        .await?;

        let row = match candidate {
            Some(existing) => {
                sqlx::query_as(
                    r#"
                    UPDATE journals SET
                        journal_type = COALESCE($2, journal_type),
                        link = COALESCE($3, link),
                        sjr = COALESCE($4, sjr),
                        q_rank = COALESCE($5, q_rank),
                        h_index = COALESCE($6, h_index),
                        total_docs = COALESCE($7, total_docs),
                        total_docs_3years = COALESCE($8, total_docs_3years),
                        total_refs = COALESCE($9, total_refs),
                        total_cites_3years = COALESCE($10, total_cites_3years),
                        citable_docs_3years = COALESCE($11, citable_docs_3years),
                        cites_per_doc_2years = COALESCE($12, cites_per_doc_2years),
                        refs_per_doc = COALESCE($13, refs_per_doc),
                        female_percent = COALESCE($14, female_percent),
                        year = COALESCE($15, year),
                        update_date = $16,
                        update_count = update_count + 1
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(existing.id)
                .bind(&fields.r#type)
                .bind(&fields.link)
                .bind(fields.sjr)
                .bind(&fields.q_rank)
                .bind(fields.h_index)
                .bind(fields.total_docs)
                .bind(fields.total_docs_3years)
                .bind(fields.total_refs)
                .bind(fields.total_cites_3years)
                .bind(fields.citable_docs_3years)
                .bind(fields.cites_per_doc_2years)
                .bind(fields.refs_per_doc)
                .bind(fields.female_percent)
                .bind(fields.year)
                .bind(update_date)
                .fetch_one(&mut *conn)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    INSERT INTO journals
                        (title, journal_type, link, sjr, q_rank, h_index, total_docs,
                         total_docs_3years, total_refs, total_cites_3years, citable_docs_3years,
                         cites_per_doc_2years, refs_per_doc, female_percent, year,
                         class_id, variant_id, update_date, update_count)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, 1)
                    RETURNING *
                    "#,
                )
                .bind(&title_lower)
                .bind(&fields.r#type)
                .bind(&fields.link)
                .bind(fields.sjr)
                .bind(&fields.q_rank)
                .bind(fields.h_index)
                .bind(fields.total_docs)
                .bind(fields.total_docs_3years)
                .bind(fields.total_refs)
                .bind(fields.total_cites_3years)
                .bind(fields.citable_docs_3years)
                .bind(fields.cites_per_doc_2years)
                .bind(fields.refs_per_doc)
                .bind(fields.female_percent)
                .bind(fields.year.unwrap_or(0))
                .bind(persist_common::entities::kind::JOURNAL_CLASS)
                .bind(persist_common::entities::kind::JOURNAL_VARIANT)
                .bind(update_date)
                .fetch_one(&mut *conn)
                .await?
            }
        };

        Ok(row)
    }

    /// Name-only lookup used by `PublicationAssociationProcessor` for a
    /// `type="Journal"` envelope (threshold 0.8, jaro, per spec.md §4.D).
    pub async fn find_or_create_journal_for_assoc(
        &self,
        conn: &mut PgConnection,
        name: &str,
        update_date: DateTime<Utc>,
    ) -> Result<Journal> {
        let name_lower = name.to_lowercase();
        let prefilter = persist_similarity::first_after_fifth(&name_lower).unwrap_or("");

        let candidate: Option<Journal> = sqlx::query_as(
            r#"
            SELECT * FROM journals
            WHERE title LIKE '%' || $1 || '%'
              AND jaro_similarity(title, $2) >= 0.8
            ORDER BY jaro_similarity(title, $2) DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(prefilter)
        .bind(&name_lower)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(existing) = candidate {
            return Ok(existing);
        }

        let row = sqlx::query_as(
            r#"
            INSERT INTO journals (title, year, class_id, variant_id, update_date, update_count)
            VALUES ($1, 0, $2, $3, $4, 1)
            RETURNING *
            "#,
        )
        .bind(&name_lower)
        .bind(persist_common::entities::kind::JOURNAL_CLASS)
        .bind(persist_common::entities::kind::JOURNAL_VARIANT)
        .bind(update_date)
        .fetch_one(&mut *conn)
        .await?;

        Ok(row)
    }

    // ------------------------------------------------------------------
    // Conference
    // ------------------------------------------------------------------

    /// Upsert a conference keyed on acronym similarity, applying the
    /// fallback split described in SPEC_FULL.md §4.C when the raw
    /// acronym has no match. `title`, when absent (the DBLP-assoc path
    /// never carries one), defaults to the acronym actually used to
    /// create the row.
    pub async fn upsert_conference_by_acronym(
        &self,
        conn: &mut PgConnection,
        acronym_raw: &str,
        title: Option<&str>,
        fields: ConferenceFields,
        update_date: DateTime<Utc>,
    ) -> Result<Conference> {
        let acronym_upper = acronym_raw.to_uppercase();

        if let Some(existing) = self.find_conference_by_acronym(conn, &acronym_upper).await? {
            return self.apply_conference_update(conn, existing, fields, update_date).await;
        }

        for part in acronym::fallback_parts(&acronym_upper) {
            if let Some(existing) = self.find_conference_by_acronym(conn, &part).await? {
                return self.apply_conference_update(conn, existing, fields, update_date).await;
            }
        }

        let insertion_acronym = acronym::insertion_acronym(&acronym_upper);
        let title = title.unwrap_or(&insertion_acronym);
        let rank = fields.rank.as_deref().unwrap_or("Unranked");
        let row = sqlx::query_as(
            r#"
            INSERT INTO conferences
                (title, acronym, publisher, rank, note, dblp_link, primary_for, comments,
                 average_rating, year, class_id, variant_id, update_date, update_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, 1)
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(&insertion_acronym)
        .bind(&fields.publisher)
        .bind(rank)
        .bind(&fields.note)
        .bind(&fields.dblp_link)
        .bind(&fields.primary_for)
        .bind(&fields.comments)
        .bind(fields.average_rating)
        .bind(fields.year)
        .bind(persist_common::entities::kind::CONFERENCE_CLASS)
        .bind(persist_common::entities::kind::CONFERENCE_VARIANT)
        .bind(update_date)
        .fetch_one(&mut *conn)
        .await?;

        Ok(row)
    }

    async fn find_conference_by_acronym(
        &self,
        conn: &mut PgConnection,
        acronym: &str,
    ) -> Result<Option<Conference>> {
        let row = sqlx::query_as(
            r#"
            SELECT * FROM conferences
            WHERE jaro_winkler_similarity(acronym, $1) >= $2
            ORDER BY jaro_winkler_similarity(acronym, $1) DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(acronym)
        .bind(self.thresholds.conference_acronym)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row)
    }

    async fn apply_conference_update(
        &self,
        conn: &mut PgConnection,
        existing: Conference,
        fields: ConferenceFields,
        update_date: DateTime<Utc>,
    ) -> Result<Conference> {
        let row = sqlx::query_as(
            r#"
            UPDATE conferences SET
                publisher = COALESCE($2, publisher),
                rank = COALESCE($3, rank),
                note = COALESCE($4, note),
                dblp_link = COALESCE($5, dblp_link),
                primary_for = COALESCE($6, primary_for),
                comments = COALESCE($7, comments),
                average_rating = COALESCE($8, average_rating),
                update_date = $9,
                update_count = update_count + 1
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(existing.id)
        .bind(&fields.publisher)
        .bind(&fields.rank)
        .bind(&fields.note)
        .bind(&fields.dblp_link)
        .bind(&fields.primary_for)
        .bind(&fields.comments)
        .bind(fields.average_rating)
        .bind(update_date)
        .fetch_one(&mut *conn)
        .await?;

        Ok(row)
    }

    // ------------------------------------------------------------------
    // Interest
    // ------------------------------------------------------------------

    pub async fn upsert_interest(
        &self,
        conn: &mut PgConnection,
        name: &str,
        update_date: DateTime<Utc>,
    ) -> Result<Interest> {
        let name_lower = name.to_lowercase();
        let prefilter: String = name_lower.chars().take(2).collect();

        let candidate: Option<Interest> = sqlx::query_as(
            r#"
            SELECT * FROM interests
            WHERE name LIKE $1 || '%'
              AND jaro_winkler_similarity(name, $2) >= $3
            ORDER BY jaro_winkler_similarity(name, $2) DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(&prefilter)
        .bind(&name_lower)
        .bind(self.thresholds.interest_name)
        .fetch_optional(&mut *conn)
        .await?;

        let row = match candidate {
            Some(existing) => {
                sqlx::query_as(
                    "UPDATE interests SET update_date = $2, update_count = update_count + 1 WHERE id = $1 RETURNING *",
                )
                .bind(existing.id)
                .bind(update_date)
                .fetch_one(&mut *conn)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    INSERT INTO interests (name, class_id, variant_id, update_date, update_count)
                    VALUES ($1, $2, $3, $4, 1)
                    RETURNING *
                    "#,
                )
                .bind(&name_lower)
                .bind(persist_common::entities::kind::INTEREST_CLASS)
                .bind(persist_common::entities::kind::INTEREST_VARIANT)
                .bind(update_date)
                .fetch_one(&mut *conn)
                .await?
            }
        };

        Ok(row)
    }

    // ------------------------------------------------------------------
    // Link tables
    // ------------------------------------------------------------------

    pub async fn link_publication_author(
        &self,
        conn: &mut PgConnection,
        publication_id: Uuid,
        author_id: Uuid,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO publication_author (publication_id, author_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(publication_id)
        .bind(author_id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub async fn link_author_interest(
        &self,
        conn: &mut PgConnection,
        author_id: Uuid,
        interest_id: Uuid,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO author_interest (author_id, interest_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(author_id)
        .bind(interest_id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Symmetric co-author link: inserts both `(a, b)` and `(b, a)` if
    /// absent (spec.md I5 / P3).
    pub async fn link_coauthors_symmetric(
        &self,
        conn: &mut PgConnection,
        a: Uuid,
        b: Uuid,
    ) -> Result<()> {
        if a == b {
            return Ok(());
        }
        sqlx::query(
            "INSERT INTO author_coauthor (author_id, coauthor_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(a)
        .bind(b)
        .execute(&mut *conn)
        .await?;
        sqlx::query(
            "INSERT INTO author_coauthor (author_id, coauthor_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(b)
        .bind(a)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub async fn attach_journal(
        &self,
        conn: &mut PgConnection,
        publication_id: Uuid,
        journal_id: Uuid,
    ) -> Result<()> {
        sqlx::query("UPDATE publications SET journal_id = $2 WHERE id = $1")
            .bind(publication_id)
            .bind(journal_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    pub async fn attach_conference(
        &self,
        conn: &mut PgConnection,
        publication_id: Uuid,
        conference_id: Uuid,
    ) -> Result<()> {
        sqlx::query("UPDATE publications SET conference_id = $2 WHERE id = $1")
            .bind(publication_id)
            .bind(conference_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}
