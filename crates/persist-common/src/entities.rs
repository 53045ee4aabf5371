//! Core entity types mirroring the relational schema.
//! These are Rust representations of the Postgres entity tables described
//! in SPEC_FULL.md §3.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `(class_id, variant_id)` identifies the kind of an envelope or row.
/// One constant pair per entity kind, mirroring the Python
/// `CLASS_ID`/`VARIANT_ID` class attributes in `original_source`.
pub mod kind {
    pub const AUTHOR_CLASS: i32 = 1;
    pub const AUTHOR_VARIANT: i32 = 0;
    pub const SCHOLAR_AUTHOR_VARIANT: i32 = 1;

    pub const PUBLICATION_CLASS: i32 = 2;
    pub const PUBLICATION_VARIANT: i32 = 0;
    pub const SCHOLAR_PUBLICATION_VARIANT: i32 = 1;
    pub const DBLP_ASSOC_VARIANT: i32 = 100;

    pub const JOURNAL_CLASS: i32 = 3;
    pub const JOURNAL_VARIANT: i32 = 0;

    pub const CONFERENCE_CLASS: i32 = 4;
    pub const CONFERENCE_VARIANT: i32 = 0;

    pub const SCHOLAR_CITATION_CLASS: i32 = 5;
    pub const SCHOLAR_CITATION_VARIANT: i32 = 0;

    pub const INTEREST_CLASS: i32 = 6;
    pub const INTEREST_VARIANT: i32 = 0;
}

/// Metadata every persisted row carries (`BaseEntity` in the source).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseMeta {
    pub id: Uuid,
    pub class_id: i32,
    pub variant_id: i32,
    pub update_date: DateTime<Utc>,
    pub update_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Author {
    pub id: Uuid,
    pub name: String,
    pub role: Option<String>,
    pub organization: Option<String>,
    pub image_url: Option<String>,
    pub homepage_url: Option<String>,
    pub class_id: i32,
    pub variant_id: i32,
    pub update_date: DateTime<Utc>,
    pub update_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScholarAuthor {
    pub id: Uuid,
    pub author_key: Uuid,
    pub author_id: String,
    pub profile_url: Option<String>,
    pub verified: Option<bool>,
    pub h_index: Option<i32>,
    pub i10_index: Option<i32>,
    pub class_id: i32,
    pub variant_id: i32,
    pub update_date: DateTime<Utc>,
    pub update_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Publication {
    pub id: Uuid,
    pub title: String,
    pub url: Option<String>,
    pub publication_year: Option<i32>,
    pub pages: Option<String>,
    pub publisher: Option<String>,
    pub description: Option<String>,
    pub journal_id: Option<Uuid>,
    pub conference_id: Option<Uuid>,
    pub class_id: i32,
    pub variant_id: i32,
    pub update_date: DateTime<Utc>,
    pub update_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScholarPublication {
    pub id: Uuid,
    pub publication_key: Uuid,
    pub publication_id: String,
    pub title_link: Option<String>,
    pub pdf_link: Option<String>,
    pub total_citations: Option<i32>,
    pub cites_id: Option<String>,
    pub related_articles_url: Option<String>,
    pub all_versions_url: Option<String>,
    pub class_id: i32,
    pub variant_id: i32,
    pub update_date: DateTime<Utc>,
    pub update_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScholarCitation {
    pub id: Uuid,
    pub publication_key: Uuid,
    pub cites_id: String,
    pub citation_link: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub summary: Option<String>,
    pub document_link: Option<String>,
    pub year: Option<String>,
    pub citations: Option<i32>,
    pub class_id: i32,
    pub variant_id: i32,
    pub update_date: DateTime<Utc>,
    pub update_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Journal {
    pub id: Uuid,
    pub title: String,
    #[sqlx(rename = "journal_type")]
    pub r#type: Option<String>,
    pub year: i32,
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
    pub class_id: i32,
    pub variant_id: i32,
    pub update_date: DateTime<Utc>,
    pub update_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Conference {
    pub id: Uuid,
    pub title: String,
    pub acronym: String,
    pub publisher: Option<String>,
    pub rank: Option<String>,
    pub note: Option<String>,
    pub dblp_link: Option<String>,
    pub primary_for: Option<String>,
    pub comments: Option<String>,
    pub average_rating: Option<f64>,
    pub year: i32,
    pub class_id: i32,
    pub variant_id: i32,
    pub update_date: DateTime<Utc>,
    pub update_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Interest {
    pub id: Uuid,
    pub name: String,
    pub class_id: i32,
    pub variant_id: i32,
    pub update_date: DateTime<Utc>,
    pub update_count: i32,
}

/// `PublicationAuthor`, `AuthorCoauthor`, `AuthorInterest` share this shape:
/// an ordered pair of foreign keys with a composite primary key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LinkPair {
    pub left: Uuid,
    pub right: Uuid,
}
