//! Idempotent schema bootstrap. Not a migration system — just enough DDL
//! to stand the schema of SPEC_FULL.md §3 up once against a bare Postgres
//! instance, using `CREATE TABLE IF NOT EXISTS`. Enables `pg_trgm` for the
//! `word_similarity` operator and `fuzzystrmatch` for the
//! `jaro_similarity`/`jaro_winkler_similarity` functions the reconcile
//! layer's prefilters and similarity matches use.

use crate::error::Result;
use sqlx::PgPool;

pub async fn bootstrap_schema(pool: &PgPool) -> Result<()> {
    sqlx::query("CREATE EXTENSION IF NOT EXISTS pg_trgm")
        .execute(pool)
        .await?;
    sqlx::query("CREATE EXTENSION IF NOT EXISTS fuzzystrmatch")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS authors (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name TEXT NOT NULL,
            role TEXT,
            organization TEXT,
            image_url TEXT,
            homepage_url TEXT,
            class_id INT NOT NULL,
            variant_id INT NOT NULL,
            update_date TIMESTAMPTZ NOT NULL DEFAULT now(),
            update_count INT NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS scholar_authors (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            author_key UUID NOT NULL REFERENCES authors(id),
            author_id TEXT NOT NULL UNIQUE,
            profile_url TEXT,
            verified BOOLEAN,
            h_index INT,
            i10_index INT,
            class_id INT NOT NULL,
            variant_id INT NOT NULL,
            update_date TIMESTAMPTZ NOT NULL DEFAULT now(),
            update_count INT NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS publications (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            title TEXT NOT NULL,
            url TEXT,
            publication_year INT,
            pages TEXT,
            publisher TEXT,
            description TEXT,
            journal_id UUID,
            conference_id UUID,
            class_id INT NOT NULL,
            variant_id INT NOT NULL,
            update_date TIMESTAMPTZ NOT NULL DEFAULT now(),
            update_count INT NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS scholar_publications (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            publication_key UUID NOT NULL REFERENCES publications(id),
            publication_id TEXT NOT NULL,
            title_link TEXT,
            pdf_link TEXT,
            total_citations INT,
            cites_id TEXT,
            related_articles_url TEXT,
            all_versions_url TEXT,
            class_id INT NOT NULL,
            variant_id INT NOT NULL,
            update_date TIMESTAMPTZ NOT NULL DEFAULT now(),
            update_count INT NOT NULL DEFAULT 1,
            UNIQUE (publication_id, cites_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS scholar_citations (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            publication_key UUID NOT NULL REFERENCES scholar_publications(id),
            cites_id TEXT NOT NULL UNIQUE,
            citation_link TEXT,
            title TEXT,
            link TEXT,
            summary TEXT,
            document_link TEXT,
            year TEXT,
            citations INT,
            class_id INT NOT NULL,
            variant_id INT NOT NULL,
            update_date TIMESTAMPTZ NOT NULL DEFAULT now(),
            update_count INT NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS journals (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            title TEXT NOT NULL,
            journal_type TEXT,
            year INT NOT NULL DEFAULT 0,
            link TEXT,
            sjr DOUBLE PRECISION,
            q_rank TEXT,
            h_index INT,
            total_docs INT,
            total_docs_3years INT,
            total_refs INT,
            total_cites_3years INT,
            citable_docs_3years INT,
            cites_per_doc_2years DOUBLE PRECISION,
            refs_per_doc DOUBLE PRECISION,
            female_percent DOUBLE PRECISION,
            class_id INT NOT NULL,
            variant_id INT NOT NULL,
            update_date TIMESTAMPTZ NOT NULL DEFAULT now(),
            update_count INT NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS conferences (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            title TEXT NOT NULL,
            acronym TEXT NOT NULL,
            publisher TEXT,
            rank TEXT,
            note TEXT,
            dblp_link TEXT,
            primary_for TEXT,
            comments TEXT,
            average_rating DOUBLE PRECISION,
            year INT NOT NULL,
            class_id INT NOT NULL,
            variant_id INT NOT NULL,
            update_date TIMESTAMPTZ NOT NULL DEFAULT now(),
            update_count INT NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS interests (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name TEXT NOT NULL,
            class_id INT NOT NULL,
            variant_id INT NOT NULL,
            update_date TIMESTAMPTZ NOT NULL DEFAULT now(),
            update_count INT NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS publication_author (
            publication_id UUID NOT NULL REFERENCES publications(id),
            author_id UUID NOT NULL REFERENCES authors(id),
            PRIMARY KEY (publication_id, author_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS author_coauthor (
            author_id UUID NOT NULL REFERENCES authors(id),
            coauthor_id UUID NOT NULL REFERENCES authors(id),
            PRIMARY KEY (author_id, coauthor_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS author_interest (
            author_id UUID NOT NULL REFERENCES authors(id),
            interest_id UUID NOT NULL REFERENCES interests(id),
            PRIMARY KEY (author_id, interest_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_authors_name_trgm ON authors USING gin (name gin_trgm_ops)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_publications_title_trgm ON publications USING gin (title gin_trgm_ops)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
