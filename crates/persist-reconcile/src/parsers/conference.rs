//! `ConferenceProcessor` — Conference. See spec.md §4.D row 4.

use super::{effective_update_date, f64_field, required_str, str_field};
use crate::store::ConferenceFields;
use crate::EntityStore;
use chrono::Datelike;
use persist_common::envelope::Envelope;
use persist_common::error::Result;
use sqlx::PgConnection;

pub async fn process(store: &EntityStore, conn: &mut PgConnection, envelope: &Envelope) -> Result<()> {
    let payload = &envelope.payload;
    let title = required_str(payload, "title")?;
    let acronym = str_field(payload, "acronym").unwrap_or(title);
    let source = str_field(payload, "source").unwrap_or("");
    let year = first_four_digit_run(source).unwrap_or_else(|| chrono::Utc::now().year());
    let update_date = effective_update_date(envelope);

    store
        .upsert_conference_by_acronym(
            conn,
            acronym,
            Some(title),
            ConferenceFields {
                publisher: Some(source.to_string()),
                rank: str_field(payload, "rank").map(str::to_string),
                note: str_field(payload, "note").map(str::to_string),
                dblp_link: str_field(payload, "dblp_link").map(str::to_string),
                primary_for: str_field(payload, "primary_for").map(str::to_string),
                comments: str_field(payload, "comments").map(str::to_string),
                average_rating: f64_field(payload, "average_rating"),
                year,
            },
            update_date,
        )
        .await?;

    Ok(())
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// The first run of exactly 4 ASCII digits bounded by a `\b` word boundary
/// on both sides (or the string edges), mirroring the original
/// `re.search(r'\b(\d{4})\b', source)` — e.g. `"ACM, New York, 2019"` ->
/// `Some(2019)`, but `"ICSE2019 Proceedings"` -> `None`, since the digits
/// are glued to the preceding letters.
fn first_four_digit_run(source: &str) -> Option<i32> {
    let bytes = source.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let left_ok = start == 0 || !is_word_byte(bytes[start - 1]);
            let right_ok = i == bytes.len() || !is_word_byte(bytes[i]);
            if i - start == 4 && left_ok && right_ok {
                return source[start..i].parse().ok();
            }
        } else {
            i += 1;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_year_in_mixed_source_text() {
        assert_eq!(first_four_digit_run("ACM, New York, NY, USA, 2019"), Some(2019));
    }

    #[test]
    fn ignores_digit_runs_that_are_not_exactly_four_long() {
        assert_eq!(first_four_digit_run("vol. 123 no. 45678"), None);
    }

    #[test]
    fn returns_none_when_absent() {
        assert_eq!(first_four_digit_run("IEEE"), None);
    }

    #[test]
    fn picks_first_run_when_multiple_present() {
        assert_eq!(first_four_digit_run("2018 edition, reprinted 2020"), Some(2018));
    }

    #[test]
    fn rejects_digits_glued_to_adjacent_letters() {
        assert_eq!(first_four_digit_run("ICSE2019 Proceedings"), None);
    }

    #[test]
    fn skips_unbounded_runs_to_find_a_bounded_one() {
        assert_eq!(first_four_digit_run("ICSE2019, 2020 edition"), Some(2020));
    }
}
