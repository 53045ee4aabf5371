//! Conference acronym fallback splitting. See SPEC_FULL.md §4.C
//! "Acronym fallback for conferences".
//!
//! Pure and deterministic: the DB probing order is decided here, the
//! actual similarity probes live in `store::EntityStore`.

/// Delimiters tried in order when the raw acronym has no similarity match.
const FALLBACK_DELIMITERS: [char; 3] = ['@', '/', '-'];

/// Splits `acronym` on the first delimiter (in `@`, `/`, `-` order) that
/// appears in it. Returns the trimmed, non-empty parts in left-to-right
/// order — the order candidates should be probed in. Returns an empty
/// vec if none of the delimiters appear.
pub fn fallback_parts(acronym: &str) -> Vec<String> {
    for delim in FALLBACK_DELIMITERS {
        if acronym.contains(delim) {
            return acronym
                .split(delim)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
    }
    Vec::new()
}

/// The acronym to use when creating a brand-new conference after every
/// fallback probe missed: the last part of whichever split was actually
/// applied, or the original acronym if no delimiter was present at all.
pub fn insertion_acronym(acronym: &str) -> String {
    match fallback_parts(acronym).last() {
        Some(part) => part.clone(),
        None => acronym.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_at_first() {
        assert_eq!(fallback_parts("ICSE@ESEC"), vec!["ICSE", "ESEC"]);
    }

    #[test]
    fn prefers_at_over_slash_and_dash() {
        assert_eq!(fallback_parts("A@B/C-D"), vec!["A", "B/C-D"]);
    }

    #[test]
    fn falls_back_to_slash_when_no_at() {
        assert_eq!(fallback_parts("A/B-C"), vec!["A", "B-C"]);
    }

    #[test]
    fn falls_back_to_dash_when_no_at_or_slash() {
        assert_eq!(fallback_parts("A-B-C"), vec!["A", "B", "C"]);
    }

    #[test]
    fn no_delimiter_yields_empty() {
        assert!(fallback_parts("ICSE").is_empty());
    }

    #[test]
    fn insertion_acronym_uses_last_split_part() {
        assert_eq!(insertion_acronym("ICSE@ESEC"), "ESEC");
        assert_eq!(insertion_acronym("A-B-C"), "C");
    }

    #[test]
    fn insertion_acronym_falls_back_to_original_when_unsplit() {
        assert_eq!(insertion_acronym("ICSE"), "ICSE");
    }

    #[test]
    fn empty_parts_between_delimiters_are_dropped() {
        assert_eq!(fallback_parts("A@@B"), vec!["A", "B"]);
    }
}
