//! Small normalizers shared by the intake guards.

/// Brazilian federative unit codes accepted for artist and submission `state` fields.
pub(crate) const BRAZILIAN_STATES: [&str; 27] = [
    "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA", "PB",
    "PR", "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
];

pub(crate) fn is_known_state(code: &str) -> bool {
    BRAZILIAN_STATES.contains(&code)
}

/// Trim an optional string, treating blank input as absent.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub(crate) fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Structural e-mail check: one `@`, non-empty local part, dotted domain, no whitespace.
pub(crate) fn is_plausible_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

/// Trim, drop blanks, and de-duplicate while keeping first-seen order.
pub(crate) fn normalize_genres(genres: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(genres.len());
    for genre in genres {
        let trimmed = genre.trim();
        if !trimmed.is_empty() && !normalized.iter().any(|existing| existing == trimmed) {
            normalized.push(trimmed.to_string());
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_check_accepts_common_addresses() {
        assert!(is_plausible_email("ana@7produtora.com.br"));
        assert!(is_plausible_email("booking+shows@example.org"));
    }

    #[test]
    fn email_check_rejects_malformed_addresses() {
        for candidate in ["", "ana", "ana@", "@example.com", "ana@example", "a b@x.com", "a@b@c.com", "ana@example..com"] {
            assert!(!is_plausible_email(candidate), "{candidate:?} accepted");
        }
    }

    #[test]
    fn genres_are_trimmed_and_deduplicated() {
        let genres = normalize_genres(vec![
            " MPB ".to_string(),
            "Forró".to_string(),
            "MPB".to_string(),
            "   ".to_string(),
        ]);
        assert_eq!(genres, vec!["MPB".to_string(), "Forró".to_string()]);
    }

    #[test]
    fn blank_optional_text_is_absent() {
        assert_eq!(optional_text(Some("   ".to_string())), None);
        assert_eq!(optional_text(Some(" @ana ".to_string())), Some("@ana".to_string()));
        assert_eq!(optional_text(None), None);
    }

    #[test]
    fn state_codes_are_case_sensitive() {
        assert!(is_known_state("PE"));
        assert!(!is_known_state("pe"));
        assert!(!is_known_state("XX"));
    }
}
