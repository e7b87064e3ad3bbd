//! Insolvency keyword filter for filing-history records.

use insolvencycheck_shared::FilingRecord;

/// Filing descriptions containing any of these (case-insensitively) are kept.
pub const INSOLVENCY_KEYWORDS: &[&str] = &[
    "winding up",
    "notice of intention to appoint administrator",
    "administration order",
    "appointment of administrator",
    "application for administration",
];

/// Whether `description` mentions at least one keyword, ignoring case.
pub fn matches_keywords(description: &str, keywords: &[&str]) -> bool {
    let haystack = description.to_lowercase();
    keywords
        .iter()
        .any(|kw| haystack.contains(&kw.to_lowercase()))
}

/// Keep the records whose description matches a keyword, preserving input order.
pub fn filter_filings(records: Vec<FilingRecord>, keywords: &[&str]) -> Vec<FilingRecord> {
    records
        .into_iter()
        .filter(|r| matches_keywords(&r.description, keywords))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(description: &str) -> FilingRecord {
        FilingRecord {
            description: description.into(),
            date: None,
        }
    }

    #[test]
    fn matching_ignores_case() {
        assert!(matches_keywords(
            "NOTICE OF INTENTION TO APPOINT ADMINISTRATOR",
            INSOLVENCY_KEYWORDS
        ));
        assert!(matches_keywords(
            "Resolution for Winding Up voluntarily",
            INSOLVENCY_KEYWORDS
        ));
        assert!(!matches_keywords("Confirmation statement", INSOLVENCY_KEYWORDS));
        assert!(!matches_keywords("", INSOLVENCY_KEYWORDS));
    }

    #[test]
    fn filter_is_an_order_preserving_subset() {
        let input = vec![
            record("Administration order made"),
            record("Change of registered office address"),
            record("Appointment of administrator"),
            record("Accounts for a small company"),
            record("winding up petition"),
        ];
        let kept = filter_filings(input.clone(), INSOLVENCY_KEYWORDS);

        let descriptions: Vec<&str> = kept.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(
            descriptions,
            vec![
                "Administration order made",
                "Appointment of administrator",
                "winding up petition"
            ]
        );
        assert!(kept.iter().all(|r| input.contains(r)));
    }

    #[test]
    fn keywords_are_case_insensitive_too() {
        let kept = filter_filings(vec![record("winding up")], &["WINDING UP"]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn empty_keyword_list_keeps_nothing() {
        let kept = filter_filings(vec![record("winding up")], &[]);
        assert!(kept.is_empty());
    }
}
