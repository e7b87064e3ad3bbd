//! Wire models for the registry's JSON responses.
//!
//! Only the fields the report needs are modelled; everything else is ignored.
//! Missing arrays default to empty so a sparse body never fails to decode.

use serde::Deserialize;

use insolvencycheck_shared::{CaseEvent, CompanyIdentity, FilingRecord, InsolvencyCase};

/// `GET /search/companies`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SearchItem {
    pub company_number: String,
    pub title: String,
}

impl From<&SearchItem> for CompanyIdentity {
    fn from(item: &SearchItem) -> Self {
        Self {
            registry_id: item.company_number.clone(),
            official_name: item.title.clone(),
        }
    }
}

/// `GET /company/{id}/insolvency`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct InsolvencyResponse {
    #[serde(default)]
    pub cases: Vec<RawCase>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawCase {
    #[serde(default)]
    pub dates: Vec<RawCaseDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawCaseDate {
    #[serde(rename = "type")]
    pub kind: String,
    /// Absent on some milestones; an empty date is left for the normalizer to label.
    #[serde(default)]
    pub date: String,
}

impl From<RawCase> for InsolvencyCase {
    fn from(raw: RawCase) -> Self {
        Self {
            events: raw
                .dates
                .into_iter()
                .map(|d| CaseEvent {
                    event_type: d.kind,
                    event_date: d.date,
                })
                .collect(),
        }
    }
}

/// `GET /company/{id}/filing-history`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct FilingHistoryResponse {
    #[serde(default)]
    pub items: Vec<RawFiling>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawFiling {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub date_filed: Option<String>,
}

impl From<RawFiling> for FilingRecord {
    fn from(raw: RawFiling) -> Self {
        Self {
            description: raw.description,
            date: non_blank(raw.date).or_else(|| non_blank(raw.date_filed)),
        }
    }
}

/// An empty or whitespace-only date counts as no date at all.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_fixture_decodes() {
        let body = std::fs::read_to_string("../../../fixtures/json/search-companies.json")
            .expect("read fixture");
        let parsed: SearchResponse = serde_json::from_str(&body).expect("decode");
        assert_eq!(parsed.items.len(), 2);
        let identity = CompanyIdentity::from(&parsed.items[0]);
        assert_eq!(identity.registry_id, "01234567");
        assert_eq!(identity.official_name, "ACME LTD");
    }

    #[test]
    fn insolvency_case_keeps_event_order() {
        let body = std::fs::read_to_string("../../../fixtures/json/insolvency.json")
            .expect("read fixture");
        let parsed: InsolvencyResponse = serde_json::from_str(&body).expect("decode");
        let case = InsolvencyCase::from(parsed.cases[0].clone());
        let kinds: Vec<&str> = case.events.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(
            kinds,
            vec!["wound-up-on", "appointment-of-liquidator", "dissolved-on"]
        );
    }

    #[test]
    fn filing_date_falls_back_to_date_filed() {
        let raw: RawFiling =
            serde_json::from_str(r#"{"description":"x","date_filed":"2023-01-02"}"#).unwrap();
        assert_eq!(FilingRecord::from(raw).date.as_deref(), Some("2023-01-02"));

        let raw: RawFiling =
            serde_json::from_str(r#"{"description":"x","date":"2023-03-04","date_filed":"2023-01-02"}"#)
                .unwrap();
        assert_eq!(FilingRecord::from(raw).date.as_deref(), Some("2023-03-04"));

        let raw: RawFiling = serde_json::from_str(r#"{"description":"x"}"#).unwrap();
        assert_eq!(FilingRecord::from(raw).date, None);
    }

    #[test]
    fn blank_filing_dates_count_as_missing() {
        let raw: RawFiling =
            serde_json::from_str(r#"{"description":"x","date":"","date_filed":"2023-01-02"}"#)
                .unwrap();
        assert_eq!(FilingRecord::from(raw).date.as_deref(), Some("2023-01-02"));

        let raw: RawFiling =
            serde_json::from_str(r#"{"description":"x","date":"  ","date_filed":""}"#).unwrap();
        assert_eq!(FilingRecord::from(raw).date, None);
    }

    #[test]
    fn undated_milestone_keeps_the_rest_of_the_case() {
        let parsed: InsolvencyResponse = serde_json::from_str(
            r#"{"cases":[{"dates":[
                {"type":"wound-up-on"},
                {"type":"appointment-of-liquidator","date":"2023-07-01"}
            ]}]}"#,
        )
        .unwrap();

        let case = InsolvencyCase::from(parsed.cases[0].clone());
        assert_eq!(case.events.len(), 2);
        assert_eq!(case.events[0].event_date, "");
        assert_eq!(case.events[1].event_date, "2023-07-01");
    }

    #[test]
    fn empty_body_decodes_to_no_items() {
        let parsed: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.items.is_empty());
        let parsed: InsolvencyResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.cases.is_empty());
    }
}
