//! Patient input assembly: loose intake documents into initial facts.
//!
//! The intake document is deliberately forgiving - frontends send optional
//! demographics, symptom lists or comma-separated strings, and several
//! spellings of "mode of arrival". Unknown keys (vital signs and the like)
//! are ignored.

use serde::Deserialize;

use crate::error::TriageError;
use crate::fact::{ArrivalMode, Fact, Gender};
use crate::symptoms::SymptomIndex;

/// Symptoms as either a JSON array or a single comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SymptomsField {
    List(Vec<String>),
    Csv(String),
}

impl Default for SymptomsField {
    fn default() -> Self {
        SymptomsField::List(Vec::new())
    }
}

impl SymptomsField {
    /// Raw entries in document order, before normalization.
    fn entries(&self) -> Vec<&str> {
        match self {
            SymptomsField::List(items) => items.iter().map(String::as_str).collect(),
            SymptomsField::Csv(csv) => csv.split(',').collect(),
        }
    }
}

/// A patient intake document, as posted by the surrounding application.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientInput {
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    /// History marker, e.g. "diabetes" or "heart disease".
    #[serde(default)]
    pub history: Option<String>,
    #[serde(default, alias = "mode-of-arrival", alias = "modeOfArrival")]
    pub mode_of_arrival: Option<String>,
    #[serde(default, alias = "symptom", alias = "symptoms_list")]
    pub symptoms: SymptomsField,
}

impl PatientInput {
    /// Parse an intake document from JSON.
    pub fn from_json(json: &str) -> Result<PatientInput, TriageError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Assemble the session's initial facts.
    ///
    /// Produces at most one demographics fact, at most one history fact,
    /// and one symptom fact per distinct canonical name in document order.
    pub fn to_facts(&self, index: &SymptomIndex) -> Vec<Fact> {
        let mut facts = Vec::new();

        let gender = self.gender.as_deref().map(Gender::parse);
        if self.age.is_some() || gender.is_some() {
            facts.push(Fact::Demographics {
                age: self.age,
                gender,
            });
        }

        let marker = self
            .history
            .as_deref()
            .map(crate::symptoms::normalize)
            .filter(|m| !m.is_empty());
        let arrival_mode = self
            .mode_of_arrival
            .as_deref()
            .and_then(ArrivalMode::parse);
        if marker.is_some() || arrival_mode.is_some() {
            facts.push(Fact::History {
                marker,
                arrival_mode,
            });
        }

        let mut seen: Vec<String> = Vec::new();
        for raw in self.symptoms.entries() {
            if raw.trim().is_empty() {
                continue;
            }
            let canonical = index.canonical(raw);
            if seen.iter().any(|s| s == &canonical) {
                continue;
            }
            seen.push(canonical.clone());
            facts.push(Fact::Symptom { name: canonical });
        }

        facts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fact::FactKind;

    fn index() -> SymptomIndex {
        SymptomIndex::builtin()
    }

    #[test]
    fn list_and_csv_symptoms_are_equivalent() {
        let from_list =
            PatientInput::from_json(r#"{"symptoms": ["fever", "stiff neck"]}"#).unwrap();
        let from_csv = PatientInput::from_json(r#"{"symptoms": "fever, stiff neck"}"#).unwrap();
        assert_eq!(
            from_list.to_facts(&index()),
            from_csv.to_facts(&index())
        );
    }

    #[test]
    fn synonyms_are_canonicalized_and_deduplicated() {
        let input =
            PatientInput::from_json(r#"{"symptoms": "heart pain, chest pain, angina"}"#).unwrap();
        let facts = input.to_facts(&index());
        assert_eq!(facts, vec![Fact::symptom("chest-pain")]);
    }

    #[test]
    fn arrival_mode_aliases_are_accepted() {
        let kebab = PatientInput::from_json(r#"{"mode-of-arrival": "ambulance"}"#).unwrap();
        let camel = PatientInput::from_json(r#"{"modeOfArrival": "ambulance"}"#).unwrap();
        for input in [kebab, camel] {
            let facts = input.to_facts(&index());
            assert_eq!(facts.len(), 1);
            assert!(matches!(
                &facts[0],
                Fact::History {
                    arrival_mode: Some(ArrivalMode::Ambulance),
                    ..
                }
            ));
        }
    }

    #[test]
    fn history_marker_is_normalized() {
        let input =
            PatientInput::from_json(r#"{"history": "Heart Disease"}"#).unwrap();
        let facts = input.to_facts(&index());
        assert!(matches!(
            &facts[0],
            Fact::History { marker: Some(m), .. } if m == "heart-disease"
        ));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let input = PatientInput::from_json(
            r#"{"age": 40, "blood_pressure": "120/80", "symptoms": []}"#,
        )
        .unwrap();
        let facts = input.to_facts(&index());
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].kind(), FactKind::Demographics);
    }

    #[test]
    fn empty_document_yields_no_facts() {
        let input = PatientInput::from_json("{}").unwrap();
        assert!(input.to_facts(&index()).is_empty());
    }
}
