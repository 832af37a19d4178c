//! Symptom name normalization and the built-in synonym index.
//!
//! Rules match symptoms by canonical hyphenated names ("chest-pain",
//! "difficulty-breathing"). Intake text arrives in many phrasings; the
//! synonym index maps the common ones onto canonical names so that
//! "heart pain" and "chest pain" reach the same rules.

use std::collections::HashMap;

/// Normalize raw symptom text to symbol form: trimmed, lower-case, inner
/// whitespace collapsed to single hyphens.
pub fn normalize(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Maps common phrasings to canonical symptom names.
#[derive(Debug, Clone)]
pub struct SymptomIndex {
    synonyms: HashMap<String, String>,
}

impl SymptomIndex {
    /// The built-in synonym table, seeded from the same clinical vocabulary
    /// the rule catalog uses.
    pub fn builtin() -> SymptomIndex {
        let table: &[(&str, &[&str])] = &[
            (
                "chest-pain",
                &["chest pain", "heart pain", "cardiac pain", "angina"],
            ),
            ("fever", &["high temperature", "pyrexia", "feverish"]),
            ("headache", &["head pain", "migraine", "cephalgia"]),
            ("cough", &["coughing", "persistent cough", "dry cough"]),
            (
                "difficulty-breathing",
                &[
                    "shortness of breath",
                    "dyspnea",
                    "breathless",
                    "cant breathe",
                ],
            ),
            (
                "abdominal-pain",
                &["stomach pain", "belly pain", "tummy ache"],
            ),
            ("vomiting", &["throwing up", "emesis"]),
            ("diarrhea", &["loose stool", "runny stomach"]),
            (
                "stiff-neck",
                &["neck stiffness", "rigid neck", "nuchal rigidity"],
            ),
            (
                "confusion",
                &["disoriented", "altered mental state", "confused"],
            ),
            (
                "severe-bleeding",
                &["hemorrhage", "blood loss", "bleeding heavily"],
            ),
            (
                "unconscious",
                &["passed out", "fainted", "unresponsive", "collapsed"],
            ),
            ("seizure", &["convulsions", "fits", "epileptic fit"]),
            ("severe-burn", &["burn injury", "thermal injury"]),
            ("fracture", &["broken bone", "bone fracture"]),
            ("weakness", &["fatigue", "tiredness", "no energy"]),
            ("dizziness", &["vertigo", "lightheaded", "spinning"]),
            ("rash", &["skin rash", "eruption", "skin irritation"]),
            (
                "runny-nose",
                &["nasal congestion", "stuffy nose", "common cold"],
            ),
            ("falls", &["fell down", "loss of balance", "tripped"]),
            ("lethargy", &["very sleepy", "limp baby"]),
        ];

        let mut synonyms = HashMap::new();
        for (canonical, phrases) in table {
            for phrase in *phrases {
                synonyms.insert(normalize(phrase), (*canonical).to_string());
            }
        }
        SymptomIndex { synonyms }
    }

    /// Canonical name for raw symptom text. Unknown symptoms pass through
    /// normalized; they simply match no rule.
    pub fn canonical(&self, raw: &str) -> String {
        let normalized = normalize(raw);
        self.synonyms
            .get(&normalized)
            .cloned()
            .unwrap_or(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace_and_case() {
        assert_eq!(normalize("  Chest   Pain "), "chest-pain");
        assert_eq!(normalize("FEVER"), "fever");
        assert_eq!(normalize("stiff neck"), "stiff-neck");
    }

    #[test]
    fn synonyms_map_to_canonical_names() {
        let index = SymptomIndex::builtin();
        assert_eq!(index.canonical("heart pain"), "chest-pain");
        assert_eq!(index.canonical("Passed Out"), "unconscious");
        assert_eq!(index.canonical("shortness of breath"), "difficulty-breathing");
    }

    #[test]
    fn unknown_symptoms_pass_through_normalized() {
        let index = SymptomIndex::builtin();
        assert_eq!(index.canonical("sore elbow"), "sore-elbow");
    }

    #[test]
    fn canonical_names_are_fixed_points() {
        let index = SymptomIndex::builtin();
        assert_eq!(index.canonical("chest-pain"), "chest-pain");
        assert_eq!(index.canonical("fever"), "fever");
    }
}
