//! Command handlers for afyactl.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::info;

use afya_core::catalog::RuleCatalog;
use afya_core::decision::{Decision, Verdict};
use afya_core::engine::Engine;
use afya_core::fact::TriageLevel;
use afya_core::patient::{PatientInput, SymptomsField};
use afya_core::symptoms::SymptomIndex;

use crate::config::Config;

#[derive(Debug, clap::Args)]
pub struct TriageArgs {
    /// Patient JSON file ("-" for stdin)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Patient age in years
    #[arg(long)]
    pub age: Option<u32>,

    /// Patient gender (male, female, other)
    #[arg(long)]
    pub gender: Option<String>,

    /// History marker, e.g. "diabetes"
    #[arg(long)]
    pub history: Option<String>,

    /// Mode of arrival (ambulance, walk-in)
    #[arg(long)]
    pub arrival: Option<String>,

    /// Comma-separated symptoms, e.g. "fever,stiff neck"
    #[arg(long)]
    pub symptoms: Option<String>,

    /// Rules file (JSON); built-in catalog when omitted
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Emit the session report as JSON
    #[arg(long)]
    pub json: bool,
}

/// The session report emitted by `triage --json`. Field names match what
/// downstream dispatch tooling expects.
#[derive(Debug, Serialize)]
struct SessionReport<'a> {
    triage_level: TriageLevel,
    score: u8,
    transport: &'a str,
    rationale: &'a str,
    rule: &'a str,
    fired: &'a [String],
    evaluated_at: DateTime<Utc>,
}

fn load_catalog(rules: Option<&Path>, config: &Config) -> Result<Arc<RuleCatalog>> {
    let path = rules
        .map(Path::to_path_buf)
        .or_else(|| config.rules_path.clone());
    match path {
        Some(path) => {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("reading rules file {}", path.display()))?;
            let catalog = RuleCatalog::from_json_str(&json)
                .with_context(|| format!("loading rules file {}", path.display()))?;
            info!(rules = catalog.len(), path = %path.display(), "catalog loaded");
            Ok(catalog.shared())
        }
        None => Ok(RuleCatalog::builtin().shared()),
    }
}

fn read_patient(args: &TriageArgs) -> Result<PatientInput> {
    if let Some(file) = &args.file {
        let json = if file == Path::new("-") {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading patient document from stdin")?;
            buf
        } else {
            fs::read_to_string(file)
                .with_context(|| format!("reading patient file {}", file.display()))?
        };
        PatientInput::from_json(&json).context("parsing patient document")
    } else {
        Ok(PatientInput {
            age: args.age,
            gender: args.gender.clone(),
            history: args.history.clone(),
            mode_of_arrival: args.arrival.clone(),
            symptoms: args
                .symptoms
                .clone()
                .map(SymptomsField::Csv)
                .unwrap_or_default(),
        })
    }
}

pub fn triage(args: &TriageArgs, config: &Config) -> Result<()> {
    let catalog = load_catalog(args.rules.as_deref(), config)?;
    let patient = read_patient(args)?;
    let facts = patient.to_facts(&SymptomIndex::builtin());

    let engine = match config.iteration_cap {
        Some(cap) => Engine::with_iteration_cap(catalog, cap),
        None => Engine::new(catalog),
    };
    let outcome = engine.run(facts).context("triage session failed")?;
    let fired: Vec<String> = outcome.fired.iter().map(|f| f.rule.clone()).collect();

    match &outcome.decision {
        Decision::Verdict(verdict) => {
            if args.json {
                let report = SessionReport {
                    triage_level: verdict.level,
                    score: verdict.score,
                    transport: verdict.transport.as_str(),
                    rationale: &verdict.rationale,
                    rule: &verdict.rule,
                    fired: &fired,
                    evaluated_at: Utc::now(),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_verdict(verdict, &fired);
            }
            Ok(())
        }
        // Absence of a verdict must never read as a safe result.
        Decision::NoVerdict => {
            bail!("no rule fired; treat with maximum caution and seek clinical review")
        }
    }
}

fn print_verdict(verdict: &Verdict, fired: &[String]) {
    println!(
        "Triage level : {} (score {})",
        colored_level(verdict.level),
        verdict.score
    );
    println!("Transport    : {}", verdict.transport);
    println!("Rationale    : {}", verdict.rationale);
    println!("Rule         : {}", verdict.rule);
    if fired.len() > 1 {
        println!("Also fired   : {}", fired[1..].join(", "));
    }
}

fn colored_level(level: TriageLevel) -> String {
    match level {
        TriageLevel::Red => level.as_str().red().bold().to_string(),
        TriageLevel::Yellow => level.as_str().yellow().bold().to_string(),
        TriageLevel::Green => level.as_str().green().bold().to_string(),
    }
}

pub fn rules(rules_path: Option<&Path>, json: bool, config: &Config) -> Result<()> {
    let catalog = load_catalog(rules_path, config)?;

    if json {
        #[derive(Serialize)]
        struct RuleRow<'a> {
            name: &'a str,
            salience: i32,
            level: TriageLevel,
            score: u8,
            transport: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            description: Option<&'a str>,
        }
        let rows: Vec<RuleRow> = catalog
            .rules()
            .iter()
            .map(|r| RuleRow {
                name: &r.name,
                salience: r.salience,
                level: r.action.level,
                score: r.action.score,
                transport: r.action.transport.as_str(),
                description: r.description.as_deref(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for rule in catalog.rules() {
        println!(
            "{:>3}  {:<18} {}",
            rule.salience,
            colored_level(rule.action.level),
            rule.name
        );
    }
    println!("{} rules", catalog.len());
    Ok(())
}

pub fn check(file: &Path) -> Result<()> {
    let json = fs::read_to_string(file)
        .with_context(|| format!("reading rules file {}", file.display()))?;
    let catalog = RuleCatalog::from_json_str(&json)
        .with_context(|| format!("validating {}", file.display()))?;
    println!("OK: {} rules", catalog.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_RULES: &str = r#"[
        {
            "name": "Fever_Checkup",
            "salience": 25,
            "conditions": [{"field": "symptom", "value": "fever"}],
            "actions": {"level": "GREEN", "score": 4, "transport": "chemist", "rationale": "Rest and fluids"}
        }
    ]"#;

    #[test]
    fn check_accepts_a_valid_rules_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        fs::write(&path, GOOD_RULES).unwrap();
        assert!(check(&path).is_ok());
    }

    #[test]
    fn check_rejects_a_malformed_rules_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        fs::write(
            &path,
            r#"[{"name": "bad", "conditions": [{"field": "nope", "value": 1}],
                 "actions": {"level": "GREEN", "score": 4, "transport": "none", "rationale": "x"}}]"#,
        )
        .unwrap();
        let err = check(&path).unwrap_err();
        assert!(format!("{err:#}").contains("bad"));
    }

    #[test]
    fn flag_based_patient_reaches_a_verdict() {
        let args = TriageArgs {
            file: None,
            age: Some(55),
            gender: None,
            history: None,
            arrival: None,
            symptoms: Some("chest pain".to_string()),
            rules: None,
            json: false,
        };
        let patient = read_patient(&args).unwrap();
        let facts = patient.to_facts(&SymptomIndex::builtin());
        let engine = Engine::new(RuleCatalog::builtin().shared());
        let outcome = engine.run(facts).unwrap();
        let verdict = outcome.decision.verdict().expect("verdict");
        assert_eq!(verdict.rule, "Middle_Age_Chest_Pain");
    }

    #[test]
    fn session_report_uses_the_service_schema() {
        let report = SessionReport {
            triage_level: TriageLevel::Red,
            score: 1,
            transport: "ambulance",
            rationale: "test",
            rule: "Some_Rule",
            fired: &[],
            evaluated_at: Utc::now(),
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"triage_level\":\"RED\""));
        assert!(json.contains("\"transport\":\"ambulance\""));
        assert!(json.contains("\"evaluated_at\""));
    }
}
