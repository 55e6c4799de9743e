//! The default health-score test case skeleton.
//!
//! New sessions seed "add blank case" from this template when there is no
//! existing document to blank. Every leaf is `null` except the fields the
//! API takes as lists, which start as empty arrays.

use super::node::CaseValue;
use super::parser::parse_document;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::path::Path;

const MHM_FIELDS: &[&str] = &[
    "age", "hgt", "wgt", "sex", "dbp", "map", "sbp", "fat", "ppr", "rhr", "rhr_day", "spo2",
    "vo2max", "whr", "wst", "alc", "cst", "exh", "fCV", "fDM", "fMI", "pHT", "a1c", "acr", "cre",
    "crp", "cys", "fbg", "eag", "gfr", "hdl", "ldl", "tgl", "tsc", "vdl", "CAN", "CHD", "CHF",
    "CKD", "CVD", "DM2", "HTN", "LDS", "LVH", "PDM", "PMI", "STK", "TDM", "THT",
];

const SMK_FIELDS: &[&str] = &["now", "evr", "yrs", "num", "qit", "slt"];

const SLP_FIELDS: &[&str] = &["bed", "slp", "awk", "slp_avg"];

const NUT_EXTRA_FIELDS: &[&str] = &[
    "protein",
    "sfat",
    "sugar",
    "fiber",
    "sodium",
    "vitamin_c",
    "iron",
    "percentage_drink",
    "density_drink",
];

/// Fields that hold lists rather than single answers.
const LIST_FIELDS: &[&str] = &["rhr_day", "bed", "slp", "awk", "slp_avg", "mfm"];

/// Top-level sections with a human-readable description of each.
pub fn section_descriptions() -> &'static [(&'static str, &'static str)] {
    &[
        ("mhm", "Medical/Health Measurements"),
        ("smk", "Smoking Data"),
        ("slp", "Sleep Data"),
        ("nut", "Nutrition Data"),
        ("qlm", "Quality of Life Measurements"),
        ("clip", "Clipboard flag"),
    ]
}

fn leaf(name: &str) -> CaseValue {
    if LIST_FIELDS.contains(&name) {
        CaseValue::Array(Vec::new())
    } else {
        CaseValue::Null
    }
}

fn section<I, S>(names: I) -> CaseValue
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let entries: IndexMap<String, CaseValue> = names
        .into_iter()
        .map(|name| (name.as_ref().to_string(), leaf(name.as_ref())))
        .collect();
    CaseValue::Object(entries)
}

/// Numbered questionnaire items such as `phq01`..`phq09`.
fn numbered(prefix: &str, count: usize) -> impl Iterator<Item = String> + '_ {
    (1..=count).map(move |i| format!("{}{:02}", prefix, i))
}

/// Builds the built-in health-score skeleton.
///
/// # Example
///
/// ```
/// use casequill::document::template::default_template;
///
/// let template = default_template();
/// assert!(template.get("mhm").and_then(|m| m.get("age")).is_some());
/// assert!(template.get("slp").and_then(|s| s.get("bed")).map(|v| v.is_array()).unwrap_or(false));
/// ```
pub fn default_template() -> CaseValue {
    let nut: Vec<String> = numbered("nqs", 22)
        .chain(NUT_EXTRA_FIELDS.iter().map(|s| s.to_string()))
        .collect();

    let qlm: Vec<String> = numbered("q", 27)
        .chain(numbered("gad", 7))
        .chain(numbered("phq", 9))
        .chain(numbered("pss", 10))
        .chain(std::iter::once("gsrh".to_string()))
        .chain(numbered("maas", 15))
        .chain(std::iter::once("mfm".to_string()))
        .collect();

    let mut root = IndexMap::new();
    root.insert("mhm".to_string(), section(MHM_FIELDS));
    root.insert("smk".to_string(), section(SMK_FIELDS));
    root.insert("slp".to_string(), section(SLP_FIELDS));
    root.insert("nut".to_string(), section(nut));
    root.insert("qlm".to_string(), section(qlm));
    root.insert("clip".to_string(), CaseValue::Null);
    CaseValue::Object(root)
}

/// Loads a custom template from a JSON file.
pub fn load_template<P: AsRef<Path>>(path: P) -> Result<CaseValue> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read template {}", path.display()))?;
    let template = parse_document(&content)
        .with_context(|| format!("Failed to parse template {}", path.display()))?;
    Ok(template)
}
