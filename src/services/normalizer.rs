//! Row normalization service
//!
//! Turns raw spreadsheet rows (header → cell, as exported to JSON) into
//! canonical [`Record`]s. Header names are matched case- and
//! whitespace-insensitively; free-text fields are folded onto canonical
//! categories so counts group cleanly.

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use regex::{Captures, Regex};
use serde_json::Value;

use crate::types::{Dataset, Record, AGE, DAYS_FILE_TO_SENT, DAYS_TO_FILE};

/// One raw row as exported from a sheet
pub type RawRow = IndexMap<String, Value>;

/// Substring → canonical arresting agency, first match wins
const AGENCY_MAP: [(&str, &str); 19] = [
    ("attorney", "Imperial County District Attorney's Office"),
    ("el centro", "El Centro Police Department"),
    ("calexico", "Calexico Police Department"),
    ("brawley", "Brawley Police Department"),
    ("calipatria state", "Calipatria State Prison"),
    ("centinela", "Centinela State Prison"),
    ("riverside sheriff", "Riverside County Sheriff's Department"),
    ("sheriff", "Imperial County Sheriff's Office"),
    ("probation", "Imperial County Probation Department"),
    ("highway", "California Highway Patrol"),
    ("westmorland", "Westmorland Police Department"),
    ("narcotics", "Imperial County Narcotics Task Force"),
    ("homeland", "Department of Homeland Security"),
    ("parks", "CA State Parks"),
    ("cdcr", "California Department of Corrections and Rehabilitation"),
    ("parole", "California Department of Corrections and Rehabilitation"),
    ("drug enforcement", "Drug Enforcement Administration"),
    ("border", "U.S. Customs and Border Patrol"),
    ("land", "Bureau of Land Management"),
];

const OTHER_AGENCY: &str = "Other Arresting Agency";

/// Substring → canonical case sub-type, first match wins
const SUBTYPE_MAP: [(&str, &str); 11] = [
    ("dv", "Domestic Violence"),
    ("dvrt", "Domestic Violence"),
    ("spu", "Special Prosecution Unit (SPU)"),
    ("svu", "Special Victims Unit (SVU)"),
    ("icac", "Internet Crimes Against Children (ICAC)"),
    ("dui", "DUI"),
    ("welfare", "Welfare Fraud"),
    ("fraud", "Fraud"),
    ("elder", "Elder Abuse"),
    ("parole", "Parole Revocation"),
    ("mandatory supervision", "Mandatory Supervision"),
];

const GENERAL_SUBTYPE: &str = "General Criminal Case";

const NOT_REPORTED: &str = "Not reported";

fn word_start_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\w").expect("valid regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

fn leading_int_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[+-]?\d+").expect("valid regex"))
}

/// Uppercase the first character of every word: "sub type" → "Sub Type"
pub fn title_case(s: &str) -> String {
    word_start_re()
        .replace_all(s, |caps: &Captures| caps[0].to_uppercase())
        .into_owned()
}

/// Leading integer of a cell, ignoring surrounding whitespace and any
/// trailing text ("123abc" → 123). Access-denied rows carry text here.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    leading_int_re()
        .find(raw.trim())
        .and_then(|m| m.as_str().parse().ok())
}

/// Parse a receipt date.
///
/// Accepts `YYYY-MM-DD`, `M/D/YYYY`, `M/D/YY`, `YYYY-MM-DD HH:MM:SS`,
/// `YYYY-MM-DDTHH:MM:SS`, RFC 3339, a bare four-digit year (January 1st),
/// and Excel serial day numbers.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse().ok().and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1));
    }

    if let Ok(serial) = s.parse::<f64>() {
        return excel_serial_date(serial);
    }

    if s.contains('/') {
        let year_len = s.rsplit('/').next().map_or(0, str::len);
        let fmt = if year_len == 4 { "%m/%d/%Y" } else { "%m/%d/%y" };
        return NaiveDate::parse_from_str(s, fmt).ok();
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Excel counts days from 1899-12-30 (including its phantom 1900-02-29)
fn excel_serial_date(serial: f64) -> Option<NaiveDate> {
    if !(1.0..=2_958_465.0).contains(&serial) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(serial.floor() as i64))
}

pub fn canonical_agency(raw: &str) -> String {
    let text = raw.trim().to_lowercase();
    AGENCY_MAP
        .iter()
        .find(|(key, _)| text.contains(key))
        .map_or(OTHER_AGENCY, |(_, name)| *name)
        .to_string()
}

pub fn canonical_subtype(raw: &str) -> String {
    if raw.trim().is_empty() {
        return GENERAL_SUBTYPE.to_string();
    }

    for token in raw.split([',', '/']).map(|t| t.trim().to_lowercase()) {
        if let Some((_, name)) = SUBTYPE_MAP.iter().find(|(key, _)| token.contains(key)) {
            return name.to_string();
        }
    }

    title_case(&whitespace_re().replace_all(raw.trim(), " "))
}

pub fn canonical_severity(raw: &str) -> String {
    let text = raw.trim();
    if text.eq_ignore_ascii_case("vop") {
        "Violation of Probation".to_string()
    } else {
        text.to_string()
    }
}

pub fn canonical_gender(raw: &str) -> &'static str {
    let text = raw.trim().to_lowercase();
    if text.starts_with('m') {
        "Male"
    } else if text.starts_with('f') {
        "Female"
    } else if text.starts_with('o') {
        "Other Gender"
    } else {
        NOT_REPORTED
    }
}

pub fn canonical_resident(raw: &str) -> &'static str {
    let text = raw.trim().to_lowercase();
    if text.starts_with("county") {
        "Resident"
    } else if text.starts_with("not") {
        "Non-resident"
    } else {
        "Unknown"
    }
}

pub fn age_group(age: Option<i64>) -> &'static str {
    match age {
        None => NOT_REPORTED,
        Some(a) if a < 18 => "<18",
        Some(a) if a <= 24 => "18–24",
        Some(a) if a <= 34 => "25–34",
        Some(a) if a <= 49 => "35–49",
        Some(a) if a <= 64 => "50–64",
        Some(_) => "65+",
    }
}

/// Numeric cell value, `None` when blank or not a number
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Stringify a cell the way a sheet export shows it
fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Header keys trimmed and lower-cased
fn normalize_keys(row: &RawRow) -> HashMap<String, String> {
    row.iter()
        .map(|(k, v)| (k.trim().to_lowercase(), cell_text(v)))
        .collect()
}

fn field<'a>(row: &'a HashMap<String, String>, names: &[&str]) -> &'a str {
    names
        .iter()
        .filter_map(|n| row.get(*n))
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .unwrap_or("")
}

/// Normalize a case row; `None` when the row has no numeric case id
pub fn normalize_case_row(raw: &RawRow) -> Option<Record> {
    let row = normalize_keys(raw);
    let id = parse_leading_int(field(&row, &["case id"]))?;

    let victim = field(&row, &["victim case"])
        .to_lowercase()
        .contains("case has a victim");

    let mut record = Record::new(id, parse_date(field(&row, &["case received by da"])))
        .with_dimension("severity", canonical_severity(field(&row, &["severity"])))
        .with_dimension("agency", canonical_agency(field(&row, &["arresting agency"])))
        .with_dimension("city", field(&row, &["location city"]))
        .with_dimension("sub_type", canonical_subtype(field(&row, &["case sub type"])))
        .with_dimension("victim_case", if victim { "Yes" } else { "No" });

    let status = field(&row, &["status"]);
    if !status.is_empty() {
        record = record.with_status(status);
    }
    if let Some(days) = parse_number(field(&row, &["days to file requested charges"])) {
        record = record.with_measure(DAYS_TO_FILE, days);
    }
    if let Some(days) = parse_leading_int(field(&row, &["days from charges filed to sentencing"])) {
        record = record.with_measure(DAYS_FILE_TO_SENT, days as f64);
    }
    Some(record)
}

/// Normalize a defendant row; `None` when the row has no numeric case id
pub fn normalize_defendant_row(raw: &RawRow) -> Option<Record> {
    let row = normalize_keys(raw);
    let id = parse_leading_int(field(&row, &["case id"]))?;

    let received = parse_date(field(
        &row,
        &["case received by da", "case received", "case received case id"],
    ));
    let age = parse_leading_int(field(&row, &["defendant age"]));

    let mut record = Record::new(id, received)
        .with_dimension("ethnicity", field(&row, &["ethnicity"]))
        .with_dimension(
            "gender",
            canonical_gender(field(&row, &["gender", "bettergender"])),
        )
        .with_dimension(
            "county_res",
            canonical_resident(field(&row, &["county resident"])),
        )
        .with_dimension("age_group", age_group(age));
    if let Some(age) = age {
        record = record.with_measure(AGE, age as f64);
    }
    Some(record)
}

/// Defendant fields copied onto a case by [`attach_defendants`]
const DEFENDANT_FIELDS: [&str; 4] = ["ethnicity", "gender", "county_res", "age_group"];

/// Copy defendant demographics onto the cases they belong to, joined by
/// case id. When several defendants share a case the last one wins. Fields
/// the case already carries are left alone. Returns how many cases matched.
pub fn attach_defendants(cases: &mut [Record], defendants: &[Record]) -> usize {
    let by_case: HashMap<i64, &Record> = defendants.iter().map(|d| (d.id, d)).collect();

    let mut matched = 0;
    for case in cases.iter_mut() {
        let Some(defendant) = by_case.get(&case.id) else {
            continue;
        };
        matched += 1;
        for name in DEFENDANT_FIELDS {
            if !case.dimensions.contains_key(name) {
                let value = defendant.dimensions.get(name).filter(|v| !v.trim().is_empty());
                if let Some(value) = value {
                    case.dimensions.insert(name.to_string(), value.clone());
                }
            }
        }
        if let Some(age) = defendant.measure(AGE) {
            case.measures.entry(AGE.to_string()).or_insert(age);
        }
    }
    matched
}

/// Records produced from a batch of rows
#[derive(Debug, Default)]
pub struct NormalizeOutcome {
    pub records: Vec<Record>,
    /// Rows dropped for lacking a numeric case id
    pub skipped: usize,
}

/// Normalize every row of `dataset`, preserving input order
pub fn normalize_rows(rows: &[RawRow], dataset: Dataset) -> NormalizeOutcome {
    let mut outcome = NormalizeOutcome {
        records: Vec::with_capacity(rows.len()),
        skipped: 0,
    };

    for row in rows {
        let record = match dataset {
            Dataset::Cases => normalize_case_row(row),
            Dataset::Defendants => normalize_defendant_row(row),
        };
        match record {
            Some(r) => outcome.records.push(r),
            None => outcome.skipped += 1,
        }
    }

    outcome
}
