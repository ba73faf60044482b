//! Session file codec: scenarios + sparse distributions ⇄ comma-separated text.
//!
//! Column order (part of the file's compatibility contract):
//!
//! ```text
//! scenario_id, scenario_group, comment, <sorted attribute keys>,
//! baseline_min, baseline_max, baseline_mode, baseline_confidence,
//! treatment_min, treatment_max, treatment_mode, treatment_confidence
//! ```
//!
//! Unset distribution fields are written as empty cells and read back as unset.
//! The comment loses its commas and has line breaks written as the two
//! characters `\n`. Unknown columns on input become scenario attributes.
//!
//! A scenario id may repeat across rows only if every column except
//! `scenario_group` is byte-identical; the merged record keeps the position of
//! the first row and the group of the last one.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::constants::{
    is_reserved_column, COL_COMMENT, COL_SCENARIO_GROUP, COL_SCENARIO_ID, DISTRIBUTION_COLUMNS,
    RESERVED_FIELD_NAMES, YIELD_MARKER,
};
use crate::error::{CodecError, Result};
use crate::types::{Arm, AttributeValue, Field, Scenario, SparseScenarioDistribution};

use super::csv::{parse_records, write_record};
use super::Session;

/// Position of an (arm, field) pair within [`DISTRIBUTION_COLUMNS`].
fn column_slot(arm: Arm, field: Field) -> usize {
    let arm_offset = match arm {
        Arm::Baseline => 0,
        Arm::Treatment => 4,
    };
    let field_offset = match field {
        Field::Min => 0,
        Field::Max => 1,
        Field::Mode => 2,
        Field::Confidence => 3,
    };
    arm_offset + field_offset
}

/// Distribution column for an (arm, field) pair.
pub fn distribution_column(arm: Arm, field: Field) -> &'static str {
    DISTRIBUTION_COLUMNS[column_slot(arm, field)]
}

/// First header (in column order) containing "yield", case-insensitively.
pub fn detect_yield_column<S: AsRef<str>>(headers: &[S]) -> Option<String> {
    headers
        .iter()
        .map(AsRef::as_ref)
        .find(|h| h.to_lowercase().contains(YIELD_MARKER))
        .map(str::to_string)
}

// ── Encode ──

/// Serialize scenarios and their sparse distributions.
///
/// A scenario without an entry in `distributions` is written with every
/// distribution cell blank. Fails on an empty scenario list or a non-finite
/// distribution value.
pub fn encode_session(
    scenarios: &[Scenario],
    distributions: &HashMap<String, SparseScenarioDistribution>,
) -> Result<String> {
    if scenarios.is_empty() {
        return Err(CodecError::EmptySession);
    }

    let attribute_keys: BTreeSet<&str> = scenarios
        .iter()
        .flat_map(|s| s.attributes.keys())
        .map(String::as_str)
        .filter(|k| !is_reserved_column(k))
        .collect();

    let mut out = String::new();
    let mut header: Vec<&str> = vec![COL_SCENARIO_ID, COL_SCENARIO_GROUP, COL_COMMENT];
    header.extend(attribute_keys.iter().copied());
    header.extend(DISTRIBUTION_COLUMNS);
    write_record(&mut out, &header);

    let unset = SparseScenarioDistribution::default();
    for scenario in scenarios {
        let mut row: Vec<String> = Vec::with_capacity(header.len());
        row.push(scenario.id.clone());
        row.push(scenario.group.clone());
        row.push(scenario.comment.as_deref().map(escape_comment).unwrap_or_default());
        for key in &attribute_keys {
            row.push(
                scenario
                    .attributes
                    .get(*key)
                    .map(AttributeValue::to_string)
                    .unwrap_or_default(),
            );
        }
        let pair = distributions.get(&scenario.id).unwrap_or(&unset);
        for arm in Arm::ALL {
            let sparse = pair.arm(arm);
            for field in Field::ALL {
                let cell = match sparse.get(field) {
                    Some(v) if !v.is_finite() => {
                        return Err(CodecError::NonFiniteValue {
                            scenario_id: scenario.id.clone(),
                            column: distribution_column(arm, field).to_string(),
                        });
                    }
                    Some(v) => format_number(v),
                    None => String::new(),
                };
                row.push(cell);
            }
        }
        write_record(&mut out, &row);
    }

    debug!(
        scenarios = scenarios.len(),
        attributes = attribute_keys.len(),
        "encoded session"
    );
    Ok(out)
}

fn format_number(v: f64) -> String {
    format!("{}", v)
}

/// Drop commas, write line breaks as the two characters `\n`.
pub fn escape_comment(comment: &str) -> String {
    comment
        .replace(',', "")
        .replace("\r\n", "\\n")
        .replace(['\n', '\r'], "\\n")
}

/// Inverse of [`escape_comment`] for the line breaks (commas are gone for good).
pub fn unescape_comment(cell: &str) -> String {
    cell.replace("\\n", "\n")
}

/// A comment as it reads back after a save: `None` when nothing is left.
pub fn canonical_comment(comment: &str) -> Option<String> {
    let stored = unescape_comment(&escape_comment(comment));
    (!stored.is_empty()).then_some(stored)
}

// ── Decode ──

/// Column positions resolved from the header row.
struct Layout {
    headers: Vec<String>,
    id: usize,
    group: usize,
    comment: Option<usize>,
    distribution: [usize; 8],
    attributes: Vec<usize>,
}

impl Layout {
    fn from_header(cells: &[String]) -> Result<Self> {
        let headers: Vec<String> = cells.iter().map(|h| h.trim().to_string()).collect();

        let mut index: HashMap<&str, usize> = HashMap::new();
        for (i, h) in headers.iter().enumerate() {
            index.entry(h.as_str()).or_insert(i);
        }

        let required = [COL_SCENARIO_ID, COL_SCENARIO_GROUP]
            .into_iter()
            .chain(DISTRIBUTION_COLUMNS);
        let missing: Vec<String> = required
            .filter(|c| !index.contains_key(c))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(CodecError::MissingColumns { columns: missing });
        }

        let mut distribution = [0usize; 8];
        for (slot, col) in distribution.iter_mut().zip(DISTRIBUTION_COLUMNS) {
            *slot = index[col];
        }

        let mut attributes = Vec::new();
        for (i, h) in headers.iter().enumerate() {
            if index[h.as_str()] != i {
                continue;
            }
            if RESERVED_FIELD_NAMES.contains(&h.as_str()) {
                warn!(column = %h, "ignoring column with a reserved name");
                continue;
            }
            if is_reserved_column(h) {
                continue;
            }
            if h.is_empty() {
                warn!(column = i, "ignoring column with an empty header");
                continue;
            }
            attributes.push(i);
        }

        Ok(Self {
            id: index[COL_SCENARIO_ID],
            group: index[COL_SCENARIO_GROUP],
            comment: index.get(COL_COMMENT).copied(),
            distribution,
            attributes,
            headers,
        })
    }
}

/// Parse session text into a fresh [`Session`].
///
/// Always rebuilds from scratch; nothing is merged with previously loaded state.
pub fn decode_session(text: &str) -> Result<Session> {
    let mut records = parse_records(text)?.into_iter();
    let header = records.next().ok_or(CodecError::EmptyInput)?;
    let layout = Layout::from_header(&header.fields)?;
    let width = layout.headers.len();

    let mut session = Session::default();
    // First row seen per id: (position in `scenarios`, raw cells).
    let mut seen: HashMap<String, (usize, Vec<String>)> = HashMap::new();
    let mut merged = 0usize;

    for record in records {
        let line = record.line;
        if record.fields.len() != width {
            warn!(
                line,
                cells = record.fields.len(),
                expected = width,
                "ragged row: missing cells read as blank, extra cells ignored"
            );
        }
        let mut cells = record.fields;
        cells.resize(width, String::new());

        let id = cells[layout.id].clone();
        if id.trim().is_empty() {
            return Err(CodecError::BlankScenarioId { line });
        }

        if let Some((position, first)) = seen.get(&id) {
            let columns = mismatched_columns(&layout, first, &cells);
            if !columns.is_empty() {
                return Err(CodecError::Conflict {
                    scenario_id: id,
                    columns,
                });
            }
            session.scenarios[*position].group = cells[layout.group].clone();
            merged += 1;
            continue;
        }

        let scenario = decode_scenario(&layout, &cells);
        let pair = decode_distribution(&layout, &cells, line)?;
        session.distributions.insert(id.clone(), pair);
        seen.insert(id, (session.scenarios.len(), cells));
        session.scenarios.push(scenario);
    }

    // Only attribute columns that carry a value somewhere; an all-blank column
    // is not written back on encode.
    let carried: Vec<&str> = layout
        .attributes
        .iter()
        .map(|&i| layout.headers[i].as_str())
        .filter(|h| session.scenarios.iter().any(|s| s.attributes.contains_key(*h)))
        .collect();
    session.yield_column = detect_yield_column(&carried);

    debug!(
        scenarios = session.scenarios.len(),
        merged_duplicates = merged,
        yield_column = ?session.yield_column,
        "decoded session"
    );
    Ok(session)
}

/// Header names of every column, except the group, whose cells differ.
fn mismatched_columns(layout: &Layout, a: &[String], b: &[String]) -> Vec<String> {
    (0..layout.headers.len())
        .filter(|&i| i != layout.group && a[i] != b[i])
        .map(|i| layout.headers[i].clone())
        .collect()
}

fn decode_scenario(layout: &Layout, cells: &[String]) -> Scenario {
    let comment = layout
        .comment
        .map(|i| cells[i].as_str())
        .filter(|c| !c.is_empty())
        .map(unescape_comment);

    let mut scenario = Scenario::new(cells[layout.id].clone(), cells[layout.group].clone());
    scenario.comment = comment;
    for &i in &layout.attributes {
        let cell = &cells[i];
        if !cell.is_empty() {
            scenario
                .attributes
                .insert(layout.headers[i].clone(), parse_attribute(cell));
        }
    }
    scenario
}

fn decode_distribution(
    layout: &Layout,
    cells: &[String],
    line: usize,
) -> Result<SparseScenarioDistribution> {
    let mut pair = SparseScenarioDistribution::default();
    for arm in Arm::ALL {
        for field in Field::ALL {
            let slot = column_slot(arm, field);
            let cell = &cells[layout.distribution[slot]];
            let value = parse_optional_number(cell, line, DISTRIBUTION_COLUMNS[slot])?;
            pair.arm_mut(arm).set(field, value);
        }
    }
    Ok(pair)
}

/// Blank → unset; otherwise a finite float or an error.
fn parse_optional_number(cell: &str, line: usize, column: &str) -> Result<Option<f64>> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(CodecError::InvalidNumber {
            line,
            column: column.to_string(),
            value: cell.to_string(),
        }),
    }
}

/// Number when the cell lexically parses as a finite one, text otherwise.
pub fn parse_attribute(cell: &str) -> AttributeValue {
    AttributeValue::parse(cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::SparseDistribution;

    const HEADER: &str = "scenario_id,scenario_group,comment,loc,baseline_min,baseline_max,baseline_mode,baseline_confidence,treatment_min,treatment_max,treatment_mode,treatment_confidence";

    #[test]
    fn test_distribution_column_mapping() {
        assert_eq!(distribution_column(Arm::Baseline, Field::Min), "baseline_min");
        assert_eq!(distribution_column(Arm::Baseline, Field::Confidence), "baseline_confidence");
        assert_eq!(distribution_column(Arm::Treatment, Field::Mode), "treatment_mode");
        let mut cols = Vec::new();
        for arm in Arm::ALL {
            for field in Field::ALL {
                cols.push(distribution_column(arm, field));
            }
        }
        assert_eq!(cols, DISTRIBUTION_COLUMNS);
    }

    #[test]
    fn test_yield_detection() {
        let headers = ["scenario_id", "area", "Crop_Yield_t", "yield2"];
        assert_eq!(detect_yield_column(&headers), Some("Crop_Yield_t".to_string()));
        assert_eq!(detect_yield_column(&["a", "b"]), None);
    }

    #[test]
    fn test_comment_escaping() {
        assert_eq!(escape_comment("a, b\nc\r\nd"), "a b\\nc\\nd");
        assert_eq!(unescape_comment("a b\\nc"), "a b\nc");
    }

    #[test]
    fn test_parse_attribute() {
        assert_eq!(parse_attribute("12.5"), AttributeValue::Number(12.5));
        assert_eq!(parse_attribute("north"), AttributeValue::from("north"));
        assert_eq!(parse_attribute("NaN"), AttributeValue::from("NaN"));
        assert_eq!(parse_attribute("inf"), AttributeValue::from("inf"));
        assert_eq!(parse_attribute(" 3"), AttributeValue::from(" 3"));
    }

    #[test]
    fn test_missing_columns_listed() {
        let err = decode_session("scenario_id,baseline_min\ns1,2\n").unwrap_err();
        match err {
            CodecError::MissingColumns { columns } => {
                assert_eq!(columns[0], "scenario_group");
                assert_eq!(columns.len(), 8);
                assert!(!columns.contains(&"baseline_min".to_string()));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_comment_column_optional() {
        let text = "scenario_id,scenario_group,baseline_min,baseline_max,baseline_mode,baseline_confidence,treatment_min,treatment_max,treatment_mode,treatment_confidence\ns1,A,,,,,,,,\n";
        let session = decode_session(text).unwrap();
        assert_eq!(session.scenarios.len(), 1);
        assert_eq!(session.scenarios[0].comment, None);
    }

    #[test]
    fn test_invalid_number() {
        let text = format!("{HEADER}\ns1,A,,north,abc,,,,,,,\n");
        assert_eq!(
            decode_session(&text).unwrap_err(),
            CodecError::InvalidNumber {
                line: 2,
                column: "baseline_min".to_string(),
                value: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_blank_id() {
        let text = format!("{HEADER}\n,A,,north,,,,,,,,\n");
        assert_eq!(
            decode_session(&text).unwrap_err(),
            CodecError::BlankScenarioId { line: 2 }
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(decode_session("").unwrap_err(), CodecError::EmptyInput);
        assert_eq!(decode_session("\n\n").unwrap_err(), CodecError::EmptyInput);
    }

    #[test]
    fn test_header_only_is_empty_session() {
        let session = decode_session(HEADER).unwrap();
        assert!(session.scenarios.is_empty());
        assert!(session.distributions.is_empty());
    }

    #[test]
    fn test_ragged_row_padded() {
        let text = format!("{HEADER}\ns1,A,,north,5\n");
        let session = decode_session(&text).unwrap();
        let pair = session.distributions["s1"];
        assert_eq!(pair.baseline.min, Some(5.0));
        assert_eq!(pair.treatment, SparseDistribution::UNSET);
    }

    #[test]
    fn test_reserved_field_name_not_an_attribute() {
        let text = format!("{HEADER},group\ns1,A,,north,,,,,,,,,B\n");
        let session = decode_session(&text).unwrap();
        let attrs = &session.scenarios[0].attributes;
        assert!(attrs.contains_key("loc"));
        assert!(!attrs.contains_key("group"));
    }

    #[test]
    fn test_blank_yield_column_not_detected() {
        let text = format!("{HEADER},crop_yield\ns1,A,,north,,,,,,,,,\n");
        let session = decode_session(&text).unwrap();
        assert_eq!(session.yield_column, None);

        let text = format!("{HEADER},crop_yield\ns1,A,,north,,,,,,,,,\ns2,A,,,,,,,,,,,7\n");
        let session = decode_session(&text).unwrap();
        assert_eq!(session.yield_column.as_deref(), Some("crop_yield"));
        let reloaded = decode_session(&session.to_csv().unwrap()).unwrap();
        assert_eq!(reloaded.yield_column.as_deref(), Some("crop_yield"));
    }

    #[test]
    fn test_non_finite_value_not_encoded() {
        let mut pair = SparseScenarioDistribution::default();
        pair.baseline.max = Some(f64::INFINITY);
        let distributions = HashMap::from([("s1".to_string(), pair)]);
        let err = encode_session(&[Scenario::new("s1", "A")], &distributions).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert_eq!(
            err,
            CodecError::NonFiniteValue {
                scenario_id: "s1".to_string(),
                column: "baseline_max".to_string(),
            }
        );
    }

    #[test]
    fn test_canonical_comment() {
        assert_eq!(canonical_comment(""), None);
        assert_eq!(canonical_comment(","), None);
        assert_eq!(canonical_comment("a,b\r\nc").as_deref(), Some("ab\nc"));
    }

    #[test]
    fn test_encode_empty_fails() {
        assert_eq!(
            encode_session(&[], &HashMap::new()).unwrap_err(),
            CodecError::EmptySession
        );
    }
}
