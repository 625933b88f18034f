//! Response body parsing for the ABS data API.
//!
//! Two wire formats are understood: SDMX-JSON (flat or series-keyed
//! observations) and delimited text with a header row. Neither parser fails;
//! structurally unusable bodies produce no rows, and text that is not
//! delimited at all is kept as a single `raw_data` row.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, warn};

use super::Observation;

/// Maximum characters kept from an unparseable body.
const RAW_DATA_LIMIT: usize = 500;

/// Column holding the observation value in delimited responses.
const VALUE_COLUMN: &str = "OBS_VALUE";

/// Parse a response body according to its content type.
pub fn parse_body(content_type: &str, body: &str) -> Vec<Observation> {
    if content_type.contains("json") {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => return parse_sdmx_json(&value),
            Err(e) => warn!("Failed to parse JSON response, trying text parsing: {}", e),
        }
    }
    parse_delimited(body)
}

// ============================================================================
// SDMX-JSON
// ============================================================================

/// Parse an SDMX-JSON data message into observations.
pub fn parse_sdmx_json(message: &Value) -> Vec<Observation> {
    let data = message.get("data").unwrap_or(message);

    let Some(dataset) = data
        .get("dataSets")
        .and_then(Value::as_array)
        .and_then(|sets| sets.first())
    else {
        debug!("SDMX message has no dataSets");
        return Vec::new();
    };

    let structure = data
        .get("structure")
        .or_else(|| {
            data.get("structures")
                .and_then(Value::as_array)
                .and_then(|s| s.first())
        });
    let series_dims = dimension_list(structure, "series");
    let observation_dims = dimension_list(structure, "observation");

    let mut rows = Vec::new();

    if let Some(observations) = dataset.get("observations").and_then(Value::as_object) {
        for (key, values) in observations {
            let mut dimensions = BTreeMap::new();
            resolve_key(key, &observation_dims, &mut dimensions);
            if let Some(row) = build_row(dimensions, values) {
                rows.push(row);
            }
        }
    } else if let Some(series) = dataset.get("series").and_then(Value::as_object) {
        for (series_key, entry) in series {
            let mut series_dimensions = BTreeMap::new();
            resolve_key(series_key, &series_dims, &mut series_dimensions);

            let Some(observations) = entry.get("observations").and_then(Value::as_object) else {
                continue;
            };
            for (obs_key, values) in observations {
                let mut dimensions = series_dimensions.clone();
                resolve_key(obs_key, &observation_dims, &mut dimensions);
                if let Some(row) = build_row(dimensions, values) {
                    rows.push(row);
                }
            }
        }
    }

    debug!(rows = rows.len(), "Parsed SDMX-JSON response");
    rows
}

/// `(dimension id, value ids)` pairs in key position order.
fn dimension_list(structure: Option<&Value>, level: &str) -> Vec<(String, Vec<String>)> {
    structure
        .and_then(|s| s.get("dimensions"))
        .and_then(|d| d.get(level))
        .and_then(Value::as_array)
        .map(|dims| {
            dims.iter()
                .map(|dim| {
                    let id = dim
                        .get("id")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                    let values = dim
                        .get("values")
                        .and_then(Value::as_array)
                        .map(|vals| {
                            vals.iter()
                                .map(|v| {
                                    v.get("id")
                                        .and_then(Value::as_str)
                                        .unwrap_or_default()
                                        .to_string()
                                })
                                .collect()
                        })
                        .unwrap_or_default();
                    (id, values)
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Map a `0:1:2` style key onto dimension ids, resolving indices to value ids
/// where the structure provides them.
fn resolve_key(
    key: &str,
    dims: &[(String, Vec<String>)],
    out: &mut BTreeMap<String, String>,
) {
    if key.is_empty() {
        return;
    }
    for (position, index) in key.split(':').enumerate() {
        let Some((id, values)) = dims.get(position) else {
            break;
        };
        if id.is_empty() {
            continue;
        }
        let resolved = index
            .parse::<usize>()
            .ok()
            .and_then(|i| values.get(i))
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or_else(|| index.to_string());
        out.insert(id.clone(), resolved);
    }
}

fn build_row(dimensions: BTreeMap<String, String>, values: &Value) -> Option<Observation> {
    let first = values.as_array()?.first()?;
    Some(Observation {
        dimensions,
        value: numeric(first),
    })
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ============================================================================
// Delimited text
// ============================================================================

/// Parse delimited text with a header row.
pub fn parse_delimited(text: &str) -> Vec<Observation> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = match reader.headers() {
        Ok(h) if h.len() > 1 => h.clone(),
        Ok(_) => return vec![raw_row(text)],
        Err(e) => {
            warn!("Error parsing text response: {}", e);
            return vec![raw_row(text)];
        }
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping malformed delimited record: {}", e);
                continue;
            }
        };

        let mut row = Observation::default();
        for (column, field) in headers.iter().zip(record.iter()) {
            if column == VALUE_COLUMN {
                row.value = field.parse().ok();
            } else {
                row.dimensions.insert(column.to_string(), field.to_string());
            }
        }
        rows.push(row);
    }

    debug!(rows = rows.len(), "Parsed delimited response");
    rows
}

fn raw_row(text: &str) -> Observation {
    let truncated: String = text.chars().take(RAW_DATA_LIMIT).collect();
    Observation::default().with_dimension("raw_data", truncated)
}
