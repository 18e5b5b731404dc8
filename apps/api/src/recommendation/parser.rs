//! Recommendation Parser — pulls the JSON array out of a chatty model response.
//!
//! The model is asked for bare JSON but routinely wraps it in prose or code
//! fences. Extraction never fails: anything unusable yields zero records.
//!
//! Strategy:
//! 1. Strict parse of the whole (fence-stripped) response.
//! 2. Otherwise, the first `[` that opens an array of objects is scanned to its
//!    matching `]` with a string-aware bracket-depth counter, and that slice is parsed.
//! 3. Each element becomes a `RecommendationRecord`; objects missing a required
//!    key are dropped.

use serde::Serialize;
use serde_json::Value;

use crate::recommendation::model::{RecommendationRecord, RecordRejection};

/// Result of running the parser over one model response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    pub records: Vec<RecommendationRecord>,
    /// False when no JSON array could be isolated at all.
    pub array_found: bool,
    /// Elements of the array that were not objects or lacked a required key.
    pub rejections: Vec<RecordRejectionSummary>,
}

/// Position and cause of a dropped array element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordRejectionSummary {
    pub index: usize,
    pub reason: String,
}

impl Extraction {
    fn not_found() -> Self {
        Self {
            records: Vec::new(),
            array_found: false,
            rejections: Vec::new(),
        }
    }

    pub fn dropped(&self) -> usize {
        self.rejections.len()
    }
}

/// Returns the valid records in `raw_text`, in model order, along with whether
/// an array was found and which elements were dropped.
pub fn extract(raw_text: &str) -> Extraction {
    let Some(items) = find_json_array(raw_text) else {
        return Extraction::not_found();
    };

    let mut records = Vec::with_capacity(items.len());
    let mut rejections = Vec::new();

    for (index, item) in items.into_iter().enumerate() {
        match RecommendationRecord::from_json(item) {
            Ok(record) => records.push(record),
            Err(rejection) => rejections.push(RecordRejectionSummary {
                index,
                reason: describe(&rejection),
            }),
        }
    }

    Extraction {
        records,
        array_found: true,
        rejections,
    }
}

fn describe(rejection: &RecordRejection) -> String {
    match rejection {
        RecordRejection::NotAnObject => "not a JSON object".to_string(),
        RecordRejection::MissingKey(key) => format!("missing \"{key}\""),
    }
}

fn find_json_array(raw_text: &str) -> Option<Vec<Value>> {
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(strip_json_fences(raw_text)) {
        return Some(items);
    }

    let candidate = first_object_array(raw_text)?;
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Array(items)) => Some(items),
        _ => None,
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(stripped) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };
    stripped
        .trim_start()
        .strip_suffix("```")
        .map(|s| s.trim())
        .unwrap_or(stripped.trim_start())
}

/// Finds the first `[` followed (after whitespace) by `{` and returns the slice up
/// to its matching `]`. Brackets inside JSON strings are ignored.
fn first_object_array(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = (0..bytes.len()).find(|&i| bytes[i] == b'[' && opens_object(&bytes[i + 1..]))?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'[' | b'{' => depth += 1,
            b']' | b'}' => {
                depth -= 1;
                if depth == 0 {
                    // Brackets are ASCII, so both ends sit on char boundaries.
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

fn opens_object(rest: &[u8]) -> bool {
    rest.iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|&b| b == b'{')
}
