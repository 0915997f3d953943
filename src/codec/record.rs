//! Serde shapes of one exchange record.
//!
//! ```json
//! {"qid": 2, "query": "...", "vid": "...",
//!  "pred_relevant_windows": [[start, end, score], ...],
//!  "pred_saliency_scores": [...]}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::QueryResult;

/// Incoming record. Windows stay untyped so one malformed triple can be
/// discarded without failing the document.
#[derive(Debug, Deserialize)]
pub(crate) struct QueryRecord {
    #[serde(default)]
    pub qid: Option<i64>,
    pub query: String,
    pub vid: String,
    pub pred_relevant_windows: Vec<Value>,
    #[serde(default)]
    pub pred_saliency_scores: Vec<f64>,
}

/// Why a window entry was dropped during decoding.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum WindowRejection {
    NotAnArray,
    TooShort(usize),
    NotNumeric,
    InvalidBounds(String),
}

impl std::fmt::Display for WindowRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowRejection::NotAnArray => write!(f, "entry is not an array"),
            WindowRejection::TooShort(len) => write!(f, "expected 3 elements, found {len}"),
            WindowRejection::NotNumeric => write!(f, "start, end and score must be numbers"),
            WindowRejection::InvalidBounds(reason) => write!(f, "{reason}"),
        }
    }
}

/// Read `[start, end, score, ...]`. Trailing elements are ignored.
pub(crate) fn parse_window(value: &Value) -> Result<(f64, f64, f64), WindowRejection> {
    let elements = value.as_array().ok_or(WindowRejection::NotAnArray)?;
    if elements.len() < 3 {
        return Err(WindowRejection::TooShort(elements.len()));
    }

    let start = elements[0].as_f64().ok_or(WindowRejection::NotNumeric)?;
    let end = elements[1].as_f64().ok_or(WindowRejection::NotNumeric)?;
    let score = elements[2].as_f64().ok_or(WindowRejection::NotNumeric)?;
    Ok((start, end, score))
}

/// Outgoing record, borrowing from the query being saved.
#[derive(Debug, Serialize)]
pub(crate) struct QueryRecordOut<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qid: Option<i64>,
    pub query: &'a str,
    pub vid: &'a str,
    pub pred_relevant_windows: Vec<[f64; 3]>,
    pub pred_saliency_scores: &'a [f64],
}

impl<'a> From<&'a QueryResult> for QueryRecordOut<'a> {
    fn from(query: &'a QueryResult) -> Self {
        Self {
            qid: query.query_id,
            query: &query.query_text,
            vid: &query.video_id,
            pred_relevant_windows: query
                .intervals()
                .iter()
                .map(|interval| {
                    [
                        interval.start_time(),
                        interval.end_time(),
                        interval.confidence_score(),
                    ]
                })
                .collect(),
            pred_saliency_scores: query.saliency_scores(),
        }
    }
}
