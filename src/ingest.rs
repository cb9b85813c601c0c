use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::annotation::{Annotation, AnnotationId};
use crate::geometry::{midpoint, Point};
use crate::transform::Size;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("candidate payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("response did not contain an `annotations` array")]
    MissingAnnotations,
}

#[derive(Debug, Error, PartialEq)]
pub enum CandidateError {
    #[error("candidate {index} is malformed: {reason}")]
    Malformed { index: usize, reason: String },
    #[error("candidate {index} is missing `{field}`")]
    MissingField { index: usize, field: &'static str },
    #[error("candidate {index} has a non-finite `{field}`")]
    NonFinite { index: usize, field: &'static str },
}

#[derive(Deserialize)]
struct RawResponse {
    annotations: Option<Vec<serde_json::Value>>,
}

/// One suggestion in normalized `[0, 1]` image coordinates.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCandidate {
    label: Option<String>,
    p1: Option<Point>,
    p2: Option<Point>,
    label_pos: Option<Point>,
    ext1: Option<Point>,
    ext2: Option<Point>,
}

#[derive(Debug, Default)]
pub struct Ingested {
    pub annotations: Vec<Annotation>,
    pub rejected: Vec<CandidateError>,
}

/// Converts a collaborator response into canvas-native annotations. Bad candidates are
/// reported in `rejected` and skipped; only a payload without an `annotations` array fails
/// as a whole.
pub fn parse_candidates(
    json: &str,
    canvas: Size,
    mut next_id: impl FnMut() -> AnnotationId,
) -> Result<Ingested, IngestError> {
    let response: RawResponse = serde_json::from_str(json)?;
    let candidates = response.annotations.ok_or(IngestError::MissingAnnotations)?;

    let mut ingested = Ingested::default();
    for (index, value) in candidates.into_iter().enumerate() {
        match convert(index, value, canvas, &mut next_id) {
            Ok(annotation) => ingested.annotations.push(annotation),
            Err(err) => {
                warn!("skipping annotation candidate: {err}");
                ingested.rejected.push(err);
            }
        }
    }
    debug!(
        accepted = ingested.annotations.len(),
        rejected = ingested.rejected.len(),
        "ingested annotation candidates"
    );
    Ok(ingested)
}

fn convert(
    index: usize,
    value: serde_json::Value,
    canvas: Size,
    next_id: &mut impl FnMut() -> AnnotationId,
) -> Result<Annotation, CandidateError> {
    let raw: RawCandidate =
        serde_json::from_value(value).map_err(|err| CandidateError::Malformed {
            index,
            reason: err.to_string(),
        })?;

    let label = raw
        .label
        .ok_or(CandidateError::MissingField { index, field: "label" })?;
    let p1 = required(index, "p1", raw.p1, canvas)?;
    let p2 = required(index, "p2", raw.p2, canvas)?;
    let label_pos = match raw.label_pos {
        Some(point) => to_canvas(index, "labelPos", point, canvas)?,
        None => midpoint(p1, p2),
    };
    let ext1 = raw
        .ext1
        .map(|point| to_canvas(index, "ext1", point, canvas))
        .transpose()?;
    let ext2 = raw
        .ext2
        .map(|point| to_canvas(index, "ext2", point, canvas))
        .transpose()?;

    let value_text = value_from_label(&label);
    let mut annotation = Annotation::new(next_id(), label, value_text, p1, p2);
    annotation.label_pos = label_pos;
    annotation.ext1 = ext1;
    annotation.ext2 = ext2;
    Ok(annotation)
}

fn required(
    index: usize,
    field: &'static str,
    point: Option<Point>,
    canvas: Size,
) -> Result<Point, CandidateError> {
    let point = point.ok_or(CandidateError::MissingField { index, field })?;
    to_canvas(index, field, point, canvas)
}

fn to_canvas(
    index: usize,
    field: &'static str,
    normalized: Point,
    canvas: Size,
) -> Result<Point, CandidateError> {
    let point = normalized.scale_xy(canvas.width, canvas.height);
    if point.is_finite() {
        Ok(point)
    } else {
        Err(CandidateError::NonFinite { index, field })
    }
}

/// Text after the first `:`, trimmed; empty when the label carries no value.
pub fn value_from_label(label: &str) -> String {
    label
        .split_once(':')
        .map(|(_, value)| value.trim().to_string())
        .unwrap_or_default()
}
