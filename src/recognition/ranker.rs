use std::cmp::Ordering;

use super::{DetectedFace, LabelCandidate};

/// Confidence a top candidate must strictly exceed to count as a match.
pub const ACCEPT_THRESHOLD: f64 = 0.5;
/// Carousel capacity; matches beyond it are counted but not shown.
pub const MAX_DISPLAYED: usize = 5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedFaces {
    /// Accepted faces with a renderable crop, in descending top-confidence order, at most
    /// [`MAX_DISPLAYED`].
    pub accepted: Vec<DetectedFace>,
    pub total_detected: usize,
    /// Every face passing the predicate, including those cut by the display cap.
    pub accepted_count: usize,
}

impl RankedFaces {
    pub fn has_matches(&self) -> bool {
        self.accepted_count > 0
    }
}

pub fn is_match(candidate: &LabelCandidate) -> bool {
    candidate.label.id > 0 && candidate.confidence > ACCEPT_THRESHOLD
}

fn by_confidence_desc(a: &LabelCandidate, b: &LabelCandidate) -> Ordering {
    b.confidence.total_cmp(&a.confidence)
}

fn by_top_confidence_desc(a: &DetectedFace, b: &DetectedFace) -> Ordering {
    match (a.top_confidence(), b.top_confidence()) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Orders faces by their best candidate and keeps the ones that match a known label.
/// A match whose crop has no area is counted but leaves its display slot to the next one.
pub fn rank(mut faces: Vec<DetectedFace>) -> RankedFaces {
    let total_detected = faces.len();

    for face in &mut faces {
        face.candidates.sort_by(by_confidence_desc);
    }
    faces.sort_by(by_top_confidence_desc);

    let mut accepted = Vec::with_capacity(MAX_DISPLAYED);
    let mut accepted_count = 0;
    for face in faces {
        if !face.top().is_some_and(is_match) {
            continue;
        }
        accepted_count += 1;
        if accepted.len() < MAX_DISPLAYED && !face.crop().is_degenerate() {
            accepted.push(face);
        }
    }

    RankedFaces {
        accepted,
        total_detected,
        accepted_count,
    }
}
