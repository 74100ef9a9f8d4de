//! Recognition results as returned by the face backend, and the policy applied to them
//! before a reply is built.

pub mod geometry;
pub mod ranker;

pub use geometry::{compute_crop, CropParseError, CropSpec, SrtParams};
pub use ranker::{rank, RankedFaces, ACCEPT_THRESHOLD, MAX_DISPLAYED};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Angle {
    #[serde(default)]
    pub roll: f64,
    #[serde(default)]
    pub yaw: f64,
    #[serde(default)]
    pub pitch: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// Zero means the backend could not attach any known identity.
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
}

impl Label {
    /// Display name with the first line of the description appended in parentheses.
    pub fn display_name(&self) -> String {
        match self
            .description
            .as_deref()
            .and_then(|d| d.lines().next())
            .map(str::trim)
            .filter(|line| !line.is_empty())
        {
            Some(line) => format!("{} ({})", self.name, line),
            None => self.name.clone(),
        }
    }

    /// Display name with every description line folded into one, comma separated.
    pub fn display_name_full(&self) -> String {
        let description = self
            .description
            .as_deref()
            .map(|d| {
                d.lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        if description.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, description)
        }
    }

    pub fn profile_handle(&self) -> Option<&str> {
        self.twitter
            .as_deref()
            .map(|h| h.trim_start_matches('@'))
            .filter(|h| !h.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelCandidate {
    #[serde(default)]
    pub label: Label,
    /// Confidence in `[0, 1]`.
    #[serde(default, rename = "value")]
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectedFace {
    #[serde(default)]
    pub bounding: Vec<Point>,
    #[serde(default)]
    pub angle: Angle,
    #[serde(default, rename = "recognize")]
    pub candidates: Vec<LabelCandidate>,
}

impl DetectedFace {
    pub fn top(&self) -> Option<&LabelCandidate> {
        self.candidates.first()
    }

    pub fn top_confidence(&self) -> Option<f64> {
        self.top().map(|c| c.confidence)
    }

    pub fn crop(&self) -> CropSpec {
        compute_crop(&self.bounding, self.angle.roll)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    #[serde(default)]
    pub faces: Vec<DetectedFace>,
}
