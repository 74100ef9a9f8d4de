use std::str::FromStr;

use super::Point;

/// Padding applied around the tight bounding box of a face.
pub const MARGIN: f64 = 1.2;

/// Crop and rotation parameters for one face thumbnail, in source-image pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropSpec {
    pub center_x: f64,
    pub center_y: f64,
    pub half_width: f64,
    pub half_height: f64,
    /// Degrees; the negated roll so the rendered face comes out upright.
    pub rotation: f64,
    pub width: u32,
    pub height: u32,
}

impl CropSpec {
    /// A crop with no area cannot be rendered and its face should be skipped.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Scale-rotate-translate argument: `"cx,cy 1.0 angle hw,hh"`.
    pub fn srt(&self) -> String {
        format!(
            "{:.2},{:.2} 1.0 {:.2} {:.2},{:.2}",
            self.center_x, self.center_y, self.rotation, self.half_width, self.half_height
        )
    }
}

/// Resolves the thumbnail crop for a face from its boundary points and roll angle.
pub fn compute_crop(points: &[Point], roll: f64) -> CropSpec {
    let mut iter = points.iter();
    let Some(first) = iter.next() else {
        return CropSpec {
            center_x: 0.0,
            center_y: 0.0,
            half_width: 0.0,
            half_height: 0.0,
            rotation: -roll,
            width: 0,
            height: 0,
        };
    };

    let (mut x_min, mut x_max, mut y_min, mut y_max) = (first.x, first.x, first.y, first.y);
    for p in iter {
        x_min = x_min.min(p.x);
        x_max = x_max.max(p.x);
        y_min = y_min.min(p.y);
        y_max = y_max.max(p.y);
    }

    let width = (f64::from(x_max) - f64::from(x_min)) * MARGIN;
    let height = (f64::from(y_max) - f64::from(y_min)) * MARGIN;

    CropSpec {
        center_x: (f64::from(x_min) + f64::from(x_max)) * 0.5,
        center_y: (f64::from(y_min) + f64::from(y_max)) * 0.5,
        half_width: width * 0.5,
        half_height: height * 0.5,
        rotation: -roll,
        width: round_half_up(width),
        height: round_half_up(height),
    }
}

fn round_half_up(value: f64) -> u32 {
    (value + 0.5) as u32
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid crop parameters: {0}")]
pub struct CropParseError(pub String);

/// The `srt` parameter as it appears in a thumbnail URL, parsed back for validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SrtParams {
    pub center_x: f64,
    pub center_y: f64,
    pub scale: f64,
    pub rotation: f64,
    pub half_width: f64,
    pub half_height: f64,
}

impl FromStr for SrtParams {
    type Err = CropParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        let [center, scale, rotation, half] = fields.as_slice() else {
            return Err(CropParseError(format!("expected 4 fields, got {}", fields.len())));
        };

        let pair = |field: &str| -> Result<(f64, f64), CropParseError> {
            let (a, b) = field
                .split_once(',')
                .ok_or_else(|| CropParseError(format!("expected x,y pair in {field:?}")))?;
            Ok((number(a)?, number(b)?))
        };

        let (center_x, center_y) = pair(*center)?;
        let (half_width, half_height) = pair(*half)?;
        if half_width < 0.0 || half_height < 0.0 {
            return Err(CropParseError("negative extent".into()));
        }

        Ok(Self {
            center_x,
            center_y,
            scale: number(scale)?,
            rotation: number(rotation)?,
            half_width,
            half_height,
        })
    }
}

fn number(s: &str) -> Result<f64, CropParseError> {
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CropParseError(format!("{s:?} is not a number")))
}
