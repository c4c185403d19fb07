use crate::domain::model::Color;
use crate::utils::error::{PlotError, Result};
use serde::{Deserialize, Serialize};

/// One inclusive `[min, max]` range and the color it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthBucket {
    pub min: f64,
    pub max: f64,
    pub color: Color,
}

impl DepthBucket {
    pub const fn new(min: f64, max: f64, color: Color) -> Self {
        Self { min, max, color }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

pub const DEFAULT_BUCKETS: [DepthBucket; 5] = [
    DepthBucket::new(0.007, 0.142, Color::from_rgb(0xB3, 0xB3, 0xFF)),
    DepthBucket::new(0.142, 0.277, Color::from_rgb(0x5D, 0x5D, 0xFF)),
    DepthBucket::new(0.277, 0.411, Color::from_rgb(0x07, 0x07, 0xFF)),
    DepthBucket::new(0.411, 0.546, Color::from_rgb(0x00, 0x00, 0xB4)),
    DepthBucket::new(0.546, 1.0, Color::from_rgb(0x00, 0x00, 0x5B)),
];

pub const DEFAULT_FALLBACK: Color = Color::from_rgb(0xE8, 0xF1, 0xFD);

/// Maps a value onto a fixed color table.
///
/// Buckets are tested in order and the first one containing the value wins,
/// so a value sitting on a shared boundary takes the lower bucket's color.
/// Anything outside every bucket, NaN included, gets the fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthClassifier {
    buckets: Vec<DepthBucket>,
    fallback: Color,
}

impl DepthClassifier {
    pub fn new(buckets: Vec<DepthBucket>, fallback: Color) -> Result<Self> {
        if buckets.is_empty() {
            return Err(PlotError::MissingConfigError {
                field: "render.buckets".to_string(),
            });
        }

        for (index, bucket) in buckets.iter().enumerate() {
            if !(bucket.min.is_finite() && bucket.max.is_finite()) || bucket.min > bucket.max {
                return Err(PlotError::InvalidConfigValueError {
                    field: format!("render.buckets[{}]", index),
                    value: format!("[{}, {}]", bucket.min, bucket.max),
                    reason: "Bucket bounds must be finite with min <= max".to_string(),
                });
            }
        }

        Ok(Self { buckets, fallback })
    }

    pub fn classify(&self, value: f64) -> Color {
        self.bucket_index(value)
            .map(|index| self.buckets[index].color)
            .unwrap_or(self.fallback)
    }

    /// Index of the first bucket containing `value`.
    pub fn bucket_index(&self, value: f64) -> Option<usize> {
        self.buckets.iter().position(|bucket| bucket.contains(value))
    }

    pub fn buckets(&self) -> &[DepthBucket] {
        &self.buckets
    }

    pub fn fallback(&self) -> Color {
        self.fallback
    }
}

impl Default for DepthClassifier {
    fn default() -> Self {
        Self {
            buckets: DEFAULT_BUCKETS.to_vec(),
            fallback: DEFAULT_FALLBACK,
        }
    }
}
