use crate::utils::error::{PlotError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// One parsed input line. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateRecord {
    latitude: f64,
    longitude: f64,
    depth: f64,
}

impl CoordinateRecord {
    pub fn new(latitude: f64, longitude: f64, depth: f64) -> Self {
        Self {
            latitude,
            longitude,
            depth,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }
}

/// 32-bit ARGB color, the same packing Android's `Color` uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(u32);

impl Color {
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(0xFF00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    pub fn argb(&self) -> u32 {
        self.0
    }

    pub fn alpha(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// `#RRGGBB` when opaque, `#AARRGGBB` otherwise.
    pub fn to_hex(&self) -> String {
        if self.alpha() == 0xFF {
            format!("#{:06X}", self.0 & 0x00FF_FFFF)
        } else {
            format!("#{:08X}", self.0)
        }
    }
}

impl FromStr for Color {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| PlotError::InvalidConfigValueError {
            field: "color".to_string(),
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| invalid("Color must start with '#'"))?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid("Color must be hexadecimal"));
        }
        let value =
            u32::from_str_radix(hex, 16).map_err(|_| invalid("Color must be hexadecimal"))?;

        match hex.len() {
            6 => Ok(Color(0xFF00_0000 | value)),
            8 => Ok(Color(value)),
            _ => Err(invalid("Color must be #RRGGBB or #AARRGGBB")),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Which record field feeds the depth classifier.
///
/// Existing plots color points by latitude even though the third column is
/// called depth. Both stay selectable until the data owner settles which one
/// is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ColorSource {
    #[default]
    Latitude,
    Depth,
}

impl ColorSource {
    pub fn value_of(&self, record: &CoordinateRecord) -> f64 {
        match self {
            ColorSource::Latitude => record.latitude(),
            ColorSource::Depth => record.depth(),
        }
    }
}

impl fmt::Display for ColorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorSource::Latitude => f.write_str("latitude"),
            ColorSource::Depth => f.write_str("depth"),
        }
    }
}

/// What to do with a line whose numeric field does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum MalformedRecordPolicy {
    #[default]
    Abort,
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterSettings {
    /// Clustering radius in screen pixels at the current zoom.
    pub max_distance_px: f64,
    /// Clusters smaller than this are drawn item by item.
    pub min_cluster_size: usize,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            max_distance_px: 100.0,
            min_cluster_size: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPosition {
    pub target: LatLng,
    pub zoom: f32,
}

impl Default for CameraPosition {
    fn default() -> Self {
        Self {
            target: LatLng::new(26.0, 151.0),
            zoom: 1.0,
        }
    }
}

/// Library-managed grouping of nearby items.
#[derive(Debug, Clone)]
pub struct Cluster<T> {
    pub position: LatLng,
    pub items: Vec<T>,
}

impl<T> Cluster<T> {
    pub fn size(&self) -> usize {
        self.items.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircleOverlay {
    pub center: LatLng,
    pub depth: f64,
    pub radius_m: f64,
    pub fill_color: Color,
    pub stroke_width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterMarker {
    pub position: LatLng,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemMarker {
    pub position: LatLng,
    pub title: Option<String>,
    pub snippet: Option<String>,
}

/// Whether what was loaded is everything the input held.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoadStatus {
    Complete,
    Partial { skipped: usize },
    NoData { reason: String },
}

#[derive(Debug, Clone)]
pub struct ExtractResult {
    pub records: Vec<CoordinateRecord>,
    pub status: LoadStatus,
}

#[derive(Debug, Clone)]
pub struct RenderPlan {
    pub record_count: usize,
    pub cluster_markers: Vec<ClusterMarker>,
    pub item_markers: Vec<ItemMarker>,
    pub circles: Vec<CircleOverlay>,
    pub camera: CameraPosition,
    pub color_source: ColorSource,
    pub status: LoadStatus,
}

impl RenderPlan {
    pub fn empty(camera: CameraPosition, color_source: ColorSource, status: LoadStatus) -> Self {
        Self {
            record_count: 0,
            cluster_markers: Vec::new(),
            item_markers: Vec::new(),
            circles: Vec::new(),
            camera,
            color_source,
            status,
        }
    }

    /// Items hidden inside cluster markers.
    pub fn clustered_item_count(&self) -> usize {
        self.cluster_markers.iter().map(|m| m.size).sum()
    }
}
