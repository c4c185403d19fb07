pub mod cli;
pub mod toml_config;

use crate::core::classifier::DepthClassifier;
use crate::core::ConfigProvider;
use crate::domain::model::{
    CameraPosition, ClusterSettings, ColorSource, LatLng, MalformedRecordPolicy,
};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};

pub const DEFAULT_INPUT_FILE: &str = "Coordinates with 3 decimal places.csv";

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "dynamic-plot")]
#[command(about = "Cluster coordinates from a CSV file and color them by depth")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_INPUT_FILE)]
    pub input: String,

    #[arg(long, default_value = ".", help = "Directory the input path is resolved against")]
    pub assets_dir: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value_t = 1.0)]
    pub zoom: f32,

    #[arg(long, default_value_t = 26.0, allow_negative_numbers = true)]
    pub camera_lat: f64,

    #[arg(long, default_value_t = 151.0, allow_negative_numbers = true)]
    pub camera_lng: f64,

    #[arg(long, default_value_t = 100.0)]
    pub max_distance_px: f64,

    #[arg(long, default_value_t = 4)]
    pub min_cluster_size: usize,

    #[arg(long, default_value_t = 1000.0)]
    pub circle_radius_m: f64,

    #[arg(long, value_enum, default_value_t = ColorSource::Latitude)]
    pub color_source: ColorSource,

    #[arg(long, value_enum, default_value_t = MalformedRecordPolicy::Abort)]
    pub on_malformed: MalformedRecordPolicy,

    #[arg(long, value_delimiter = ',', default_value = "geojson,csv,json")]
    pub output_formats: Vec<String>,

    #[arg(long, help = "Bundle outputs into this ZIP file")]
    pub archive: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, default_value = "compact", help = "compact or json")]
    pub log_format: String,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn camera(&self) -> CameraPosition {
        CameraPosition {
            target: LatLng::new(self.camera_lat, self.camera_lng),
            zoom: self.zoom,
        }
    }

    fn color_source(&self) -> ColorSource {
        self.color_source
    }

    fn malformed_policy(&self) -> MalformedRecordPolicy {
        self.on_malformed
    }

    fn cluster_settings(&self) -> ClusterSettings {
        ClusterSettings {
            max_distance_px: self.max_distance_px,
            min_cluster_size: self.min_cluster_size,
        }
    }

    fn depth_classifier(&self) -> Result<DepthClassifier> {
        Ok(DepthClassifier::default())
    }

    fn circle_radius_m(&self) -> f64 {
        self.circle_radius_m
    }

    fn output_formats(&self) -> &[String] {
        &self.output_formats
    }

    fn archive_name(&self) -> Option<&str> {
        self.archive.as_deref()
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input)?;
        validation::validate_path("assets_dir", &self.assets_dir)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_camera(self.camera_lat, self.camera_lng, self.zoom)?;
        validation::validate_range("max_distance_px", self.max_distance_px, 1.0, 10_000.0)?;
        validation::validate_positive_number("min_cluster_size", self.min_cluster_size, 1)?;
        validation::validate_range("circle_radius_m", self.circle_radius_m, 0.0, 1_000_000.0)?;
        validation::validate_output_formats("output_formats", &self.output_formats)?;
        if let Some(archive) = &self.archive {
            validation::validate_path("archive", archive)?;
        }
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_initial_view() {
        let config = CliConfig::parse_from(["dynamic-plot"]);

        assert_eq!(config.input, DEFAULT_INPUT_FILE);
        assert_eq!(config.camera(), CameraPosition::default());
        assert_eq!(config.color_source(), ColorSource::Latitude);
        assert_eq!(config.malformed_policy(), MalformedRecordPolicy::Abort);
        assert_eq!(config.cluster_settings(), ClusterSettings::default());
        assert_eq!(config.output_formats, vec!["geojson", "csv", "json"]);
        assert!(config.archive_name().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = CliConfig::parse_from([
            "dynamic-plot",
            "--input",
            "quakes.csv",
            "--color-source",
            "depth",
            "--on-malformed",
            "skip",
            "--camera-lat",
            "-33.5",
            "--output-formats",
            "csv",
            "--archive",
            "plot.zip",
        ]);

        assert_eq!(config.input_path(), "quakes.csv");
        assert_eq!(config.color_source(), ColorSource::Depth);
        assert_eq!(config.malformed_policy(), MalformedRecordPolicy::Skip);
        assert_eq!(config.camera().target.latitude, -33.5);
        assert_eq!(config.output_formats(), ["csv".to_string()]);
        assert_eq!(config.archive_name(), Some("plot.zip"));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = CliConfig::parse_from(["dynamic-plot", "--zoom", "30"]);
        assert!(config.validate().is_err());

        let config = CliConfig::parse_from(["dynamic-plot", "--output-formats", "kml"]);
        assert!(config.validate().is_err());

        let config = CliConfig::parse_from(["dynamic-plot", "--min-cluster-size", "0"]);
        assert!(config.validate().is_err());
    }
}
