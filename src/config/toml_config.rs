use crate::core::classifier::{DepthBucket, DepthClassifier, DEFAULT_BUCKETS, DEFAULT_FALLBACK};
use crate::core::render::DEFAULT_CIRCLE_RADIUS_M;
use crate::core::ConfigProvider;
use crate::domain::model::{
    CameraPosition, ClusterSettings, Color, ColorSource, LatLng, MalformedRecordPolicy,
};
use crate::utils::error::{PlotError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub plot: PlotInfo,
    pub source: SourceConfig,
    #[serde(default)]
    pub parse: ParseConfig,
    #[serde(default)]
    pub cluster: ClusterConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotInfo {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub input_path: String,
    pub assets_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseConfig {
    pub on_malformed: Option<MalformedRecordPolicy>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub max_distance_px: Option<f64>,
    pub min_cluster_size: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderConfig {
    pub color_source: Option<ColorSource>,
    pub circle_radius_m: Option<f64>,
    pub fallback_color: Option<Color>,
    pub buckets: Option<Vec<DepthBucket>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CameraConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub zoom: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PlotError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PlotError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PlotError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("plot.name", &self.plot.name)?;
        validation::validate_path("source.input_path", &self.source.input_path)?;
        if let Some(dir) = &self.source.assets_dir {
            validation::validate_path("source.assets_dir", dir)?;
        }
        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_output_formats("load.output_formats", &self.load.output_formats)?;

        let camera = self.camera();
        validation::validate_camera(camera.target.latitude, camera.target.longitude, camera.zoom)?;

        let settings = self.cluster_settings();
        validation::validate_range("cluster.max_distance_px", settings.max_distance_px, 1.0, 10_000.0)?;
        validation::validate_positive_number("cluster.min_cluster_size", settings.min_cluster_size, 1)?;
        validation::validate_range("render.circle_radius_m", self.circle_radius_m(), 0.0, 1_000_000.0)?;

        if let Some(compression) = &self.load.compression {
            if compression.enabled {
                validation::validate_path("load.compression.filename", &compression.filename)?;
            }
        }

        // 顏色表也在這裡先驗證一次
        self.depth_classifier()?;
        Ok(())
    }

    pub fn assets_dir(&self) -> &str {
        self.source.assets_dir.as_deref().unwrap_or(".")
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        &self.source.input_path
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn camera(&self) -> CameraPosition {
        let default = CameraPosition::default();
        CameraPosition {
            target: LatLng::new(
                self.camera.latitude.unwrap_or(default.target.latitude),
                self.camera.longitude.unwrap_or(default.target.longitude),
            ),
            zoom: self.camera.zoom.unwrap_or(default.zoom),
        }
    }

    fn color_source(&self) -> ColorSource {
        self.render.color_source.unwrap_or_default()
    }

    fn malformed_policy(&self) -> MalformedRecordPolicy {
        self.parse.on_malformed.unwrap_or_default()
    }

    fn cluster_settings(&self) -> ClusterSettings {
        let default = ClusterSettings::default();
        ClusterSettings {
            max_distance_px: self.cluster.max_distance_px.unwrap_or(default.max_distance_px),
            min_cluster_size: self.cluster.min_cluster_size.unwrap_or(default.min_cluster_size),
        }
    }

    fn depth_classifier(&self) -> Result<DepthClassifier> {
        let buckets = self
            .render
            .buckets
            .clone()
            .unwrap_or_else(|| DEFAULT_BUCKETS.to_vec());
        let fallback = self.render.fallback_color.unwrap_or(DEFAULT_FALLBACK);
        DepthClassifier::new(buckets, fallback)
    }

    fn circle_radius_m(&self) -> f64 {
        self.render.circle_radius_m.unwrap_or(DEFAULT_CIRCLE_RADIUS_M)
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn archive_name(&self) -> Option<&str> {
        self.load
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| c.filename.as_str())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[plot]
name = "seafloor"

[source]
input_path = "Coordinates with 3 decimal places.csv"

[load]
output_path = "./output"
output_formats = ["geojson"]
"#;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let config = TomlConfig::from_toml_str(MINIMAL).unwrap();

        assert_eq!(config.plot.name, "seafloor");
        assert_eq!(config.assets_dir(), ".");
        assert_eq!(config.camera(), CameraPosition::default());
        assert_eq!(config.color_source(), ColorSource::Latitude);
        assert_eq!(config.malformed_policy(), MalformedRecordPolicy::Abort);
        assert_eq!(config.cluster_settings(), ClusterSettings::default());
        assert_eq!(config.circle_radius_m(), 1000.0);
        assert_eq!(config.depth_classifier().unwrap(), DepthClassifier::default());
        assert!(config.archive_name().is_none());
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r##"
[plot]
name = "quakes"
description = "Depth colored epicentres"
version = "1.0.0"

[source]
input_path = "quakes.csv"
assets_dir = "./assets"

[parse]
on_malformed = "skip"

[cluster]
max_distance_px = 60.0
min_cluster_size = 2

[render]
color_source = "depth"
circle_radius_m = 500.0
fallback_color = "#FFFFFF"

[[render.buckets]]
min = 0.0
max = 10.0
color = "#FF0000"

[[render.buckets]]
min = 10.0
max = 100.0
color = "#00FF00"

[camera]
latitude = -20.0
longitude = 170.0
zoom = 4.0

[load]
output_path = "./out"
output_formats = ["geojson", "csv", "json"]

[load.compression]
enabled = true
filename = "plot.zip"

[monitoring]
enabled = true
"##;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());

        assert_eq!(config.assets_dir(), "./assets");
        assert_eq!(config.malformed_policy(), MalformedRecordPolicy::Skip);
        assert_eq!(config.color_source(), ColorSource::Depth);
        assert_eq!(config.cluster_settings().min_cluster_size, 2);
        assert_eq!(config.camera().target, LatLng::new(-20.0, 170.0));
        assert_eq!(config.archive_name(), Some("plot.zip"));
        assert!(config.monitoring_enabled());

        let classifier = config.depth_classifier().unwrap();
        assert_eq!(classifier.buckets().len(), 2);
        assert_eq!(classifier.classify(10.0).to_hex(), "#FF0000");
        assert_eq!(classifier.classify(500.0).to_hex(), "#FFFFFF");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("DYNAMIC_PLOT_TEST_INPUT", "from-env.csv");

        let toml_content = MINIMAL.replace(
            "Coordinates with 3 decimal places.csv",
            "${DYNAMIC_PLOT_TEST_INPUT}",
        );
        let config = TomlConfig::from_toml_str(&toml_content).unwrap();
        assert_eq!(config.input_path(), "from-env.csv");

        std::env::remove_var("DYNAMIC_PLOT_TEST_INPUT");
    }

    #[test]
    fn test_config_validation() {
        let bad_format = MINIMAL.replace("[\"geojson\"]", "[\"kml\"]");
        let config = TomlConfig::from_toml_str(&bad_format).unwrap();
        assert!(config.validate().is_err());

        let bad_bucket = format!(
            "{}\n[render]\n[[render.buckets]]\nmin = 1.0\nmax = 0.0\ncolor = \"#000000\"\n",
            MINIMAL
        );
        let config = TomlConfig::from_toml_str(&bad_bucket).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_color_fails_parsing() {
        let toml_content = format!("{}\n[render]\nfallback_color = \"blue\"\n", MINIMAL);
        assert!(TomlConfig::from_toml_str(&toml_content).is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.plot.name, "seafloor");
    }
}
