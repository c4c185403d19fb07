//! Serialized forms of a [`RenderPlan`].

use crate::domain::model::{CameraPosition, ColorSource, LoadStatus, RenderPlan};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const GEOJSON_FILE: &str = "plot.geojson";
pub const CIRCLES_FILE: &str = "circles.csv";
pub const SUMMARY_FILE: &str = "summary.json";

#[derive(Debug, Clone, Serialize)]
pub struct PlotSummary {
    pub generated_at: DateTime<Utc>,
    pub status: LoadStatus,
    pub record_count: usize,
    pub cluster_marker_count: usize,
    pub clustered_item_count: usize,
    pub item_marker_count: usize,
    pub circle_count: usize,
    pub color_source: ColorSource,
    pub camera: CameraPosition,
}

impl PlotSummary {
    pub fn from_plan(plan: &RenderPlan) -> Self {
        Self {
            generated_at: Utc::now(),
            status: plan.status.clone(),
            record_count: plan.record_count,
            cluster_marker_count: plan.cluster_markers.len(),
            clustered_item_count: plan.clustered_item_count(),
            item_marker_count: plan.item_markers.len(),
            circle_count: plan.circles.len(),
            color_source: plan.color_source,
            camera: plan.camera,
        }
    }
}

/// GeoJSON `FeatureCollection`. Coordinates are `[longitude, latitude]`.
pub fn to_geojson(plan: &RenderPlan) -> Value {
    let clusters = plan.cluster_markers.iter().map(|marker| {
        json!({
            "type": "Feature",
            "geometry": {
                "type": "Point",
                "coordinates": [marker.position.longitude, marker.position.latitude],
            },
            "properties": {
                "kind": "cluster",
                "size": marker.size,
            },
        })
    });

    // 圓圈與單點標記同序產生；沒畫圓的標記就不帶圓圈欄位
    let mut circles = plan.circles.iter().peekable();
    let items = plan.item_markers.iter().map(move |marker| {
        let mut properties = json!({
            "kind": "item",
            "title": marker.title,
            "snippet": marker.snippet,
        });
        if let Some(circle) = circles.next_if(|c| c.center == marker.position) {
            properties["depth"] = json!(circle.depth);
            properties["fill_color"] = json!(circle.fill_color);
            properties["radius_m"] = json!(circle.radius_m);
            properties["stroke_width"] = json!(circle.stroke_width);
        }

        json!({
            "type": "Feature",
            "geometry": {
                "type": "Point",
                "coordinates": [marker.position.longitude, marker.position.latitude],
            },
            "properties": properties,
        })
    });

    json!({
        "type": "FeatureCollection",
        "features": clusters.chain(items).collect::<Vec<_>>(),
        "camera": plan.camera,
    })
}

pub fn circles_csv(plan: &RenderPlan) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "latitude",
        "longitude",
        "depth",
        "radius_m",
        "fill_color",
        "stroke_width",
    ])?;

    for circle in &plan.circles {
        writer.write_record([
            circle.center.latitude.to_string(),
            circle.center.longitude.to_string(),
            circle.depth.to_string(),
            circle.radius_m.to_string(),
            circle.fill_color.to_hex(),
            circle.stroke_width.to_string(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| crate::utils::error::PlotError::IoError(e.into_error()))
}

/// Renders every requested format, in request order, as `(file name, bytes)`.
pub fn render_outputs(plan: &RenderPlan, formats: &[String]) -> Result<Vec<(&'static str, Vec<u8>)>> {
    let mut files = Vec::new();
    for format in formats {
        match format.as_str() {
            "geojson" => files.push((GEOJSON_FILE, serde_json::to_vec_pretty(&to_geojson(plan))?)),
            "csv" => files.push((CIRCLES_FILE, circles_csv(plan)?)),
            "json" => files.push((
                SUMMARY_FILE,
                serde_json::to_vec_pretty(&PlotSummary::from_plan(plan))?,
            )),
            other => tracing::warn!("⚠️ Ignoring unsupported output format: {}", other),
        }
    }
    Ok(files)
}

pub fn bundle_zip(files: &[(&str, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for (name, data) in files {
        zip.start_file(*name, SimpleFileOptions::default())?;
        zip.write_all(data)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CircleOverlay, ClusterMarker, Color, ItemMarker, LatLng};

    fn sample_plan() -> RenderPlan {
        let mut plan = RenderPlan::empty(
            CameraPosition::default(),
            ColorSource::Latitude,
            LoadStatus::Complete,
        );
        plan.record_count = 6;
        plan.cluster_markers.push(ClusterMarker {
            position: LatLng::new(1.0, 2.0),
            size: 5,
        });
        plan.item_markers.push(ItemMarker {
            position: LatLng::new(0.1, 3.0),
            title: None,
            snippet: None,
        });
        plan.circles.push(CircleOverlay {
            center: LatLng::new(0.1, 3.0),
            depth: 0.3,
            radius_m: 1000.0,
            fill_color: Color::from_rgb(0xB3, 0xB3, 0xFF),
            stroke_width: 0.0,
        });
        plan
    }

    #[test]
    fn test_geojson_lists_clusters_then_items() {
        let geojson = to_geojson(&sample_plan());
        let features = geojson["features"].as_array().unwrap();

        assert_eq!(geojson["type"], "FeatureCollection");
        assert_eq!(features.len(), 2);
        assert_eq!(features[0]["properties"]["kind"], "cluster");
        assert_eq!(features[0]["properties"]["size"], 5);
        assert_eq!(features[0]["geometry"]["coordinates"], json!([2.0, 1.0]));
        assert_eq!(features[1]["properties"]["fill_color"], "#B3B3FF");
        assert_eq!(geojson["camera"]["zoom"], 1.0);
    }

    #[test]
    fn test_geojson_items_come_from_markers() {
        let mut plan = sample_plan();
        plan.item_markers[0].title = Some("Station 7".to_string());
        plan.item_markers.push(ItemMarker {
            position: LatLng::new(-5.0, 40.0),
            title: None,
            snippet: Some("no circle drawn".to_string()),
        });

        let geojson = to_geojson(&plan);
        let items: Vec<&Value> = geojson["features"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|f| f["properties"]["kind"] == "item")
            .collect();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["properties"]["title"], "Station 7");
        assert_eq!(items[0]["properties"]["depth"], 0.3);
        assert_eq!(items[1]["geometry"]["coordinates"], json!([40.0, -5.0]));
        assert_eq!(items[1]["properties"]["snippet"], "no circle drawn");
        assert!(items[1]["properties"].get("fill_color").is_none());
    }

    #[test]
    fn test_circles_csv_has_header_and_rows() {
        let csv = String::from_utf8(circles_csv(&sample_plan()).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "latitude,longitude,depth,radius_m,fill_color,stroke_width");
        assert_eq!(lines[1], "0.1,3,0.3,1000,#B3B3FF,0");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_summary_counts() {
        let summary = PlotSummary::from_plan(&sample_plan());
        assert_eq!(summary.record_count, 6);
        assert_eq!(summary.clustered_item_count, 5);
        assert_eq!(summary.circle_count, 1);

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["status"]["state"], "complete");
        assert_eq!(value["color_source"], "latitude");
    }

    #[test]
    fn test_render_outputs_follows_requested_formats() {
        let formats = vec!["json".to_string(), "geojson".to_string()];
        let files = render_outputs(&sample_plan(), &formats).unwrap();
        let names: Vec<&str> = files.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec![SUMMARY_FILE, GEOJSON_FILE]);
    }

    #[test]
    fn test_bundle_zip_contains_every_file() {
        let files = render_outputs(
            &sample_plan(),
            &["geojson".to_string(), "csv".to_string(), "json".to_string()],
        )
        .unwrap();
        let archive = bundle_zip(&files).unwrap();

        let mut zip = zip::ZipArchive::new(std::io::Cursor::new(archive)).unwrap();
        assert_eq!(zip.len(), 3);
        assert!(zip.by_name(CIRCLES_FILE).is_ok());
    }
}
