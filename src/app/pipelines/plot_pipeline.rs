use crate::core::clustering::{ClusterManager, DistanceClusterAlgorithm};
use crate::core::output;
use crate::core::parser;
use crate::core::render::{render_clusters, DepthCircleRenderer};
use crate::core::{ConfigProvider, CoordinateRecord, ExtractResult, Pipeline, RenderPlan, Storage};
use crate::domain::model::{ColorSource, LoadStatus};
use crate::domain::ports::ClusterRenderer;
use crate::utils::error::Result;
use std::path::Path;
use tokio::sync::Mutex;

/// Loads a coordinate CSV, clusters it and writes the resulting render plan.
///
/// The pipeline owns a single [`ClusterManager`] for its whole life. Every
/// transform replaces the items it holds, so repeated loads never pile up.
pub struct PlotPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    cluster_manager: Mutex<ClusterManager<CoordinateRecord>>,
}

impl<S: Storage, C: ConfigProvider> PlotPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        let algorithm = DistanceClusterAlgorithm::new(config.cluster_settings().max_distance_px);
        Self {
            storage,
            config,
            cluster_manager: Mutex::new(ClusterManager::new(algorithm)),
        }
    }

    /// Drops the loaded items, leaving nothing to cluster until the next load.
    pub async fn pause(&self) {
        self.cluster_manager.lock().await.clear_items();
        tracing::debug!("⏸️ Cluster items cleared");
    }

    /// Number of items the cluster manager currently holds.
    pub async fn loaded_item_count(&self) -> usize {
        self.cluster_manager.lock().await.items().len()
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for PlotPipeline<S, C> {
    async fn extract(&self) -> Result<ExtractResult> {
        let input_path = self.config.input_path();
        tracing::debug!("Reading coordinates from: {}", input_path);

        let bytes = match self.storage.read_file(input_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                // 讀不到檔案時不中斷，回傳空資料並標記狀態
                tracing::warn!("⚠️ Input '{}' unavailable, nothing to plot: {}", input_path, e);
                return Ok(ExtractResult {
                    records: Vec::new(),
                    status: LoadStatus::NoData {
                        reason: e.to_string(),
                    },
                });
            }
        };

        // 無效的位元組換成 U+FFFD，數值欄位裡的會由解析規則處理
        let text = String::from_utf8_lossy(&bytes);

        let batch = parser::parse_records(&text, self.config.malformed_policy())?;
        let status = if batch.skipped > 0 {
            tracing::warn!("⚠️ {} malformed lines were skipped", batch.skipped);
            LoadStatus::Partial {
                skipped: batch.skipped,
            }
        } else {
            LoadStatus::Complete
        };

        Ok(ExtractResult {
            records: batch.records,
            status,
        })
    }

    async fn transform(&self, data: ExtractResult) -> Result<RenderPlan> {
        let camera = self.config.camera();
        let color_source = self.config.color_source();

        if let LoadStatus::NoData { .. } = data.status {
            self.pause().await;
            return Ok(RenderPlan::empty(camera, color_source, data.status));
        }

        if color_source == ColorSource::Latitude {
            tracing::warn!(
                "🎨 Coloring by latitude, not the depth column; use color_source = depth to change"
            );
        }

        let settings = self.config.cluster_settings();
        let record_count = data.records.len();

        let mut renderer = DepthCircleRenderer::new(
            self.config.depth_classifier()?,
            color_source,
            settings.min_cluster_size,
        )
        .with_radius(self.config.circle_radius_m());

        let (cluster_markers, item_markers) = {
            let mut manager = self.cluster_manager.lock().await;
            // 重新載入前先清掉舊的點
            manager.clear_items();
            manager.add_items(data.records);
            let clusters = manager.cluster(camera.zoom);
            render_clusters(clusters, &mut renderer)
        };

        Ok(RenderPlan {
            record_count,
            cluster_markers,
            item_markers,
            circles: renderer.into_circles(),
            camera,
            color_source,
            status: data.status,
        })
    }

    async fn load(&self, plan: RenderPlan) -> Result<String> {
        let files = output::render_outputs(&plan, self.config.output_formats())?;
        let output_root = Path::new(self.config.output_path());

        if let Some(archive) = self.config.archive_name() {
            tracing::debug!("Creating ZIP file with {} files", files.len());
            let zip_data = output::bundle_zip(&files)?;

            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage.write_file(archive, &zip_data).await?;
            return Ok(output_root.join(archive).display().to_string());
        }

        for (name, data) in &files {
            tracing::debug!("Writing {} ({} bytes)", name, data.len());
            self.storage.write_file(name, data).await?;
        }

        Ok(output_root.display().to_string())
    }
}
