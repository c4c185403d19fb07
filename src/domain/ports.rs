use crate::core::classifier::DepthClassifier;
use crate::domain::model::{
    CameraPosition, CircleOverlay, Cluster, ClusterSettings, ColorSource, ExtractResult, LatLng,
    MalformedRecordPolicy, RenderPlan,
};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn camera(&self) -> CameraPosition;
    fn color_source(&self) -> ColorSource;
    fn malformed_policy(&self) -> MalformedRecordPolicy;
    fn cluster_settings(&self) -> ClusterSettings;
    fn depth_classifier(&self) -> Result<DepthClassifier>;
    fn circle_radius_m(&self) -> f64;
    fn output_formats(&self) -> &[String];
    /// ZIP archive name when outputs should be bundled.
    fn archive_name(&self) -> Option<&str>;
}

/// Anything the clustering layer can place on a map.
pub trait ClusterItem: Clone + Send + Sync {
    fn position(&self) -> LatLng;

    fn title(&self) -> Option<&str> {
        None
    }

    fn snippet(&self) -> Option<&str> {
        None
    }
}

pub trait ClusterAlgorithm<T: ClusterItem>: Send + Sync {
    fn cluster(&self, items: &[T], zoom: f32) -> Vec<Cluster<T>>;
}

pub trait ClusterRenderer<T: ClusterItem> {
    fn should_render_as_cluster(&self, cluster: &Cluster<T>) -> bool;

    /// Called once per item drawn on its own, before its marker is placed.
    fn on_before_cluster_item_rendered(&mut self, item: &T);

    fn into_circles(self) -> Vec<CircleOverlay>
    where
        Self: Sized;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ExtractResult>;
    async fn transform(&self, data: ExtractResult) -> Result<RenderPlan>;
    async fn load(&self, plan: RenderPlan) -> Result<String>;
}
