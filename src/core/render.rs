use crate::core::classifier::DepthClassifier;
use crate::domain::model::{
    CircleOverlay, Cluster, ClusterMarker, ColorSource, CoordinateRecord, ItemMarker,
};
use crate::domain::ports::{ClusterItem, ClusterRenderer};

pub const DEFAULT_CIRCLE_RADIUS_M: f64 = 1000.0;

/// Draws a depth-colored circle under every individually rendered record.
pub struct DepthCircleRenderer {
    classifier: DepthClassifier,
    color_source: ColorSource,
    min_cluster_size: usize,
    radius_m: f64,
    circles: Vec<CircleOverlay>,
}

impl DepthCircleRenderer {
    pub fn new(classifier: DepthClassifier, color_source: ColorSource, min_cluster_size: usize) -> Self {
        Self {
            classifier,
            color_source,
            min_cluster_size,
            radius_m: DEFAULT_CIRCLE_RADIUS_M,
            circles: Vec::new(),
        }
    }

    pub fn with_radius(mut self, radius_m: f64) -> Self {
        self.radius_m = radius_m;
        self
    }
}

impl ClusterRenderer<CoordinateRecord> for DepthCircleRenderer {
    fn should_render_as_cluster(&self, cluster: &Cluster<CoordinateRecord>) -> bool {
        cluster.size() >= self.min_cluster_size
    }

    fn on_before_cluster_item_rendered(&mut self, item: &CoordinateRecord) {
        let value = self.color_source.value_of(item);
        self.circles.push(CircleOverlay {
            center: item.position(),
            depth: item.depth(),
            radius_m: self.radius_m,
            fill_color: self.classifier.classify(value),
            stroke_width: 0.0,
        });
    }

    fn into_circles(self) -> Vec<CircleOverlay> {
        self.circles
    }
}

/// Walks the clusters the way a map would draw them.
///
/// Large clusters become a single marker; members of small ones are drawn
/// one by one, each passing through the renderer's item hook first.
pub fn render_clusters<T, R>(
    clusters: &[Cluster<T>],
    renderer: &mut R,
) -> (Vec<ClusterMarker>, Vec<ItemMarker>)
where
    T: ClusterItem,
    R: ClusterRenderer<T>,
{
    let mut cluster_markers = Vec::new();
    let mut item_markers = Vec::new();

    for cluster in clusters {
        if renderer.should_render_as_cluster(cluster) {
            cluster_markers.push(ClusterMarker {
                position: cluster.position,
                size: cluster.size(),
            });
            continue;
        }

        for item in &cluster.items {
            renderer.on_before_cluster_item_rendered(item);
            item_markers.push(ItemMarker {
                position: item.position(),
                title: item.title().map(str::to_string),
                snippet: item.snippet().map(str::to_string),
            });
        }
    }

    (cluster_markers, item_markers)
}
