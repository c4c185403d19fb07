//! Distance-based marker clustering.
//!
//! Items are projected onto a unit Web Mercator square. Walking the items in
//! insertion order, every item not yet claimed becomes a cluster center and
//! pulls in all items inside a square whose side is the clustering radius at
//! the current zoom. An item already claimed moves only if the new center is
//! strictly closer.

use std::collections::HashMap;
use std::f64::consts::PI;

use crate::domain::model::{Cluster, CoordinateRecord, LatLng};
use crate::domain::ports::{ClusterAlgorithm, ClusterItem};

/// Tile size the pixel radius is expressed against.
const TILE_SIZE_PX: f64 = 256.0;
const MAX_SIN_LATITUDE: f64 = 0.9999;
const MAX_ZOOM: f32 = 21.0;

impl ClusterItem for CoordinateRecord {
    fn position(&self) -> LatLng {
        LatLng::new(self.latitude(), self.longitude())
    }
}

/// Projects onto `[0, 1] x [0, 1]`, y growing southwards.
pub fn project(position: LatLng) -> (f64, f64) {
    let x = position.longitude / 360.0 + 0.5;
    let sin_y = position
        .latitude
        .to_radians()
        .sin()
        .clamp(-MAX_SIN_LATITUDE, MAX_SIN_LATITUDE);
    let y = 0.5 * ((1.0 + sin_y) / (1.0 - sin_y)).ln() / -(2.0 * PI) + 0.5;
    (x, y)
}

#[derive(Debug, Clone, Copy)]
pub struct DistanceClusterAlgorithm {
    max_distance_px: f64,
}

impl DistanceClusterAlgorithm {
    pub fn new(max_distance_px: f64) -> Self {
        Self { max_distance_px }
    }

    /// Side of the search square in projected units.
    pub fn span_at(&self, zoom: f32) -> f64 {
        let discrete_zoom = zoom.clamp(0.0, MAX_ZOOM).floor() as i32;
        self.max_distance_px / 2f64.powi(discrete_zoom) / TILE_SIZE_PX
    }
}

impl Default for DistanceClusterAlgorithm {
    fn default() -> Self {
        Self::new(100.0)
    }
}

/// Uniform grid over projected points, cell side equal to the search span.
struct GridIndex {
    cell: f64,
    cells: HashMap<(i64, i64), Vec<usize>>,
}

impl GridIndex {
    fn build(points: &[(f64, f64)], cell: f64) -> Self {
        let mut cells: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
        for (index, &(x, y)) in points.iter().enumerate() {
            let key = ((x / cell).floor() as i64, (y / cell).floor() as i64);
            cells.entry(key).or_default().push(index);
        }
        Self { cell, cells }
    }

    /// Indices inside the closed square centered on `center`, ascending.
    fn search(&self, points: &[(f64, f64)], center: (f64, f64), side: f64) -> Vec<usize> {
        let half = side / 2.0;
        let (min_x, max_x) = (center.0 - half, center.0 + half);
        let (min_y, max_y) = (center.1 - half, center.1 + half);

        let mut found = Vec::new();
        for cx in (min_x / self.cell).floor() as i64..=(max_x / self.cell).floor() as i64 {
            for cy in (min_y / self.cell).floor() as i64..=(max_y / self.cell).floor() as i64 {
                if let Some(bucket) = self.cells.get(&(cx, cy)) {
                    found.extend(bucket.iter().copied().filter(|&i| {
                        let (x, y) = points[i];
                        x >= min_x && x <= max_x && y >= min_y && y <= max_y
                    }));
                }
            }
        }
        found.sort_unstable();
        found
    }
}

fn distance_squared(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)
}

impl<T: ClusterItem> ClusterAlgorithm<T> for DistanceClusterAlgorithm {
    fn cluster(&self, items: &[T], zoom: f32) -> Vec<Cluster<T>> {
        if items.is_empty() {
            return Vec::new();
        }

        let span = self.span_at(zoom);
        let points: Vec<(f64, f64)> = items.iter().map(|item| project(item.position())).collect();
        let index = GridIndex::build(&points, span);

        let mut visited = vec![false; items.len()];
        let mut distance_to_cluster: Vec<Option<f64>> = vec![None; items.len()];
        let mut item_to_cluster: Vec<Option<usize>> = vec![None; items.len()];
        let mut members: Vec<(LatLng, Vec<usize>)> = Vec::new();

        for candidate in 0..items.len() {
            if visited[candidate] {
                continue;
            }

            let nearby = index.search(&points, points[candidate], span);
            let cluster_id = members.len();
            members.push((items[candidate].position(), Vec::with_capacity(nearby.len())));

            for &item in &nearby {
                let distance = distance_squared(points[item], points[candidate]);
                if let Some(existing) = distance_to_cluster[item] {
                    // 已被較近的中心收走
                    if existing < distance {
                        continue;
                    }
                    if let Some(previous) = item_to_cluster[item] {
                        members[previous].1.retain(|&i| i != item);
                    }
                }
                distance_to_cluster[item] = Some(distance);
                item_to_cluster[item] = Some(cluster_id);
                members[cluster_id].1.push(item);
                visited[item] = true;
            }
            visited[candidate] = true;
        }

        members
            .into_iter()
            .filter(|(_, indices)| !indices.is_empty())
            .map(|(position, indices)| Cluster {
                position,
                items: indices.into_iter().map(|i| items[i].clone()).collect(),
            })
            .collect()
    }
}

/// Owns the items currently on the map and the algorithm that groups them.
pub struct ClusterManager<T: ClusterItem, A: ClusterAlgorithm<T> = DistanceClusterAlgorithm> {
    algorithm: A,
    items: Vec<T>,
    clusters: Vec<Cluster<T>>,
}

impl<T: ClusterItem, A: ClusterAlgorithm<T>> ClusterManager<T, A> {
    pub fn new(algorithm: A) -> Self {
        Self {
            algorithm,
            items: Vec::new(),
            clusters: Vec::new(),
        }
    }

    pub fn add_item(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn add_items<I: IntoIterator<Item = T>>(&mut self, items: I) {
        self.items.extend(items);
    }

    /// Drops every item and the last clustering result.
    pub fn clear_items(&mut self) {
        self.items.clear();
        self.clusters.clear();
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Re-runs the algorithm over the current items.
    pub fn cluster(&mut self, zoom: f32) -> &[Cluster<T>] {
        self.clusters = self.algorithm.cluster(&self.items, zoom);
        tracing::debug!(
            "Clustered {} items into {} clusters at zoom {}",
            self.items.len(),
            self.clusters.len(),
            zoom
        );
        &self.clusters
    }

    pub fn clusters(&self) -> &[Cluster<T>] {
        &self.clusters
    }
}
