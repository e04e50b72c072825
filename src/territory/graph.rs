//! Province adjacency derived from shared boundary edges
//!
//! Every ring edge is keyed by its precision-rounded endpoints. An edge owned
//! by exactly two different provinces makes them neighbors. The graph is
//! built once and never changes.

use std::collections::BTreeSet;

use ahash::AHashMap;
use geo::{Area, Centroid};
use geo_types::{LineString, MultiPolygon, Polygon};

use crate::core::error::GeometryError;
use crate::core::types::{ProvinceId, Vec2};
use crate::territory::dataset::{BoundaryFeature, TerritoryDataset};

/// Rounding step for edge matching (map units)
pub const DEFAULT_PRECISION: f64 = 1e-6;

type PointKey = (i64, i64);
type EdgeKey = (PointKey, PointKey);

/// One province node
#[derive(Debug, Clone, PartialEq)]
pub struct ProvinceNode {
    pub id: ProvinceId,
    pub code: String,
    pub name: String,
    pub centroid: Vec2,
    pub area: f64,
    /// Sorted
    pub neighbors: Vec<ProvinceId>,
}

#[derive(Debug, Clone)]
pub struct TerritoryGraph {
    nodes: Vec<ProvinceNode>,
    codes: AHashMap<String, ProvinceId>,
}

impl TerritoryGraph {
    pub fn build(dataset: &TerritoryDataset) -> Result<Self, GeometryError> {
        Self::build_with_precision(dataset, DEFAULT_PRECISION)
    }

    pub fn build_with_precision(dataset: &TerritoryDataset, precision: f64) -> Result<Self, GeometryError> {
        let mut nodes: Vec<ProvinceNode> = Vec::new();
        let mut codes: AHashMap<String, ProvinceId> = AHashMap::new();
        let mut edge_owners: AHashMap<EdgeKey, Vec<ProvinceId>> = AHashMap::new();

        for feature in &dataset.features {
            let Some(code) = feature.code.as_deref().filter(|c| !c.is_empty()) else {
                continue;
            };
            if codes.contains_key(code) {
                return Err(GeometryError::DuplicateCode(code.to_string()));
            }

            let id = ProvinceId(nodes.len() as u32);
            let rings = clean_rings(code, feature)?;
            let (centroid, area) = measure(code, &rings)?;

            for ring in &rings {
                for (a, b) in ring_edges(ring, precision) {
                    let owners = edge_owners.entry((a.min(b), a.max(b))).or_default();
                    if !owners.contains(&id) {
                        owners.push(id);
                    }
                }
            }

            codes.insert(code.to_string(), id);
            nodes.push(ProvinceNode {
                id,
                code: code.to_string(),
                name: if feature.name.is_empty() { code.to_string() } else { feature.name.clone() },
                centroid,
                area,
                neighbors: Vec::new(),
            });
        }

        if nodes.is_empty() {
            return Err(GeometryError::EmptyDataset);
        }

        let mut adjacency: Vec<BTreeSet<ProvinceId>> = vec![BTreeSet::new(); nodes.len()];
        for owners in edge_owners.values() {
            if let [a, b] = owners.as_slice() {
                adjacency[a.index()].insert(*b);
                adjacency[b.index()].insert(*a);
            }
        }
        for (node, neighbors) in nodes.iter_mut().zip(adjacency) {
            node.neighbors = neighbors.into_iter().collect();
        }

        tracing::debug!(
            "Built territory graph: {} provinces, {} shared edges",
            nodes.len(),
            edge_owners.values().filter(|o| o.len() == 2).count()
        );

        Ok(Self { nodes, codes })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[ProvinceNode] {
        &self.nodes
    }

    pub fn node(&self, id: ProvinceId) -> Option<&ProvinceNode> {
        self.nodes.get(id.index())
    }

    pub fn by_code(&self, code: &str) -> Option<ProvinceId> {
        self.codes.get(code).copied()
    }

    pub fn neighbors(&self, id: ProvinceId) -> &[ProvinceId] {
        self.node(id).map_or(&[], |n| n.neighbors.as_slice())
    }

    pub fn are_adjacent(&self, a: ProvinceId, b: ProvinceId) -> bool {
        self.node(a)
            .is_some_and(|n| n.neighbors.binary_search(&b).is_ok())
    }
}

/// Drop closing duplicates and reject rings that cannot bound an area
fn clean_rings(code: &str, feature: &BoundaryFeature) -> Result<Vec<Vec<Vec2>>, GeometryError> {
    if feature.polygons.is_empty() {
        return Err(GeometryError::MissingRing { code: code.to_string() });
    }

    let mut rings = Vec::with_capacity(feature.polygons.len());
    for raw in &feature.polygons {
        let mut ring: Vec<Vec2> = Vec::with_capacity(raw.len());
        for &[x, y] in raw {
            if !x.is_finite() || !y.is_finite() {
                return Err(GeometryError::NonFiniteCoordinate { code: code.to_string() });
            }
            let point = Vec2::new(x, y);
            if ring.last() != Some(&point) {
                ring.push(point);
            }
        }
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        if ring.len() < 3 {
            return Err(GeometryError::DegenerateRing { code: code.to_string(), points: ring.len() });
        }
        rings.push(ring);
    }
    Ok(rings)
}

/// Centroid and unsigned area over all rings of a region
fn measure(code: &str, rings: &[Vec<Vec2>]) -> Result<(Vec2, f64), GeometryError> {
    let polygons: Vec<Polygon<f64>> = rings
        .iter()
        .map(|ring| {
            let coords: Vec<(f64, f64)> = ring.iter().map(|p| (p.x, p.y)).collect();
            Polygon::new(LineString::from(coords), vec![])
        })
        .collect();
    let shape = MultiPolygon::new(polygons);

    let area = shape.unsigned_area();
    let degenerate = || GeometryError::DegenerateRing {
        code: code.to_string(),
        points: rings.iter().map(Vec::len).min().unwrap_or(0),
    };
    if area <= 0.0 || !area.is_finite() {
        return Err(degenerate());
    }
    let centroid = shape.centroid().ok_or_else(degenerate)?;
    Ok((Vec2::new(centroid.x(), centroid.y()), area))
}

fn round_point(p: &Vec2, precision: f64) -> PointKey {
    ((p.x / precision).round() as i64, (p.y / precision).round() as i64)
}

/// Consecutive point pairs of a ring, wrapping around, skipping zero-length edges
fn ring_edges(ring: &[Vec2], precision: f64) -> Vec<(PointKey, PointKey)> {
    let keys: Vec<PointKey> = ring.iter().map(|p| round_point(p, precision)).collect();
    (0..keys.len())
        .map(|i| (keys[i], keys[(i + 1) % keys.len()]))
        .filter(|(a, b)| a != b)
        .collect()
}
