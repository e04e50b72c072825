//! Territory graph builder
//!
//! Turns code-tagged boundary polygons into province nodes with a
//! symmetric, fixed adjacency.

pub mod dataset;
pub mod graph;

pub use dataset::{BoundaryFeature, TerritoryDataset};
pub use graph::{ProvinceNode, TerritoryGraph, DEFAULT_PRECISION};
