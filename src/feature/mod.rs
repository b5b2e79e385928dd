//! Feature model and the geometry collaborator surface.
//!
//! The clustering core treats geometries as opaque: everything it needs from
//! them (centroids, bounding boxes, simplification, cell intersection) goes
//! through the operations in [`ops`].

mod collection;
pub mod ops;

pub use collection::{Epsg, Feature, FeatureCollection};
