//! Geometry operations the clustering core delegates.
//!
//! Thin wrappers over the `geo` algorithms, returning crate errors instead of
//! bare `Option`s so callers can propagate with `?`.

use crate::error::{Result, TerrasomError};
use crate::feature::{Epsg, FeatureCollection};
use geo::{BoundingRect, Centroid, Simplify};
use geo_types::Geometry;
use log::info;

/// Computes the centroid of a geometry as `(x, y)` map coordinates.
pub fn centroid(geometry: &Geometry<f64>) -> Result<(f64, f64)> {
    let point = geometry
        .centroid()
        .ok_or_else(|| TerrasomError::Geometry("geometry has no centroid".to_string()))?;
    Ok((point.x(), point.y()))
}

/// Computes the axis-aligned bounding box over all geometries as
/// `(x_min, y_min, x_max, y_max)`.
pub fn bounding_box<'a, I>(geometries: I) -> Result<(f64, f64, f64, f64)>
where
    I: IntoIterator<Item = &'a Geometry<f64>>,
{
    let mut bounds: Option<(f64, f64, f64, f64)> = None;

    for geometry in geometries {
        if let Some(rect) = geometry.bounding_rect() {
            let (min, max) = (rect.min(), rect.max());
            bounds = Some(match bounds {
                None => (min.x, min.y, max.x, max.y),
                Some((x0, y0, x1, y1)) => {
                    (x0.min(min.x), y0.min(min.y), x1.max(max.x), y1.max(max.y))
                }
            });
        }
    }

    bounds.ok_or_else(|| TerrasomError::Geometry("no geometries with an extent".to_string()))
}

/// Simplifies a geometry with Douglas-Peucker at the given tolerance.
///
/// Points and other zero-extent geometries pass through unchanged.
pub fn simplify(geometry: &Geometry<f64>, tolerance: f64) -> Geometry<f64> {
    match geometry {
        Geometry::LineString(g) => Geometry::LineString(g.simplify(&tolerance)),
        Geometry::MultiLineString(g) => Geometry::MultiLineString(g.simplify(&tolerance)),
        Geometry::Polygon(g) => Geometry::Polygon(g.simplify(&tolerance)),
        Geometry::MultiPolygon(g) => Geometry::MultiPolygon(g.simplify(&tolerance)),
        other => other.clone(),
    }
}

/// Ensures a collection is in the target CRS.
///
/// Coordinate transforms are a collaborator capability this crate does not
/// provide: a collection already tagged with the target CRS passes through,
/// an untagged collection is tagged (the caller asserts its CRS), and any
/// other combination is a configuration error.
pub fn reproject(collection: &mut FeatureCollection, target: Epsg) -> Result<()> {
    match collection.crs {
        Some(crs) if crs == target => Ok(()),
        None => {
            info!("tagging untagged collection as {}", target);
            collection.crs = Some(target);
            Ok(())
        }
        Some(crs) => Err(TerrasomError::Config(format!(
            "features are in {} but {} was requested; reproject them with an external transform tool first",
            crs, target
        ))),
    }
}
