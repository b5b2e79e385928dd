//! GeoJSON feature backend.

use crate::cluster::LabeledCollection;
use crate::error::{Result, TerrasomError};
use crate::feature::{Epsg, Feature, FeatureCollection};
use crate::io::FeatureStore;
use geojson::GeoJson;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Property names recognized as feature identifiers, compared
/// case-insensitively.
const ID_COLUMNS: [&str; 4] = ["ID", "OBJECTID", "OBJECT_ID", "FID"];

/// Feature I/O over GeoJSON files.
///
/// The legacy `crs` member (`urn:ogc:def:crs:EPSG::<code>` style) is parsed
/// on load when present and written on save, so the EPSG tag survives a
/// round-trip; files without one load with an unknown CRS.
#[derive(Debug, Clone, Default)]
pub struct GeoJsonStore;

impl FeatureStore for GeoJsonStore {
    fn load(&self, path: &Path) -> Result<FeatureCollection> {
        if !path.exists() {
            return Err(TerrasomError::FileNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path)?;
        let geojson: GeoJson = contents.parse()?;

        let GeoJson::FeatureCollection(fc) = geojson else {
            return Err(TerrasomError::Serialization(
                "expected a GeoJSON FeatureCollection".to_string(),
            ));
        };

        let crs = fc
            .foreign_members
            .as_ref()
            .and_then(|members| members.get("crs"))
            .and_then(parse_crs_member)
            .map(Epsg);

        let mut features = Vec::with_capacity(fc.features.len());
        for f in fc.features {
            let geometry = f.geometry.ok_or_else(|| {
                TerrasomError::Geometry("feature without geometry".to_string())
            })?;
            let geometry = geo_types::Geometry::<f64>::try_from(geometry.value)
                .map_err(|e| TerrasomError::Geometry(e.to_string()))?;

            let mut attributes = BTreeMap::new();
            let mut id = None;
            if let Some(properties) = f.properties {
                for (name, value) in properties {
                    if id.is_none()
                        && ID_COLUMNS.contains(&name.to_uppercase().as_str())
                    {
                        id = Some((name.clone(), value.clone()));
                    }
                    if let Some(number) = value.as_f64() {
                        attributes.insert(name, number);
                    }
                }
            }

            features.push(Feature {
                geometry,
                attributes,
                id,
            });
        }

        Ok(FeatureCollection::new(features, crs))
    }

    fn save(&self, collection: &LabeledCollection, path: &Path) -> Result<()> {
        let features = collection
            .features
            .iter()
            .map(|lf| {
                let mut properties = Map::new();
                properties.insert("cluster".to_string(), Value::from(lf.cluster));
                for (name, value) in collection.columns.iter().zip(&lf.normalized) {
                    properties.insert(name.clone(), Value::from(*value));
                }
                if let Some((name, value)) = &lf.feature.id {
                    properties.insert(name.clone(), value.clone());
                }

                geojson::Feature {
                    bbox: None,
                    geometry: Some(geojson::Geometry::new(geojson::Value::from(
                        &lf.feature.geometry,
                    ))),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();

        let mut foreign_members = Map::new();
        foreign_members.insert("crs".to_string(), crs_member(collection.crs));

        let fc = geojson::FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(foreign_members),
        };

        let file = fs::File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &GeoJson::from(fc))?;
        writer.flush()?;
        Ok(())
    }
}

/// Extracts an EPSG code from a legacy named-CRS member.
fn parse_crs_member(member: &Value) -> Option<u32> {
    let name = member.get("properties")?.get("name")?.as_str()?;
    name.rsplit(':').find_map(|part| part.parse().ok())
}

fn crs_member(crs: Epsg) -> Value {
    json!({
        "type": "name",
        "properties": { "name": format!("urn:ogc:def:crs:EPSG::{}", crs.0) }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::LabeledFeature;
    use geo_types::point;
    use tempfile::tempdir;

    fn labeled_point(x: f64, y: f64, cluster: u32, normalized: Vec<f64>) -> LabeledFeature {
        LabeledFeature {
            feature: Feature::new(point!(x: x, y: y).into(), BTreeMap::new()),
            cluster,
            normalized,
        }
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.clusters.geojson");

        let mut first = labeled_point(1.0, 2.0, 3, vec![0.25, 0.75]);
        first.feature.id = Some(("OBJECTID".to_string(), Value::from(42)));

        let collection = LabeledCollection {
            features: vec![first, labeled_point(-1.0, 5.0, 0, vec![1.0, 0.0])],
            columns: vec!["income".to_string(), "density".to_string()],
            crs: Epsg(3763),
        };

        GeoJsonStore.save(&collection, &path).unwrap();
        let loaded = GeoJsonStore.load(&path).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.crs, Some(Epsg(3763)));
        assert_eq!(loaded.features[0].attributes["cluster"], 3.0);
        assert_eq!(loaded.features[0].attributes["income"], 0.25);
        assert_eq!(
            loaded.features[0].id,
            Some(("OBJECTID".to_string(), Value::from(42)))
        );
        assert_eq!(
            loaded.features[1].geometry,
            point!(x: -1.0, y: 5.0).into()
        );
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let err = GeoJsonStore.load(Path::new("/nonexistent.geojson")).unwrap_err();
        assert!(matches!(err, TerrasomError::FileNotFound(_)));
    }

    #[test]
    fn test_load_detects_id_column_case_insensitively() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("features.geojson");
        fs::write(
            &path,
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":{"type":"Point","coordinates":[0.0,0.0]},
                 "properties":{"fid":7,"income":12.5}}]}"#,
        )
        .unwrap();

        let loaded = GeoJsonStore.load(&path).unwrap();
        assert_eq!(
            loaded.features[0].id,
            Some(("fid".to_string(), Value::from(7)))
        );
        assert_eq!(loaded.features[0].attributes["income"], 12.5);
        assert_eq!(loaded.crs, None);
    }
}
