use std::fs;
use std::path::Path;

use anyhow::Context as _;
use geojson::{GeoJson, Geometry, Value};
use rayon::prelude::*;

use crate::error::{GlobeError, GlobeResult};
use crate::geometry::{LineString, Ring};

/// Decoded world topology shared through the plugin namespace: the map-data
/// plugin produces it, the layer plugins snapshot the pieces they draw.
#[derive(Clone, Debug, Default)]
pub struct World {
    pub land: Vec<Ring>,
    pub borders: Vec<LineString>,
    pub lakes: Vec<Ring>,
}

impl World {
    pub fn is_empty(&self) -> bool {
        self.land.is_empty() && self.borders.is_empty() && self.lakes.is_empty()
    }
}

#[derive(Clone, Copy)]
enum Layer {
    Land,
    Borders,
    Lakes,
}

const LAYER_FILES: [(&str, Layer); 3] = [
    ("ne_110m_land.json", Layer::Land),
    ("ne_110m_borders.json", Layer::Borders),
    ("ne_110m_lakes.json", Layer::Lakes),
];

/// Load the Natural Earth GeoJSON layer files found in `dir`. Missing files
/// are tolerated; an unreadable or unparsable file, or a directory with no
/// layer files at all, is a `DataLoad` error naming the resource.
pub fn load_dir(dir: &Path) -> GlobeResult<World> {
    let present: Vec<(&str, Layer)> = LAYER_FILES
        .iter()
        .copied()
        .filter(|(file, _)| dir.join(file).exists())
        .collect();

    if present.is_empty() {
        return Err(GlobeError::data_load(
            dir.display().to_string(),
            anyhow::anyhow!("no world layer files found"),
        ));
    }

    let parsed: Vec<(Layer, GeoJson)> = present
        .into_par_iter()
        .map(|(file, layer)| {
            let path = dir.join(file);
            let geojson = read_geojson(&path)
                .map_err(|source| GlobeError::data_load(path.display().to_string(), source))?;
            Ok((layer, geojson))
        })
        .collect::<GlobeResult<Vec<_>>>()?;

    let mut world = World::default();
    for (layer, geojson) in parsed {
        match layer {
            Layer::Land => world.land = polygon_rings(&geojson),
            Layer::Borders => world.borders = line_strings(&geojson),
            Layer::Lakes => world.lakes = polygon_rings(&geojson),
        }
    }
    Ok(world)
}

fn read_geojson(path: &Path) -> anyhow::Result<GeoJson> {
    let content = fs::read_to_string(path).context("read failed")?;
    content.parse::<GeoJson>().context("not valid GeoJSON")
}

/// Extract every polygon exterior ring.
pub fn polygon_rings(geojson: &GeoJson) -> Vec<Ring> {
    let mut rings = Vec::new();
    visit_geometries(geojson, &mut |geometry| {
        match &geometry.value {
            Value::Polygon(poly) => {
                if let Some(exterior) = poly.first() {
                    rings.push(positions_to_line(exterior));
                }
            }
            Value::MultiPolygon(polys) => {
                for poly in polys {
                    if let Some(exterior) = poly.first() {
                        rings.push(positions_to_line(exterior));
                    }
                }
            }
            _ => {}
        }
    });
    rings
}

/// Extract every line feature (and polygon outlines, which stroke the same).
pub fn line_strings(geojson: &GeoJson) -> Vec<LineString> {
    let mut lines = Vec::new();
    visit_geometries(geojson, &mut |geometry| {
        match &geometry.value {
            Value::LineString(coords) => lines.push(positions_to_line(coords)),
            Value::MultiLineString(multi) => {
                for coords in multi {
                    lines.push(positions_to_line(coords));
                }
            }
            Value::Polygon(poly) => {
                if let Some(exterior) = poly.first() {
                    lines.push(positions_to_line(exterior));
                }
            }
            _ => {}
        }
    });
    lines
}

fn positions_to_line(coords: &[Vec<f64>]) -> LineString {
    coords
        .iter()
        .filter(|c| c.len() >= 2)
        .map(|c| (c[0], c[1]))
        .collect()
}

fn visit_geometries(geojson: &GeoJson, visit: &mut impl FnMut(&Geometry)) {
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if let Some(ref geometry) = feature.geometry {
                    visit_geometry(geometry, visit);
                }
            }
        }
        GeoJson::Feature(feature) => {
            if let Some(ref geometry) = feature.geometry {
                visit_geometry(geometry, visit);
            }
        }
        GeoJson::Geometry(geometry) => visit_geometry(geometry, visit),
    }
}

fn visit_geometry(geometry: &Geometry, visit: &mut impl FnMut(&Geometry)) {
    if let Value::GeometryCollection(ref geometries) = geometry.value {
        for inner in geometries {
            visit_geometry(inner, visit);
        }
    } else {
        visit(geometry);
    }
}

/// Simplified continent outlines for when no data files are available.
/// Coarse, but enough to make the globe readable.
pub fn builtin_world() -> World {
    let mut world = World::default();

    // North America
    world.land.push(vec![
        (-168.0, 65.0), (-166.0, 60.0), (-141.0, 60.0), (-130.0, 55.0),
        (-125.0, 48.0), (-124.0, 40.0), (-117.0, 32.0), (-110.0, 25.0),
        (-97.0, 25.0), (-97.0, 28.0), (-82.0, 24.0), (-80.0, 25.0),
        (-81.0, 31.0), (-75.0, 35.0), (-70.0, 41.0), (-67.0, 45.0),
        (-65.0, 47.0), (-55.0, 47.0), (-52.0, 47.0), (-55.0, 52.0),
        (-58.0, 55.0), (-64.0, 60.0), (-73.0, 62.0), (-80.0, 63.0),
        (-95.0, 62.0), (-110.0, 68.0), (-130.0, 70.0), (-145.0, 70.0),
        (-168.0, 65.0),
    ]);

    // South America
    world.land.push(vec![
        (-80.0, 10.0), (-75.0, 5.0), (-70.0, 5.0), (-60.0, 5.0),
        (-50.0, 0.0), (-35.0, -5.0), (-35.0, -10.0), (-38.0, -15.0),
        (-40.0, -22.0), (-48.0, -25.0), (-55.0, -34.0), (-58.0, -38.0),
        (-65.0, -42.0), (-68.0, -50.0), (-75.0, -52.0), (-75.0, -45.0),
        (-72.0, -40.0), (-72.0, -30.0), (-70.0, -20.0), (-70.0, -15.0),
        (-80.0, -5.0), (-80.0, 0.0), (-80.0, 10.0),
    ]);

    // Europe
    world.land.push(vec![
        (-10.0, 36.0), (-5.0, 36.0), (0.0, 38.0), (5.0, 43.0),
        (10.0, 44.0), (15.0, 45.0), (20.0, 40.0), (25.0, 37.0),
        (30.0, 40.0), (35.0, 42.0), (40.0, 43.0), (40.0, 55.0),
        (30.0, 60.0), (25.0, 65.0), (20.0, 70.0), (10.0, 71.0),
        (5.0, 62.0), (5.0, 58.0), (-5.0, 58.0), (-10.0, 52.0),
        (-5.0, 48.0), (-5.0, 43.0), (-10.0, 36.0),
    ]);

    // Africa
    world.land.push(vec![
        (-17.0, 15.0), (-17.0, 20.0), (-15.0, 28.0), (-5.0, 35.0),
        (10.0, 37.0), (20.0, 33.0), (25.0, 32.0), (35.0, 30.0),
        (35.0, 20.0), (42.0, 12.0), (50.0, 12.0), (45.0, 5.0),
        (35.0, -5.0), (35.0, -20.0), (35.0, -25.0), (30.0, -30.0),
        (20.0, -35.0), (18.0, -35.0), (15.0, -30.0), (10.0, -15.0),
        (10.0, 0.0), (5.0, 5.0), (-5.0, 5.0), (-10.0, 10.0),
        (-17.0, 15.0),
    ]);

    // Asia
    world.land.push(vec![
        (35.0, 42.0), (40.0, 43.0), (50.0, 40.0), (55.0, 37.0),
        (60.0, 25.0), (65.0, 25.0), (70.0, 20.0), (75.0, 15.0),
        (80.0, 8.0), (80.0, 15.0), (88.0, 22.0), (92.0, 22.0),
        (95.0, 16.0), (100.0, 14.0), (105.0, 10.0), (110.0, 20.0),
        (115.0, 22.0), (120.0, 22.0), (122.0, 25.0), (125.0, 30.0),
        (130.0, 35.0), (135.0, 35.0), (140.0, 40.0), (145.0, 45.0),
        (145.0, 50.0), (140.0, 55.0), (135.0, 55.0), (130.0, 52.0),
        (130.0, 43.0), (120.0, 40.0), (110.0, 45.0), (90.0, 50.0),
        (70.0, 55.0), (60.0, 55.0), (50.0, 50.0), (40.0, 43.0),
        (35.0, 42.0),
    ]);

    // Australia
    world.land.push(vec![
        (115.0, -20.0), (120.0, -18.0), (130.0, -12.0), (140.0, -12.0),
        (145.0, -15.0), (150.0, -25.0), (153.0, -30.0), (150.0, -35.0),
        (145.0, -38.0), (140.0, -38.0), (135.0, -35.0), (130.0, -32.0),
        (125.0, -32.0), (115.0, -35.0), (115.0, -25.0), (115.0, -20.0),
    ]);

    world
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_polygons_and_lines() {
        let raw = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {}, "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 0.0]]]
                }},
                {"type": "Feature", "properties": {}, "geometry": {
                    "type": "MultiLineString",
                    "coordinates": [[[0.0, 0.0], [5.0, 5.0]], [[1.0, 1.0], [2.0, 2.0]]]
                }}
            ]
        }"#;
        let geojson: GeoJson = raw.parse().unwrap();

        let rings = polygon_rings(&geojson);
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 4);

        let lines = line_strings(&geojson);
        // the polygon outline strokes too
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn missing_directory_is_a_data_load_error() {
        let err = load_dir(Path::new("definitely/not/here")).unwrap_err();
        assert!(matches!(err, GlobeError::DataLoad { .. }));
    }

    #[test]
    fn builtin_world_has_closed_land_rings() {
        let world = builtin_world();
        assert!(!world.is_empty());
        for ring in &world.land {
            assert_eq!(ring.first(), ring.last());
        }
    }
}
