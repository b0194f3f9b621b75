// export.rs
//
// Writes the selected route as GeoJSON and the two endpoints as CSV.

use crate::error::ExportError;
use crate::route_planner::session::{PlannedRoute, RouteComparison};
use chrono::NaiveDate;
use log::info;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const POINTS_FILE_NAME: &str = "route_points.csv";

#[derive(Debug, Serialize)]
struct EndpointRecord {
    kind: &'static str,
    longitude: f64,
    latitude: f64,
}

/// `route_<label>_<YYYYMMDD>.json`, label lower-cased with spaces as `_`.
pub fn geojson_file_name(label: &str, date: NaiveDate) -> String {
    format!(
        "route_{}_{}.json",
        label.to_lowercase().replace(' ', "_"),
        date.format("%Y%m%d")
    )
}

pub fn export_geojson(route: &PlannedRoute, dir: &Path, date: NaiveDate) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(geojson_file_name(route.label(), date));
    fs::write(&path, serde_json::to_string_pretty(&route.geojson)?)?;
    info!("Route exported to {}", path.display());
    Ok(path)
}

pub fn write_points_csv<W: Write>(routes: &RouteComparison, writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for (kind, point) in [("origin", routes.origin), ("destination", routes.destination)] {
        wtr.serialize(EndpointRecord {
            kind,
            longitude: point.lng,
            latitude: point.lat,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_points_csv(routes: &RouteComparison, dir: &Path) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(POINTS_FILE_NAME);
    write_points_csv(routes, File::create(&path)?)?;
    info!("Route points exported to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared_data::{Coordinate, RoutePreference, RouteSummary, TrafficEstimate};
    use serde_json::json;

    fn planned(preference: RoutePreference) -> PlannedRoute {
        PlannedRoute {
            preference,
            geojson: json!({"features": [{"properties": {"summary": {"duration": 660.0}}}]}),
            summary: RouteSummary::default(),
            base_duration: Some(600.0),
            traffic: TrafficEstimate::Unavailable {
                reason: "test".into(),
            },
        }
    }

    fn comparison() -> RouteComparison {
        RouteComparison {
            origin: Coordinate::new(102.2651, -3.7932),
            destination: Coordinate::new(102.3, -3.8),
            fastest: planned(RoutePreference::Fastest),
            alternative: planned(RoutePreference::Shortest),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).expect("valid date")
    }

    #[test]
    fn file_names_carry_label_and_date() {
        assert_eq!(geojson_file_name("Fastest", date()), "route_fastest_20240102.json");
        assert_eq!(
            geojson_file_name("Traffic-free alternative", date()),
            "route_traffic-free_alternative_20240102.json"
        );
    }

    #[test]
    fn points_csv_lists_origin_then_destination() {
        let mut buf = Vec::new();
        write_points_csv(&comparison(), &mut buf).expect("csv");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(
            text,
            "kind,longitude,latitude\norigin,102.2651,-3.7932\ndestination,102.3,-3.8\n"
        );
    }

    #[test]
    fn geojson_export_writes_the_adjusted_route() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = export_geojson(&comparison().fastest, dir.path(), date()).expect("export");
        assert!(path.ends_with("route_fastest_20240102.json"));
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("json");
        assert_eq!(written["features"][0]["properties"]["summary"]["duration"], 660.0);
    }
}
