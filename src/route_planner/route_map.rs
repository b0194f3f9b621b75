// route_map.rs
//
// Renders one planned route as a PNG: the route polyline in lng/lat space
// with origin and destination markers.

use crate::error::ExportError;
use crate::global_variables::DEFAULT_MAP_CENTER;
use crate::route_planner::session::{PlannedRoute, RouteComparison};
use crate::shared_data::{Coordinate, RoutePreference};
use log::info;
use plotters::prelude::*;
use std::fmt::Display;
use std::path::Path;

const MAP_SIZE: (u32, u32) = (1200, 600);
/// Fraction of the route extent added on each side of the plot.
const MAP_PADDING: f64 = 0.1;
/// Minimum half-extent in degrees, so a zero-length route still has an area.
const MIN_HALF_SPAN: f64 = 0.005;

pub fn route_color(preference: RoutePreference) -> RGBColor {
    match preference {
        RoutePreference::Fastest => RED,
        RoutePreference::Shortest => BLUE,
    }
}

/// Plot bounds as ((min_lng, max_lng), (min_lat, max_lat)) covering every
/// point plus padding. Without points the default map centre is used.
pub fn map_bounds(points: &[Coordinate]) -> ((f64, f64), (f64, f64)) {
    let (center_lat, center_lng) = DEFAULT_MAP_CENTER;
    if points.is_empty() {
        return (
            (center_lng - MIN_HALF_SPAN, center_lng + MIN_HALF_SPAN),
            (center_lat - MIN_HALF_SPAN, center_lat + MIN_HALF_SPAN),
        );
    }
    let axis = |values: Vec<f64>| {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mid = (min + max) / 2.0;
        let half = ((max - min) / 2.0 * (1.0 + 2.0 * MAP_PADDING)).max(MIN_HALF_SPAN);
        (mid - half, mid + half)
    };
    (
        axis(points.iter().map(|p| p.lng).collect()),
        axis(points.iter().map(|p| p.lat).collect()),
    )
}

fn render_err<E: Display>(e: E) -> ExportError {
    ExportError::Render(e.to_string())
}

pub fn render_route_map(
    routes: &RouteComparison,
    route: &PlannedRoute,
    output: &Path,
) -> Result<(), ExportError> {
    let mut extent = route.summary.geometry.clone();
    extent.push(routes.origin);
    extent.push(routes.destination);
    let ((x0, x1), (y0, y1)) = map_bounds(&extent);

    let root = BitMapBackend::new(output, MAP_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{} route", route.label()), ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc("Longitude")
        .y_desc("Latitude")
        .draw()
        .map_err(render_err)?;

    let color = route_color(route.preference);
    chart
        .draw_series(LineSeries::new(
            route.summary.geometry.iter().map(|p| (p.lng, p.lat)),
            color.stroke_width(5),
        ))
        .map_err(render_err)?;

    chart
        .draw_series([
            Circle::new((routes.origin.lng, routes.origin.lat), 8, GREEN.filled()),
            Circle::new((routes.destination.lng, routes.destination.lat), 8, RED.filled()),
        ])
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    info!("Route map saved to {}", output.display());
    Ok(())
}
