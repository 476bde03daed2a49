//! Output formatting for routes, snaps, and mask summaries.

use std::fmt::Write as _;

use clap::ValueEnum;
use serde::Serialize;

use searoute_lib::{
    GeoCoordinate, RouteFeature, RouteOutcome, RoutePath, Snapped, WaterGrid,
};

use crate::terminal::{format_with_separators, ColorPalette};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing.
    #[default]
    Text,
    /// Plain JSON objects.
    Json,
    /// GeoJSON features (routes only; other commands fall back to JSON).
    Geojson,
}

/// Render a route outcome; failed routes are shown as the straight-line
/// fallback.
pub fn render_route(
    from: GeoCoordinate,
    to: GeoCoordinate,
    outcome: &RouteOutcome,
    format: OutputFormat,
    palette: &ColorPalette,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(route_text(from, to, outcome, palette)),
        OutputFormat::Json => {
            let feature = RouteFeature::from_outcome(from, to, outcome);
            serde_json::to_string_pretty(&RouteJson {
                routed: feature.properties.routed,
                reason: outcome.reason().map(|reason| reason.to_string()),
                points: match outcome {
                    RouteOutcome::Found(path) => path.points.clone(),
                    RouteOutcome::NoRoute(_) => vec![from, to],
                },
                cost: feature.properties.cost,
                length_km: feature.properties.length_km,
                nodes_expanded: feature.properties.nodes_expanded,
            })
        }
        OutputFormat::Geojson => {
            serde_json::to_string_pretty(&RouteFeature::from_outcome(from, to, outcome))
        }
    }
}

#[derive(Serialize)]
struct RouteJson {
    routed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    points: Vec<GeoCoordinate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    length_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nodes_expanded: Option<usize>,
}

fn route_text(
    from: GeoCoordinate,
    to: GeoCoordinate,
    outcome: &RouteOutcome,
    p: &ColorPalette,
) -> String {
    let mut out = String::new();
    match outcome {
        RouteOutcome::Found(path) => {
            let _ = writeln!(
                out,
                "Sea route from {}{from}{} to {}{to}{} ({} points, {:.1} km):",
                p.emphasis,
                p.reset,
                p.emphasis,
                p.reset,
                path.len(),
                path.length_km()
            );
            write_points(&mut out, path, p);
            let _ = writeln!(
                out,
                "{}cost {:.3}, {} cells expanded{}",
                p.muted,
                path.cost,
                format_with_separators(path.nodes_expanded as u64),
                p.reset
            );
        }
        RouteOutcome::NoRoute(reason) => {
            let _ = writeln!(
                out,
                "{}No sea route: {reason}. Falling back to a straight line.{}",
                p.warning, p.reset
            );
            let _ = writeln!(out, "  {}START{} {from}", p.departure, p.reset);
            let _ = writeln!(out, "  {}GOAL{}  {to}", p.arrival, p.reset);
            let _ = writeln!(
                out,
                "{}straight line {:.1} km{}",
                p.muted,
                from.distance_km(&to),
                p.reset
            );
        }
    }
    out
}

fn write_points(out: &mut String, path: &RoutePath, p: &ColorPalette) {
    let last = path.points.len().saturating_sub(1);
    for (i, point) in path.points.iter().enumerate() {
        let (tag, label) = match i {
            0 => (p.departure, "START"),
            i if i == last => (p.arrival, "GOAL "),
            _ => (p.waypoint, "  WP "),
        };
        let _ = writeln!(
            out,
            "  {tag}{label}{} {}{point}{} {}{}{}",
            p.reset, p.water, p.reset, p.muted, path.cells[i], p.reset
        );
    }
}

/// Render a snap result; `None` means no water within the radius.
pub fn render_snap(
    at: GeoCoordinate,
    snapped: Option<&Snapped>,
    format: OutputFormat,
    palette: &ColorPalette,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(match snapped {
            Some(s) if s.radius == 0 => format!(
                "{at} is on water; cell {} centre {}{}{}\n",
                s.cell, palette.water, s.coordinate, palette.reset
            ),
            Some(s) => format!(
                "{at} snapped to {}{}{} (cell {}, ring {})\n",
                palette.water, s.coordinate, palette.reset, s.cell, s.radius
            ),
            None => format!(
                "{}No water near {at}; coordinate left unchanged.{}\n",
                palette.warning, palette.reset
            ),
        }),
        OutputFormat::Json | OutputFormat::Geojson => serde_json::to_string_pretty(&SnapJson {
            input: at,
            snapped: snapped.is_some(),
            coordinate: snapped.map(|s| s.coordinate).unwrap_or(at),
            cell: snapped.map(|s| [s.cell.row, s.cell.col]),
            radius: snapped.map(|s| s.radius),
        }),
    }
}

#[derive(Serialize)]
struct SnapJson {
    input: GeoCoordinate,
    snapped: bool,
    coordinate: GeoCoordinate,
    #[serde(skip_serializing_if = "Option::is_none")]
    cell: Option<[u32; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    radius: Option<u32>,
}

/// Geometry and coverage summary of a loaded mask.
#[derive(Debug, Serialize)]
pub struct MaskSummary {
    pub source: String,
    pub north: f64,
    pub south: f64,
    pub west: f64,
    pub east: f64,
    pub resolution: f64,
    pub rows: u32,
    pub cols: u32,
    pub water_cells: usize,
    pub water_ratio: f64,
    pub wraps_longitude: bool,
}

impl MaskSummary {
    pub fn new(source: impl Into<String>, grid: &WaterGrid) -> Self {
        let g = grid.geometry();
        let water_cells = grid.water_count();
        Self {
            source: source.into(),
            north: g.north,
            south: g.south(),
            west: g.west,
            east: g.east(),
            resolution: g.resolution,
            rows: g.rows,
            cols: g.cols,
            water_cells,
            water_ratio: if grid.is_empty() {
                0.0
            } else {
                water_cells as f64 / grid.len() as f64
            },
            wraps_longitude: grid.wraps_longitude(),
        }
    }
}

pub fn render_mask_info(
    summary: &MaskSummary,
    format: OutputFormat,
    palette: &ColorPalette,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => {
            let p = palette;
            let mut out = String::new();
            let _ = writeln!(out, "Water mask: {}{}{}", p.emphasis, summary.source, p.reset);
            let _ = writeln!(
                out,
                "  extent      N {:.4}  S {:.4}  W {:.4}  E {:.4}",
                summary.north, summary.south, summary.west, summary.east
            );
            let _ = writeln!(
                out,
                "  grid        {} x {} cells at {} deg",
                format_with_separators(summary.rows as u64),
                format_with_separators(summary.cols as u64),
                summary.resolution
            );
            let _ = writeln!(
                out,
                "  water       {}{}{} cells ({:.1}%)",
                p.water,
                format_with_separators(summary.water_cells as u64),
                p.reset,
                summary.water_ratio * 100.0
            );
            let _ = writeln!(
                out,
                "  wraps       {}",
                if summary.wraps_longitude { "yes" } else { "no" }
            );
            Ok(out)
        }
        OutputFormat::Json | OutputFormat::Geojson => serde_json::to_string_pretty(summary),
    }
}
