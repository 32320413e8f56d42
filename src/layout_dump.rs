use crate::layout::{Layout, StationShape};
use crate::model::SubwayMap;
use crate::render::segments_per_route;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub name: String,
    pub width: f32,
    pub height: f32,
    pub cell_size: f32,
    pub line_width: f32,
    pub routes: Vec<RouteDump>,
    pub segments: Vec<SegmentDump>,
    pub stations: Vec<StationDump>,
    pub labels: Vec<LabelDump>,
}

#[derive(Debug, Serialize)]
pub struct RouteDump {
    pub id: u32,
    pub stations: Vec<u32>,
    pub segments: usize,
}

#[derive(Debug, Serialize)]
pub struct SegmentDump {
    pub route: u32,
    pub from_station: u32,
    pub to_station: u32,
    pub lane: usize,
    pub bundle_size: usize,
    pub color: String,
    pub dashed: bool,
    pub points: Vec<[f32; 2]>,
}

#[derive(Debug, Serialize)]
pub struct StationDump {
    pub id: u32,
    pub shape: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub angle: f32,
    pub min: [i32; 2],
    pub max: [i32; 2],
    pub surrounding_min: [i32; 2],
    pub surrounding_max: [i32; 2],
    pub inclined: bool,
}

#[derive(Debug, Serialize)]
pub struct LabelDump {
    pub station: u32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub strategy: String,
    pub lines: Vec<String>,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout, map: &SubwayMap) -> Self {
        let counts = segments_per_route(layout);
        let routes = map
            .routes()
            .map(|route| RouteDump {
                id: route.id().0,
                stations: route.stations().iter().map(|id| id.0).collect(),
                segments: counts.get(&route.id()).copied().unwrap_or(0),
            })
            .collect();

        let segments = layout
            .segments
            .iter()
            .map(|segment| SegmentDump {
                route: segment.route.0,
                from_station: segment.from_station.0,
                to_station: segment.to_station.0,
                lane: segment.lane,
                bundle_size: segment.bundle_size,
                color: segment.color.clone(),
                dashed: segment.dashed,
                points: vec![
                    [segment.from.0, segment.from.1],
                    [segment.to.0, segment.to.1],
                ],
            })
            .collect();

        let stations = layout
            .stations
            .iter()
            .map(|station| {
                let (shape, center, width, height, angle) = match station.shape {
                    StationShape::Circle { center, radius } => {
                        ("circle", center, radius * 2.0, radius * 2.0, 0.0)
                    }
                    StationShape::Rect {
                        center,
                        width,
                        height,
                        angle,
                    } => ("rect", center, width, height, angle),
                };
                let bounds = &station.bounds;
                StationDump {
                    id: station.id.0,
                    shape: shape.to_string(),
                    x: center.0,
                    y: center.1,
                    width,
                    height,
                    angle,
                    min: [bounds.min.0, bounds.min.1],
                    max: [bounds.max.0, bounds.max.1],
                    surrounding_min: [bounds.surrounding_min.0, bounds.surrounding_min.1],
                    surrounding_max: [bounds.surrounding_max.0, bounds.surrounding_max.1],
                    inclined: bounds.is_inclined,
                }
            })
            .collect();

        let labels = layout
            .labels
            .iter()
            .map(|label| LabelDump {
                station: label.station.0,
                x: label.x,
                y: label.y,
                width: label.width,
                height: label.height,
                strategy: format!("{:?}", label.strategy),
                lines: label.lines.clone(),
            })
            .collect();

        LayoutDump {
            name: map.name().to_string(),
            width: layout.width,
            height: layout.height,
            cell_size: layout.cell_size,
            line_width: layout.line_width,
            routes,
            segments,
            stations,
            labels,
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout, map: &SubwayMap) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, map);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
