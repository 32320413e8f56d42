use super::occupancy::OccupiedCells;
use super::priority::RoutePrioritizer;
use super::stations::StationLines;
use super::types::RouteSegment;
use crate::error::{Error, Result};
use crate::geometry::{Grid, Point, offset_connection};
use crate::model::{Route, StationId, SubwayMap};
use log::debug;
use std::collections::BTreeMap;

/// Offsets every route connection into its lane and records what it covers.
#[derive(Debug, Default)]
pub struct RoutesManager {
    prioritizer: RoutePrioritizer,
    lines: BTreeMap<StationId, StationLines>,
}

impl RoutesManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bundle widths per station axis gathered by the last [`process`](Self::process).
    pub fn station_lines(&self) -> &BTreeMap<StationId, StationLines> {
        &self.lines
    }

    pub fn process(
        &mut self,
        map: &SubwayMap,
        grid: &Grid,
        occupied: &mut OccupiedCells,
    ) -> Result<Vec<RouteSegment>> {
        self.prioritizer = RoutePrioritizer::new();
        self.lines.clear();
        let mut segments = Vec::new();
        for route in consume_routes(map) {
            self.draw_route(route, map, grid, occupied, &mut segments)?;
        }
        debug!(
            "laid out {} route segments over {} cells",
            segments.len(),
            occupied.route_cell_count()
        );
        Ok(segments)
    }

    fn draw_route(
        &mut self,
        route: &Route,
        map: &SubwayMap,
        grid: &Grid,
        occupied: &mut OccupiedCells,
        segments: &mut Vec<RouteSegment>,
    ) -> Result<()> {
        let selected = map.selected_route() == Some(route.id());
        for conn in route.connections() {
            let edge = conn.edge();
            let bundle_size = map.connections().get(edge.first(), edge.second())?.len();
            let lane = self.prioritizer.calculate_priority(route.id(), edge, map)?;
            let offset = grid.lane_offset(lane, bundle_size);

            let start = station_center(map, grid, edge.first())?;
            let end = station_center(map, grid, edge.second())?;
            let mut segment = offset_connection(start, end, offset);
            if !conn.is_canonical() {
                segment = segment.reversed();
            }

            if let Some(direction) = conn.direction(map.stations()) {
                for cell in grid.digital_diff_analyzer(segment, direction) {
                    if occupied.in_grid(cell) {
                        occupied.add_route_cell(cell, edge);
                    }
                }
                for station in [conn.from, conn.to] {
                    self.lines
                        .entry(station)
                        .or_default()
                        .record(direction.axis(), bundle_size);
                }
            }

            let color = route.color();
            let mut drawn = RouteSegment {
                route: route.id(),
                from_station: conn.from,
                to_station: conn.to,
                from: segment.from,
                to: segment.to,
                lane,
                bundle_size,
                color: color.primary().to_string(),
                dashed: false,
                selected,
            };
            if let Some(secondary) = color.secondary() {
                segments.push(drawn.clone());
                drawn.color = secondary.to_string();
                drawn.dashed = true;
            }
            segments.push(drawn);
        }
        Ok(())
    }
}

/// Ascending route id, the selected route last.
fn consume_routes(map: &SubwayMap) -> Vec<&Route> {
    let selected = map.selected_route();
    let mut routes: Vec<&Route> = map.routes().collect();
    routes.sort_by_key(|route| (Some(route.id()) == selected, route.id()));
    routes
}

fn station_center(map: &SubwayMap, grid: &Grid, id: StationId) -> Result<Point> {
    map.station(id)
        .map(|station| grid.centrify(station.position()))
        .ok_or(Error::StationNotFound(id))
}
