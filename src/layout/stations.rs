use super::occupancy::OccupiedCells;
use super::types::{StationBounds, StationLayout, StationShape};
use crate::config::LayoutConfig;
use crate::error::Result;
use crate::geometry::{Axis, Cell, Grid, Point, is_right_angle_multiple, rotate};
use crate::model::{StationId, SubwayMap};
use log::debug;
use std::collections::BTreeMap;

const SLIVER_COVER: f32 = 0.1;
const NEAR_FULL_COVER: f32 = 0.8;
const FULL_COVER: f32 = 0.999;

/// Widest bundle seen on each axis through a station.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StationLines {
    counts: [usize; 4],
}

impl StationLines {
    pub fn record(&mut self, axis: Axis, count: usize) {
        let slot = &mut self.counts[axis as usize];
        *slot = (*slot).max(count);
    }

    pub fn count(&self, axis: Axis) -> usize {
        self.counts[axis as usize]
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|count| *count == 0)
    }

    /// Axis carrying the most lines. Axes 45 degrees off it fold into it, so
    /// only the orthogonal axis still contributes to the station's depth.
    pub fn dominant(&self) -> Option<(Axis, usize)> {
        let mut best: Option<(Axis, usize)> = None;
        for axis in Axis::ALL {
            let count = self.count(axis);
            if count > best.map_or(0, |(_, c)| c) {
                best = Some((axis, count));
            }
        }
        best
    }
}

/// Shapes every station from the bundles recorded by the routes pass.
#[derive(Debug, Default)]
pub struct StationsManager;

impl StationsManager {
    pub fn process(
        &self,
        map: &SubwayMap,
        grid: &Grid,
        config: &LayoutConfig,
        lines: &BTreeMap<StationId, StationLines>,
        occupied: &mut OccupiedCells,
    ) -> Result<Vec<StationLayout>> {
        let mut layouts = Vec::with_capacity(map.stations().len());
        let mut rects = 0usize;
        for station in map.stations().values() {
            let cell = station.position();
            let center = grid.centrify(cell);
            let lines = lines.get(&station.id()).copied().unwrap_or_default();
            let layout = match lines.dominant() {
                Some((axis, count)) if count > 1 => {
                    rects += 1;
                    let depth = lines.count(axis.orthogonal());
                    let width = grid.distance_of_parallel_lines(count).max(grid.cell_size);
                    let height = grid.distance_of_parallel_lines(depth).max(grid.cell_size);
                    let angle = (axis.angle() + 90.0).rem_euclid(180.0);
                    StationLayout {
                        id: station.id(),
                        shape: StationShape::Rect {
                            center,
                            width,
                            height,
                            angle,
                        },
                        bounds: rect_bounds(cell, center, width, height, angle, grid.cell_size),
                    }
                }
                _ => StationLayout {
                    id: station.id(),
                    shape: StationShape::Circle {
                        center,
                        radius: grid.cell_size * config.station_radius_factor,
                    },
                    bounds: StationBounds::single(cell),
                },
            };
            occupied.add_station(layout.id, layout.bounds);
            layouts.push(layout);
        }
        debug!("shaped {} stations ({} as bundles)", layouts.len(), rects);
        Ok(layouts)
    }
}

fn rect_bounds(
    cell: Cell,
    center: Point,
    width: f32,
    height: f32,
    angle: f32,
    cell_size: f32,
) -> StationBounds {
    let (hw, hh) = (width / 2.0, height / 2.0);
    let corners = [
        (center.0 - hw, center.1 - hh),
        (center.0 + hw, center.1 - hh),
        (center.0 + hw, center.1 + hh),
        (center.0 - hw, center.1 + hh),
    ];
    let rotated = rotate(&corners, center, angle);
    let mut min = (f32::MAX, f32::MAX);
    let mut max = (f32::MIN, f32::MIN);
    for (x, y) in rotated.iter().map(|&(x, y)| (snap(x), snap(y))) {
        min = (min.0.min(x), min.1.min(y));
        max = (max.0.max(x), max.1.max(y));
    }

    let is_inclined = !is_right_angle_multiple(angle);
    let (x_core, x_margin) = span_cells(min.0, max.0, cell.0, cell_size, is_inclined);
    let (y_core, y_margin) = span_cells(min.1, max.1, cell.1, cell_size, is_inclined);
    StationBounds {
        min: (x_core.0, y_core.0),
        max: (x_core.1, y_core.1),
        surrounding_min: (x_margin.0, y_margin.0),
        surrounding_max: (x_margin.1, y_margin.1),
        is_inclined,
    }
}

fn snap(value: f32) -> f32 {
    (value * 1000.0).round() / 1000.0
}

/// Core and margin cell ranges covering `[low, high]` pixels on one axis.
///
/// A sliver under a tenth of a cell is left out of the core but kept in the
/// margin; an edge cell that is nearly full reserves one more margin cell.
fn span_cells(
    low: f32,
    high: f32,
    own: i32,
    cell_size: f32,
    is_inclined: bool,
) -> ((i32, i32), (i32, i32)) {
    let first = (low / cell_size).floor() as i32;
    let last = (high / cell_size).ceil() as i32 - 1;
    let mut core = (first.min(own), last.max(own));
    if is_inclined {
        return (core, (core.0 - 1, core.1 + 1));
    }

    let low_cover = ((first + 1) as f32 * cell_size - low) / cell_size;
    let high_cover = (high - last as f32 * cell_size) / cell_size;
    let mut margin = (core.0 - 1, core.1 + 1);
    if first < own {
        if low_cover <= SLIVER_COVER {
            core.0 = first + 1;
            margin.0 = first;
        } else if (NEAR_FULL_COVER..FULL_COVER).contains(&low_cover) {
            margin.0 -= 1;
        }
    }
    if last > own {
        if high_cover <= SLIVER_COVER {
            core.1 = last - 1;
            margin.1 = last;
        } else if (NEAR_FULL_COVER..FULL_COVER).contains(&high_cover) {
            margin.1 += 1;
        }
    }
    (core, margin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SizeSettings;

    fn grid() -> Grid {
        Grid::new(&SizeSettings::default(), &LayoutConfig::default())
    }

    fn shape(lines: StationLines) -> StationLayout {
        let mut map = SubwayMap::default();
        let id = map.new_station(5, 5, vec!["A".to_string()]);
        let mut occupied = OccupiedCells::new(30);
        let table = BTreeMap::from([(id, lines)]);
        StationsManager
            .process(&map, &grid(), &LayoutConfig::default(), &table, &mut occupied)
            .unwrap()
            .remove(0)
    }

    #[test]
    fn lonely_or_single_line_station_is_a_circle() {
        let mut lines = StationLines::default();
        assert!(matches!(shape(lines).shape, StationShape::Circle { .. }));
        lines.record(Axis::Horizontal, 1);
        lines.record(Axis::Vertical, 1);
        let layout = shape(lines);
        match layout.shape {
            StationShape::Circle { center, radius } => {
                assert_eq!(center, (165.0, 165.0));
                assert!((radius - 12.0).abs() < 1e-4);
            }
            other => panic!("expected circle, got {other:?}"),
        }
        assert_eq!(layout.bounds, StationBounds::single((5, 5)));
    }

    #[test]
    fn dominant_axis_absorbs_adjacent_axes() {
        let mut lines = StationLines::default();
        lines.record(Axis::Horizontal, 2);
        lines.record(Axis::Horizontal, 1);
        lines.record(Axis::Falling, 2);
        lines.record(Axis::Vertical, 1);
        assert_eq!(lines.dominant(), Some((Axis::Horizontal, 2)));
        assert_eq!(lines.count(Axis::Vertical), 1);
        assert!(!lines.is_empty());
    }

    #[test]
    fn bundle_station_is_rotated_across_the_lines() {
        let mut lines = StationLines::default();
        lines.record(Axis::Horizontal, 2);
        let layout = shape(lines);
        match layout.shape {
            StationShape::Rect {
                width,
                height,
                angle,
                ..
            } => {
                assert_eq!(width, 30.0);
                assert_eq!(height, 30.0);
                assert_eq!(angle, 90.0);
            }
            other => panic!("expected rect, got {other:?}"),
        }
        assert_eq!(layout.bounds.min, (5, 5));
        assert_eq!(layout.bounds.max, (5, 5));
        assert!(!layout.bounds.is_inclined);
    }

    #[test]
    fn slivers_stay_out_of_the_core() {
        // Four lines span 33px across a 30px cell: 1.5px spills each way.
        let mut lines = StationLines::default();
        lines.record(Axis::Vertical, 4);
        let bounds = shape(lines).bounds;
        assert_eq!(bounds.min, (5, 5));
        assert_eq!(bounds.max, (5, 5));
        assert_eq!(bounds.surrounding_min, (4, 4));
        assert_eq!(bounds.surrounding_max, (6, 6));
    }

    #[test]
    fn wide_bundles_cover_neighbouring_cells() {
        // Eight lines: 8 * 6 + 7 * 3 = 69px, spilling well into both neighbours.
        let mut lines = StationLines::default();
        lines.record(Axis::Vertical, 8);
        let bounds = shape(lines).bounds;
        assert_eq!(bounds.min, (4, 5));
        assert_eq!(bounds.max, (6, 5));
        assert_eq!(bounds.surrounding_min, (3, 4));
        assert_eq!(bounds.surrounding_max, (7, 6));
    }

    #[test]
    fn diagonal_bundle_is_inclined() {
        let mut lines = StationLines::default();
        lines.record(Axis::Rising, 3);
        let bounds = shape(lines).bounds;
        assert!(bounds.is_inclined);
        assert!(bounds.contains((5, 5)));
        assert_eq!(bounds.surrounding_min, (bounds.min.0 - 1, bounds.min.1 - 1));
        assert_eq!(bounds.surrounding_max, (bounds.max.0 + 1, bounds.max.1 + 1));
    }
}
