use super::occupancy::OccupiedCells;
use super::types::{LabelLayout, PlacementStrategy, StationBounds, StationLayout};
use crate::config::LayoutConfig;
use crate::error::{Error, Result};
use crate::geometry::Cell;
use crate::model::SubwayMap;
use log::{debug, warn};

/// Places station labels next to their stations without covering lines,
/// other stations or labels placed earlier in the same redraw.
#[derive(Debug, Default)]
pub struct LabelsManager;

impl LabelsManager {
    pub fn process(
        &self,
        map: &mut SubwayMap,
        stations: &[StationLayout],
        config: &LayoutConfig,
        occupied: &mut OccupiedCells,
    ) -> Result<Vec<LabelLayout>> {
        let grid_size = map.settings().grid_size as i32;
        let mut layouts = Vec::with_capacity(stations.len());
        let mut forced = 0usize;
        for station_layout in stations {
            let id = station_layout.id;
            let station = map
                .stations_mut()
                .get_mut(&id)
                .ok_or(Error::StationNotFound(id))?;
            let label = station.label_mut();
            let (width, height) = label.footprint(config.label_chars_per_cell);

            let (origin, strategy) = if label.is_pinned() {
                (label.position(), PlacementStrategy::Pinned)
            } else {
                let is_free = |cell: Cell| occupied.is_free_for_label(cell, id);
                match find_position(&station_layout.bounds, (width, height), is_free) {
                    Some(found) => found,
                    None => {
                        forced += 1;
                        let origin =
                            forced_position(&station_layout.bounds, (width, height), grid_size);
                        warn!(
                            "no free space for label of station {id}, forcing it to ({}, {})",
                            origin.0, origin.1
                        );
                        (origin, PlacementStrategy::Forced)
                    }
                }
            };
            label.set_position(origin.0, origin.1);

            let cells = footprint_cells(origin, (width, height));
            occupied.add_label_cells(id, &cells);
            layouts.push(LabelLayout {
                station: id,
                x: origin.0,
                y: origin.1,
                width,
                height,
                lines: label.name().to_vec(),
                strategy,
            });
        }
        debug!("placed {} labels ({} forced)", layouts.len(), forced);
        Ok(layouts)
    }
}

/// First structured placement whose whole footprint passes `is_free`:
/// centered on each side (right, bottom, left, top), then the same sides
/// sliding along the station until the label only touches it diagonally.
pub fn find_position(
    bounds: &StationBounds,
    size: (i32, i32),
    is_free: impl Fn(Cell) -> bool,
) -> Option<(Cell, PlacementStrategy)> {
    let fits = |origin: Cell| footprint_cells(origin, size).into_iter().all(&is_free);
    centered_candidates(bounds, size)
        .into_iter()
        .chain(sliding_candidates(bounds, size))
        .find(|(origin, _)| fits(*origin))
}

fn centered_candidates(bounds: &StationBounds, (w, h): (i32, i32)) -> Vec<(Cell, PlacementStrategy)> {
    let cx = centered(bounds.min.0, bounds.max.0, w);
    let cy = centered(bounds.min.1, bounds.max.1, h);
    vec![
        ((bounds.max.0 + 1, cy), PlacementStrategy::Right),
        ((cx, bounds.max.1 + 1), PlacementStrategy::Bottom),
        ((bounds.min.0 - w, cy), PlacementStrategy::Left),
        ((cx, bounds.min.1 - h), PlacementStrategy::Top),
    ]
}

fn sliding_candidates(bounds: &StationBounds, (w, h): (i32, i32)) -> Vec<(Cell, PlacementStrategy)> {
    let vertical = slides(bounds.min.1, bounds.max.1, h);
    let horizontal = slides(bounds.min.0, bounds.max.0, w);
    let mut candidates = Vec::new();
    candidates.extend(
        vertical
            .iter()
            .map(|y| ((bounds.max.0 + 1, *y), PlacementStrategy::RightSliding)),
    );
    candidates.extend(
        horizontal
            .iter()
            .map(|x| ((*x, bounds.max.1 + 1), PlacementStrategy::BottomSliding)),
    );
    candidates.extend(
        vertical
            .iter()
            .map(|y| ((bounds.min.0 - w, *y), PlacementStrategy::LeftSliding)),
    );
    candidates.extend(
        horizontal
            .iter()
            .map(|x| ((*x, bounds.min.1 - h), PlacementStrategy::TopSliding)),
    );
    candidates
}

/// Start of a `size`-long run centered on `[min, max]`, biased towards `min`.
fn centered(min: i32, max: i32, size: i32) -> i32 {
    min + (max - min + 1 - size).div_euclid(2)
}

/// Starts off the centered one, alternating away from it, for which the
/// run still touches `[min, max]` at least at a corner.
fn slides(min: i32, max: i32, size: i32) -> Vec<i32> {
    let center = centered(min, max, size);
    let (low, high) = (min - size, max + 1);
    let mut starts = Vec::new();
    let mut step = 1;
    while center + step <= high || center - step >= low {
        for start in [center + step, center - step] {
            if (low..=high).contains(&start) {
                starts.push(start);
            }
        }
        step += 1;
    }
    starts
}

/// Right of the station when the label fits inside the grid, else left.
fn forced_position(bounds: &StationBounds, (w, h): (i32, i32), grid_size: i32) -> Cell {
    let y = centered(bounds.min.1, bounds.max.1, h);
    if bounds.max.0 + 1 + w <= grid_size {
        (bounds.max.0 + 1, y)
    } else {
        (bounds.min.0 - w, y)
    }
}

fn footprint_cells(origin: Cell, (w, h): (i32, i32)) -> Vec<Cell> {
    (origin.1..origin.1 + h)
        .flat_map(|y| (origin.0..origin.0 + w).map(move |x| (x, y)))
        .collect()
}
