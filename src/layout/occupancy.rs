use super::StationBounds;
use crate::geometry::Cell;
use crate::model::{EdgeKey, StationId};
use std::collections::{BTreeMap, HashMap};

/// Grid cells claimed during one redraw, split by what claimed them.
#[derive(Debug, Clone, Default)]
pub struct OccupiedCells {
    grid_size: i32,
    routes: HashMap<Cell, Vec<EdgeKey>>,
    stations: BTreeMap<StationId, StationBounds>,
    labels: HashMap<Cell, StationId>,
}

impl OccupiedCells {
    pub fn new(grid_size: u32) -> Self {
        Self {
            grid_size: grid_size as i32,
            ..Self::default()
        }
    }

    pub fn clear(&mut self) {
        self.routes.clear();
        self.stations.clear();
        self.labels.clear();
    }

    pub fn in_grid(&self, cell: Cell) -> bool {
        cell.0 >= 0 && cell.1 >= 0 && cell.0 < self.grid_size && cell.1 < self.grid_size
    }

    pub fn add_route_cell(&mut self, cell: Cell, edge: EdgeKey) {
        let edges = self.routes.entry(cell).or_default();
        if !edges.contains(&edge) {
            edges.push(edge);
        }
    }

    pub fn add_station(&mut self, station: StationId, bounds: StationBounds) {
        self.stations.insert(station, bounds);
    }

    pub fn add_label_cells(&mut self, station: StationId, cells: &[Cell]) {
        for cell in cells {
            self.labels.insert(*cell, station);
        }
    }

    pub fn is_route_cell(&self, cell: Cell) -> bool {
        self.routes.contains_key(&cell)
    }

    pub fn is_label_cell(&self, cell: Cell) -> bool {
        self.labels.contains_key(&cell)
    }

    pub fn station_at(&self, cell: Cell) -> Option<StationId> {
        self.stations
            .iter()
            .find(|(_, bounds)| bounds.contains(cell))
            .map(|(id, _)| *id)
    }

    fn is_near_station(&self, cell: Cell, except: Option<StationId>) -> bool {
        self.stations
            .iter()
            .any(|(id, bounds)| Some(*id) != except && bounds.surrounds(cell))
    }

    /// Free of every route, station (including margins) and label.
    pub fn is_fully_available(&self, cell: Cell) -> bool {
        self.in_grid(cell)
            && !self.is_route_cell(cell)
            && !self.is_label_cell(cell)
            && !self.is_near_station(cell, None)
    }

    /// Whether `station` could be dropped on `cell`: lines incident to the
    /// dragged station and all labels are ignored.
    pub fn is_free_for_drop(&self, cell: Cell, station: StationId) -> bool {
        if !self.in_grid(cell) || self.is_near_station(cell, Some(station)) {
            return false;
        }
        match self.routes.get(&cell) {
            Some(edges) => edges.iter().all(|edge| edge.touches(station)),
            None => true,
        }
    }

    /// Whether a label of `owner` may cover `cell`. The owner's own margin is
    /// usable, its core footprint is not.
    pub fn is_free_for_label(&self, cell: Cell, owner: StationId) -> bool {
        if !self.in_grid(cell) || self.is_route_cell(cell) || self.is_label_cell(cell) {
            return false;
        }
        self.stations.iter().all(|(id, bounds)| {
            if *id == owner {
                !bounds.contains(cell)
            } else {
                !bounds.surrounds(cell)
            }
        })
    }

    pub fn route_cell_count(&self) -> usize {
        self.routes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_grid_cells_are_never_available() {
        let occupied = OccupiedCells::new(10);
        assert!(occupied.is_fully_available((0, 0)));
        assert!(!occupied.is_fully_available((-1, 0)));
        assert!(!occupied.is_fully_available((10, 3)));
    }

    #[test]
    fn drop_ignores_incident_lines() {
        let mut occupied = OccupiedCells::new(10);
        let a = StationId(1);
        let b = StationId(2);
        let c = StationId(3);
        occupied.add_route_cell((4, 4), EdgeKey::new(a, b));
        assert!(occupied.is_free_for_drop((4, 4), a));
        assert!(!occupied.is_free_for_drop((4, 4), c));
        assert!(!occupied.is_fully_available((4, 4)));
    }

    #[test]
    fn drop_respects_other_station_margins() {
        let mut occupied = OccupiedCells::new(10);
        occupied.add_station(StationId(1), StationBounds::single((2, 2)));
        assert!(!occupied.is_free_for_drop((3, 3), StationId(2)));
        assert!(occupied.is_free_for_drop((3, 3), StationId(1)));
        assert!(occupied.is_free_for_drop((4, 4), StationId(2)));
    }

    #[test]
    fn label_may_use_own_margin_only() {
        let mut occupied = OccupiedCells::new(10);
        occupied.add_station(StationId(1), StationBounds::single((2, 2)));
        occupied.add_station(StationId(2), StationBounds::single((6, 2)));
        assert!(occupied.is_free_for_label((3, 2), StationId(1)));
        assert!(!occupied.is_free_for_label((2, 2), StationId(1)));
        assert!(!occupied.is_free_for_label((5, 2), StationId(1)));
        occupied.add_label_cells(StationId(1), &[(3, 2)]);
        assert!(!occupied.is_free_for_label((3, 2), StationId(2)));
        assert_eq!(occupied.station_at((6, 2)), Some(StationId(2)));
    }
}
