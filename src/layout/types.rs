use crate::geometry::{Cell, Point};
use crate::model::{RouteId, StationId};
use std::fmt;
use std::str::FromStr;

/// One drawable piece of a route between two adjacent stations, already
/// shifted into its lane.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSegment {
    pub route: RouteId,
    pub from_station: StationId,
    pub to_station: StationId,
    pub from: Point,
    pub to: Point,
    pub lane: usize,
    pub bundle_size: usize,
    pub color: String,
    pub dashed: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StationShape {
    Circle {
        center: Point,
        radius: f32,
    },
    /// Rectangle centered on `center`, `width` along the rotated x axis.
    Rect {
        center: Point,
        width: f32,
        height: f32,
        angle: f32,
    },
}

impl StationShape {
    pub fn center(&self) -> Point {
        match self {
            StationShape::Circle { center, .. } | StationShape::Rect { center, .. } => *center,
        }
    }
}

/// Grid extents of a rendered station, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationBounds {
    pub min: Cell,
    pub max: Cell,
    /// Extended extent other stations must keep clear of.
    pub surrounding_min: Cell,
    pub surrounding_max: Cell,
    pub is_inclined: bool,
}

impl StationBounds {
    pub fn single(cell: Cell) -> Self {
        Self {
            min: cell,
            max: cell,
            surrounding_min: (cell.0 - 1, cell.1 - 1),
            surrounding_max: (cell.0 + 1, cell.1 + 1),
            is_inclined: false,
        }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        in_range(cell, self.min, self.max)
    }

    pub fn surrounds(&self, cell: Cell) -> bool {
        in_range(cell, self.surrounding_min, self.surrounding_max)
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        cell_range(self.min, self.max)
    }

    pub fn surrounding_cells(&self) -> impl Iterator<Item = Cell> {
        cell_range(self.surrounding_min, self.surrounding_max)
    }
}

fn in_range(cell: Cell, min: Cell, max: Cell) -> bool {
    cell.0 >= min.0 && cell.0 <= max.0 && cell.1 >= min.1 && cell.1 <= max.1
}

fn cell_range(min: Cell, max: Cell) -> impl Iterator<Item = Cell> {
    (min.1..=max.1).flat_map(move |y| (min.0..=max.0).map(move |x| (x, y)))
}

#[derive(Debug, Clone, PartialEq)]
pub struct StationLayout {
    pub id: StationId,
    pub shape: StationShape,
    pub bounds: StationBounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementStrategy {
    Right,
    Bottom,
    Left,
    Top,
    RightSliding,
    BottomSliding,
    LeftSliding,
    TopSliding,
    Forced,
    Pinned,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelLayout {
    pub station: StationId,
    /// Top-left cell of the footprint.
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub lines: Vec<String>,
    pub strategy: PlacementStrategy,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub from: Point,
    pub to: Point,
}

/// Drawable output of one full redraw.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    pub cell_size: f32,
    pub line_width: f32,
    pub segments: Vec<RouteSegment>,
    pub stations: Vec<StationLayout>,
    pub labels: Vec<LabelLayout>,
    pub grid: Vec<GridLine>,
}

impl Layout {
    pub fn station(&self, id: StationId) -> Option<&StationLayout> {
        self.stations.iter().find(|station| station.id == id)
    }

    pub fn label(&self, station: StationId) -> Option<&LabelLayout> {
        self.labels.iter().find(|label| label.station == station)
    }

    pub fn route_segments(&self, route: RouteId) -> impl Iterator<Item = &RouteSegment> {
        self.segments.iter().filter(move |segment| segment.route == route)
    }
}

/// Identifier the renderer stamps on drawn elements so host UI events can be
/// mapped back to map objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementId {
    Station(StationId),
    Route(RouteId),
    Label(StationId),
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementId::Station(id) => write!(f, "station-{id}"),
            ElementId::Route(id) => write!(f, "route-{id}"),
            ElementId::Label(id) => write!(f, "label-{id}"),
        }
    }
}

impl FromStr for ElementId {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (kind, id) = value.rsplit_once('-').ok_or(())?;
        let id: u32 = id.parse().map_err(|_| ())?;
        match kind {
            "station" => Ok(ElementId::Station(StationId(id))),
            "route" => Ok(ElementId::Route(RouteId(id))),
            "label" => Ok(ElementId::Label(StationId(id))),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_ids_round_trip_through_strings() {
        for id in [
            ElementId::Station(StationId(3)),
            ElementId::Route(RouteId(12)),
            ElementId::Label(StationId(0)),
        ] {
            assert_eq!(id.to_string().parse::<ElementId>(), Ok(id));
        }
        assert!("bogus-1".parse::<ElementId>().is_err());
        assert!("station-x".parse::<ElementId>().is_err());
    }

    #[test]
    fn single_cell_bounds_reserve_a_ring() {
        let bounds = StationBounds::single((5, 5));
        assert!(bounds.contains((5, 5)));
        assert!(!bounds.contains((6, 5)));
        assert!(bounds.surrounds((6, 4)));
        assert_eq!(bounds.surrounding_cells().count(), 9);
    }
}
