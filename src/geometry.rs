// Pure coordinate math shared by every layout pass: cell/pixel conversion,
// perpendicular offsets of route segments, rotation and the thick-line
// rasterizer used for occupancy.

use crate::config::LayoutConfig;
use crate::model::SizeSettings;
use std::collections::HashSet;

pub type Point = (f32, f32);
pub type Cell = (i32, i32);

const ANGLE_EPS: f32 = 1e-3;

/// One of the eight compass directions a connection can take on the grid.
///
/// Screen coordinates are used throughout: `y` grows downwards, so
/// `South` is `+y` and angles grow clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    South,
    North,
    East,
    West,
    SouthEast,
    NorthWest,
    SouthWest,
    NorthEast,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::South,
        Direction::North,
        Direction::East,
        Direction::West,
        Direction::SouthEast,
        Direction::NorthWest,
        Direction::SouthWest,
        Direction::NorthEast,
    ];

    /// Nearest direction for a delta; `None` when both components are zero.
    pub fn from_delta(dx: f32, dy: f32) -> Option<Self> {
        if dx.abs() < f32::EPSILON && dy.abs() < f32::EPSILON {
            return None;
        }
        let octant = (dy.atan2(dx).to_degrees() / 45.0).round() as i32;
        Some(match octant.rem_euclid(8) {
            0 => Direction::East,
            1 => Direction::SouthEast,
            2 => Direction::South,
            3 => Direction::SouthWest,
            4 => Direction::West,
            5 => Direction::NorthWest,
            6 => Direction::North,
            _ => Direction::NorthEast,
        })
    }

    pub fn between(from: Cell, to: Cell) -> Option<Self> {
        Self::from_delta((to.0 - from.0) as f32, (to.1 - from.1) as f32)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::South => Direction::North,
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::SouthEast => Direction::NorthWest,
            Direction::NorthWest => Direction::SouthEast,
            Direction::SouthWest => Direction::NorthEast,
            Direction::NorthEast => Direction::SouthWest,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Direction::East | Direction::West => Axis::Horizontal,
            Direction::North | Direction::South => Axis::Vertical,
            Direction::SouthEast | Direction::NorthWest => Axis::Falling,
            Direction::SouthWest | Direction::NorthEast => Axis::Rising,
        }
    }

    /// Clockwise screen angle in degrees, `East` being 0.
    pub fn angle(self) -> f32 {
        match self {
            Direction::East => 0.0,
            Direction::SouthEast => 45.0,
            Direction::South => 90.0,
            Direction::SouthWest => 135.0,
            Direction::West => 180.0,
            Direction::NorthWest => 225.0,
            Direction::North => 270.0,
            Direction::NorthEast => 315.0,
        }
    }

    pub fn unit(self) -> Point {
        let rad = self.angle().to_radians();
        (rad.cos(), rad.sin())
    }
}

/// Undirected line through a station; opposite directions share an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Axis {
    Horizontal,
    Falling,
    Vertical,
    Rising,
}

impl Axis {
    pub const ALL: [Axis; 4] = [Axis::Horizontal, Axis::Falling, Axis::Vertical, Axis::Rising];

    pub fn angle(self) -> f32 {
        match self {
            Axis::Horizontal => 0.0,
            Axis::Falling => 45.0,
            Axis::Vertical => 90.0,
            Axis::Rising => 135.0,
        }
    }

    /// Axes 45 degrees apart.
    pub fn is_adjacent(self, other: Axis) -> bool {
        !matches!(
            (self, other),
            (Axis::Horizontal, Axis::Horizontal | Axis::Vertical)
                | (Axis::Vertical, Axis::Vertical | Axis::Horizontal)
                | (Axis::Falling, Axis::Falling | Axis::Rising)
                | (Axis::Rising, Axis::Rising | Axis::Falling)
        )
    }

    pub fn orthogonal(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
            Axis::Falling => Axis::Rising,
            Axis::Rising => Axis::Falling,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

impl Segment {
    pub fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }

    pub fn reversed(self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }

    fn translated(self, by: Point) -> Self {
        Self {
            from: (self.from.0 + by.0, self.from.1 + by.1),
            to: (self.to.0 + by.0, self.to.1 + by.1),
        }
    }
}

/// Grid configuration for one redraw: cell size and line metrics in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub size: u32,
    pub cell_size: f32,
    pub line_width: f32,
    pub line_gap: f32,
}

impl Grid {
    pub fn new(settings: &SizeSettings, config: &LayoutConfig) -> Self {
        let line_width = settings.line_width();
        Self {
            size: settings.grid_size,
            cell_size: settings.cell_size(),
            line_width,
            line_gap: line_width * config.line_gap_factor.max(0.0),
        }
    }

    pub fn half_line_width(&self) -> f32 {
        self.line_width / 2.0
    }

    pub fn contains(&self, cell: Cell) -> bool {
        let size = self.size as i32;
        cell.0 >= 0 && cell.1 >= 0 && cell.0 < size && cell.1 < size
    }

    /// Pixel center of a grid cell.
    pub fn centrify(&self, cell: Cell) -> Point {
        let half = self.cell_size / 2.0;
        (
            cell.0 as f32 * self.cell_size + half,
            cell.1 as f32 * self.cell_size + half,
        )
    }

    pub fn cell_at(&self, point: Point) -> Cell {
        (
            (point.0 / self.cell_size).floor() as i32,
            (point.1 / self.cell_size).floor() as i32,
        )
    }

    /// Span covered by `count` parallel lines including the gaps between them.
    pub fn distance_of_parallel_lines(&self, count: usize) -> f32 {
        if count == 0 {
            return 0.0;
        }
        count as f32 * self.line_width + (count - 1) as f32 * self.line_gap
    }

    /// Perpendicular pixel offset of the line in `lane` out of `count`, centering
    /// the whole bundle on the true edge.
    pub fn lane_offset(&self, lane: usize, count: usize) -> f32 {
        let radius = self.distance_of_parallel_lines(count) / 2.0;
        -radius + self.half_line_width() + lane as f32 * (self.line_width + self.line_gap)
    }

    /// Cells covered by a segment drawn with the configured line width.
    ///
    /// Walks the center line and both boundary lines (offset by half the line
    /// width perpendicular to `direction`) and yields each cell once.
    pub fn digital_diff_analyzer(&self, segment: Segment, direction: Direction) -> DdaCells {
        let (ux, uy) = direction.unit();
        let half = self.half_line_width();
        let normal = (uy * half, -ux * half);
        let lines = vec![
            segment.translated((-normal.0, -normal.1)),
            segment.translated(normal),
            segment,
        ];
        DdaCells {
            lines,
            current: None,
            cell_size: self.cell_size,
            seen: HashSet::new(),
        }
    }
}

/// Shift a segment perpendicular to itself by `offset` pixels.
///
/// Negative offsets move to the right of the `from -> to` heading on screen,
/// positive ones to the left.
pub fn offset_connection(from: Point, to: Point, offset: f32) -> Segment {
    if offset == 0.0 {
        return Segment::new(from, to);
    }
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    let len = (dx * dx + dy * dy).sqrt();
    if len <= f32::EPSILON {
        return Segment::new(from, to);
    }
    let perp = (dy / len * offset, -dx / len * offset);
    Segment::new((from.0 + perp.0, from.1 + perp.1), (to.0 + perp.0, to.1 + perp.1))
}

pub fn rotate(points: &[Point], fulcrum: Point, angle_degrees: f32) -> Vec<Point> {
    let rad = angle_degrees.to_radians();
    let (sin, cos) = rad.sin_cos();
    points
        .iter()
        .map(|&(x, y)| {
            let rx = x - fulcrum.0;
            let ry = y - fulcrum.1;
            (
                fulcrum.0 + rx * cos - ry * sin,
                fulcrum.1 + rx * sin + ry * cos,
            )
        })
        .collect()
}

/// Clockwise screen angle of `from -> to` in degrees.
pub fn angle(from: Point, to: Point) -> f32 {
    (to.1 - from.1).atan2(to.0 - from.0).to_degrees()
}

pub fn is_right_angle_multiple(angle_degrees: f32) -> bool {
    let rem = angle_degrees.rem_euclid(90.0);
    rem < ANGLE_EPS || 90.0 - rem < ANGLE_EPS
}

/// Lazy cell sequence produced by [`Grid::digital_diff_analyzer`].
#[derive(Debug, Clone)]
pub struct DdaCells {
    lines: Vec<Segment>,
    current: Option<LineWalk>,
    cell_size: f32,
    seen: HashSet<Cell>,
}

impl Iterator for DdaCells {
    type Item = Cell;

    fn next(&mut self) -> Option<Cell> {
        loop {
            if self.current.is_none() {
                let segment = self.lines.pop()?;
                self.current = Some(LineWalk::new(segment, self.cell_size));
            }
            let step = self.current.as_mut().and_then(LineWalk::step);
            match step {
                Some(cell) => {
                    if self.seen.insert(cell) {
                        return Some(cell);
                    }
                }
                None => self.current = None,
            }
        }
    }
}

#[derive(Debug, Clone)]
struct LineWalk {
    x: f32,
    y: f32,
    step_x: f32,
    step_y: f32,
    remaining: usize,
}

impl LineWalk {
    fn new(segment: Segment, cell_size: f32) -> Self {
        let x0 = segment.from.0 / cell_size;
        let y0 = segment.from.1 / cell_size;
        let dx = segment.to.0 / cell_size - x0;
        let dy = segment.to.1 / cell_size - y0;
        let steps = dx.abs().max(dy.abs()).ceil() as usize;
        if steps == 0 {
            return Self {
                x: x0,
                y: y0,
                step_x: 0.0,
                step_y: 0.0,
                remaining: 1,
            };
        }
        Self {
            x: x0,
            y: y0,
            step_x: dx / steps as f32,
            step_y: dy / steps as f32,
            remaining: steps + 1,
        }
    }

    fn step(&mut self) -> Option<Cell> {
        if self.remaining == 0 {
            return None;
        }
        let cell = (self.x.floor() as i32, self.y.floor() as i32);
        self.x += self.step_x;
        self.y += self.step_y;
        self.remaining -= 1;
        Some(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid {
            size: 30,
            cell_size: 30.0,
            line_width: 6.0,
            line_gap: 3.0,
        }
    }

    #[test]
    fn direction_from_delta_rounds_to_nearest_octant() {
        assert_eq!(Direction::from_delta(1.0, 0.0), Some(Direction::East));
        assert_eq!(Direction::from_delta(0.0, 1.0), Some(Direction::South));
        assert_eq!(Direction::from_delta(-2.0, -2.0), Some(Direction::NorthWest));
        assert_eq!(Direction::from_delta(3.0, 1.0), Some(Direction::East));
        assert_eq!(Direction::from_delta(2.0, 1.0), Some(Direction::SouthEast));
        assert_eq!(Direction::from_delta(1.0, -3.0), Some(Direction::North));
        assert_eq!(Direction::from_delta(0.0, 0.0), None);
    }

    #[test]
    fn opposite_directions_share_an_axis() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_eq!(dir.axis(), dir.opposite().axis());
        }
        assert!(Axis::Horizontal.is_adjacent(Axis::Rising));
        assert!(!Axis::Horizontal.is_adjacent(Axis::Vertical));
        assert_eq!(Axis::Falling.orthogonal(), Axis::Rising);
    }

    #[test]
    fn centrify_returns_cell_center() {
        assert_eq!(grid().centrify((2, 3)), (75.0, 105.0));
        assert_eq!(grid().cell_at((75.0, 105.0)), (2, 3));
    }

    #[test]
    fn parallel_line_distance() {
        let g = grid();
        assert_eq!(g.distance_of_parallel_lines(1), 6.0);
        assert_eq!(g.distance_of_parallel_lines(2), 15.0);
        assert_eq!(g.distance_of_parallel_lines(0), 0.0);
    }

    #[test]
    fn lane_offsets_are_centered() {
        let g = grid();
        assert_eq!(g.lane_offset(0, 1), 0.0);
        let first = g.lane_offset(0, 3);
        let last = g.lane_offset(2, 3);
        assert!((first + last).abs() < 1e-4);
        assert!((g.lane_offset(1, 3)).abs() < 1e-4);
    }

    #[test]
    fn zero_offset_returns_input() {
        let seg = offset_connection((1.0, 2.0), (7.0, 9.0), 0.0);
        assert_eq!(seg, Segment::new((1.0, 2.0), (7.0, 9.0)));
    }

    #[test]
    fn negative_offset_moves_right_of_heading() {
        // Heading east, right-hand side on screen is +y.
        let seg = offset_connection((0.0, 0.0), (10.0, 0.0), -2.0);
        assert_eq!(seg.from, (0.0, 2.0));
        assert_eq!(seg.to, (10.0, 2.0));
    }

    #[test]
    fn rotate_quarter_turn() {
        let rotated = rotate(&[(2.0, 0.0)], (0.0, 0.0), 90.0);
        assert!((rotated[0].0).abs() < 1e-5);
        assert!((rotated[0].1 - 2.0).abs() < 1e-5);
    }

    #[test]
    fn angle_of_diagonal() {
        assert!((angle((0.0, 0.0), (1.0, 1.0)) - 45.0).abs() < 1e-4);
        assert!(is_right_angle_multiple(180.0));
        assert!(!is_right_angle_multiple(45.0));
    }

    #[test]
    fn dda_covers_center_and_boundary_cells() {
        let g = Grid {
            line_width: 30.0,
            ..grid()
        };
        // Horizontal segment through row 2 spanning exactly cell (2, 2).
        let seg = Segment::new((60.0, 75.0), (89.0, 75.0));
        let cells: Vec<Cell> = g.digital_diff_analyzer(seg, Direction::East).collect();
        assert!(cells.contains(&(2, 2)));
        let upper = g.cell_at((60.0, 75.0 - g.half_line_width()));
        let lower = g.cell_at((60.0, 75.0 + g.half_line_width()));
        assert!(cells.contains(&upper));
        assert!(cells.contains(&lower));
        let unique: HashSet<Cell> = cells.iter().copied().collect();
        assert_eq!(unique.len(), cells.len());
    }

    #[test]
    fn dda_is_restartable() {
        let g = grid();
        let seg = Segment::new(g.centrify((1, 1)), g.centrify((4, 4)));
        let first: Vec<Cell> = g.digital_diff_analyzer(seg, Direction::SouthEast).collect();
        let second: Vec<Cell> = g.digital_diff_analyzer(seg, Direction::SouthEast).collect();
        assert_eq!(first, second);
        for i in 1..=4 {
            assert!(first.contains(&(i, i)));
        }
    }
}
