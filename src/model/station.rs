use crate::geometry::Cell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(pub u32);

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type Stations = BTreeMap<StationId, Station>;

/// Display name of a station plus where it sits on the grid.
///
/// `width` is the longest line in characters and `height` the number of
/// lines; both follow `name`. The position is the top-left cell of the
/// label footprint.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    name: Vec<String>,
    width: usize,
    height: usize,
    x: i32,
    y: i32,
    pinned: bool,
}

impl Label {
    pub fn new(name: Vec<String>) -> Self {
        let mut label = Self {
            name: Vec::new(),
            width: 0,
            height: 0,
            x: 0,
            y: 0,
            pinned: false,
        };
        label.set_name(name);
        label
    }

    pub fn name(&self) -> &[String] {
        &self.name
    }

    /// An empty name becomes a single empty line; a label always has one.
    pub fn set_name(&mut self, mut name: Vec<String>) {
        if name.is_empty() {
            name.push(String::new());
        }
        self.width = name.iter().map(|line| line.chars().count()).max().unwrap_or(0);
        self.height = name.len();
        self.name = name;
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn position(&self) -> Cell {
        (self.x, self.y)
    }

    /// Position chosen by automatic placement; ignored while pinned.
    pub fn set_position(&mut self, x: i32, y: i32) {
        if !self.pinned {
            self.x = x;
            self.y = y;
        }
    }

    /// User override: the label stays here until unpinned.
    pub fn pin_at(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
        self.pinned = true;
    }

    pub fn unpin(&mut self) {
        self.pinned = false;
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Footprint in grid cells, at least one cell each way.
    pub fn footprint(&self, chars_per_cell: usize) -> (i32, i32) {
        let per_cell = chars_per_cell.max(1);
        let w = self.width.div_ceil(per_cell).max(1);
        (w as i32, self.height.max(1) as i32)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    id: StationId,
    x: i32,
    y: i32,
    label: Label,
}

impl Station {
    pub fn new(id: StationId, x: i32, y: i32, label: Label) -> Self {
        Self { id, x, y, label }
    }

    pub fn id(&self) -> StationId {
        self.id
    }

    pub fn position(&self) -> Cell {
        (self.x, self.y)
    }

    pub(crate) fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn label_mut(&mut self) -> &mut Label {
        &mut self.label
    }
}
