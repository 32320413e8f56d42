use super::{EdgeKey, StationId, Stations};
use crate::geometry::Direction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(pub u32);

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single line color, or two colors drawn as a dashed bicolor line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteColor {
    Single(String),
    Dual(String, String),
}

impl RouteColor {
    pub fn primary(&self) -> &str {
        match self {
            RouteColor::Single(color) | RouteColor::Dual(color, _) => color,
        }
    }

    pub fn secondary(&self) -> Option<&str> {
        match self {
            RouteColor::Single(_) => None,
            RouteColor::Dual(_, color) => Some(color),
        }
    }
}

/// One step of a route, linked to its neighbours by index into
/// [`Route::connections`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteConnection {
    pub from: StationId,
    pub to: StationId,
    pub prev: Option<usize>,
    pub next: Option<usize>,
}

impl RouteConnection {
    pub fn edge(&self) -> EdgeKey {
        EdgeKey::new(self.from, self.to)
    }

    /// Direction of travel; `None` for co-located or missing stations.
    pub fn direction(&self, stations: &Stations) -> Option<Direction> {
        let from = stations.get(&self.from)?.position();
        let to = stations.get(&self.to)?.position();
        Direction::between(from, to)
    }

    /// Whether the route travels this edge from its lower-id station.
    pub fn is_canonical(&self) -> bool {
        self.from <= self.to
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    id: RouteId,
    color: RouteColor,
    stations: Vec<StationId>,
    connections: Vec<RouteConnection>,
}

impl Route {
    pub fn new(id: RouteId, color: RouteColor) -> Self {
        Self {
            id,
            color,
            stations: Vec::new(),
            connections: Vec::new(),
        }
    }

    pub fn id(&self) -> RouteId {
        self.id
    }

    pub fn color(&self) -> &RouteColor {
        &self.color
    }

    pub(crate) fn set_color(&mut self, color: RouteColor) {
        self.color = color;
    }

    pub fn stations(&self) -> &[StationId] {
        &self.stations
    }

    pub fn first(&self) -> Option<StationId> {
        self.stations.first().copied()
    }

    pub fn last(&self) -> Option<StationId> {
        self.stations.last().copied()
    }

    pub fn contains(&self, station: StationId) -> bool {
        self.stations.contains(&station)
    }

    /// Append a station. Loop checks belong to the caller.
    pub fn add_connection(&mut self, station: StationId) -> bool {
        self.stations.push(station);
        self.rebuild();
        true
    }

    pub fn prepend_connection(&mut self, station: StationId) -> bool {
        self.stations.insert(0, station);
        self.rebuild();
        true
    }

    /// Remove every occurrence of `station`, joining its neighbours.
    ///
    /// A joined step that would stay in place or run over an edge the route
    /// already uses is dropped, and a route reduced to a single station is
    /// emptied. Returns how many occurrences were removed.
    pub fn remove_connection(&mut self, station: StationId) -> usize {
        let removed = self.stations.iter().filter(|&&id| id == station).count();
        if removed == 0 {
            return 0;
        }
        let mut joined: Vec<StationId> = Vec::with_capacity(self.stations.len() - removed);
        let mut used = BTreeSet::new();
        for id in self.stations.iter().copied().filter(|&id| id != station) {
            if let Some(&last) = joined.last() {
                if last == id || !used.insert(EdgeKey::new(last, id)) {
                    continue;
                }
            }
            joined.push(id);
        }
        if joined.len() < 2 {
            joined.clear();
        }
        self.stations = joined;
        self.rebuild();
        removed
    }

    pub fn reverse(&mut self) {
        self.stations.reverse();
        self.rebuild();
    }

    pub fn connections(&self) -> &[RouteConnection] {
        &self.connections
    }

    /// First connection of this route running over `edge`.
    pub fn find_connection(&self, edge: EdgeKey) -> Option<usize> {
        self.connections.iter().position(|conn| conn.edge() == edge)
    }

    pub fn edges(&self) -> BTreeSet<EdgeKey> {
        self.connections.iter().map(RouteConnection::edge).collect()
    }

    fn rebuild(&mut self) {
        let count = self.stations.len().saturating_sub(1);
        self.connections = self
            .stations
            .windows(2)
            .enumerate()
            .map(|(idx, pair)| RouteConnection {
                from: pair[0],
                to: pair[1],
                prev: idx.checked_sub(1),
                next: (idx + 1 < count).then_some(idx + 1),
            })
            .collect();
    }
}
