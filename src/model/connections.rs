use super::{RouteId, StationId};
use crate::error::{Error, Result};
use std::collections::{BTreeSet, HashMap};

/// Unordered station pair; `(a, b)` and `(b, a)` build the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeKey {
    low: StationId,
    high: StationId,
}

impl EdgeKey {
    pub fn new(a: StationId, b: StationId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// Canonical start of the edge (lower station id).
    pub fn first(&self) -> StationId {
        self.low
    }

    pub fn second(&self) -> StationId {
        self.high
    }

    pub fn touches(&self, station: StationId) -> bool {
        self.low == station || self.high == station
    }
}

/// Index of which routes run over which edge.
#[derive(Debug, Clone, Default)]
pub struct ConnectionsManager {
    edges: HashMap<EdgeKey, BTreeSet<RouteId>>,
}

impl ConnectionsManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `route` on the edge, creating it when absent. Returns `false`
    /// when the route already uses the edge.
    pub fn add(&mut self, from: StationId, to: StationId, route: RouteId) -> bool {
        self.edges
            .entry(EdgeKey::new(from, to))
            .or_default()
            .insert(route)
    }

    pub fn get(&self, from: StationId, to: StationId) -> Result<&BTreeSet<RouteId>> {
        self.edges
            .get(&EdgeKey::new(from, to))
            .ok_or(Error::EdgeNotFound { from, to })
    }

    pub fn contains(&self, from: StationId, to: StationId) -> bool {
        self.edges.contains_key(&EdgeKey::new(from, to))
    }

    /// Drop `route` from the edge; an edge left without routes is deleted.
    pub fn remove(&mut self, from: StationId, to: StationId, route: RouteId) -> bool {
        let key = EdgeKey::new(from, to);
        let Some(routes) = self.edges.get_mut(&key) else {
            return false;
        };
        let removed = routes.remove(&route);
        if routes.is_empty() {
            self.edges.remove(&key);
        }
        removed
    }

    pub fn remove_entire_route(&mut self, route: RouteId) {
        self.edges.retain(|_, routes| {
            routes.remove(&route);
            !routes.is_empty()
        });
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn edges(&self) -> impl Iterator<Item = (&EdgeKey, &BTreeSet<RouteId>)> {
        self.edges.iter()
    }

    pub fn clear(&mut self) {
        self.edges.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: StationId = StationId(1);
    const B: StationId = StationId(2);
    const C: StationId = StationId(3);

    #[test]
    fn edge_lookup_is_symmetric() {
        let mut manager = ConnectionsManager::new();
        assert!(manager.add(A, B, RouteId(7)));
        assert!(manager.add(B, A, RouteId(8)));
        let forward = manager.get(A, B).unwrap().clone();
        let backward = manager.get(B, A).unwrap().clone();
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 2);
    }

    #[test]
    fn duplicate_add_is_reported() {
        let mut manager = ConnectionsManager::new();
        assert!(manager.add(A, B, RouteId(1)));
        assert!(!manager.add(B, A, RouteId(1)));
        assert_eq!(manager.get(A, B).unwrap().len(), 1);
    }

    #[test]
    fn removing_last_route_deletes_edge() {
        let mut manager = ConnectionsManager::new();
        manager.add(A, B, RouteId(1));
        manager.remove(A, B, RouteId(1));
        assert!(matches!(
            manager.get(A, B),
            Err(Error::EdgeNotFound { .. })
        ));
        assert!(manager.is_empty());
    }

    #[test]
    fn unknown_edge_is_not_found() {
        let manager = ConnectionsManager::new();
        assert!(manager.get(A, C).is_err());
    }

    #[test]
    fn remove_entire_route_prunes_emptied_edges() {
        let mut manager = ConnectionsManager::new();
        manager.add(A, B, RouteId(1));
        manager.add(B, C, RouteId(1));
        manager.add(B, C, RouteId(2));
        manager.remove_entire_route(RouteId(1));
        assert!(!manager.contains(A, B));
        assert_eq!(
            manager.get(C, B).unwrap().iter().copied().collect::<Vec<_>>(),
            vec![RouteId(2)]
        );
    }
}
