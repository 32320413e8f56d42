use super::{
    ConnectionsManager, EdgeKey, Label, Route, RouteColor, RouteId, Station, StationId, Stations,
};
use crate::error::{Error, Result};
use crate::geometry::Cell;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Grid and canvas dimensions shared by every layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeSettings {
    /// Cells per side.
    pub grid_size: u32,
    /// Canvas side in pixels.
    pub canvas_size: u32,
    /// Line width relative to the cell size.
    pub line_width_factor: f32,
}

impl Default for SizeSettings {
    fn default() -> Self {
        Self {
            grid_size: 30,
            canvas_size: 900,
            line_width_factor: 0.2,
        }
    }
}

impl SizeSettings {
    pub fn cell_size(&self) -> f32 {
        self.canvas_size as f32 / self.grid_size.max(1) as f32
    }

    pub fn line_width(&self) -> f32 {
        self.cell_size() * self.line_width_factor
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.grid_size == 0 {
            return Err(Error::invalid("gridSize", "settings", "must be greater than 0"));
        }
        if self.canvas_size == 0 {
            return Err(Error::invalid("canvasSize", "settings", "must be greater than 0"));
        }
        if !(self.line_width_factor > 0.0) {
            return Err(Error::invalid(
                "lineWidthFactor",
                "settings",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Recoverable domain-rule violations reported by connection edits. The map
/// is left untouched whenever one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleViolation {
    #[error("station {station} cannot be connected to itself (loop)")]
    LoopToSelf { station: StationId },

    #[error("connection between stations {from} and {to} already exists")]
    DuplicateConnection { from: StationId, to: StationId },

    #[error("route {0} does not exist")]
    UnknownRoute(RouteId),

    #[error("station {0} does not exist")]
    UnknownStation(StationId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    StationAdded(StationId),
    StationRemoved(StationId),
    StationMoved { id: StationId, from: Cell, to: Cell },
    StationRenamed(StationId),
    RouteAdded(RouteId),
    RouteRemoved(RouteId),
    RouteChanged(RouteId),
    RouteSelected(Option<RouteId>),
    Cleared,
    Loaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&MapEvent)>;

#[derive(Clone, Copy)]
enum RouteEnd {
    Head,
    Tail,
}

/// Aggregate root: stations, routes, the edge index and size settings.
pub struct SubwayMap {
    name: String,
    settings: SizeSettings,
    stations: Stations,
    routes: BTreeMap<RouteId, Route>,
    connections: ConnectionsManager,
    selected_route: Option<RouteId>,
    next_station_id: u32,
    next_route_id: u32,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl fmt::Debug for SubwayMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubwayMap")
            .field("name", &self.name)
            .field("settings", &self.settings)
            .field("stations", &self.stations)
            .field("routes", &self.routes)
            .field("connections", &self.connections)
            .field("selected_route", &self.selected_route)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for SubwayMap {
    fn default() -> Self {
        Self::new(SizeSettings::default())
    }
}

impl SubwayMap {
    pub fn new(settings: SizeSettings) -> Self {
        Self {
            name: String::new(),
            settings,
            stations: Stations::new(),
            routes: BTreeMap::new(),
            connections: ConnectionsManager::new(),
            selected_route: None,
            next_station_id: 0,
            next_route_id: 0,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn settings(&self) -> &SizeSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: SizeSettings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    pub fn stations(&self) -> &Stations {
        &self.stations
    }

    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.stations.get(&id)
    }

    pub(crate) fn stations_mut(&mut self) -> &mut Stations {
        &mut self.stations
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.values()
    }

    pub fn route(&self, id: RouteId) -> Option<&Route> {
        self.routes.get(&id)
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn connections(&self) -> &ConnectionsManager {
        &self.connections
    }

    pub fn selected_route(&self) -> Option<RouteId> {
        self.selected_route
    }

    pub fn subscribe(&mut self, listener: impl Fn(&MapEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.retain(|(sub, _)| *sub != id);
    }

    fn emit(&self, event: MapEvent) {
        for (_, listener) in &self.listeners {
            listener(&event);
        }
    }

    pub fn new_station(&mut self, x: i32, y: i32, name: Vec<String>) -> StationId {
        let id = StationId(self.next_station_id);
        self.insert_station(Station::new(id, x, y, Label::new(name)));
        id
    }

    pub(crate) fn insert_station(&mut self, station: Station) {
        let id = station.id();
        self.next_station_id = self.next_station_id.max(id.0 + 1);
        self.stations.insert(id, station);
        self.emit(MapEvent::StationAdded(id));
    }

    /// Remove a station from every route that visits it, then from the map.
    pub fn remove_station(&mut self, id: StationId) -> Result<Station> {
        if !self.stations.contains_key(&id) {
            return Err(Error::StationNotFound(id));
        }
        let visiting: Vec<RouteId> = self
            .routes
            .values()
            .filter(|route| route.contains(id))
            .map(Route::id)
            .collect();
        for route in visiting {
            self.remove_station_from_route(route, id)?;
        }
        let station = self
            .stations
            .remove(&id)
            .ok_or(Error::StationNotFound(id))?;
        self.emit(MapEvent::StationRemoved(id));
        Ok(station)
    }

    pub fn move_station(&mut self, id: StationId, x: i32, y: i32) -> Result<()> {
        let station = self
            .stations
            .get_mut(&id)
            .ok_or(Error::StationNotFound(id))?;
        let from = station.position();
        station.set_position(x, y);
        self.emit(MapEvent::StationMoved {
            id,
            from,
            to: (x, y),
        });
        Ok(())
    }

    pub fn rename_station(&mut self, id: StationId, name: Vec<String>) -> Result<()> {
        let station = self
            .stations
            .get_mut(&id)
            .ok_or(Error::StationNotFound(id))?;
        station.label_mut().set_name(name);
        self.emit(MapEvent::StationRenamed(id));
        Ok(())
    }

    pub fn pin_label(&mut self, id: StationId, x: i32, y: i32) -> Result<()> {
        let station = self
            .stations
            .get_mut(&id)
            .ok_or(Error::StationNotFound(id))?;
        station.label_mut().pin_at(x, y);
        self.emit(MapEvent::StationRenamed(id));
        Ok(())
    }

    pub fn new_route(&mut self, color: RouteColor) -> RouteId {
        let id = RouteId(self.next_route_id);
        self.insert_route(Route::new(id, color));
        id
    }

    fn insert_route(&mut self, route: Route) {
        let id = route.id();
        self.next_route_id = self.next_route_id.max(id.0 + 1);
        self.routes.insert(id, route);
        self.emit(MapEvent::RouteAdded(id));
    }

    pub fn remove_route(&mut self, id: RouteId) -> Result<Route> {
        let route = self.routes.remove(&id).ok_or(Error::RouteNotFound(id))?;
        self.connections.remove_entire_route(id);
        if self.selected_route == Some(id) {
            self.selected_route = None;
        }
        self.emit(MapEvent::RouteRemoved(id));
        Ok(route)
    }

    pub fn set_route_color(&mut self, id: RouteId, color: RouteColor) -> Result<()> {
        let route = self.routes.get_mut(&id).ok_or(Error::RouteNotFound(id))?;
        route.set_color(color);
        self.emit(MapEvent::RouteChanged(id));
        Ok(())
    }

    /// Extend a route at its tail with `station`.
    pub fn new_connection(
        &mut self,
        route: RouteId,
        station: StationId,
    ) -> std::result::Result<(), RuleViolation> {
        self.extend_route(route, station, RouteEnd::Tail)
    }

    /// Extend a route at its head with `station`.
    pub fn prepend_connection(
        &mut self,
        route: RouteId,
        station: StationId,
    ) -> std::result::Result<(), RuleViolation> {
        self.extend_route(route, station, RouteEnd::Head)
    }

    fn extend_route(
        &mut self,
        route_id: RouteId,
        station: StationId,
        end: RouteEnd,
    ) -> std::result::Result<(), RuleViolation> {
        if !self.stations.contains_key(&station) {
            return Err(RuleViolation::UnknownStation(station));
        }
        let route = self
            .routes
            .get_mut(&route_id)
            .ok_or(RuleViolation::UnknownRoute(route_id))?;
        let anchor = match end {
            RouteEnd::Head => route.first(),
            RouteEnd::Tail => route.last(),
        };
        if let Some(anchor) = anchor {
            if anchor == station {
                return Err(RuleViolation::LoopToSelf { station });
            }
            if !self.connections.add(anchor, station, route_id) {
                return Err(RuleViolation::DuplicateConnection {
                    from: anchor,
                    to: station,
                });
            }
        }
        match end {
            RouteEnd::Head => route.prepend_connection(station),
            RouteEnd::Tail => route.add_connection(station),
        };
        self.emit(MapEvent::RouteChanged(route_id));
        Ok(())
    }

    /// Drop every occurrence of `station` from the route and repair the edge
    /// index for the joined neighbours.
    pub fn remove_station_from_route(&mut self, route_id: RouteId, station: StationId) -> Result<usize> {
        let route = self
            .routes
            .get_mut(&route_id)
            .ok_or(Error::RouteNotFound(route_id))?;
        let before = route.edges();
        let removed = route.remove_connection(station);
        if removed == 0 {
            return Ok(0);
        }
        let after = route.edges();
        for edge in before.difference(&after) {
            self.connections.remove(edge.first(), edge.second(), route_id);
        }
        for edge in after.difference(&before) {
            self.connections.add(edge.first(), edge.second(), route_id);
        }
        debug!(
            "removed station {station} from route {route_id} ({removed} occurrence(s), {} edge(s) left)",
            after.len()
        );
        self.emit(MapEvent::RouteChanged(route_id));
        Ok(removed)
    }

    pub fn reverse_route(&mut self, id: RouteId) -> Result<()> {
        let route = self.routes.get_mut(&id).ok_or(Error::RouteNotFound(id))?;
        route.reverse();
        self.emit(MapEvent::RouteChanged(id));
        Ok(())
    }

    pub fn select_route(&mut self, id: RouteId) -> Result<()> {
        if !self.routes.contains_key(&id) {
            return Err(Error::RouteNotFound(id));
        }
        self.selected_route = Some(id);
        self.emit(MapEvent::RouteSelected(Some(id)));
        Ok(())
    }

    pub fn deselect_route(&mut self) {
        self.selected_route = None;
        self.emit(MapEvent::RouteSelected(None));
    }

    /// Routes currently running over the edge between `a` and `b`.
    pub fn routes_on(&self, a: StationId, b: StationId) -> Result<Vec<RouteId>> {
        Ok(self.connections.get(a, b)?.iter().copied().collect())
    }

    pub fn edge_count(&self) -> usize {
        self.connections.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.connections.edges().map(|(key, _)| *key)
    }

    pub fn clear(&mut self) {
        self.reset_contents();
        self.emit(MapEvent::Cleared);
    }

    fn reset_contents(&mut self) {
        self.name.clear();
        self.stations.clear();
        self.routes.clear();
        self.connections.clear();
        self.selected_route = None;
        self.next_station_id = 0;
        self.next_route_id = 0;
    }

    /// Swap in the contents of a fully built map, keeping listeners.
    pub(crate) fn replace_contents(&mut self, other: SubwayMap) {
        self.name = other.name;
        self.settings = other.settings;
        self.stations = other.stations;
        self.routes = other.routes;
        self.connections = other.connections;
        self.selected_route = None;
        self.next_station_id = other.next_station_id;
        self.next_route_id = other.next_route_id;
        self.emit(MapEvent::Loaded);
    }

    pub(crate) fn insert_route_with_id(&mut self, id: RouteId, color: RouteColor) {
        self.insert_route(Route::new(id, color));
    }
}
