// Lane ordering for routes sharing an edge.
//
// Routes on an edge are ordered by where their paths separate: walking away
// from the edge in its canonical direction (lower station id first), the
// route that turns further right takes the lower lane. Lane 0 is drawn on
// the right-hand side of the canonical heading, so bundles keep their
// left-to-right order until they actually split.

use crate::error::{Error, Result};
use crate::geometry::Direction;
use crate::model::{EdgeKey, Route, RouteId, Stations, SubwayMap};
use log::trace;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Signed sharpness of the bend from `current` (row) into `next` (column),
/// negative bending right and positive bending left on screen. Straight
/// ahead and reversals carry no preference.
#[rustfmt::skip]
const TURN_PRIORITY: [[i8; 8]; 8] = [
    //  S   N   E   W  SE  NW  SW  NE
    [   0,  0,  2, -2,  1, -3, -1,  3], // S
    [   0,  0, -2,  2, -3,  1,  3, -1], // N
    [  -2,  2,  0,  0, -1,  3, -3,  1], // E
    [   2, -2,  0,  0,  3, -1,  1, -3], // W
    [  -1,  3,  1, -3,  0,  0, -2,  2], // SE
    [   3, -1, -3,  1,  0,  0,  2, -2], // NW
    [   1, -3,  3, -1,  2, -2,  0,  0], // SW
    [  -3,  1, -1,  3, -2,  2,  0,  0], // NE
];

pub fn get_priority(current: Direction, next: Direction) -> i8 {
    TURN_PRIORITY[current.index()][next.index()]
}

/// Lane of `route` among the routes sharing `edge`, without caching.
pub fn calculate_priority(route: RouteId, edge: EdgeKey, map: &SubwayMap) -> Result<usize> {
    let order = bundle_order(edge, map)?;
    lane_in(&order, route)
}

/// Memoizes bundle orders for the duration of one redraw.
#[derive(Debug, Default)]
pub struct RoutePrioritizer {
    bundles: HashMap<EdgeKey, Vec<RouteId>>,
}

impl RoutePrioritizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calculate_priority(
        &mut self,
        route: RouteId,
        edge: EdgeKey,
        map: &SubwayMap,
    ) -> Result<usize> {
        if !self.bundles.contains_key(&edge) {
            let order = bundle_order(edge, map)?;
            self.bundles.insert(edge, order);
        }
        let order = self.bundles.get(&edge).map_or(&[][..], Vec::as_slice);
        lane_in(order, route)
    }
}

fn lane_in(order: &[RouteId], route: RouteId) -> Result<usize> {
    order
        .iter()
        .position(|id| *id == route)
        .ok_or(Error::RouteNotFound(route))
}

/// Routes on `edge` sorted into lane order.
pub fn bundle_order(edge: EdgeKey, map: &SubwayMap) -> Result<Vec<RouteId>> {
    let mut order: Vec<RouteId> = map
        .connections()
        .get(edge.first(), edge.second())?
        .iter()
        .copied()
        .collect();
    // The comparator is not guaranteed to be transitive when three or more
    // routes split at one station, so a plain insertion sort keeps the
    // result deterministic where `sort_by` may not.
    for i in 1..order.len() {
        let mut j = i;
        while j > 0 && compare_routes(order[j - 1], order[j], edge, map)? == Ordering::Greater {
            order.swap(j - 1, j);
            j -= 1;
        }
    }
    trace!("edge {}-{} lanes {:?}", edge.first(), edge.second(), order);
    Ok(order)
}

fn compare_routes(a: RouteId, b: RouteId, edge: EdgeKey, map: &SubwayMap) -> Result<Ordering> {
    let route_a = map.route(a).ok_or(Error::RouteNotFound(a))?;
    let route_b = map.route(b).ok_or(Error::RouteNotFound(b))?;
    let stations = map.stations();
    let heading = edge_direction(edge, stations);

    let ordering = match heading {
        Some(heading) => {
            let ahead = compare_from_edge(route_a, route_b, edge, stations, heading, true);
            let behind = compare_from_edge(route_a, route_b, edge, stations, heading.opposite(), false)
                .reverse();
            ahead.then(behind)
        }
        None => Ordering::Equal,
    };
    Ok(ordering.then(a.cmp(&b)))
}

fn edge_direction(edge: EdgeKey, stations: &Stations) -> Option<Direction> {
    let from = stations.get(&edge.first())?.position();
    let to = stations.get(&edge.second())?.position();
    Direction::between(from, to)
}

fn compare_from_edge(
    a: &Route,
    b: &Route,
    edge: EdgeKey,
    stations: &Stations,
    heading: Direction,
    ahead: bool,
) -> Ordering {
    match (
        Walk::start(a, stations, edge, ahead),
        Walk::start(b, stations, edge, ahead),
    ) {
        (Some(walk_a), Some(walk_b)) => compare_walks(heading, walk_a, walk_b),
        _ => Ordering::Equal,
    }
}

/// Step both routes in lockstep while they keep the same direction, then
/// order them by how they leave the shared path.
fn compare_walks(mut heading: Direction, mut a: Walk<'_>, mut b: Walk<'_>) -> Ordering {
    loop {
        match (a.step(), b.step()) {
            (Some(dir_a), Some(dir_b)) if dir_a == dir_b => heading = dir_a,
            (Some(dir_a), Some(dir_b)) => {
                return get_priority(heading, dir_a).cmp(&get_priority(heading, dir_b));
            }
            (None, None) => return Ordering::Equal,
            (None, Some(dir_b)) => return ended_against(heading, dir_b, &mut b),
            (Some(dir_a), None) => return ended_against(heading, dir_a, &mut a).reverse(),
        }
    }
}

/// Order of a route that ended against one that continues in `first` and
/// beyond: the ended route takes the side opposite to where the other one
/// eventually turns.
fn ended_against(heading: Direction, first: Direction, continuing: &mut Walk<'_>) -> Ordering {
    let mut dir = first;
    while dir == heading {
        match continuing.step() {
            Some(next) => dir = next,
            None => return Ordering::Equal,
        }
    }
    match get_priority(heading, dir).signum() {
        -1 => Ordering::Greater,
        1 => Ordering::Less,
        _ => Ordering::Equal,
    }
}

/// Cursor over a route's connections leaving a shared edge, yielding
/// directions as seen by a traveller moving away from the edge.
struct Walk<'a> {
    route: &'a Route,
    stations: &'a Stations,
    index: Option<usize>,
    along: bool,
}

impl<'a> Walk<'a> {
    /// `ahead` walks past the edge's canonical end, otherwise past its start.
    fn start(route: &'a Route, stations: &'a Stations, edge: EdgeKey, ahead: bool) -> Option<Self> {
        let index = route.find_connection(edge)?;
        let canonical = route.connections()[index].is_canonical();
        Some(Self {
            route,
            stations,
            index: Some(index),
            along: canonical == ahead,
        })
    }

    fn step(&mut self) -> Option<Direction> {
        let connections = self.route.connections();
        let current = connections[self.index?];
        self.index = if self.along { current.next } else { current.prev };
        let conn = connections[self.index?];
        let dir = conn.direction(self.stations)?;
        Some(if self.along { dir } else { dir.opposite() })
    }
}
