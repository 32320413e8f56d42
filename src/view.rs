// Host-facing surface: owns the result of the last redraw and answers the
// placement queries an editor asks between redraws.

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::geometry::Cell;
use crate::layout::{ElementId, GridLine, Layout, OccupiedCells, compute_layout, grid_lines};
use crate::model::{RouteColor, RouteId, SizeSettings, StationId, SubwayMap};
use crate::render::render_svg;
use crate::theme::Theme;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:#[0-9a-fA-F]{3}|#[0-9a-fA-F]{6}|[a-zA-Z]{3,20})$").unwrap());

#[derive(Debug, Clone)]
pub struct MapView {
    config: LayoutConfig,
    theme: Theme,
    layout: Layout,
    occupied: OccupiedCells,
}

impl MapView {
    pub fn new(config: LayoutConfig, theme: Theme) -> Self {
        Self {
            config,
            theme,
            layout: Layout::default(),
            occupied: OccupiedCells::default(),
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Recompute the whole layout for `map`. Occupancy from the previous
    /// redraw is discarded first.
    pub fn redraw_map(&mut self, map: &mut SubwayMap) -> Result<&Layout> {
        self.occupied.clear();
        let (layout, occupied) = compute_layout(map, &self.config)?;
        self.layout = layout;
        self.occupied = occupied;
        Ok(&self.layout)
    }

    pub fn redraw_grid(&self, settings: &SizeSettings) -> Vec<GridLine> {
        grid_lines(settings)
    }

    pub fn is_cell_fully_available(&self, cell: Cell) -> bool {
        self.occupied.is_fully_available(cell)
    }

    pub fn is_cell_free_for_drop(&self, cell: Cell, except: StationId) -> bool {
        self.occupied.is_free_for_drop(cell, except)
    }

    pub fn select_route(&mut self, map: &mut SubwayMap, route: RouteId) -> Result<()> {
        map.select_route(route)?;
        for segment in &mut self.layout.segments {
            segment.selected = segment.route == route;
        }
        Ok(())
    }

    pub fn deselect_route(&mut self, map: &mut SubwayMap) {
        map.deselect_route();
        for segment in &mut self.layout.segments {
            segment.selected = false;
        }
    }

    /// Recolor `route` with one or two colors (`#rgb`, `#rrggbb` or a
    /// color name). Returns false and changes nothing when the input is
    /// rejected.
    pub fn try_set_color(&mut self, map: &mut SubwayMap, route: RouteId, colors: &[&str]) -> bool {
        let colors: Vec<&str> = colors.iter().map(|color| color.trim()).collect();
        if !colors.iter().all(|color| COLOR_RE.is_match(color)) {
            debug!("rejected colors {colors:?} for route {route}");
            return false;
        }
        let color = match colors.as_slice() {
            [single] => RouteColor::Single(single.to_string()),
            [primary, secondary] => RouteColor::Dual(primary.to_string(), secondary.to_string()),
            _ => return false,
        };
        if map.set_route_color(route, color.clone()).is_err() {
            return false;
        }

        // Dual colors change the segment count, so only a same-shape update
        // is patched in place.
        let mut drawn: Vec<_> = self
            .layout
            .segments
            .iter_mut()
            .filter(|segment| segment.route == route)
            .collect();
        let overlays = drawn.iter().filter(|segment| segment.dashed).count();
        let is_dual = color.secondary().is_some();
        if (overlays > 0) == is_dual {
            for segment in &mut drawn {
                segment.color = if segment.dashed {
                    color.secondary().unwrap_or(color.primary()).to_string()
                } else {
                    color.primary().to_string()
                };
            }
        }
        true
    }

    /// Map an id stamped on a rendered element back to the element, if it
    /// is part of the current layout.
    pub fn get_id(&self, element_id: &str) -> Option<ElementId> {
        let id: ElementId = element_id.parse().ok()?;
        let known = match id {
            ElementId::Station(station) => self.layout.station(station).is_some(),
            ElementId::Label(station) => self.layout.label(station).is_some(),
            ElementId::Route(route) => self.layout.route_segments(route).next().is_some(),
        };
        known.then_some(id)
    }

    pub fn render_svg(&self) -> String {
        render_svg(&self.layout, &self.theme, &self.config)
    }
}
