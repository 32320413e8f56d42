mod labels;
mod occupancy;
mod priority;
mod routes;
mod stations;
pub(crate) mod types;
pub use labels::{LabelsManager, find_position};
pub use occupancy::OccupiedCells;
pub use priority::{RoutePrioritizer, bundle_order, calculate_priority, get_priority};
pub use routes::RoutesManager;
pub use stations::{StationLines, StationsManager};
pub use types::*;

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::geometry::Grid;
use crate::model::{SizeSettings, SubwayMap};
use log::debug;

/// Run the routes, stations and labels passes over `map`, in that order.
///
/// Each pass reads the occupancy left by the previous one, so the returned
/// [`OccupiedCells`] reflects the finished layout. Label positions chosen
/// here are written back onto the map.
pub fn compute_layout(
    map: &mut SubwayMap,
    config: &LayoutConfig,
) -> Result<(Layout, OccupiedCells)> {
    let settings = *map.settings();
    let grid = Grid::new(&settings, config);
    let mut occupied = OccupiedCells::new(settings.grid_size);

    let mut routes = RoutesManager::new();
    let segments = routes.process(map, &grid, &mut occupied)?;
    let stations =
        StationsManager.process(map, &grid, config, routes.station_lines(), &mut occupied)?;
    let labels = LabelsManager.process(map, &stations, config, &mut occupied)?;

    let size = settings.canvas_size as f32;
    debug!(
        "layout of {:?}: {} segments, {} stations, {} labels",
        map.name(),
        segments.len(),
        stations.len(),
        labels.len()
    );
    let layout = Layout {
        width: size,
        height: size,
        cell_size: grid.cell_size,
        line_width: grid.line_width,
        segments,
        stations,
        labels,
        grid: if config.draw_grid {
            grid_lines(&settings)
        } else {
            Vec::new()
        },
    };
    Ok((layout, occupied))
}

/// Cell boundaries of the whole canvas, vertical lines first.
pub fn grid_lines(settings: &SizeSettings) -> Vec<GridLine> {
    let cell = settings.cell_size();
    let extent = settings.grid_size as f32 * cell;
    let mut lines = Vec::with_capacity((settings.grid_size as usize + 1) * 2);
    for i in 0..=settings.grid_size {
        let x = i as f32 * cell;
        lines.push(GridLine {
            from: (x, 0.0),
            to: (x, extent),
        });
    }
    for i in 0..=settings.grid_size {
        let y = i as f32 * cell;
        lines.push(GridLine {
            from: (0.0, y),
            to: (extent, y),
        });
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RouteColor;

    #[test]
    fn grid_lines_cover_canvas() {
        let settings = SizeSettings {
            grid_size: 3,
            canvas_size: 90,
            line_width_factor: 0.2,
        };
        let lines = grid_lines(&settings);
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[3].from, (90.0, 0.0));
        assert_eq!(lines[7].to, (90.0, 90.0));
    }

    #[test]
    fn passes_share_occupancy() {
        let mut map = SubwayMap::default();
        let a = map.new_station(3, 3, vec!["Alpha".into()]);
        let b = map.new_station(8, 3, vec!["Beta".into()]);
        let route = map.new_route(RouteColor::Single("#d22".into()));
        map.new_connection(route, a).unwrap();
        map.new_connection(route, b).unwrap();

        let (layout, occupied) = compute_layout(&mut map, &LayoutConfig::default()).unwrap();
        assert_eq!(layout.segments.len(), 1);
        assert_eq!(layout.stations.len(), 2);
        assert_eq!(layout.labels.len(), 2);
        assert!(layout.grid.is_empty());
        for label in &layout.labels {
            for dx in 0..label.width {
                for dy in 0..label.height {
                    let cell = (label.x + dx, label.y + dy);
                    assert!(!occupied.is_route_cell(cell));
                    assert!(occupied.is_label_cell(cell));
                }
            }
        }
        // The line blocks the right-hand side of a.
        let alpha = layout.label(a).unwrap();
        assert_ne!(alpha.strategy, PlacementStrategy::Right);
        assert_eq!(map.station(a).unwrap().label().position(), (alpha.x, alpha.y));
    }
}
