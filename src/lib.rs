#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod layout_dump;
pub mod model;
pub mod render;
pub mod theme;
pub mod view;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, load_config};
pub use error::{Error, Result};
pub use layout::{Layout, compute_layout};
pub use model::{RouteColor, RouteId, SizeSettings, StationId, SubwayMap};
pub use theme::Theme;
pub use view::MapView;

/// Theme and layout knobs for one-shot rendering.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::classic()
    }
}

impl RenderOptions {
    pub fn classic() -> Self {
        Self {
            theme: Theme::classic(),
            layout: LayoutConfig::default(),
        }
    }

    pub fn modern() -> Self {
        Self {
            theme: Theme::modern(),
            layout: LayoutConfig::default(),
        }
    }

    pub fn with_grid(mut self) -> Self {
        self.layout.draw_grid = true;
        self
    }
}

/// Load a map document and render it to SVG in one go.
pub fn render_with_options(json: &str, options: &RenderOptions) -> Result<String> {
    let mut map = SubwayMap::default();
    map.from_json(json)?;
    let mut view = MapView::new(options.layout.clone(), options.theme.clone());
    view.redraw_map(&mut map)?;
    Ok(view.render_svg())
}

/// [`render_with_options`] with the classic theme.
pub fn render(json: &str) -> Result<String> {
    render_with_options(json, &RenderOptions::default())
}
