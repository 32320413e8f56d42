use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Gap between parallel lines as a fraction of the line width.
    pub line_gap_factor: f32,
    /// Radius of a single-line station as a fraction of the cell size.
    pub station_radius_factor: f32,
    pub label_chars_per_cell: usize,
    pub label_line_height: f32,
    pub draw_grid: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_gap_factor: 0.5,
            station_radius_factor: 0.4,
            label_chars_per_cell: 2,
            label_line_height: 1.2,
            draw_grid: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 900.0,
            height: 900.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::classic(),
            layout: LayoutConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    grid_color: Option<String>,
    station_fill: Option<String>,
    station_stroke: Option<String>,
    label_color: Option<String>,
    selected_color: Option<String>,
    default_route_color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    line_gap_factor: Option<f32>,
    station_radius_factor: Option<f32>,
    label_chars_per_cell: Option<usize>,
    label_line_height: Option<f32>,
    draw_grid: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    apply_config_file(&mut config, &contents)?;
    Ok(config)
}

fn apply_config_file(config: &mut Config, contents: &str) -> anyhow::Result<()> {
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    match parsed.theme.as_deref() {
        Some("modern") => config.theme = Theme::modern(),
        Some("classic") | Some("default") => config.theme = Theme::classic(),
        Some(other) => anyhow::bail!("unknown theme {other:?}"),
        None => {}
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.grid_color {
            config.theme.grid_color = v;
        }
        if let Some(v) = vars.station_fill {
            config.theme.station_fill = v;
        }
        if let Some(v) = vars.station_stroke {
            config.theme.station_stroke = v;
        }
        if let Some(v) = vars.label_color {
            config.theme.label_color = v;
        }
        if let Some(v) = vars.selected_color {
            config.theme.selected_color = v;
        }
        if let Some(v) = vars.default_route_color {
            config.theme.default_route_color = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.line_gap_factor {
            config.layout.line_gap_factor = v;
        }
        if let Some(v) = layout.station_radius_factor {
            config.layout.station_radius_factor = v;
        }
        if let Some(v) = layout.label_chars_per_cell {
            config.layout.label_chars_per_cell = v.max(1);
        }
        if let Some(v) = layout.label_line_height {
            config.layout.label_line_height = v;
        }
        if let Some(v) = layout.draw_grid {
            config.layout.draw_grid = v;
        }
    }

    Ok(())
}
