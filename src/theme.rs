use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub grid_color: String,
    pub station_fill: String,
    pub station_stroke: String,
    pub label_color: String,
    pub selected_color: String,
    pub default_route_color: String,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "Helvetica, Arial, sans-serif".to_string(),
            font_size: 12.0,
            background: "#FFFFFF".to_string(),
            grid_color: "#E4E4E4".to_string(),
            station_fill: "#FFFFFF".to_string(),
            station_stroke: "#000000".to_string(),
            label_color: "#000000".to_string(),
            selected_color: "#FFD400".to_string(),
            default_route_color: "#333333".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 11.0,
            background: "#F8FAFF".to_string(),
            grid_color: "#D7E0F0".to_string(),
            station_fill: "#FFFFFF".to_string(),
            station_stroke: "#1C2430".to_string(),
            label_color: "#1C2430".to_string(),
            selected_color: "#7A8AA6".to_string(),
            default_route_color: "#7A8AA6".to_string(),
        }
    }
}
