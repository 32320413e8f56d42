// Persisted JSON form of a map. Export renumbers ids densely; import
// validates everything into a scratch map before touching live state.

use super::{Label, RouteColor, RouteId, SizeSettings, Station, StationId, SubwayMap};
use crate::error::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

pub type SettingsDocument = SizeSettings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDocument {
    pub name: String,
    pub settings: SettingsDocument,
    pub stations: Vec<StationDocument>,
    pub routes: Vec<RouteDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationDocument {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub label: LabelDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelDocument {
    pub x: i32,
    pub y: i32,
    pub name: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub pinned: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDocument {
    pub id: u32,
    pub color: RouteColor,
    pub stations: Vec<u32>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl MapDocument {
    /// Parse strict JSON, falling back to JSON5 for hand-edited files.
    pub fn parse(text: &str) -> Result<Self> {
        let value = match serde_json::from_str::<Value>(text) {
            Ok(value) => value,
            Err(strict) => json5::from_str::<Value>(text)
                .map_err(|_| Error::InvalidDocument(strict.to_string()))?,
        };
        Self::from_value(&value)
    }

    /// Validate a JSON value field by field, naming the first missing or
    /// malformed property.
    pub fn from_value(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::InvalidDocument("expected a JSON object".to_string()));
        }
        let name = string_field(value, "name", "document")?;
        let settings_value = field(value, "settings", "document")?;
        let settings = SizeSettings {
            grid_size: positive_int(settings_value, "gridSize", "settings")?,
            canvas_size: positive_int(settings_value, "canvasSize", "settings")?,
            line_width_factor: positive_float(settings_value, "lineWidthFactor", "settings")?,
        };

        let stations = array_field(value, "stations", "document")?
            .iter()
            .enumerate()
            .map(|(idx, station)| parse_station(station, &format!("station[{idx}]")))
            .collect::<Result<Vec<_>>>()?;

        let routes = array_field(value, "routes", "document")?
            .iter()
            .enumerate()
            .map(|(idx, route)| parse_route(route, &format!("route[{idx}]")))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name,
            settings,
            stations,
            routes,
        })
    }
}

fn parse_station(value: &Value, object: &str) -> Result<StationDocument> {
    let label_value = field(value, "label", object)?;
    let label_object = format!("label of {object}");
    let name = array_field(label_value, "name", &label_object)?
        .iter()
        .map(|line| {
            line.as_str()
                .map(str::to_string)
                .ok_or_else(|| Error::invalid("name", label_object.as_str(), "expected strings"))
        })
        .collect::<Result<Vec<_>>>()?;
    if name.is_empty() {
        return Err(Error::invalid("name", label_object, "needs at least one line"));
    }
    let pinned = label_value
        .get("pinned")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    Ok(StationDocument {
        id: unsigned_int(value, "id", object)?,
        x: int_field(value, "x", object)?,
        y: int_field(value, "y", object)?,
        label: LabelDocument {
            x: int_field(label_value, "x", &label_object)?,
            y: int_field(label_value, "y", &label_object)?,
            name,
            pinned,
        },
    })
}

fn parse_route(value: &Value, object: &str) -> Result<RouteDocument> {
    let color = match field(value, "color", object)? {
        Value::String(color) => RouteColor::Single(color.clone()),
        Value::Array(colors) => match colors.as_slice() {
            [Value::String(one)] => RouteColor::Single(one.clone()),
            [Value::String(first), Value::String(second)] => {
                RouteColor::Dual(first.clone(), second.clone())
            }
            _ => {
                return Err(Error::invalid(
                    "color",
                    object,
                    "expected one or two color strings",
                ));
            }
        },
        _ => return Err(Error::invalid("color", object, "expected a string or an array")),
    };
    let stations = array_field(value, "stations", object)?
        .iter()
        .map(|id| {
            id.as_u64()
                .and_then(|id| u32::try_from(id).ok())
                .ok_or_else(|| Error::invalid("stations", object, "expected station ids"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(RouteDocument {
        id: unsigned_int(value, "id", object)?,
        color,
        stations,
    })
}

fn field<'a>(value: &'a Value, property: &str, object: &str) -> Result<&'a Value> {
    value
        .get(property)
        .filter(|found| !found.is_null())
        .ok_or_else(|| Error::missing(property, object))
}

fn array_field<'a>(value: &'a Value, property: &str, object: &str) -> Result<&'a Vec<Value>> {
    field(value, property, object)?
        .as_array()
        .ok_or_else(|| Error::invalid(property, object, "expected an array"))
}

fn string_field(value: &Value, property: &str, object: &str) -> Result<String> {
    field(value, property, object)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::invalid(property, object, "expected a string"))
}

fn int_field(value: &Value, property: &str, object: &str) -> Result<i32> {
    field(value, property, object)?
        .as_i64()
        .and_then(|number| i32::try_from(number).ok())
        .ok_or_else(|| Error::invalid(property, object, "expected an integer"))
}

fn unsigned_int(value: &Value, property: &str, object: &str) -> Result<u32> {
    field(value, property, object)?
        .as_u64()
        .and_then(|number| u32::try_from(number).ok())
        .ok_or_else(|| Error::invalid(property, object, "expected a non-negative integer"))
}

fn positive_int(value: &Value, property: &str, object: &str) -> Result<u32> {
    let number = unsigned_int(value, property, object)?;
    if number == 0 {
        return Err(Error::invalid(property, object, "must be greater than 0"));
    }
    Ok(number)
}

fn positive_float(value: &Value, property: &str, object: &str) -> Result<f32> {
    let number = field(value, property, object)?
        .as_f64()
        .ok_or_else(|| Error::invalid(property, object, "expected a number"))?;
    if number <= 0.0 {
        return Err(Error::invalid(property, object, "must be greater than 0"));
    }
    Ok(number as f32)
}

impl SubwayMap {
    /// Snapshot with station and route ids renumbered densely from 0.
    pub fn to_document(&self) -> MapDocument {
        let station_ids: BTreeMap<StationId, u32> = self
            .stations()
            .keys()
            .enumerate()
            .map(|(idx, id)| (*id, idx as u32))
            .collect();

        let stations = self
            .stations()
            .values()
            .map(|station| {
                let label = station.label();
                let (label_x, label_y) = label.position();
                StationDocument {
                    id: station_ids[&station.id()],
                    x: station.position().0,
                    y: station.position().1,
                    label: LabelDocument {
                        x: label_x,
                        y: label_y,
                        name: label.name().to_vec(),
                        pinned: label.is_pinned(),
                    },
                }
            })
            .collect();

        let routes = self
            .routes()
            .enumerate()
            .map(|(idx, route)| RouteDocument {
                id: idx as u32,
                color: route.color().clone(),
                stations: route
                    .stations()
                    .iter()
                    .map(|id| station_ids[id])
                    .collect(),
            })
            .collect();

        MapDocument {
            name: self.name().to_string(),
            settings: *self.settings(),
            stations,
            routes,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    /// Build a fresh map from a validated document.
    pub fn from_document(document: &MapDocument) -> Result<SubwayMap> {
        let mut map = SubwayMap::new(document.settings);
        map.settings().validate()?;
        map.set_name(document.name.clone());

        let mut seen = BTreeSet::new();
        for (idx, doc) in document.stations.iter().enumerate() {
            if !seen.insert(doc.id) {
                return Err(Error::invalid(
                    "id",
                    format!("station[{idx}]"),
                    format!("duplicate station id {}", doc.id),
                ));
            }
            let mut label = Label::new(doc.label.name.clone());
            if doc.label.pinned {
                label.pin_at(doc.label.x, doc.label.y);
            } else {
                label.set_position(doc.label.x, doc.label.y);
            }
            map.insert_station(Station::new(StationId(doc.id), doc.x, doc.y, label));
        }

        for (idx, doc) in document.routes.iter().enumerate() {
            let route = RouteId(doc.id);
            if map.route(route).is_some() {
                return Err(Error::invalid(
                    "id",
                    format!("route[{idx}]"),
                    format!("duplicate route id {}", doc.id),
                ));
            }
            map.insert_route_with_id(route, doc.color.clone());
            for station in &doc.stations {
                if !seen.contains(station) {
                    return Err(Error::UnknownStationReference {
                        route: doc.id,
                        station: *station,
                    });
                }
                map.new_connection(route, StationId(*station))
                    .map_err(|violation| {
                        Error::InvalidDocument(format!("route {}: {violation}", doc.id))
                    })?;
            }
        }
        Ok(map)
    }

    /// Replace this map with the parsed document. On any error the current
    /// contents stay as they were.
    pub fn from_json(&mut self, text: &str) -> Result<()> {
        let document = MapDocument::parse(text)?;
        let scratch = SubwayMap::from_document(&document)?;
        debug!(
            "loaded map \"{}\": {} station(s), {} route(s)",
            scratch.name(),
            scratch.stations().len(),
            scratch.route_count()
        );
        self.replace_contents(scratch);
        Ok(())
    }
}
