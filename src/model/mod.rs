mod connections;
mod document;
mod map;
mod route;
mod station;

pub use connections::{ConnectionsManager, EdgeKey};
pub use document::{LabelDocument, MapDocument, RouteDocument, SettingsDocument, StationDocument};
pub use map::{MapEvent, RuleViolation, SizeSettings, SubscriptionId, SubwayMap};
pub use route::{Route, RouteColor, RouteConnection, RouteId};
pub use station::{Label, Station, StationId, Stations};
