use crate::model::{RouteId, StationId};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing property \"{property}\" in {object}")]
    MissingProperty { property: String, object: String },

    #[error("invalid property \"{property}\" in {object}: {reason}")]
    InvalidProperty {
        property: String,
        object: String,
        reason: String,
    },

    #[error("route {route} references unknown station {station}")]
    UnknownStationReference { route: u32, station: u32 },

    #[error("invalid map document: {0}")]
    InvalidDocument(String),

    #[error("no connection between stations {from} and {to}")]
    EdgeNotFound { from: StationId, to: StationId },

    #[error("station {0} does not exist")]
    StationNotFound(StationId),

    #[error("route {0} does not exist")]
    RouteNotFound(RouteId),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn missing(property: &str, object: impl Into<String>) -> Self {
        Error::MissingProperty {
            property: property.to_string(),
            object: object.into(),
        }
    }

    pub(crate) fn invalid(
        property: &str,
        object: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidProperty {
            property: property.to_string(),
            object: object.into(),
            reason: reason.into(),
        }
    }
}
