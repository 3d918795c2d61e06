//! Pollen data for French locations
//!
//! Resolves a coordinate to its INSEE commune code via geo.api.gouv.fr, which
//! the host caches on the location, then fetches and normalizes Recosanté
//! pollen bulletins for that code.

pub mod convert;
pub mod error;
pub mod location;
pub mod resolver;
pub mod source;
pub mod types;

#[cfg(test)]
mod testing;

pub use convert::convert_pollen;
pub use error::SourceError;
pub use location::Location;
pub use resolver::{GeocodingService, LocationResolver};
pub use source::{
    PollenDataService, RecosanteParameters, RecosanteSource, WeatherSource, RECOSANTE_SOURCE_ID,
};
pub use types::*;
