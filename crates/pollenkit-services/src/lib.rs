//! HTTP clients for the upstream services behind the pollen source.
//!
//! - [`GeoApiClient`]: French communes geocoding (coordinates to INSEE code)
//! - [`RecosanteClient`]: Recosanté pollen exposure data by INSEE code

pub mod error;
pub mod geo;
pub mod http;
pub mod recosante;
pub mod retry;

pub use error::ServiceError;
pub use geo::{Commune, GeoApiClient};
pub use http::ClientOptions;
pub use recosante::{
    Raep, RaepDetail, RaepDetailIndice, RaepIndice, RaepValidity, RecosanteClient,
    RecosanteResponse,
};
pub use retry::RetryConfig;
