//! Counting fakes for the collaborator traits.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use pollenkit_services::{Commune, RecosanteResponse, ServiceError};

use crate::resolver::GeocodingService;
use crate::source::PollenDataService;

pub fn commune(code: &str) -> Commune {
    Commune {
        code: code.to_string(),
        name: None,
        postal_codes: Vec::new(),
    }
}

fn api_error(service: &'static str, status: u16) -> ServiceError {
    ServiceError::Api {
        service,
        status,
        message: "fake failure".to_string(),
    }
}

pub struct FakeGeocoding {
    candidates: Vec<Commune>,
    failure: Option<u16>,
    calls: AtomicUsize,
    last_query: Mutex<Option<(f64, f64)>>,
}

impl FakeGeocoding {
    pub fn with(candidates: Vec<Commune>) -> Self {
        Self {
            candidates,
            failure: None,
            calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            failure: Some(status),
            ..Self::with(Vec::new())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<(f64, f64)> {
        *self.last_query.lock().unwrap()
    }
}

#[async_trait]
impl GeocodingService for FakeGeocoding {
    async fn communes(&self, longitude: f64, latitude: f64) -> Result<Vec<Commune>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some((longitude, latitude));
        match self.failure {
            Some(status) => Err(api_error("geo.api.gouv.fr", status)),
            None => Ok(self.candidates.clone()),
        }
    }
}

/// Geocoding fake backed by a fixed table of known points. Unknown points
/// get no candidates, like coordinates outside the territory.
pub struct TableGeocoding {
    points: Vec<((f64, f64), &'static str)>,
}

impl TableGeocoding {
    /// Entries are `((longitude, latitude), insee_code)`.
    pub fn with(points: Vec<((f64, f64), &'static str)>) -> Self {
        Self { points }
    }
}

#[async_trait]
impl GeocodingService for TableGeocoding {
    async fn communes(&self, longitude: f64, latitude: f64) -> Result<Vec<Commune>, ServiceError> {
        tokio::task::yield_now().await;
        Ok(self
            .points
            .iter()
            .filter(|(point, _)| *point == (longitude, latitude))
            .map(|(_, code)| commune(code))
            .collect())
    }
}

pub struct FakePollen {
    response: RecosanteResponse,
    failure: Option<u16>,
    calls: AtomicUsize,
    requests: Mutex<Vec<(String, bool)>>,
}

impl FakePollen {
    pub fn with(response: RecosanteResponse) -> Self {
        Self {
            response,
            failure: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            failure: Some(status),
            ..Self::with(RecosanteResponse::default())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(String, bool)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PollenDataService for FakePollen {
    async fn pollen(
        &self,
        insee_code: &str,
        include_details: bool,
    ) -> Result<RecosanteResponse, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((insee_code.to_string(), include_details));
        match self.failure {
            Some(status) => Err(api_error("Recosanté", status)),
            None => Ok(self.response.clone()),
        }
    }
}
