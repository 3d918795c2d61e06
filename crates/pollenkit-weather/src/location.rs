//! Host-owned location record and its per-source parameter cache.

use std::collections::BTreeMap;

use chrono_tz::Tz;
use serde::de::DeserializeOwned;
use serde::ser::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Geographic location as stored by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub city_name: Option<String>,
    /// ISO 3166-1 alpha-2
    pub country_code: Option<String>,
    pub timezone: Tz,
    /// Values derived by each source, keyed by source id
    #[serde(default)]
    pub parameters: BTreeMap<String, BTreeMap<String, String>>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64, timezone: Tz) -> Self {
        Self {
            latitude,
            longitude,
            city_name: None,
            country_code: None,
            timezone,
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_country_code(mut self, country_code: impl Into<String>) -> Self {
        self.country_code = Some(country_code.into());
        self
    }

    pub fn with_city_name(mut self, city_name: impl Into<String>) -> Self {
        self.city_name = Some(city_name.into());
        self
    }

    /// Case-insensitive ISO country match. A location without a country
    /// code matches nothing.
    pub fn is_in_country(&self, country_code: &str) -> bool {
        self.country_code
            .as_deref()
            .is_some_and(|code| code.eq_ignore_ascii_case(country_code))
    }

    /// Typed view of the parameters stored for `source_id`.
    ///
    /// Returns `None` when nothing is stored or the stored keys do not form a
    /// valid `T`.
    pub fn parameters_for<T: DeserializeOwned>(&self, source_id: &str) -> Option<T> {
        let raw = self.parameters.get(source_id)?;
        let value = Value::Object(
            raw.iter()
                .map(|(key, value)| (key.clone(), Value::String(value.clone())))
                .collect(),
        );

        match serde_json::from_value(value) {
            Ok(params) => Some(params),
            Err(e) => {
                tracing::debug!("Ignoring stored parameters for {}: {}", source_id, e);
                None
            }
        }
    }

    /// Replace the parameters stored for `source_id` with `params`.
    ///
    /// The previous key set is dropped as a whole. Scalar fields are stored
    /// in their string form and `null` fields are omitted.
    pub fn set_parameters<T: Serialize>(
        &mut self,
        source_id: &str,
        params: &T,
    ) -> Result<(), serde_json::Error> {
        let Value::Object(fields) = serde_json::to_value(params)? else {
            return Err(serde_json::Error::custom(
                "location parameters must serialize to a map",
            ));
        };

        let mut stored = BTreeMap::new();
        for (key, value) in fields {
            match value {
                Value::Null => {}
                Value::String(s) => {
                    stored.insert(key, s);
                }
                Value::Bool(_) | Value::Number(_) => {
                    stored.insert(key, value.to_string());
                }
                Value::Array(_) | Value::Object(_) => {
                    return Err(serde_json::Error::custom(format!(
                        "location parameter '{key}' is not a scalar"
                    )));
                }
            }
        }

        self.parameters.insert(source_id.to_string(), stored);
        Ok(())
    }

    /// Drop everything stored for `source_id`.
    pub fn clear_parameters(&mut self, source_id: &str) -> bool {
        self.parameters.remove(source_id).is_some()
    }
}
