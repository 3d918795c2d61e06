use std::collections::BTreeMap;
use std::fmt;

use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Categories of supplementary data a source can provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFeature {
    CurrentWeather,
    AirQuality,
    Pollen,
    Minutely,
    Alerts,
    Normals,
}

impl SourceFeature {
    pub const ALL: [SourceFeature; 6] = [
        Self::CurrentWeather,
        Self::AirQuality,
        Self::Pollen,
        Self::Minutely,
        Self::Alerts,
        Self::Normals,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CurrentWeather => "current_weather",
            Self::AirQuality => "air_quality",
            Self::Pollen => "pollen",
            Self::Minutely => "minutely",
            Self::Alerts => "alerts",
            Self::Normals => "normals",
        }
    }
}

impl fmt::Display for SourceFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pollen taxa monitored by the RNSA network
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollenType {
    Cypress,
    Hazel,
    Alder,
    Poplar,
    Willow,
    Ash,
    Hornbeam,
    Birch,
    Plane,
    Oak,
    Olive,
    Linden,
    Chestnut,
    Sorrel,
    Grass,
    Plantain,
    Urticaceae,
    Mugwort,
    Ragweed,
}

impl PollenType {
    pub const ALL: [PollenType; 19] = [
        Self::Cypress,
        Self::Hazel,
        Self::Alder,
        Self::Poplar,
        Self::Willow,
        Self::Ash,
        Self::Hornbeam,
        Self::Birch,
        Self::Plane,
        Self::Oak,
        Self::Olive,
        Self::Linden,
        Self::Chestnut,
        Self::Sorrel,
        Self::Grass,
        Self::Plantain,
        Self::Urticaceae,
        Self::Mugwort,
        Self::Ragweed,
    ];

    /// Parse a taxon label as published in French ("Bouleau", "graminées", ...).
    ///
    /// Matching ignores case, surrounding whitespace and accents.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = normalize_label(label);
        let pollen = match normalized.as_str() {
            "cypres" | "cupressacees" | "cupressacees/taxacees" => Self::Cypress,
            "noisetier" => Self::Hazel,
            "aulne" => Self::Alder,
            "peuplier" => Self::Poplar,
            "saule" => Self::Willow,
            "frene" => Self::Ash,
            "charme" => Self::Hornbeam,
            "bouleau" => Self::Birch,
            "platane" => Self::Plane,
            "chene" => Self::Oak,
            "olivier" => Self::Olive,
            "tilleul" => Self::Linden,
            "chataignier" => Self::Chestnut,
            "rumex" | "oseille" => Self::Sorrel,
            "graminees" | "graminee" => Self::Grass,
            "plantain" => Self::Plantain,
            "urticacees" | "urticacee" => Self::Urticaceae,
            "armoise" | "armoises" => Self::Mugwort,
            "ambroisie" | "ambroisies" => Self::Ragweed,
            _ => return None,
        };
        Some(pollen)
    }

    /// English display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cypress => "Cypress",
            Self::Hazel => "Hazel",
            Self::Alder => "Alder",
            Self::Poplar => "Poplar",
            Self::Willow => "Willow",
            Self::Ash => "Ash",
            Self::Hornbeam => "Hornbeam",
            Self::Birch => "Birch",
            Self::Plane => "Plane",
            Self::Oak => "Oak",
            Self::Olive => "Olive",
            Self::Linden => "Linden",
            Self::Chestnut => "Chestnut",
            Self::Sorrel => "Sorrel",
            Self::Grass => "Grass",
            Self::Plantain => "Plantain",
            Self::Urticaceae => "Urticaceae",
            Self::Mugwort => "Mugwort",
            Self::Ragweed => "Ragweed",
        }
    }
}

fn normalize_label(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'à' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' => 'i',
            'ô' | 'ö' => 'o',
            'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Pollen exposure risk on the RNSA scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollenLevel {
    None,
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl PollenLevel {
    /// Map a raw RNSA value (0-5). Out-of-range values yield `None`.
    pub fn from_value(value: u8) -> Option<Self> {
        let level = match value {
            0 => Self::None,
            1 => Self::VeryLow,
            2 => Self::Low,
            3 => Self::Moderate,
            4 => Self::High,
            5 => Self::VeryHigh,
            _ => return None,
        };
        Some(level)
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::VeryLow => "Very low",
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::VeryHigh => "Very high",
        }
    }
}

/// Describe a raw risk value, "Unknown" when off the scale.
pub fn describe_level(value: u8) -> &'static str {
    PollenLevel::from_value(value).map_or("Unknown", |level| level.description())
}

/// Pollen risk for one day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pollen {
    /// Overall risk as published, independent of the per-taxon levels
    pub overall: Option<u8>,
    pub levels: BTreeMap<PollenType, u8>,
}

impl Pollen {
    pub fn level(&self, pollen_type: PollenType) -> Option<u8> {
        self.levels.get(&pollen_type).copied()
    }

    /// Highest per-taxon level, with the taxon it belongs to
    pub fn max_level(&self) -> Option<(PollenType, u8)> {
        self.levels
            .iter()
            .max_by_key(|(_, value)| **value)
            .map(|(pollen_type, value)| (*pollen_type, *value))
    }

    pub fn is_empty(&self) -> bool {
        self.overall.is_none() && self.levels.is_empty()
    }
}

/// Pollen data for one local day, stamped at local midnight
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollenReading {
    pub date: DateTime<Tz>,
    pub pollen: Pollen,
}

/// Daily pollen readings in the location's time zone
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollenWrapper {
    pub time_zone: Tz,
    pub daily: Vec<PollenReading>,
}

impl PollenWrapper {
    pub fn empty(time_zone: Tz) -> Self {
        Self {
            time_zone,
            daily: Vec::new(),
        }
    }
}

/// Normalized output of a source request. Only the requested features are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeatherWrapper {
    pub pollen: Option<PollenWrapper>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_plain() {
        assert_eq!(PollenType::from_label("bouleau"), Some(PollenType::Birch));
        assert_eq!(PollenType::from_label("noisetier"), Some(PollenType::Hazel));
        assert_eq!(PollenType::from_label("rumex"), Some(PollenType::Sorrel));
    }

    #[test]
    fn test_label_accents_and_case() {
        assert_eq!(PollenType::from_label("Graminées"), Some(PollenType::Grass));
        assert_eq!(PollenType::from_label("CHÂTAIGNIER"), Some(PollenType::Chestnut));
        assert_eq!(PollenType::from_label("  Frêne "), Some(PollenType::Ash));
        assert_eq!(PollenType::from_label("Chêne"), Some(PollenType::Oak));
        assert_eq!(PollenType::from_label("Cyprès"), Some(PollenType::Cypress));
    }

    #[test]
    fn test_label_plural_forms() {
        assert_eq!(PollenType::from_label("armoises"), Some(PollenType::Mugwort));
        assert_eq!(PollenType::from_label("ambroisies"), Some(PollenType::Ragweed));
        assert_eq!(PollenType::from_label("urticacées"), Some(PollenType::Urticaceae));
    }

    #[test]
    fn test_label_unknown() {
        assert_eq!(PollenType::from_label("pin"), None);
        assert_eq!(PollenType::from_label(""), None);
    }

    #[test]
    fn test_every_type_has_a_name() {
        for pollen_type in PollenType::ALL {
            assert!(!pollen_type.name().is_empty());
        }
    }

    #[test]
    fn test_level_scale() {
        assert_eq!(PollenLevel::from_value(0), Some(PollenLevel::None));
        assert_eq!(PollenLevel::from_value(5), Some(PollenLevel::VeryHigh));
        assert_eq!(PollenLevel::from_value(6), None);
        assert_eq!(describe_level(3), "Moderate");
        assert_eq!(describe_level(42), "Unknown");
    }

    #[test]
    fn test_pollen_helpers() {
        let mut pollen = Pollen::default();
        assert!(pollen.is_empty());
        assert_eq!(pollen.max_level(), None);

        pollen.levels.insert(PollenType::Birch, 4);
        pollen.levels.insert(PollenType::Grass, 2);
        pollen.levels.insert(PollenType::Oak, 1);

        assert_eq!(pollen.level(PollenType::Birch), Some(4));
        assert_eq!(pollen.level(PollenType::Ragweed), None);
        assert_eq!(pollen.max_level(), Some((PollenType::Birch, 4)));
        assert!(!pollen.is_empty());
    }

    #[test]
    fn test_feature_display() {
        assert_eq!(SourceFeature::Pollen.to_string(), "pollen");
        assert_eq!(SourceFeature::AirQuality.to_string(), "air_quality");
    }
}
