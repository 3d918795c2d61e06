//! Recosanté RAEP payload to normalized pollen readings.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use pollenkit_services::{RaepIndice, RaepValidity, RecosanteResponse};

use crate::types::{Pollen, PollenReading, PollenType, PollenWrapper};

/// Bulletins cover a week; anything much longer is a broken payload.
const MAX_DAYS: usize = 31;

/// Convert a Recosanté response into daily readings in `time_zone`.
///
/// The same risk levels apply to every day of the bulletin's validity window.
/// A payload without RAEP block or without a usable window yields no
/// readings rather than an error.
pub fn convert_pollen(response: &RecosanteResponse, time_zone: Tz) -> PollenWrapper {
    let Some(raep) = &response.raep else {
        tracing::debug!("Response has no RAEP block");
        return PollenWrapper::empty(time_zone);
    };

    let Some(validity) = &raep.validity else {
        tracing::warn!("RAEP block without validity window, no readings produced");
        return PollenWrapper::empty(time_zone);
    };

    let Some(days) = validity_days(validity, time_zone) else {
        tracing::warn!(
            "Unusable RAEP validity window {} -> {}, no readings produced",
            validity.start,
            validity.end
        );
        return PollenWrapper::empty(time_zone);
    };

    let pollen = pollen_levels(raep.indice.as_ref());
    let daily = days
        .into_iter()
        .map(|date| PollenReading {
            date,
            pollen: pollen.clone(),
        })
        .collect();

    PollenWrapper { time_zone, daily }
}

fn pollen_levels(indice: Option<&RaepIndice>) -> Pollen {
    let Some(indice) = indice else {
        return Pollen::default();
    };

    let mut levels = BTreeMap::new();
    for detail in indice.details.iter().flatten() {
        let Some(label) = detail.label.as_deref() else {
            tracing::debug!("Skipping pollen detail without label");
            continue;
        };
        let Some(pollen_type) = PollenType::from_label(label) else {
            tracing::debug!("Skipping unknown pollen label '{}'", label);
            continue;
        };
        let Some(value) = detail.indice.value else {
            tracing::debug!("Skipping {} without value", pollen_type.name());
            continue;
        };
        levels.insert(pollen_type, value);
    }

    Pollen {
        overall: indice.value,
        levels,
    }
}

/// Local midnights of every day in the window, in `time_zone`.
///
/// Days run from the start's local day while strictly before the end's
/// local day; a window within a single day yields that day.
fn validity_days(validity: &RaepValidity, time_zone: Tz) -> Option<Vec<DateTime<Tz>>> {
    let start = parse_timestamp(&validity.start)?
        .with_timezone(&time_zone)
        .date_naive();
    let end = parse_timestamp(&validity.end)?
        .with_timezone(&time_zone)
        .date_naive();

    if end < start {
        return None;
    }

    let dates: Vec<NaiveDate> = if end == start {
        vec![start]
    } else {
        start.iter_days().take_while(|day| *day < end).take(MAX_DAYS).collect()
    };

    let midnights = dates
        .into_iter()
        .filter_map(|day| start_of_day(time_zone, day))
        .collect();
    Some(midnights)
}

/// First instant of `day` in `time_zone`: local midnight, or the end of the
/// DST gap when midnight is skipped.
fn start_of_day(time_zone: Tz, day: NaiveDate) -> Option<DateTime<Tz>> {
    let midnight = day.and_time(NaiveTime::MIN);
    if let Some(start) = time_zone.from_local_datetime(&midnight).earliest() {
        return Some(start);
    }

    // Midnight read with the offset in force before the gap is the transition instant.
    let before = time_zone
        .offset_from_local_datetime(&(midnight - Duration::hours(12)))
        .earliest()?
        .fix();
    let utc = midnight - Duration::seconds(i64::from(before.local_minus_utc()));
    Some(time_zone.from_utc_datetime(&utc))
}

/// RFC 3339, or a naive date-time / date taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}
