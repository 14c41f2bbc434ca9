use std::str::FromStr;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use common::req::{TemperatureReport, WeatherSnapshot};
use log::info;

use crate::aggregate::{Aggregator, OutdoorDay};
use crate::sample::SampleStore;

/// What to serve when the outdoor station has no samples for today.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum EmptyOutdoor {
    /// Serve the snapshot with the outdoor derived fields set to null.
    #[default]
    NullFields,
    /// Serve nothing at all.
    Suppress,
}

impl FromStr for EmptyOutdoor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "null-fields" => Ok(Self::NullFields),
            "suppress" => Ok(Self::Suppress),
            _ => bail!("unknown empty outdoor policy {s:?}, expected null-fields or suppress"),
        }
    }
}

pub fn assemble(
    timestamp: i64,
    outdoor: Option<OutdoorDay>,
    bedroom: Option<TemperatureReport>,
) -> WeatherSnapshot {
    let mut snapshot = WeatherSnapshot::empty(timestamp);
    snapshot.bedroom = bedroom;
    if let Some(day) = outdoor {
        snapshot.outside = Some(day.outside);
        snapshot.kdk_inside = Some(day.indoor_ref);
        snapshot.rain = Some(day.rain);
    }
    snapshot
}

/// Runs both aggregations and merges them.
///
/// Returns `None` only under [`EmptyOutdoor::Suppress`] with an empty
/// outdoor window.
pub fn collect<S: SampleStore>(
    aggregator: &mut Aggregator<S>,
    now: DateTime<Utc>,
    policy: EmptyOutdoor,
) -> Result<Option<WeatherSnapshot>> {
    let outdoor = aggregator.aggregate_outdoor(now)?;
    if outdoor.is_none() {
        info!("No outdoor samples recorded today");
        if policy == EmptyOutdoor::Suppress {
            return Ok(None);
        }
    }
    let bedroom = aggregator.aggregate_indoor_sensor(now)?;

    Ok(Some(assemble(now.timestamp(), outdoor, bedroom)))
}
