//! Stored weather samples and the range-query contract over them.

use anyhow::{bail, Result};
use common::req::DataSource;

#[derive(Debug, Default, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OutdoorReading {
    pub temp_outside_f: f64,    // °F
    pub temp_indoor_ref_f: f64, // °F, console sensor next to the station
    pub rain_daily_raw: i32,    // bucket tips
    pub rain_rate_raw: i32,     // bucket tips
}

/// Indoor sensor reading. The vendor already tracks the session min/max.
#[derive(Debug, Default, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IndoorReading {
    pub temp_c: f64,     // °C
    pub temp_c_min: f64, // °C
    pub temp_c_max: f64, // °C
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Payload {
    Outdoor(OutdoorReading),
    Indoor(IndoorReading),
}

impl Payload {
    pub fn source(&self) -> DataSource {
        match self {
            Payload::Outdoor(_) => DataSource::Outdoor,
            Payload::Indoor(_) => DataSource::Indoor,
        }
    }

    /// Fails on NaN or infinite temperatures, which SQLite would store as NULL.
    pub fn check_finite(&self) -> Result<()> {
        let temps = match self {
            Payload::Outdoor(r) => vec![r.temp_outside_f, r.temp_indoor_ref_f],
            Payload::Indoor(r) => vec![r.temp_c, r.temp_c_min, r.temp_c_max],
        };
        if let Some(t) = temps.iter().find(|t| !t.is_finite()) {
            bail!("non-finite {} temperature {t}", self.source().tag());
        }
        Ok(())
    }
}

/// One persisted record. `id` is assigned by the store and never reused.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct WeatherSample {
    pub id: i32,
    pub timestamp: i64, // s since epoch
    pub payload: Payload,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

/// Range query within a single data source.
///
/// `from` is inclusive, `before` is exclusive. Results are ordered by
/// timestamp, ties broken by insertion order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleQuery {
    pub source: DataSource,
    pub from: Option<i64>,
    pub before: Option<i64>,
    pub order: Order,
    pub limit: Option<i64>,
}

impl SampleQuery {
    pub fn new(source: DataSource) -> Self {
        Self {
            source,
            from: None,
            before: None,
            order: Order::Asc,
            limit: None,
        }
    }

    pub fn from(mut self, timestamp: i64) -> Self {
        self.from = Some(timestamp);
        self
    }

    pub fn before(mut self, timestamp: i64) -> Self {
        self.before = Some(timestamp);
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Read side of the sample store.
pub trait SampleStore {
    fn query(&mut self, query: &SampleQuery) -> Result<Vec<WeatherSample>>;
}

impl<S: SampleStore + ?Sized> SampleStore for &mut S {
    fn query(&mut self, query: &SampleQuery) -> Result<Vec<WeatherSample>> {
        (**self).query(query)
    }
}
