//! Daily aggregation of stored samples.
//!
//! The two sources are reduced differently. The outdoor station only reports
//! instantaneous values, so every sample since local midnight is scanned to
//! find the day's bounds. The indoor sensor reports its own min/max, so only
//! its latest sample is read.

use std::time::Instant;

use anyhow::{bail, Result};
use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use common::req::{DataSource, RainReport, TemperatureReport};
use log::debug;

use crate::sample::{Order, Payload, SampleQuery, SampleStore};

/// Civil timezone that defines "today".
pub const LOCAL_TZ: Tz = chrono_tz::America::Asuncion;

/// mm of rain per bucket tip.
pub const RAIN_SCALE: f64 = 0.2;

pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

pub fn scale_rain(raw: i32) -> f64 {
    f64::from(raw) * RAIN_SCALE
}

/// First instant of the calendar day containing `now` in `tz`.
pub fn local_midnight(now: DateTime<Utc>, tz: Tz) -> DateTime<Tz> {
    let date = now.with_timezone(&tz).date_naive();
    // a DST jump may skip 00:00, the day then starts at the first valid hour
    (0..24)
        .filter_map(|h| NaiveTime::from_hms_opt(h, 0, 0))
        .find_map(|t| tz.from_local_datetime(&date.and_time(t)).earliest())
        .unwrap_or_else(|| now.with_timezone(&tz))
}

/// Running bounds, seeded so that the first observation sets both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bounds {
    min: f64,
    max: f64,
}

impl Bounds {
    const EMPTY: Self = Self {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    fn observe(&mut self, value: f64) {
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    fn report_celsius(&self, current_f: f64, timestamp: i64) -> TemperatureReport {
        TemperatureReport {
            temp: fahrenheit_to_celsius(current_f),
            temp_max: fahrenheit_to_celsius(self.max),
            temp_min: fahrenheit_to_celsius(self.min),
            timestamp,
        }
    }
}

/// Outdoor station summary for the current day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutdoorDay {
    pub outside: TemperatureReport,
    pub indoor_ref: TemperatureReport,
    pub rain: RainReport,
}

pub struct Aggregator<S> {
    store: S,
    tz: Tz,
}

impl<S: SampleStore> Aggregator<S> {
    pub fn new(store: S) -> Self {
        Self::with_timezone(store, LOCAL_TZ)
    }

    pub fn with_timezone(store: S, tz: Tz) -> Self {
        Self { store, tz }
    }

    /// Reduces all outdoor samples since local midnight.
    ///
    /// Returns `None` when nothing was recorded today yet.
    pub fn aggregate_outdoor(&mut self, now: DateTime<Utc>) -> Result<Option<OutdoorDay>> {
        let midnight = local_midnight(now, self.tz).timestamp();

        let started = Instant::now();
        let samples = self
            .store
            .query(&SampleQuery::new(DataSource::Outdoor).from(midnight))?;
        debug!(
            "Fetched {} outdoor samples since {midnight} in {} ms",
            samples.len(),
            started.elapsed().as_millis()
        );

        let mut outside = Bounds::EMPTY;
        let mut indoor_ref = Bounds::EMPTY;
        let mut last = None;
        for sample in &samples {
            let Payload::Outdoor(reading) = sample.payload else {
                bail!("sample {} is not an outdoor reading", sample.id);
            };
            outside.observe(reading.temp_outside_f);
            indoor_ref.observe(reading.temp_indoor_ref_f);
            last = Some((sample.timestamp, reading));
        }

        Ok(last.map(|(ts, current)| OutdoorDay {
            outside: outside.report_celsius(current.temp_outside_f, ts),
            indoor_ref: indoor_ref.report_celsius(current.temp_indoor_ref_f, ts),
            rain: RainReport {
                day: scale_rain(current.rain_daily_raw),
                rate: scale_rain(current.rain_rate_raw),
                timestamp: ts,
            },
        }))
    }

    /// Latest indoor sensor reading strictly before `now`, as reported.
    pub fn aggregate_indoor_sensor(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<Option<TemperatureReport>> {
        let started = Instant::now();
        let samples = self.store.query(
            &SampleQuery::new(DataSource::Indoor)
                .before(now.timestamp())
                .order(Order::Desc)
                .limit(1),
        )?;
        debug!(
            "Fetched latest indoor sample in {} ms",
            started.elapsed().as_millis()
        );

        let Some(sample) = samples.first() else {
            return Ok(None);
        };
        let Payload::Indoor(reading) = sample.payload else {
            bail!("sample {} is not an indoor reading", sample.id);
        };

        Ok(Some(TemperatureReport {
            temp: reading.temp_c,
            temp_max: reading.temp_c_max,
            temp_min: reading.temp_c_min,
            timestamp: sample.timestamp,
        }))
    }
}
