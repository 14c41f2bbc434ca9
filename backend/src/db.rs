use crate::sample::{
    IndoorReading, Order, OutdoorReading, Payload, SampleQuery, SampleStore, WeatherSample,
};
use crate::schema::*;
use anyhow::{anyhow, Context, Result};
use common::req::DataSource;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::debug;

// keep in sync with schema.rs
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS samples (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    source TEXT NOT NULL,
    timestamp BIGINT NOT NULL,
    temp_outside_f DOUBLE,
    temp_indoor_ref_f DOUBLE,
    rain_daily_raw INTEGER,
    rain_rate_raw INTEGER,
    temp_c DOUBLE,
    temp_c_min DOUBLE,
    temp_c_max DOUBLE
);
CREATE INDEX IF NOT EXISTS samples_source_timestamp ON samples (source, timestamp);
";

#[derive(Debug, Default, Insertable)]
#[diesel(table_name=samples)]
struct NewSampleRow<'a> {
    source: &'a str,
    timestamp: i64,
    temp_outside_f: Option<f64>,
    temp_indoor_ref_f: Option<f64>,
    rain_daily_raw: Option<i32>,
    rain_rate_raw: Option<i32>,
    temp_c: Option<f64>,
    temp_c_min: Option<f64>,
    temp_c_max: Option<f64>,
}

#[derive(Debug, Queryable)]
struct SampleRow {
    id: i32,
    source: String,
    timestamp: i64,
    temp_outside_f: Option<f64>,
    temp_indoor_ref_f: Option<f64>,
    rain_daily_raw: Option<i32>,
    rain_rate_raw: Option<i32>,
    temp_c: Option<f64>,
    temp_c_min: Option<f64>,
    temp_c_max: Option<f64>,
}

impl TryFrom<SampleRow> for WeatherSample {
    type Error = anyhow::Error;

    fn try_from(row: SampleRow) -> Result<Self> {
        let missing = |column: &str| anyhow!("sample {} has no {column}", row.id);

        let payload = match DataSource::from_tag(&row.source) {
            Some(DataSource::Outdoor) => Payload::Outdoor(OutdoorReading {
                temp_outside_f: row.temp_outside_f.ok_or_else(|| missing("temp_outside_f"))?,
                temp_indoor_ref_f: row
                    .temp_indoor_ref_f
                    .ok_or_else(|| missing("temp_indoor_ref_f"))?,
                rain_daily_raw: row.rain_daily_raw.ok_or_else(|| missing("rain_daily_raw"))?,
                rain_rate_raw: row.rain_rate_raw.ok_or_else(|| missing("rain_rate_raw"))?,
            }),
            Some(DataSource::Indoor) => Payload::Indoor(IndoorReading {
                temp_c: row.temp_c.ok_or_else(|| missing("temp_c"))?,
                temp_c_min: row.temp_c_min.ok_or_else(|| missing("temp_c_min"))?,
                temp_c_max: row.temp_c_max.ok_or_else(|| missing("temp_c_max"))?,
            }),
            None => return Err(anyhow!("sample {} has unknown source {:?}", row.id, row.source)),
        };

        Ok(Self {
            id: row.id,
            timestamp: row.timestamp,
            payload,
        })
    }
}

pub struct Db {
    conn: SqliteConnection,
}

impl Db {
    pub fn connect(database_url: &str) -> Result<Self> {
        let mut conn = SqliteConnection::establish(database_url)
            .with_context(|| format!("failed to open database {database_url}"))?;
        conn.batch_execute(SCHEMA)
            .context("failed to create samples table")?;

        Ok(Self { conn })
    }

    /// Appends a sample and returns its generated id.
    pub fn insert_sample(&mut self, timestamp: i64, payload: &Payload) -> Result<i32> {
        payload.check_finite()?;
        let mut row = NewSampleRow {
            source: payload.source().tag(),
            timestamp,
            ..Default::default()
        };
        match payload {
            Payload::Outdoor(r) => {
                row.temp_outside_f = Some(r.temp_outside_f);
                row.temp_indoor_ref_f = Some(r.temp_indoor_ref_f);
                row.rain_daily_raw = Some(r.rain_daily_raw);
                row.rain_rate_raw = Some(r.rain_rate_raw);
            }
            Payload::Indoor(r) => {
                row.temp_c = Some(r.temp_c);
                row.temp_c_min = Some(r.temp_c_min);
                row.temp_c_max = Some(r.temp_c_max);
            }
        }

        let id = self.conn.transaction(|conn| {
            diesel::insert_into(samples::table)
                .values(&row)
                .execute(conn)?;
            samples::table
                .select(samples::id)
                .order(samples::id.desc())
                .first::<i32>(conn)
        })?;
        debug!("Inserted {} sample {id} at {timestamp}", row.source);

        Ok(id)
    }
}

impl SampleStore for Db {
    fn query(&mut self, query: &SampleQuery) -> Result<Vec<WeatherSample>> {
        let mut q = samples::table
            .filter(samples::source.eq(query.source.tag()))
            .into_boxed();
        if let Some(from) = query.from {
            q = q.filter(samples::timestamp.ge(from));
        }
        if let Some(before) = query.before {
            q = q.filter(samples::timestamp.lt(before));
        }
        q = match query.order {
            Order::Asc => q.order((samples::timestamp.asc(), samples::id.asc())),
            Order::Desc => q.order((samples::timestamp.desc(), samples::id.desc())),
        };
        if let Some(limit) = query.limit {
            q = q.limit(limit);
        }

        let rows = q
            .load::<SampleRow>(&mut self.conn)
            .with_context(|| format!("failed to query {} samples", query.source.tag()))?;
        rows.into_iter().map(WeatherSample::try_from).collect()
    }
}
