// keep in sync with the snapshot assembly of the backend

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Personal weather station (outdoor sensor + console reference).
    Outdoor,
    /// Indoor climate sensor.
    Indoor,
}

impl DataSource {
    pub const ALL: [Self; 2] = [Self::Outdoor, Self::Indoor];

    /// Tag stored alongside every record of this source.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Outdoor => "weatherlink_weather",
            Self::Indoor => "netatmo_weather",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.tag() == tag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct TemperatureReport {
    pub temp: f64,     // °C
    pub temp_max: f64, // °C
    pub temp_min: f64, // °C
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct RainReport {
    pub day: f64,  // mm
    pub rate: f64, // mm/h
    pub timestamp: i64,
}

/// Unified reading of all sources, as served by `/api/weather`.
///
/// Missing summaries serialize as `null`.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct WeatherSnapshot {
    pub outside: Option<TemperatureReport>,
    pub bedroom: Option<TemperatureReport>,
    pub kdk_inside: Option<TemperatureReport>,
    pub rain: Option<RainReport>,
    pub timestamp: i64, // request time, s
}

impl WeatherSnapshot {
    pub fn empty(timestamp: i64) -> Self {
        Self {
            outside: None,
            bedroom: None,
            kdk_inside: None,
            rain: None,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for source in DataSource::ALL {
            assert_eq!(DataSource::from_tag(source.tag()), Some(source));
        }
        assert_eq!(DataSource::from_tag("netatmo_token"), None);
    }

    #[test]
    fn absent_summaries_are_null() {
        let json = serde_json::to_value(WeatherSnapshot::empty(42)).unwrap();
        assert!(json["outside"].is_null());
        assert!(json["bedroom"].is_null());
        assert!(json["kdk_inside"].is_null());
        assert!(json["rain"].is_null());
        assert_eq!(json["timestamp"], 42);
    }

    #[test]
    fn rain_uses_short_field_names() {
        let rain = RainReport {
            day: 1.2,
            rate: 0.4,
            timestamp: 7,
        };
        let json = serde_json::to_value(rain).unwrap();
        assert_eq!(json["day"], 1.2);
        assert_eq!(json["rate"], 0.4);
        assert_eq!(json["timestamp"], 7);
    }
}
