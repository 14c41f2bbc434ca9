use anyhow::{bail, Context, Result};

use crate::sample::Payload;

const MAGIC: &str = "WX01";

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Header {
    magic: String,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            magic: MAGIC.to_string(),
        }
    }
}

/// Datagram sent by the ingestion jobs, one reading each.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Packet {
    pub header: Header,
    pub timestamp: i64, // s since epoch
    pub payload: Payload,
}

impl Packet {
    pub fn decode(data: &[u8]) -> Result<Self> {
        let packet: Self = postcard::from_bytes(data).context("malformed packet")?;
        if packet.header.magic != MAGIC {
            bail!("bad magic {:?}", packet.header.magic);
        }
        packet.payload.check_finite()?;
        Ok(packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::{IndoorReading, OutdoorReading};

    #[test]
    fn decode_outdoor_packet() {
        let reading = OutdoorReading {
            temp_outside_f: 88.1,
            temp_indoor_ref_f: 76.0,
            rain_daily_raw: 12,
            rain_rate_raw: 3,
        };
        let data = postcard::to_allocvec(&Packet {
            header: Header::default(),
            timestamp: 1_700_000_000,
            payload: Payload::Outdoor(reading),
        })
        .unwrap();

        let packet = Packet::decode(&data).unwrap();
        assert_eq!(packet.timestamp, 1_700_000_000);
        assert_eq!(packet.payload, Payload::Outdoor(reading));
    }

    #[test]
    fn reject_foreign_magic() {
        let data = postcard::to_allocvec(&Packet {
            header: Header {
                magic: "M1S1".to_string(),
            },
            timestamp: 1,
            payload: Payload::Indoor(IndoorReading::default()),
        })
        .unwrap();

        let err = Packet::decode(&data).unwrap_err();
        assert!(err.to_string().contains("bad magic"));
    }

    #[test]
    fn reject_non_finite_temperature() {
        let data = postcard::to_allocvec(&Packet {
            header: Header::default(),
            timestamp: 1,
            payload: Payload::Indoor(IndoorReading {
                temp_c: 21.0,
                temp_c_min: f64::NEG_INFINITY,
                temp_c_max: 22.0,
            }),
        })
        .unwrap();

        let err = Packet::decode(&data).unwrap_err();
        assert!(err.to_string().contains("non-finite"));
    }

    #[test]
    fn reject_garbage() {
        assert!(Packet::decode(&[0xff, 0x01]).is_err());
        assert!(Packet::decode(&[]).is_err());
    }
}
