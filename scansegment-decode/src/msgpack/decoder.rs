//!
//! Decoder for the MSGPACK scan-segment telegram encoding.
//!
//! On-wire field names are assigned small integer keys by the sensor firmware; only
//! `TelegramCounter`'s key (`2`) is fixed by the wire contract, so the remaining keys below are
//! assigned sequentially in the order the fields are documented. String keys are always accepted
//! as a fallback, since some firmware revisions emit them instead of integers.
//!

use crate::crc;
use crate::msgpack::model::{MsgpackSegment, Scan};
use crate::result::{Error, Result};
use rmpv::Value;

mod keys {
    pub const TELEGRAM_COUNTER: i64 = 2;
    pub const TIMESTAMP_TRANSMIT: i64 = 3;
    pub const SEGMENT_COUNTER: i64 = 4;
    pub const FRAME_NUMBER: i64 = 5;
    pub const SENDER_ID: i64 = 6;
    pub const SEGMENT_DATA: i64 = 7;
    pub const LAYER_ID: i64 = 8;
    pub const AVAILABILITY: i64 = 9;

    pub const TIMESTAMP_START: i64 = 1;
    pub const TIMESTAMP_STOP: i64 = 2;
    pub const THETA_START: i64 = 3;
    pub const THETA_STOP: i64 = 4;
    pub const PHI: i64 = 5;
    pub const DISTANCE: i64 = 6;
    pub const RSSI: i64 = 7;
    /// Pinned by the wire contract (not sequentially assigned like its neighbors): the README's
    /// `Propertiesv` spelling is a typo for this same field, keyed `27`.
    pub const PROPERTIES: i64 = 27;
    pub const CHANNEL_THETA: i64 = 9;
    pub const BEAM_COUNT: i64 = 10;
    pub const ECHO_COUNT: i64 = 11;
    pub const SCAN_NUMBER: i64 = 12;
    pub const MODULE_ID: i64 = 13;
}

/// Decodes one complete MSGPACK telegram, including its trailing CRC, from `bytes`.
pub fn decode(bytes: &[u8]) -> Result<MsgpackSegment> {
    if bytes.len() < 4 {
        return Err(Error::MalformedTelegram(
            "telegram shorter than its trailing CRC".to_string(),
        ));
    }
    let (body, crc_bytes) = bytes.split_at(bytes.len() - 4);
    let expected = u32::from_le_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);
    let computed = crc::checksum(body);
    if expected != computed {
        return Err(Error::CrcMismatch {
            expected,
            computed,
            telegram: crate::BinaryData::new(bytes.to_vec()),
        });
    }

    let mut cursor = body;
    let root = rmpv::decode::read_value(&mut cursor)
        .map_err(|err| Error::MalformedTelegram(format!("invalid MSGPACK body: {err}")))?;

    let outer = as_map(&root, "root")?;
    if outer.len() != 1 {
        return Err(Error::MalformedTelegram(
            "outer MSGPACK map must have exactly one entry".to_string(),
        ));
    }
    if !key_matches(&outer[0].0, 1, "1") {
        return Err(Error::MalformedTelegram(
            "outer MSGPACK map's single key must be 1".to_string(),
        ));
    }

    let root_fields = as_map(&outer[0].1, "root")?;

    let telegram_counter = as_u64(
        field(root_fields, keys::TELEGRAM_COUNTER, "TelegramCounter")?,
        "TelegramCounter",
    )?;
    let timestamp_transmit = as_u64(
        field(root_fields, keys::TIMESTAMP_TRANSMIT, "TimestampTransmit")?,
        "TimestampTransmit",
    )?;
    let segment_counter = as_u64(
        field(root_fields, keys::SEGMENT_COUNTER, "SegmentCounter")?,
        "SegmentCounter",
    )? as u32;
    let frame_number = as_u64(
        field(root_fields, keys::FRAME_NUMBER, "FrameNumber")?,
        "FrameNumber",
    )? as u32;
    let sender_id = as_u64(
        field(root_fields, keys::SENDER_ID, "SenderId")?,
        "SenderId",
    )? as u32;

    let layer_id = optional_field(root_fields, keys::LAYER_ID, "LayerId")
        .map(|v| as_i64(v, "LayerId"))
        .transpose()?;
    let availability = optional_field(root_fields, keys::AVAILABILITY, "Availability")
        .map(|v| as_i64(v, "Availability"))
        .transpose()?;

    let scan_values = as_array(
        field(root_fields, keys::SEGMENT_DATA, "SegmentData")?,
        "SegmentData",
    )?;
    let scans = scan_values
        .iter()
        .map(decode_scan)
        .collect::<Result<Vec<_>>>()?;

    Ok(MsgpackSegment {
        telegram_counter,
        timestamp_transmit,
        segment_counter,
        frame_number,
        sender_id,
        layer_id,
        availability,
        scans,
    })
}

fn decode_scan(value: &Value) -> Result<Scan> {
    let fields = as_map(value, "SegmentData[]")?;

    let timestamp_start = as_u64(
        field(fields, keys::TIMESTAMP_START, "TimestampStart")?,
        "TimestampStart",
    )?;
    let timestamp_stop = as_u64(
        field(fields, keys::TIMESTAMP_STOP, "TimestampStop")?,
        "TimestampStop",
    )?;
    let theta_start = as_f32(
        field(fields, keys::THETA_START, "ThetaStart")?,
        "ThetaStart",
    )?;
    let theta_stop = as_f32(field(fields, keys::THETA_STOP, "ThetaStop")?, "ThetaStop")?;
    let phi = as_f32(field(fields, keys::PHI, "Phi")?, "Phi")?;
    let beam_count = as_u64(
        field(fields, keys::BEAM_COUNT, "BeamCount")?,
        "BeamCount",
    )? as u32;
    let echo_count = as_u64(
        field(fields, keys::ECHO_COUNT, "EchoCount")?,
        "EchoCount",
    )? as u32;

    let distance = as_nested_u32(
        field(fields, keys::DISTANCE, "Distance")?,
        "Distance",
    )?;
    let rssi = as_nested_u32(field(fields, keys::RSSI, "Rssi")?, "Rssi")?;
    let properties = as_byte_vec(
        field(fields, keys::PROPERTIES, "Properties")?,
        "Properties",
    )?;
    let channel_theta = as_f32_vec(
        field(fields, keys::CHANNEL_THETA, "ChannelTheta")?,
        "ChannelTheta",
    )?;

    let scan_number = optional_field(fields, keys::SCAN_NUMBER, "ScanNumber")
        .map(|v| as_i64(v, "ScanNumber"))
        .transpose()?;
    let module_id = optional_field(fields, keys::MODULE_ID, "ModuleID")
        .map(|v| as_i64(v, "ModuleID"))
        .transpose()?;

    Ok(Scan {
        timestamp_start,
        timestamp_stop,
        theta_start,
        theta_stop,
        phi,
        beam_count,
        echo_count,
        distance,
        rssi,
        properties,
        channel_theta,
        scan_number,
        module_id,
    })
}

fn key_matches(key: &Value, int_key: i64, str_key: &str) -> bool {
    match key {
        Value::Integer(i) => i.as_i64() == Some(int_key),
        Value::String(s) => s.as_str() == Some(str_key),
        _ => false,
    }
}

fn lookup<'v>(map: &'v [(Value, Value)], int_key: i64, str_key: &str) -> Option<&'v Value> {
    map.iter()
        .find(|(k, _)| key_matches(k, int_key, str_key))
        .map(|(_, v)| v)
}

fn field<'v>(
    map: &'v [(Value, Value)],
    int_key: i64,
    name: &'static str,
) -> Result<&'v Value> {
    lookup(map, int_key, name).ok_or(Error::MissingField(name))
}

fn optional_field<'v>(
    map: &'v [(Value, Value)],
    int_key: i64,
    name: &str,
) -> Option<&'v Value> {
    lookup(map, int_key, name)
}

fn as_map<'v>(value: &'v Value, field: &'static str) -> Result<&'v [(Value, Value)]> {
    value.as_map().ok_or(Error::TypeMismatch {
        field,
        expected: "map",
    })
}

fn as_array<'v>(value: &'v Value, field: &'static str) -> Result<&'v [Value]> {
    value.as_array().ok_or(Error::TypeMismatch {
        field,
        expected: "array",
    })
}

fn as_u64(value: &Value, field: &'static str) -> Result<u64> {
    value.as_u64().ok_or(Error::TypeMismatch {
        field,
        expected: "unsigned integer",
    })
}

fn as_i64(value: &Value, field: &'static str) -> Result<i64> {
    value.as_i64().ok_or(Error::TypeMismatch {
        field,
        expected: "integer",
    })
}

fn as_f32(value: &Value, field: &'static str) -> Result<f32> {
    value
        .as_f64()
        .map(|f| f as f32)
        .ok_or(Error::TypeMismatch {
            field,
            expected: "float",
        })
}

fn as_nested_u32(value: &Value, field: &'static str) -> Result<Vec<Vec<u32>>> {
    as_array(value, field)?
        .iter()
        .map(|echo| {
            as_array(echo, field)?
                .iter()
                .map(|beam| as_u64(beam, field).map(|v| v as u32))
                .collect()
        })
        .collect()
}

fn as_byte_vec(value: &Value, field: &'static str) -> Result<Vec<u8>> {
    if let Some(bytes) = value.as_slice() {
        return Ok(bytes.to_vec());
    }
    as_array(value, field)?
        .iter()
        .map(|v| as_u64(v, field).map(|v| v as u8))
        .collect()
}

fn as_f32_vec(value: &Value, field: &'static str) -> Result<Vec<f32>> {
    as_array(value, field)?
        .iter()
        .map(|v| as_f32(v, field))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmpv::Value;

    fn sample_root(use_string_keys: bool) -> Value {
        let key = |int_key: i64, name: &str| -> Value {
            if use_string_keys {
                Value::String(name.into())
            } else {
                Value::Integer(int_key.into())
            }
        };

        let scan = Value::Map(vec![
            (key(1, "TimestampStart"), Value::from(100u64)),
            (key(2, "TimestampStop"), Value::from(200u64)),
            (key(3, "ThetaStart"), Value::F32(-1.0)),
            (key(4, "ThetaStop"), Value::F32(1.0)),
            (key(5, "Phi"), Value::F32(0.1)),
            (
                key(6, "Distance"),
                Value::Array(vec![Value::Array(vec![Value::from(10u64), Value::from(20u64)])]),
            ),
            (
                key(7, "Rssi"),
                Value::Array(vec![Value::Array(vec![Value::from(1u64), Value::from(2u64)])]),
            ),
            (
                key(8, "Properties"),
                Value::Array(vec![Value::from(0u64), Value::from(1u64)]),
            ),
            (
                key(9, "ChannelTheta"),
                Value::Array(vec![Value::F32(0.0), Value::F32(0.5)]),
            ),
            (key(10, "BeamCount"), Value::from(2u64)),
            (key(11, "EchoCount"), Value::from(1u64)),
            (key(12, "ScanNumber"), Value::from(5u64)),
            (key(13, "ModuleID"), Value::from(0u64)),
        ]);

        let root_fields = Value::Map(vec![
            (key(2, "TelegramCounter"), Value::from(7u64)),
            (key(3, "TimestampTransmit"), Value::from(123456u64)),
            (key(4, "SegmentCounter"), Value::from(1u64)),
            (key(5, "FrameNumber"), Value::from(9u64)),
            (key(6, "SenderId"), Value::from(42u64)),
            (key(7, "SegmentData"), Value::Array(vec![scan])),
            (key(8, "LayerId"), Value::from(0u64)),
            (key(9, "Availability"), Value::from(1u64)),
        ]);

        Value::Map(vec![(Value::Integer(1i64.into()), root_fields)])
    }

    fn bytes_for(root: &Value) -> Vec<u8> {
        let mut body = Vec::new();
        rmpv::encode::write_value(&mut body, root).unwrap();
        let crc = crc::checksum(&body);
        let mut telegram = body;
        telegram.extend_from_slice(&crc.to_le_bytes());
        telegram
    }

    #[test]
    fn decodes_with_integer_keys() {
        let root = sample_root(false);
        let bytes = bytes_for(&root);
        let segment = decode(&bytes).unwrap();

        assert_eq!(segment.telegram_counter, 7);
        assert_eq!(segment.segment_counter, 1);
        assert_eq!(segment.frame_number, 9);
        assert_eq!(segment.scans.len(), 1);
        assert_eq!(segment.scans[0].beam_count, 2);
        assert_eq!(segment.scans[0].distance, vec![vec![10, 20]]);
        assert_eq!(segment.scans[0].channel_theta, vec![0.0, 0.5]);
    }

    #[test]
    fn decodes_with_string_keys() {
        let root = sample_root(true);
        let bytes = bytes_for(&root);
        let segment = decode(&bytes).unwrap();

        assert_eq!(segment.telegram_counter, 7);
        assert_eq!(segment.scans[0].properties, vec![0, 1]);
    }

    #[test]
    fn rejects_crc_mismatch() {
        let root = sample_root(false);
        let mut bytes = bytes_for(&root);
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert!(matches!(decode(&bytes), Err(Error::CrcMismatch { .. })));
    }

    #[test]
    fn rejects_missing_required_field() {
        let mut root_fields = match sample_root(false) {
            Value::Map(mut outer) => match outer.remove(0).1 {
                Value::Map(fields) => fields,
                _ => unreachable!(),
            },
            _ => unreachable!(),
        };
        root_fields.retain(|(k, _)| !key_matches(k, keys::SENDER_ID, "SenderId"));
        let root = Value::Map(vec![(Value::Integer(1i64.into()), Value::Map(root_fields))]);
        let bytes = bytes_for(&root);
        assert!(matches!(decode(&bytes), Err(Error::MissingField("SenderId"))));
    }

    #[test]
    fn rejects_non_map_outer_value() {
        let root = Value::Array(vec![Value::from(1u64)]);
        let bytes = bytes_for(&root);
        assert!(matches!(decode(&bytes), Err(Error::TypeMismatch { .. })));
    }
}
