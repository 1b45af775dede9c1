use crate::bitfields::{BeamContent, EchoContent};
use crate::half_float;
use crate::result::{Error, Result};

/// One line's measurement channels within a module, present or absent per that module's
/// [EchoContent]/[BeamContent] flags.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineMeasurement {
    /// Per-echo, per-beam distance in millimetres, already scaled by the module's
    /// `distance_scaling_factor`.
    pub distance_mm: Option<Vec<Vec<f32>>>,

    /// Per-echo, per-beam raw distance sample, as transmitted, before the
    /// `distance_scaling_factor` multiply. Kept alongside `distance_mm` for callers that need the
    /// unscaled integer value and the factor separately.
    pub distance_raw: Option<Vec<Vec<u16>>>,

    /// Per-echo, per-beam received signal strength, unscaled.
    pub rssi: Option<Vec<Vec<u16>>>,

    /// Per-beam property flags.
    pub properties: Option<Vec<u8>>,

    /// Per-beam azimuth offset in radians, decoded from half-precision floats.
    pub channel_theta: Option<Vec<f32>>,
}

/// One COMPACT module: a batch of lines sharing segment/frame/sender identity and scan geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct CompactModule {
    pub segment_counter: u32,
    pub frame_number: u32,
    pub sender_id: u32,
    pub lines_in_module: u32,
    pub beams_per_scan: u32,
    pub echos_per_beam: u32,
    pub timestamp_start: Vec<u64>,
    pub timestamp_stop: Vec<u64>,
    pub phi: Vec<f32>,
    pub theta_start: Vec<f32>,
    pub theta_stop: Vec<f32>,
    pub distance_scaling_factor: f32,
    pub next_module_size: u32,
    pub data_content_echos: EchoContent,
    pub data_content_beams: BeamContent,
    pub lines: Vec<LineMeasurement>,
}

/// A cursor over a single module's byte slice. Every read advances the position and fails with
/// [Error::MalformedTelegram] rather than panicking on short input.
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.bytes.len() - self.pos < n {
            return Err(Error::MalformedTelegram(
                "module ended before declared fields were read".to_string(),
            ));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self) -> Result<u64> {
        let b = self.take(8)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    fn f32(&mut self) -> Result<f32> {
        let b = self.take(4)?;
        Ok(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

/// Byte offset of `lines_in_module` within a module's metadata prefix.
const LINES_IN_MODULE_OFFSET: usize = 12;

/// Length, in bytes, of a module's fixed six-`u32` metadata prefix.
const FIXED_PREFIX_LEN: usize = 24;

/// Length, in bytes, of the per-line metadata arrays (timestamps, phi, theta).
const PER_LINE_METADATA_LEN: usize = 8 + 8 + 4 + 4 + 4;

/// Peeks a module's `next_module_size` field without decoding its measurement block. Used by the
/// stream extractor, which only needs to know where the following module starts.
pub(crate) fn peek_next_module_size(bytes: &[u8]) -> Result<u32> {
    if bytes.len() < FIXED_PREFIX_LEN {
        return Err(Error::MalformedTelegram(
            "module shorter than its fixed metadata prefix".to_string(),
        ));
    }
    let l = &bytes[LINES_IN_MODULE_OFFSET..LINES_IN_MODULE_OFFSET + 4];
    let lines = u32::from_le_bytes([l[0], l[1], l[2], l[3]]);
    let offset = FIXED_PREFIX_LEN + lines as usize * PER_LINE_METADATA_LEN + 4;
    if bytes.len() < offset + 4 {
        return Err(Error::MalformedTelegram(
            "module shorter than its declared per-line metadata".to_string(),
        ));
    }
    let n = &bytes[offset..offset + 4];
    Ok(u32::from_le_bytes([n[0], n[1], n[2], n[3]]))
}

impl CompactModule {
    /// Decodes one module from its exact byte slice (metadata plus measurement block, excluding
    /// any other module or the trailing CRC).
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);

        let segment_counter = cursor.u32()?;
        let frame_number = cursor.u32()?;
        let sender_id = cursor.u32()?;
        let lines_in_module = cursor.u32()?;
        let beams_per_scan = cursor.u32()?;
        let echos_per_beam = cursor.u32()?;

        let lines = lines_in_module as usize;
        let mut timestamp_start = Vec::with_capacity(lines);
        for _ in 0..lines {
            timestamp_start.push(cursor.u64()?);
        }
        let mut timestamp_stop = Vec::with_capacity(lines);
        for _ in 0..lines {
            timestamp_stop.push(cursor.u64()?);
        }
        let mut phi = Vec::with_capacity(lines);
        for _ in 0..lines {
            phi.push(cursor.f32()?);
        }
        let mut theta_start = Vec::with_capacity(lines);
        for _ in 0..lines {
            theta_start.push(cursor.f32()?);
        }
        let mut theta_stop = Vec::with_capacity(lines);
        for _ in 0..lines {
            theta_stop.push(cursor.f32()?);
        }

        let distance_scaling_factor = cursor.f32()?;
        let next_module_size = cursor.u32()?;
        let _reserved1 = cursor.u8()?;
        let data_content_echos = EchoContent::from_bits_truncate(cursor.u8()?);
        let data_content_beams = BeamContent::from_bits_truncate(cursor.u8()?);
        let _reserved2 = cursor.u8()?;

        let beams = beams_per_scan as usize;
        let echos = echos_per_beam as usize;

        let mut line_measurements = Vec::with_capacity(lines);
        for _ in 0..lines {
            let (distance_mm, distance_raw) = if data_content_echos.contains(EchoContent::DISTANCE)
            {
                let mut scaled_per_echo = Vec::with_capacity(echos);
                let mut raw_per_echo = Vec::with_capacity(echos);
                for _ in 0..echos {
                    let mut scaled_beam_values = Vec::with_capacity(beams);
                    let mut raw_beam_values = Vec::with_capacity(beams);
                    for _ in 0..beams {
                        let raw = cursor.u16()?;
                        scaled_beam_values.push(raw as f32 * distance_scaling_factor);
                        raw_beam_values.push(raw);
                    }
                    scaled_per_echo.push(scaled_beam_values);
                    raw_per_echo.push(raw_beam_values);
                }
                (Some(scaled_per_echo), Some(raw_per_echo))
            } else {
                (None, None)
            };

            let rssi = if data_content_echos.contains(EchoContent::RSSI) {
                let mut per_echo = Vec::with_capacity(echos);
                for _ in 0..echos {
                    let mut beam_values = Vec::with_capacity(beams);
                    for _ in 0..beams {
                        beam_values.push(cursor.u16()?);
                    }
                    per_echo.push(beam_values);
                }
                Some(per_echo)
            } else {
                None
            };

            let properties = if data_content_beams.contains(BeamContent::PROPERTIES) {
                let mut values = Vec::with_capacity(beams);
                for _ in 0..beams {
                    values.push(cursor.u8()?);
                }
                Some(values)
            } else {
                None
            };

            let channel_theta = if data_content_beams.contains(BeamContent::CHANNEL_THETA) {
                let mut values = Vec::with_capacity(beams);
                for _ in 0..beams {
                    values.push(half_float::decode(cursor.u16()?));
                }
                Some(values)
            } else {
                None
            };

            line_measurements.push(LineMeasurement {
                distance_mm,
                distance_raw,
                rssi,
                properties,
                channel_theta,
            });
        }

        Ok(CompactModule {
            segment_counter,
            frame_number,
            sender_id,
            lines_in_module,
            beams_per_scan,
            echos_per_beam,
            timestamp_start,
            timestamp_stop,
            phi,
            theta_start,
            theta_stop,
            distance_scaling_factor,
            next_module_size,
            data_content_echos,
            data_content_beams,
            lines: line_measurements,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module_bytes(
        lines: u32,
        beams: u32,
        echos: u32,
        content_echos: u8,
        content_beams: u8,
    ) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u32.to_le_bytes()); // segment_counter
        bytes.extend_from_slice(&2u32.to_le_bytes()); // frame_number
        bytes.extend_from_slice(&3u32.to_le_bytes()); // sender_id
        bytes.extend_from_slice(&lines.to_le_bytes());
        bytes.extend_from_slice(&beams.to_le_bytes());
        bytes.extend_from_slice(&echos.to_le_bytes());

        for _ in 0..lines {
            bytes.extend_from_slice(&1000u64.to_le_bytes()); // timestamp_start
        }
        for _ in 0..lines {
            bytes.extend_from_slice(&2000u64.to_le_bytes()); // timestamp_stop
        }
        for _ in 0..lines {
            bytes.extend_from_slice(&0.0f32.to_le_bytes()); // phi
        }
        for _ in 0..lines {
            bytes.extend_from_slice(&(-1.5f32).to_le_bytes()); // theta_start
        }
        for _ in 0..lines {
            bytes.extend_from_slice(&1.5f32.to_le_bytes()); // theta_stop
        }

        bytes.extend_from_slice(&0.001f32.to_le_bytes()); // distance_scaling_factor
        bytes.extend_from_slice(&0u32.to_le_bytes()); // next_module_size
        bytes.push(0); // reserved1
        bytes.push(content_echos);
        bytes.push(content_beams);
        bytes.push(0); // reserved2

        for _ in 0..lines {
            if content_echos & 0b01 != 0 {
                for _ in 0..echos {
                    for beam in 0..beams {
                        bytes.extend_from_slice(&(beam as u16).to_le_bytes());
                    }
                }
            }
            if content_echos & 0b10 != 0 {
                for _ in 0..echos {
                    for _ in 0..beams {
                        bytes.extend_from_slice(&42u16.to_le_bytes());
                    }
                }
            }
            if content_beams & 0b01 != 0 {
                for _ in 0..beams {
                    bytes.push(7);
                }
            }
            if content_beams & 0b10 != 0 {
                for _ in 0..beams {
                    bytes.extend_from_slice(&0x3C00u16.to_le_bytes()); // half-float 1.0
                }
            }
        }

        bytes
    }

    #[test]
    fn decodes_module_with_all_channels() {
        let bytes = module_bytes(2, 4, 1, 0b11, 0b11);
        let module = CompactModule::decode(&bytes).unwrap();

        assert_eq!(module.lines_in_module, 2);
        assert_eq!(module.beams_per_scan, 4);
        assert_eq!(module.echos_per_beam, 1);
        assert_eq!(module.lines.len(), 2);

        let distances = module.lines[0].distance_mm.as_ref().unwrap();
        assert_eq!(distances.len(), 1);
        assert_eq!(distances[0], vec![0.0, 0.001, 0.002, 0.003]);

        let raw_distances = module.lines[0].distance_raw.as_ref().unwrap();
        assert_eq!(raw_distances[0], vec![0, 1, 2, 3]);

        let rssi = module.lines[0].rssi.as_ref().unwrap();
        assert_eq!(rssi[0], vec![42, 42, 42, 42]);

        let properties = module.lines[0].properties.as_ref().unwrap();
        assert_eq!(properties, &vec![7, 7, 7, 7]);

        let theta = module.lines[0].channel_theta.as_ref().unwrap();
        for value in theta {
            assert_eq!(*value, 1.0);
        }
    }

    #[test]
    fn omits_channels_not_present_in_flags() {
        let bytes = module_bytes(1, 2, 1, 0b00, 0b00);
        let module = CompactModule::decode(&bytes).unwrap();

        assert!(module.lines[0].distance_mm.is_none());
        assert!(module.lines[0].distance_raw.is_none());
        assert!(module.lines[0].rssi.is_none());
        assert!(module.lines[0].properties.is_none());
        assert!(module.lines[0].channel_theta.is_none());
    }

    #[test]
    fn peek_next_module_size_reads_without_full_decode() {
        let mut bytes = module_bytes(1, 2, 1, 0b00, 0b00);
        // patch next_module_size (right after the fixed prefix, per-line metadata, and scaling
        // factor) to a nonzero value to confirm the peek finds it at the right offset.
        let offset = FIXED_PREFIX_LEN + 1 * PER_LINE_METADATA_LEN + 4;
        bytes[offset..offset + 4].copy_from_slice(&555u32.to_le_bytes());
        assert_eq!(peek_next_module_size(&bytes).unwrap(), 555);
    }

    #[test]
    fn truncated_module_is_malformed() {
        let bytes = module_bytes(1, 4, 1, 0b11, 0b11);
        let truncated = &bytes[..bytes.len() - 1];
        assert!(matches!(
            CompactModule::decode(truncated),
            Err(Error::MalformedTelegram(_))
        ));
    }
}
