/// One scan within an MSGPACK telegram's `SegmentData` list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scan {
    pub timestamp_start: u64,
    pub timestamp_stop: u64,
    pub theta_start: f32,
    pub theta_stop: f32,
    pub phi: f32,
    pub beam_count: u32,
    pub echo_count: u32,
    pub distance: Vec<Vec<u32>>,
    pub rssi: Vec<Vec<u32>>,
    pub properties: Vec<u8>,
    pub channel_theta: Vec<f32>,
    pub scan_number: Option<i64>,
    pub module_id: Option<i64>,
}

/// A fully decoded MSGPACK telegram: segment identity plus its scans.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MsgpackSegment {
    pub telegram_counter: u64,
    pub timestamp_transmit: u64,
    pub segment_counter: u32,
    pub frame_number: u32,
    pub sender_id: u32,
    pub layer_id: Option<i64>,
    pub availability: Option<i64>,
    pub scans: Vec<Scan>,
}
