//! # Summarize Module
//!
//! Produces a one-line, human-readable summary of a decoded telegram, for callers (chiefly the
//! CLI's `read` subcommand) that want a quick look at a segment without formatting its full
//! `Debug` output.

use crate::compact::CompactSegment;
use crate::msgpack::MsgpackSegment;
use std::fmt::{self, Display, Formatter};

/// Summary of one decoded COMPACT telegram.
#[derive(Clone, Debug, PartialEq)]
pub struct CompactSummary {
    pub telegram_counter: u64,
    pub frame_number: u32,
    pub segment_counter: u32,
    pub module_count: usize,
    pub line_count: usize,
    pub beams_per_scan: u32,
    pub echos_per_beam: u32,
}

impl Display for CompactSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "telegram #{}: frame {}, segment {}, {} module(s), {} line(s), {} beam(s)/scan, {} echo(es)/beam",
            self.telegram_counter,
            self.frame_number,
            self.segment_counter,
            self.module_count,
            self.line_count,
            self.beams_per_scan,
            self.echos_per_beam,
        )
    }
}

/// Summarizes a decoded COMPACT telegram's header and module dimensions.
///
/// Dimensions (`line_count`, `beams_per_scan`, `echos_per_beam`) are taken from the first module;
/// a telegram always has at least one ([crate::result::Error::MalformedTelegram] is raised
/// otherwise during decode).
pub fn compact(segment: &CompactSegment) -> CompactSummary {
    let first = &segment.modules[0];
    CompactSummary {
        telegram_counter: segment.telegram_counter,
        frame_number: segment.frame_number(),
        segment_counter: segment.segment_counter(),
        module_count: segment.modules.len(),
        line_count: segment.modules.iter().map(|m| m.lines.len()).sum(),
        beams_per_scan: first.beams_per_scan,
        echos_per_beam: first.echos_per_beam,
    }
}

/// Summary of one decoded MSGPACK telegram.
#[derive(Clone, Debug, PartialEq)]
pub struct MsgpackSummary {
    pub telegram_counter: u64,
    pub frame_number: u32,
    pub segment_counter: u32,
    pub scan_count: usize,
    pub beam_count: u32,
    pub echo_count: u32,
}

impl Display for MsgpackSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "telegram #{}: frame {}, segment {}, {} scan(s), {} beam(s), {} echo(es)",
            self.telegram_counter,
            self.frame_number,
            self.segment_counter,
            self.scan_count,
            self.beam_count,
            self.echo_count,
        )
    }
}

/// Summarizes a decoded MSGPACK telegram's header and first scan's dimensions.
pub fn msgpack(segment: &MsgpackSegment) -> MsgpackSummary {
    let (beam_count, echo_count) = segment
        .scans
        .first()
        .map(|scan| (scan.beam_count, scan.echo_count))
        .unwrap_or((0, 0));

    MsgpackSummary {
        telegram_counter: segment.telegram_counter,
        frame_number: segment.frame_number,
        segment_counter: segment.segment_counter,
        scan_count: segment.scans.len(),
        beam_count,
        echo_count,
    }
}
