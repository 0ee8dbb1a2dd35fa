use historian_base::{err, Direction, Result, StatusCode, TimestampsToReturn};

/// Wire format for a paginated read's resume state. Fixed-size, little-endian,
/// 24 bytes. Clients must treat the bytes as opaque; only this module
/// constructs or parses them.
///
/// Layout: `version(1) | direction(1) | flags(1) | reserved(1) | nextIndex(8)
/// | remaining(4) | endIdx(8)`. `returnBounds` and `timestampsToReturn` are
/// packed into `flags` rather than carried as their own bytes, which keeps
/// the record at 24 bytes instead of 25.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ContinuationPoint {
    pub direction: Direction,
    pub return_bounds: bool,
    pub timestamps_to_return: TimestampsToReturn,
    /// Index to resume copying from (inclusive), in store-index space.
    pub next_index: u64,
    /// Remaining per-node budget (`numValuesPerNode` counter). `u32::MAX`
    /// means unlimited.
    pub remaining: u32,
    /// The captured end of the original `[startIdx, endIdx]` range. Fixed at
    /// issue time so later inserts never leak into an in-progress paginated
    /// read.
    pub end_idx: u64,
}

const VERSION: u8 = 1;
const RECORD_LEN: usize = 24;

const FLAG_RETURN_BOUNDS: u8 = 0b0000_0001;
const FLAG_TTR_MASK: u8 = 0b0000_0110;
const FLAG_TTR_SHIFT: u32 = 1;

fn ttr_to_bits(ttr: TimestampsToReturn) -> u8 {
    match ttr {
        TimestampsToReturn::Source => 0,
        TimestampsToReturn::Server => 1,
        TimestampsToReturn::Both => 2,
        TimestampsToReturn::Neither => 3,
    }
}

fn ttr_from_bits(bits: u8) -> Option<TimestampsToReturn> {
    match bits {
        0 => Some(TimestampsToReturn::Source),
        1 => Some(TimestampsToReturn::Server),
        2 => Some(TimestampsToReturn::Both),
        3 => Some(TimestampsToReturn::Neither),
        _ => None,
    }
}

impl ContinuationPoint {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(RECORD_LEN);
        buf.push(VERSION);
        buf.push(match self.direction {
            Direction::Forward => 0,
            Direction::Reverse => 1,
        });
        let mut flags = 0u8;
        if self.return_bounds {
            flags |= FLAG_RETURN_BOUNDS;
        }
        flags |= ttr_to_bits(self.timestamps_to_return) << FLAG_TTR_SHIFT;
        buf.push(flags);
        buf.push(0); // reserved
        buf.extend_from_slice(&self.next_index.to_le_bytes());
        buf.extend_from_slice(&self.remaining.to_le_bytes());
        buf.extend_from_slice(&self.end_idx.to_le_bytes());
        debug_assert_eq!(buf.len(), RECORD_LEN);
        buf
    }

    /// Decodes a continuation token. A malformed or unrecognized token
    /// returns `BadContinuationPointInvalid` rather than panicking.
    pub fn decode(bytes: &[u8]) -> std::result::Result<ContinuationPoint, StatusCode> {
        if bytes.len() != RECORD_LEN {
            return Err(StatusCode::BadContinuationPointInvalid);
        }
        if bytes[0] != VERSION {
            return Err(StatusCode::BadContinuationPointInvalid);
        }
        let direction = match bytes[1] {
            0 => Direction::Forward,
            1 => Direction::Reverse,
            _ => return Err(StatusCode::BadContinuationPointInvalid),
        };
        let flags = bytes[2];
        let return_bounds = flags & FLAG_RETURN_BOUNDS != 0;
        let ttr_bits = (flags & FLAG_TTR_MASK) >> FLAG_TTR_SHIFT;
        let timestamps_to_return =
            ttr_from_bits(ttr_bits).ok_or(StatusCode::BadContinuationPointInvalid)?;
        let next_index = u64::from_le_bytes(bytes[4..12].try_into().unwrap());
        let remaining = u32::from_le_bytes(bytes[12..16].try_into().unwrap());
        let end_idx = u64::from_le_bytes(bytes[16..24].try_into().unwrap());
        Ok(ContinuationPoint { direction, return_bounds, timestamps_to_return, next_index, remaining, end_idx })
    }

    /// As `decode`, but surfaces the internal `Error` type for callers that
    /// cannot attribute the failure to a single result slot (none in this
    /// crate currently need this; kept for symmetry with the rest of the
    /// error-handling split).
    #[allow(dead_code)]
    pub fn decode_strict(bytes: &[u8]) -> Result<ContinuationPoint> {
        Self::decode(bytes).map_err(|_| err("invalid continuation point"))
    }
}
