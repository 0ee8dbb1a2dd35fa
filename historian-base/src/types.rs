use std::sync::Arc;

/// Signed count of 100 ns ticks since the OPC UA epoch (1601-01-01). Source
/// timestamps are not required to be monotonic across inserts into a single
/// node's store; only the store's *order* is required to stay ascending.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Timestamp(pub i64);

/// One second, expressed in 100 ns ticks. Used to synthesize a bounding
/// value's timestamp when the corresponding request bound was unspecified
/// (OPC UA Part 11 Table 1, marks (a) and (b)).
pub const ONE_SECOND: i64 = 10_000_000;

impl Timestamp {
    /// The zero DateTime, OPC UA's "no value" convention. Request bounds use
    /// this to mean "unbounded on this side".
    pub const UNSPECIFIED: Timestamp = Timestamp(0);

    pub fn is_unspecified(self) -> bool {
        self == Self::UNSPECIFIED
    }

    pub fn checked_add_ticks(self, ticks: i64) -> Option<Timestamp> {
        self.0.checked_add(ticks).map(Timestamp)
    }
}

/// A capability object handing out the current time. Abstracted so the
/// gatherer's polling scheduler and the backend's "no timestamp supplied"
/// fallback can both be driven by a fake clock in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// A `Clock` backed by `std::time::SystemTime`, for production use.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime, UNIX_EPOCH};
        // OPC UA epoch is 1601-01-01; Unix epoch is 1970-01-01. The gap is
        // 11644473600 seconds, a constant offset in 100 ns ticks.
        const EPOCH_OFFSET_TICKS: i64 = 11_644_473_600 * ONE_SECOND;
        let since_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let ticks = since_unix.as_nanos() as i64 / 100;
        Timestamp(ticks + EPOCH_OFFSET_TICKS)
    }
}

/// Opaque identifier for a node in the address space, used as the primary
/// key into both the gatherer's registry and the backend's per-node store.
/// The historian core never interprets the identifier; it only compares and
/// orders it (the order is needed for deterministic iteration in tests and
/// for use as a `BTreeMap`/`HashMap` key).
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId {
    pub namespace_index: u16,
    pub identifier: Identifier,
}

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Identifier {
    Numeric(u32),
    String(Arc<str>),
}

impl NodeId {
    pub fn numeric(namespace_index: u16, value: u32) -> Self {
        NodeId { namespace_index, identifier: Identifier::Numeric(value) }
    }

    pub fn string(namespace_index: u16, value: impl Into<Arc<str>>) -> Self {
        NodeId { namespace_index, identifier: Identifier::String(value.into()) }
    }
}

/// An opaque, cheaply-cloneable value payload. The historian core never
/// looks inside it; it is passed through verbatim between the backend and
/// whatever decodes/encodes it at the wire boundary.
#[derive(Clone, Debug, PartialEq)]
pub struct Variant(pub Arc<[u8]>);

impl Variant {
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Variant(bytes.into())
    }
}

/// Status codes surfaced by the historian core. Named after their OPC UA
/// counterparts; `Good` is the only non-`Bad*` member this crate produces.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum StatusCode {
    Good,
    BadHistoryOperationUnsupported,
    BadHistoryOperationInvalid,
    BadBoundNotSupported,
    BadBoundNotFound,
    BadContinuationPointInvalid,
    BadNoContinuationPoints,
    BadTimestampNotSupported,
    BadOutOfMemory,
    BadNodeIdUnknown,
    BadDataUnavailable,
    BadInternalError,
}

impl StatusCode {
    pub fn is_good(self) -> bool {
        matches!(self, StatusCode::Good)
    }
}

/// A stored or returned sample. Only `value` and the two timestamps are
/// interpreted by the historian core; `status` is propagated verbatim and
/// the picosecond fields exist only to round-trip through a wire codec.
#[derive(Clone, Debug, PartialEq)]
pub struct DataValue {
    pub value: Option<Variant>,
    pub status: StatusCode,
    pub source_timestamp: Option<Timestamp>,
    pub server_timestamp: Option<Timestamp>,
    pub source_picoseconds: Option<u16>,
    pub server_picoseconds: Option<u16>,
}

impl DataValue {
    pub fn new(value: Variant, timestamp: Timestamp) -> Self {
        DataValue {
            value: Some(value),
            status: StatusCode::Good,
            source_timestamp: Some(timestamp),
            server_timestamp: None,
            source_picoseconds: None,
            server_picoseconds: None,
        }
    }

    /// `sourceTimestamp` if present, else `serverTimestamp`, else the
    /// clock's current time. This is the ordering key the store sorts by.
    pub fn effective_timestamp(&self, clock: &dyn Clock) -> Timestamp {
        self.source_timestamp
            .or(self.server_timestamp)
            .unwrap_or_else(|| clock.now())
    }

    /// Clears the timestamp(s) not selected by `timestampsToReturn`, as
    /// required before a value leaves the read engine.
    pub fn project_timestamps(&mut self, which: TimestampsToReturn) {
        match which {
            TimestampsToReturn::Source => self.server_timestamp = None,
            TimestampsToReturn::Server => self.source_timestamp = None,
            TimestampsToReturn::Both => {}
            TimestampsToReturn::Neither => {
                self.source_timestamp = None;
                self.server_timestamp = None;
            }
        }
    }

    /// A synthetic bounding entry: no value, a caller-supplied status (almost
    /// always `BadBoundNotFound`), and the timestamp of the bound that was
    /// requested rather than any real neighbor.
    pub fn synthetic_bound(status: StatusCode, timestamp: Timestamp) -> Self {
        DataValue {
            value: None,
            status,
            source_timestamp: Some(timestamp),
            server_timestamp: None,
            source_picoseconds: None,
            server_picoseconds: None,
        }
    }
}

/// Binary-search strategy for `Backend::match_timestamp`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum MatchStrategy {
    Equal,
    After,
    EqualOrAfter,
    Before,
    EqualOrBefore,
}

/// Direction of a HistoryRead: forward if `startTime <= endTime` (treating
/// `UNSPECIFIED` as unbounded on its side), reverse otherwise.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    pub fn reversed(self) -> Direction {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }
}

/// Which of `sourceTimestamp`/`serverTimestamp` to retain on outgoing
/// values.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TimestampsToReturn {
    Source,
    Server,
    Both,
    Neither,
}

/// An indexed sub-selection into an array-valued sample, forwarded verbatim
/// to `Backend::copy_values`. `end = None` means "to the end of the array".
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct NumericRange {
    pub start: u32,
    pub end: Option<u32>,
}
