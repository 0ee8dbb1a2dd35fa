mod error;
mod types;

pub use error::{err, Error, Result};
pub use types::{
    Clock, DataValue, Direction, Identifier, MatchStrategy, NodeId, NumericRange, StatusCode,
    SystemClock, Timestamp, TimestampsToReturn, Variant, ONE_SECOND,
};

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn unspecified_timestamp_is_zero() {
        assert!(Timestamp::UNSPECIFIED.is_unspecified());
        assert_eq!(Timestamp::UNSPECIFIED, Timestamp(0));
    }

    #[test]
    fn node_id_equality_and_order() {
        let a = NodeId::numeric(1, 10);
        let b = NodeId::numeric(1, 20);
        let c = NodeId::numeric(1, 10);
        assert_eq!(a, c);
        assert!(a < b);
    }

    #[test]
    fn project_timestamps_clears_unwanted_side() {
        let mut dv = DataValue::new(Variant::from_bytes(vec![1, 2, 3]), Timestamp(100));
        dv.server_timestamp = Some(Timestamp(200));
        dv.project_timestamps(TimestampsToReturn::Source);
        assert_eq!(dv.source_timestamp, Some(Timestamp(100)));
        assert_eq!(dv.server_timestamp, None);

        dv.server_timestamp = Some(Timestamp(200));
        dv.project_timestamps(TimestampsToReturn::Neither);
        assert_eq!(dv.source_timestamp, None);
        assert_eq!(dv.server_timestamp, None);
    }

    #[test]
    fn system_clock_advances() {
        let clock = SystemClock;
        let t1 = clock.now();
        let t2 = clock.now();
        assert!(t2.0 >= t1.0);
    }
}
