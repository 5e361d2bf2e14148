//! MRSP = most restrictive speed profile: the maximum speed allowed at any
//! given point of a path.

use std::collections::HashMap;
use std::hash::Hash;

use super::{Envelope, EnvelopeBuilder, EnvelopePart, EnvelopeTags};
use crate::infra::PathProperties;
use crate::railway::rollingstock::RollingStock;
use crate::units;

/// Computes the MRSP of a rolling stock on a path.
///
/// * `rs_max_speed` rolling stock max speed (m/s), finite and positive
///   as `RollingStock::validate` ensures
/// * `rs_length` rolling stock length (m)
/// * `add_rolling_stock_length` whether a restriction stays active until
///   the rear of the train has cleared it
/// * `train_tag` the train category used to pick speed limits
pub fn compute_mrsp<P: PathProperties + ?Sized>(path: &P,
                                               rs_max_speed: f64,
                                               rs_length: f64,
                                               add_rolling_stock_length: bool,
                                               train_tag: Option<&str>)
                                               -> Envelope {
    let mut builder = EnvelopeBuilder::new();
    let path_length = path.length();
    if !(path_length > 0.0) {
        warn!("empty path, the MRSP has no segments");
        return builder.build();
    }

    // Limit corresponding to the hardware's maximum operational speed
    builder.add_part(EnvelopePart::constant(EnvelopeTags::train_limit(), 0.0, path_length, rs_max_speed));

    let offset = if add_rolling_stock_length { rs_length } else { 0.0 };
    for entry in path.speed_limit_entries(train_tag) {
        // Compute where this limit is active from and to
        let start = entry.lower;
        let end = path_length.min(offset + entry.upper);
        if entry.speed == 0.0 {
            continue;
        }
        if !(end > start) {
            warn!("ignoring speed limit [{}, {}) outside of a {}m path", entry.lower, entry.upper, path_length);
            continue;
        }
        builder.add_part(EnvelopePart::constant(EnvelopeTags::speed_limit(entry.source), start, end, entry.speed));
    }

    debug!("computing MRSP from {} parts over {}m", builder.len(), path_length);
    builder.build()
}

pub fn compute_mrsp_for<P: PathProperties + ?Sized>(path: &P,
                                                   rolling_stock: &RollingStock,
                                                   add_rolling_stock_length: bool,
                                                   train_tag: Option<&str>)
                                                   -> Envelope {
    compute_mrsp(path, rolling_stock.max_speed, rolling_stock.length, add_rolling_stock_length, train_tag)
}

/// Block MRSPs, computed once per block.
pub struct MrspCache<K> {
    rs_max_speed: f64,
    cache: HashMap<K, Envelope>,
}

impl<K: Hash + Eq> MrspCache<K> {
    /// Without a rolling stock, the network's global maximum speed applies.
    pub fn new(rolling_stock: Option<&RollingStock>) -> Self {
        let rs_max_speed = rolling_stock.map_or(units::kmh_to_ms(units::DEFAULT_MAX_SPEED_KMH), |rs| rs.max_speed);
        MrspCache { rs_max_speed, cache: HashMap::new() }
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn mrsp<P: PathProperties + ?Sized>(&mut self, block: K, path: &P) -> &Envelope {
        let rs_max_speed = self.rs_max_speed;
        self.cache.entry(block).or_insert_with(|| compute_mrsp(path, rs_max_speed, 0.0, false, None))
    }

    /// Time it takes to go through the block at MRSP speed, up to
    /// `end_offset` if given.
    pub fn block_time<P: PathProperties + ?Sized>(&mut self, block: K, path: &P, end_offset: Option<f64>) -> f64 {
        if end_offset == Some(0.0) {
            return 0.0;
        }
        let length = end_offset.unwrap_or_else(|| path.length());
        self.mrsp(block, path).interpolate_arrival_at_clamp(length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{LimitKind, SpeedLimitSource};
    use crate::infra::{SimplePath, SpeedLimitEntry};

    const MAX_SPEED: f64 = 40.0;

    fn entry(lower: f64, upper: f64, speed: f64) -> SpeedLimitEntry {
        SpeedLimitEntry { lower, upper, speed, source: None }
    }

    fn path_with(entries: &[SpeedLimitEntry]) -> SimplePath {
        let mut path = SimplePath::new(1000.0).unwrap();
        for e in entries {
            path.add_speed_limit(None, e.clone()).unwrap();
        }
        path
    }

    fn shape(env: &Envelope) -> Vec<(f64, f64, f64)> {
        env.segments().iter().map(|s| (s.begin, s.end, s.speed)).collect()
    }

    #[test]
    fn no_limits_gives_hardware_limit() {
        let env = compute_mrsp(&path_with(&[]), MAX_SPEED, 20.0, true, None);
        assert_eq!(shape(&env), vec![(0.0, 1000.0, MAX_SPEED)]);
        assert_eq!(env.segments()[0].tags.limit, LimitKind::TrainLimit);
    }

    #[test]
    fn restriction_extended_by_train_length() {
        let path = path_with(&[entry(100.0, 200.0, 10.0)]);
        let env = compute_mrsp(&path, MAX_SPEED, 20.0, true, None);
        assert_eq!(shape(&env), vec![
            (0.0, 100.0, MAX_SPEED),
            (100.0, 220.0, 10.0),
            (220.0, 1000.0, MAX_SPEED),
        ]);
        assert_eq!(env.segments()[1].tags.limit, LimitKind::SpeedLimit);
    }

    #[test]
    fn restriction_without_train_length() {
        let path = path_with(&[entry(100.0, 200.0, 10.0)]);
        let env = compute_mrsp(&path, MAX_SPEED, 20.0, false, None);
        assert_eq!(shape(&env), vec![
            (0.0, 100.0, MAX_SPEED),
            (100.0, 200.0, 10.0),
            (200.0, 1000.0, MAX_SPEED),
        ]);
    }

    #[test]
    fn extension_is_clamped_to_path_end() {
        let path = path_with(&[entry(900.0, 990.0, 10.0)]);
        let env = compute_mrsp(&path, MAX_SPEED, 20.0, true, None);
        assert_eq!(shape(&env), vec![(0.0, 900.0, MAX_SPEED), (900.0, 1000.0, 10.0)]);
    }

    #[test]
    fn zero_speed_is_not_a_restriction() {
        let with = compute_mrsp(&path_with(&[entry(100.0, 200.0, 10.0), entry(300.0, 500.0, 0.0)]),
                                MAX_SPEED, 20.0, true, None);
        let without = compute_mrsp(&path_with(&[entry(100.0, 200.0, 10.0)]), MAX_SPEED, 20.0, true, None);
        assert_eq!(with, without);
        assert!(with.min_speed() > 0.0);
    }

    #[test]
    fn limits_above_the_hardware_limit_do_not_bind() {
        let env = compute_mrsp(&path_with(&[entry(100.0, 200.0, 60.0)]), MAX_SPEED, 0.0, false, None);
        assert_eq!(shape(&env), vec![(0.0, 1000.0, MAX_SPEED)]);
    }

    #[test]
    fn provenance_is_carried() {
        let mut path = SimplePath::new(1000.0).unwrap();
        let source = Some(SpeedLimitSource::GivenTrainTag("MA100".to_string()));
        path.add_speed_limit(Some("MA100"), SpeedLimitEntry { lower: 0.0, upper: 50.0, speed: 5.0, source: source.clone() }).unwrap();
        let env = compute_mrsp(&path, MAX_SPEED, 0.0, false, Some("MA100"));
        assert_eq!(env.segments()[0].tags.source, source);
        let other = compute_mrsp(&path, MAX_SPEED, 0.0, false, Some("HLP"));
        assert_eq!(shape(&other), vec![(0.0, 1000.0, MAX_SPEED)]);
    }

    #[test]
    fn out_of_path_limits_are_dropped() {
        let env = compute_mrsp(&path_with(&[entry(1200.0, 1300.0, 10.0)]), MAX_SPEED, 20.0, true, None);
        assert_eq!(shape(&env), vec![(0.0, 1000.0, MAX_SPEED)]);
    }

    struct EmptyPath(crate::stairs::StairSequence<f64>);

    impl PathProperties for EmptyPath {
        fn length(&self) -> f64 { 0.0 }
        fn speed_limit_entries(&self, _: Option<&str>) -> Vec<SpeedLimitEntry> {
            vec![entry(0.0, 10.0, 5.0)]
        }
        fn slopes(&self) -> &crate::stairs::StairSequence<f64> { &self.0 }
    }

    #[test]
    fn zero_length_path_gives_empty_envelope() {
        let env = compute_mrsp(&EmptyPath(Default::default()), MAX_SPEED, 20.0, true, None);
        assert!(env.is_empty());
        assert_eq!(env.end(), 0.0);
    }

    #[test]
    fn cache_computes_each_block_once() {
        let path = path_with(&[entry(0.0, 500.0, 10.0)]);
        let mut cache = MrspCache::new(None);
        let default_max = units::kmh_to_ms(units::DEFAULT_MAX_SPEED_KMH);
        assert_eq!(cache.mrsp("b1", &path).max_speed(), default_max);
        cache.mrsp("b1", &path);
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.block_time("b1", &path, Some(0.0)), 0.0);
        let t = cache.block_time("b1", &path, Some(600.0));
        assert!((t - (50.0 + 100.0 / default_max)).abs() < 1e-9);
        let full = cache.block_time("b1", &path, None);
        assert!((full - (50.0 + 500.0 / default_max)).abs() < 1e-9);
    }
}
