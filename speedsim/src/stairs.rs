//! Stepwise attributes along a linear offset.
//!
//! A `StairSequence` records a value starting at each offset; the value holds
//! until the next recorded offset. Offsets are appended in strictly increasing
//! order and looked up by binary search.

#[derive(Debug, Fail)]
pub enum StairError {
    #[fail(display = "offset {} does not follow the last recorded offset {}", offset, last)]
    NonIncreasingOffset { offset: f64, last: f64 },
    #[fail(display = "offset is not a finite number")]
    NonFiniteOffset,
}

#[derive(Clone, Debug)]
pub struct StairSequence<T> {
    offsets: Vec<f64>,
    values: Vec<T>,
}

impl<T> Default for StairSequence<T> {
    fn default() -> Self {
        StairSequence { offsets: Vec::new(), values: Vec::new() }
    }
}

impl<T> StairSequence<T> {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Record `value` as active from `offset` onwards.
    pub fn push(&mut self, offset: f64, value: T) -> Result<(), StairError> {
        if !offset.is_finite() {
            return Err(StairError::NonFiniteOffset);
        }
        if let Some(&last) = self.offsets.last() {
            if offset <= last {
                return Err(StairError::NonIncreasingOffset { offset, last });
            }
        }
        self.offsets.push(offset);
        self.values.push(value);
        Ok(())
    }

    /// The value active at `offset`, or `None` before the first recorded offset.
    pub fn get(&self, offset: f64) -> Option<&T> {
        let idx = self.offsets.partition_point(|&o| o <= offset);
        if idx == 0 { None } else { Some(&self.values[idx - 1]) }
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, &T)> {
        self.offsets.iter().cloned().zip(self.values.iter())
    }

    /// The steps overlapping `[begin, end)`, clipped to that range.
    /// The last step extends up to `end`; the range before the first
    /// recorded offset is not covered.
    pub fn steps_between(&self, begin: f64, end: f64) -> Vec<(f64, f64, &T)> {
        let mut steps = Vec::new();
        if !(end > begin) || self.is_empty() {
            return steps;
        }
        let mut i = self.offsets.partition_point(|&o| o <= begin).saturating_sub(1);
        while i < self.offsets.len() && self.offsets[i] < end {
            let lo = self.offsets[i].max(begin);
            let hi = self.offsets.get(i + 1).map_or(end, |&next| next.min(end));
            if hi > lo {
                steps.push((lo, hi, &self.values[i]));
            }
            i += 1;
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slopes() -> StairSequence<f64> {
        let mut s = StairSequence::new();
        s.push(0.0, 1.0).unwrap();
        s.push(100.0, -2.0).unwrap();
        s.push(250.0, 0.5).unwrap();
        s
    }

    #[test]
    fn lookup_returns_covering_value() {
        let s = slopes();
        assert_eq!(s.get(0.0), Some(&1.0));
        assert_eq!(s.get(99.9), Some(&1.0));
        assert_eq!(s.get(100.0), Some(&-2.0));
        assert_eq!(s.get(1e9), Some(&0.5));
    }

    #[test]
    fn lookup_before_first_offset() {
        let mut s = StairSequence::new();
        s.push(10.0, "a").unwrap();
        assert_eq!(s.get(9.0), None);
        assert_eq!(StairSequence::<u8>::new().get(0.0), None);
    }

    #[test]
    fn push_rejects_non_increasing_offsets() {
        let mut s = slopes();
        match s.push(250.0, 3.0) {
            Err(StairError::NonIncreasingOffset { offset, last }) => {
                assert_eq!(offset, 250.0);
                assert_eq!(last, 250.0);
            }
            x => panic!("unexpected {:?}", x),
        }
        assert!(s.push(10.0, 3.0).is_err());
        assert!(s.push(std::f64::NAN, 3.0).is_err());
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn steps_are_clipped_to_range() {
        let s = slopes();
        let steps = s.steps_between(50.0, 300.0);
        assert_eq!(steps, vec![(50.0, 100.0, &1.0), (100.0, 250.0, &-2.0), (250.0, 300.0, &0.5)]);

        let inner = s.steps_between(120.0, 130.0);
        assert_eq!(inner, vec![(120.0, 130.0, &-2.0)]);

        assert!(s.steps_between(10.0, 10.0).is_empty());
    }

    #[test]
    fn steps_skip_uncovered_prefix() {
        let mut s = StairSequence::new();
        s.push(100.0, 7).unwrap();
        assert_eq!(s.steps_between(0.0, 150.0), vec![(100.0, 150.0, &7)]);
        assert!(s.steps_between(0.0, 100.0).is_empty());
    }
}
