use smallvec::SmallVec;
use super::EnvelopeTags;

/// A tagged, position bounded piecewise constant speed curve.
/// `positions` has one more element than `speeds`: segment `i` spans
/// `[positions[i], positions[i + 1])` at `speeds[i]`.
#[derive(Clone, Debug, PartialEq)]
pub struct EnvelopePart {
    tags: EnvelopeTags,
    positions: SmallVec<[f64; 4]>,
    speeds: SmallVec<[f64; 4]>,
}

impl EnvelopePart {
    pub fn new(tags: EnvelopeTags, positions: &[f64], speeds: &[f64]) -> Self {
        assert!(speeds.len() >= 1 && positions.len() == speeds.len() + 1,
                "an envelope part needs one more position than speeds");
        assert!(positions.windows(2).all(|w| w[0] < w[1]),
                "envelope part positions must be strictly increasing: {:?}", positions);
        assert!(speeds.iter().all(|s| s.is_finite() && *s >= 0.0),
                "envelope part speeds must be finite and positive: {:?}", speeds);
        EnvelopePart {
            tags,
            positions: SmallVec::from_slice(positions),
            speeds: SmallVec::from_slice(speeds),
        }
    }

    pub fn constant(tags: EnvelopeTags, begin: f64, end: f64, speed: f64) -> Self {
        EnvelopePart::new(tags, &[begin, end], &[speed])
    }

    pub fn tags(&self) -> &EnvelopeTags {
        &self.tags
    }

    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    pub fn begin(&self) -> f64 {
        self.positions[0]
    }

    pub fn end(&self) -> f64 {
        self.positions[self.positions.len() - 1]
    }

    pub fn segment_count(&self) -> usize {
        self.speeds.len()
    }

    /// `(begin, end, speed)` of each segment, in order.
    pub fn segments(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.positions.windows(2).zip(self.speeds.iter()).map(|(w, &speed)| (w[0], w[1], speed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepped_part() {
        let part = EnvelopePart::new(EnvelopeTags::train_limit(), &[0.0, 10.0, 30.0], &[5.0, 8.0]);
        assert_eq!(part.begin(), 0.0);
        assert_eq!(part.end(), 30.0);
        assert_eq!(part.segment_count(), 2);
        assert_eq!(part.segments().collect::<Vec<_>>(), vec![(0.0, 10.0, 5.0), (10.0, 30.0, 8.0)]);
    }

    #[test]
    #[should_panic]
    fn rejects_empty_part() {
        EnvelopePart::constant(EnvelopeTags::train_limit(), 10.0, 10.0, 5.0);
    }

    #[test]
    #[should_panic]
    fn rejects_mismatched_lengths() {
        EnvelopePart::new(EnvelopeTags::train_limit(), &[0.0, 1.0], &[1.0, 2.0]);
    }
}
