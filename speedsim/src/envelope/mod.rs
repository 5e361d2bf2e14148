//! Speed envelopes: piecewise constant speed curves over path offsets.

pub mod part;
pub mod builder;
pub mod mrsp;

pub use self::part::EnvelopePart;
pub use self::builder::EnvelopeBuilder;

use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum EnvelopeProfile {
    ConstantSpeed,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum LimitKind {
    /// The rolling stock's own maximum speed.
    TrainLimit,
    /// A speed restriction coming from the track.
    SpeedLimit,
}

/// Which rule of a speed section produced a speed limit.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SpeedLimitSource {
    GivenTrainTag(String),
    FallbackTag(String),
    UnknownTag,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EnvelopeTags {
    pub profile: EnvelopeProfile,
    pub limit: LimitKind,
    pub source: Option<SpeedLimitSource>,
}

impl EnvelopeTags {
    pub fn train_limit() -> Self {
        EnvelopeTags { profile: EnvelopeProfile::ConstantSpeed, limit: LimitKind::TrainLimit, source: None }
    }

    pub fn speed_limit(source: Option<SpeedLimitSource>) -> Self {
        EnvelopeTags { profile: EnvelopeProfile::ConstantSpeed, limit: LimitKind::SpeedLimit, source }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EnvelopeSegment {
    pub begin: f64,
    pub end: f64,
    pub speed: f64,
    pub tags: EnvelopeTags,
}

impl EnvelopeSegment {
    pub fn length(&self) -> f64 {
        self.end - self.begin
    }
}

/// A resolved, gap-free speed curve. Segments are sorted by position and
/// each one starts where the previous one ends.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Envelope {
    segments: Vec<EnvelopeSegment>,
}

impl Envelope {
    pub(crate) fn new(segments: Vec<EnvelopeSegment>) -> Self {
        debug_assert!(segments.windows(2).all(|w| w[0].end == w[1].begin));
        Envelope { segments }
    }

    pub fn segments(&self) -> &[EnvelopeSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn begin(&self) -> f64 {
        self.segments.first().map_or(0.0, |s| s.begin)
    }

    pub fn end(&self) -> f64 {
        self.segments.last().map_or(0.0, |s| s.end)
    }

    /// The segment covering `position`. The end of the envelope belongs
    /// to the last segment.
    pub fn segment_at(&self, position: f64) -> Option<&EnvelopeSegment> {
        if self.is_empty() || position < self.begin() || position > self.end() {
            return None;
        }
        let idx = self.segments.partition_point(|s| s.end <= position);
        self.segments.get(idx).or_else(|| self.segments.last())
    }

    pub fn speed_at(&self, position: f64) -> Option<f64> {
        self.segment_at(position).map(|s| s.speed)
    }

    pub fn max_speed(&self) -> f64 {
        self.segments.iter().map(|s| s.speed).fold(0.0, f64::max)
    }

    pub fn min_speed(&self) -> f64 {
        self.segments.iter().map(|s| s.speed).fold(std::f64::INFINITY, f64::min)
    }

    /// Time needed to reach `position` from the start of the envelope when
    /// running exactly at the envelope speed. The position is clamped to
    /// the envelope range.
    pub fn interpolate_arrival_at_clamp(&self, position: f64) -> f64 {
        let position = position.max(self.begin()).min(self.end());
        let mut time = 0.0;
        for segment in &self.segments {
            if segment.begin >= position {
                break;
            }
            time += (segment.end.min(position) - segment.begin) / segment.speed;
        }
        time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stepped() -> Envelope {
        let mut builder = EnvelopeBuilder::new();
        builder.add_part(EnvelopePart::constant(EnvelopeTags::train_limit(), 0.0, 300.0, 30.0));
        builder.add_part(EnvelopePart::constant(EnvelopeTags::speed_limit(None), 100.0, 200.0, 10.0));
        builder.build()
    }

    #[test]
    fn segment_lookup() {
        let env = stepped();
        assert_eq!(env.speed_at(0.0), Some(30.0));
        assert_eq!(env.speed_at(99.0), Some(30.0));
        assert_eq!(env.speed_at(100.0), Some(10.0));
        assert_eq!(env.speed_at(200.0), Some(30.0));
        assert_eq!(env.speed_at(300.0), Some(30.0));
        assert_eq!(env.speed_at(300.1), None);
        assert_eq!(env.speed_at(-1.0), None);
        assert_eq!(env.segment_at(150.0).unwrap().tags.limit, LimitKind::SpeedLimit);
    }

    #[test]
    fn bounds_and_extrema() {
        let env = stepped();
        assert_eq!(env.begin(), 0.0);
        assert_eq!(env.end(), 300.0);
        assert_eq!(env.max_speed(), 30.0);
        assert_eq!(env.min_speed(), 10.0);
        assert_eq!(Envelope::default().end(), 0.0);
    }

    #[test]
    fn arrival_time() {
        let env = stepped();
        assert_eq!(env.interpolate_arrival_at_clamp(0.0), 0.0);
        assert!((env.interpolate_arrival_at_clamp(150.0) - (100.0 / 30.0 + 5.0)).abs() < 1e-9);
        let total = 100.0 / 30.0 + 10.0 + 100.0 / 30.0;
        assert!((env.interpolate_arrival_at_clamp(300.0) - total).abs() < 1e-9);
        assert!((env.interpolate_arrival_at_clamp(1e6) - total).abs() < 1e-9);
    }
}
