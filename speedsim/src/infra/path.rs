use ordered_float::OrderedFloat;

use super::{BlockSection, DataIntegrityError, Infra, PathProperties, SpeedLimitEntry, Track};
use crate::stairs::{StairError, StairSequence};

#[derive(Debug, Fail)]
pub enum PathError {
    #[fail(display = "path length must be positive, got {}", _0)]
    NonPositiveLength(f64),
    #[fail(display = "invalid range [{}, {}] on track \"{}\"", begin, end, track)]
    InvalidRange { track: String, begin: f64, end: f64 },
    #[fail(display = "invalid speed limit range [{}, {})", _0, _1)]
    InvalidSpeedLimit(f64, f64),
    #[fail(display = "speed limit {} is not a finite, non negative speed", _0)]
    InvalidSpeed(f64),
    #[fail(display = "speed section at {} on track \"{}\" has invalid speed {}", offset, track, speed)]
    InvalidSpeedSection { track: String, offset: f64, speed: f64 },
    #[fail(display = "stop offset {} is outside of the {}m path", offset, length)]
    StopOutOfPath { offset: f64, length: f64 },
    #[fail(display = "{}", _0)]
    Integrity(#[cause] DataIntegrityError),
    #[fail(display = "{}", _0)]
    Stair(#[cause] StairError),
}

impl From<DataIntegrityError> for PathError {
    fn from(e: DataIntegrityError) -> Self {
        PathError::Integrity(e)
    }
}

impl From<StairError> for PathError {
    fn from(e: StairError) -> Self {
        PathError::Stair(e)
    }
}

/// A forward range `[begin, end]` of one track.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackRange {
    pub line: String,
    pub track: String,
    pub begin: f64,
    pub end: f64,
}

impl TrackRange {
    pub fn new(line: &str, track: &str, begin: f64, end: f64) -> Self {
        TrackRange { line: line.to_string(), track: track.to_string(), begin, end }
    }
}

/// The ordered track ranges a train runs over.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrainPath {
    pub ranges: Vec<TrackRange>,
}

impl TrainPath {
    pub fn new(ranges: Vec<TrackRange>) -> Self {
        TrainPath { ranges }
    }

    pub fn length(&self) -> f64 {
        self.ranges.iter().map(|r| r.end - r.begin).sum()
    }
}

struct ResolvedRange<'a> {
    track: &'a Track,
    begin: f64,
    end: f64,
    path_offset: f64,
}

impl<'a> ResolvedRange<'a> {
    fn path_offset_of(&self, track_offset: f64) -> f64 {
        self.path_offset + track_offset - self.begin
    }
}

/// Path properties read from the tracks of an infrastructure.
pub struct InfraPath<'a> {
    infra: &'a Infra,
    ranges: Vec<ResolvedRange<'a>>,
    length: f64,
    slopes: StairSequence<f64>,
}

impl<'a> InfraPath<'a> {
    pub fn new(infra: &'a Infra, path: &TrainPath) -> Result<InfraPath<'a>, PathError> {
        let mut ranges = Vec::new();
        let mut slopes = StairSequence::new();
        let mut path_offset = 0.0;
        for range in &path.ranges {
            let track = infra.track(&range.line, &range.track)?;
            if !(range.begin >= 0.0 && range.end > range.begin && range.end <= track.length) {
                return Err(PathError::InvalidRange {
                    track: range.track.clone(),
                    begin: range.begin,
                    end: range.end,
                });
            }
            for (lo, _hi, section) in track.speed_limit.steps_between(range.begin, range.end) {
                if let Some(speed) = section.invalid_speed() {
                    return Err(PathError::InvalidSpeedSection { track: track.name.clone(), offset: lo, speed });
                }
            }
            let resolved = ResolvedRange { track, begin: range.begin, end: range.end, path_offset };

            // Track sections without a recorded slope are flat.
            if track.slope.get(range.begin).is_none() {
                slopes.push(path_offset, 0.0)?;
            }
            for (lo, _hi, &grade) in track.slope.steps_between(range.begin, range.end) {
                slopes.push(resolved.path_offset_of(lo), grade)?;
            }

            path_offset += range.end - range.begin;
            ranges.push(resolved);
        }
        if !(path_offset > 0.0) {
            return Err(PathError::NonPositiveLength(path_offset));
        }
        Ok(InfraPath { infra, ranges, length: path_offset, slopes })
    }

    pub fn block_section_at(&self, offset: f64) -> Option<&'a BlockSection> {
        let range = self.ranges.iter()
            .find(|r| offset < r.path_offset + (r.end - r.begin))
            .or_else(|| self.ranges.last())?;
        range.track.block_sections.get(range.begin + offset - range.path_offset)
    }
}

impl<'a> PathProperties for InfraPath<'a> {
    fn length(&self) -> f64 {
        self.length
    }

    fn speed_limit_entries(&self, train_tag: Option<&str>) -> Vec<SpeedLimitEntry> {
        let fallbacks = train_tag.map_or(&[][..], |t| self.infra.tag_fallbacks(t));
        let mut entries: Vec<SpeedLimitEntry> = Vec::new();
        for range in &self.ranges {
            for (lo, hi, section) in range.track.speed_limit.steps_between(range.begin, range.end) {
                let (speed, source) = section.resolve(train_tag, fallbacks);
                let lower = range.path_offset_of(lo);
                let upper = range.path_offset_of(hi);
                let continues_last = entries.last().map_or(false, |last| {
                    last.upper == lower && last.speed == speed && last.source == source
                });
                match entries.last_mut() {
                    Some(last) if continues_last => last.upper = upper,
                    _ => entries.push(SpeedLimitEntry { lower, upper, speed, source }),
                }
            }
        }
        entries
    }

    fn slopes(&self) -> &StairSequence<f64> {
        &self.slopes
    }
}

/// Path properties given directly, without track data.
/// Speed limits are recorded per train category; limits without a category
/// apply to every train.
#[derive(Clone, Debug)]
pub struct SimplePath {
    length: f64,
    limits: Vec<(Option<String>, SpeedLimitEntry)>,
    slopes: StairSequence<f64>,
}

impl SimplePath {
    pub fn new(length: f64) -> Result<Self, PathError> {
        if !(length > 0.0 && length.is_finite()) {
            return Err(PathError::NonPositiveLength(length));
        }
        Ok(SimplePath { length, limits: Vec::new(), slopes: StairSequence::new() })
    }

    pub fn add_speed_limit(&mut self, category: Option<&str>, entry: SpeedLimitEntry) -> Result<(), PathError> {
        if !(entry.lower >= 0.0 && entry.upper > entry.lower) {
            return Err(PathError::InvalidSpeedLimit(entry.lower, entry.upper));
        }
        if !(entry.speed >= 0.0 && entry.speed.is_finite()) {
            return Err(PathError::InvalidSpeed(entry.speed));
        }
        self.limits.push((category.map(|c| c.to_string()), entry));
        Ok(())
    }

    pub fn add_slope(&mut self, offset: f64, grade: f64) -> Result<(), PathError> {
        self.slopes.push(offset, grade)?;
        Ok(())
    }
}

impl PathProperties for SimplePath {
    fn length(&self) -> f64 {
        self.length
    }

    fn speed_limit_entries(&self, train_tag: Option<&str>) -> Vec<SpeedLimitEntry> {
        let mut entries: Vec<SpeedLimitEntry> = self.limits.iter()
            .filter(|(category, _)| category.is_none() || category.as_ref().map(|c| c.as_str()) == train_tag)
            .map(|(_, entry)| entry.clone())
            .collect();
        entries.sort_by_key(|e| OrderedFloat(e.lower));
        entries
    }

    fn slopes(&self) -> &StairSequence<f64> {
        &self.slopes
    }
}
