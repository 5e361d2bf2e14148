//! Static infrastructure: lines, their tracks, and the stepwise attributes
//! recorded along each track.
//!
//! Infrastructure is built once, single threaded, and is read only
//! afterwards; paths and envelopes only ever borrow it immutably.

pub mod path;

pub use self::path::{InfraPath, PathError, SimplePath, TrackRange, TrainPath};

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::envelope::SpeedLimitSource;
use crate::stairs::StairSequence;

#[derive(Debug, Fail, PartialEq)]
pub enum DataIntegrityError {
    #[fail(display = "a track named \"{}\" is already registered on line \"{}\"", name, line)]
    DuplicateTrack { line: String, name: String },
    #[fail(display = "a line named \"{}\" already exists", _0)]
    DuplicateLine(String),
    #[fail(display = "unknown line \"{}\"", _0)]
    UnknownLine(String),
    #[fail(display = "unknown track \"{}\" on line \"{}\"", name, line)]
    UnknownTrack { line: String, name: String },
}

/// A speed limit entry over the half open range `[lower, upper)` of a path.
/// A speed of zero means the range is not restricted.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeedLimitEntry {
    pub lower: f64,
    pub upper: f64,
    pub speed: f64,
    pub source: Option<SpeedLimitSource>,
}

/// What the speed profile computation needs to know about a path.
pub trait PathProperties {
    /// Path length, in meters.
    fn length(&self) -> f64;

    /// Speed limits applying to trains of category `train_tag`, ordered by
    /// offset. Entries start at a non negative offset and carry a finite,
    /// non negative speed.
    fn speed_limit_entries(&self, train_tag: Option<&str>) -> Vec<SpeedLimitEntry>;

    /// Grade along the path, in meters per kilometer.
    fn slopes(&self) -> &StairSequence<f64>;
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlockSection(pub String);

/// A speed section: a default speed plus speeds for some train categories.
/// All speeds are in m/s, and zero means no restriction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpeedSection {
    pub default_speed: f64,
    pub by_tag: HashMap<String, f64>,
}

impl SpeedSection {
    pub fn new(default_speed: f64) -> Self {
        SpeedSection { default_speed, by_tag: HashMap::new() }
    }

    pub fn with_tag(mut self, tag: &str, speed: f64) -> Self {
        self.by_tag.insert(tag.to_string(), speed);
        self
    }

    /// The first speed of the section that is negative or not finite.
    pub fn invalid_speed(&self) -> Option<f64> {
        std::iter::once(self.default_speed)
            .chain(self.by_tag.values().cloned())
            .find(|s| !(*s >= 0.0 && s.is_finite()))
    }

    /// The speed applying to `train_tag`: its own speed, else the speed of
    /// its first fallback tag that has one, else the default speed.
    pub fn resolve(&self, train_tag: Option<&str>, fallbacks: &[String]) -> (f64, Option<SpeedLimitSource>) {
        let tag = match train_tag {
            Some(tag) => tag,
            None => return (self.default_speed, None),
        };
        if let Some(&speed) = self.by_tag.get(tag) {
            return (speed, Some(SpeedLimitSource::GivenTrainTag(tag.to_string())));
        }
        for fallback in fallbacks {
            if let Some(&speed) = self.by_tag.get(fallback) {
                return (speed, Some(SpeedLimitSource::FallbackTag(fallback.clone())));
            }
        }
        (self.default_speed, Some(SpeedLimitSource::UnknownTag))
    }
}

#[derive(Debug)]
pub struct Track {
    pub line: String,
    pub id: String,
    pub name: String,
    pub length: f64,
    pub slope: StairSequence<f64>,
    pub block_sections: StairSequence<BlockSection>,
    pub speed_limit: StairSequence<SpeedSection>,
}

impl Track {
    /// Creates a track and registers it with a line. Fails when another
    /// track with the same name is already registered on that line.
    pub fn create_and_register<'l>(line: &'l mut Line, id: &str, name: &str, length: f64)
        -> Result<&'l mut Track, DataIntegrityError> {
        let track = Track {
            line: line.name.clone(),
            id: id.to_string(),
            name: name.to_string(),
            length,
            slope: StairSequence::new(),
            block_sections: StairSequence::new(),
            speed_limit: StairSequence::new(),
        };
        line.register(track)
    }
}

#[derive(Debug)]
pub struct Line {
    pub name: String,
    tracks: HashMap<String, Track>,
}

impl Line {
    pub fn new(name: &str) -> Self {
        Line { name: name.to_string(), tracks: HashMap::new() }
    }

    pub fn register(&mut self, track: Track) -> Result<&mut Track, DataIntegrityError> {
        match self.tracks.entry(track.name.clone()) {
            Entry::Occupied(_) => Err(DataIntegrityError::DuplicateTrack {
                line: self.name.clone(),
                name: track.name,
            }),
            Entry::Vacant(e) => {
                debug!("registered track {} on line {}", track.name, self.name);
                Ok(e.insert(track))
            }
        }
    }

    pub fn track(&self, name: &str) -> Option<&Track> {
        self.tracks.get(name)
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }
}

#[derive(Debug, Default)]
pub struct Infra {
    lines: HashMap<String, Line>,
    tag_fallbacks: HashMap<String, Vec<String>>,
}

impl Infra {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_line(&mut self, name: &str) -> Result<&mut Line, DataIntegrityError> {
        match self.lines.entry(name.to_string()) {
            Entry::Occupied(_) => Err(DataIntegrityError::DuplicateLine(name.to_string())),
            Entry::Vacant(e) => Ok(e.insert(Line::new(name))),
        }
    }

    pub fn line(&self, name: &str) -> Result<&Line, DataIntegrityError> {
        self.lines.get(name).ok_or_else(|| DataIntegrityError::UnknownLine(name.to_string()))
    }

    pub fn line_mut(&mut self, name: &str) -> Result<&mut Line, DataIntegrityError> {
        self.lines.get_mut(name).ok_or_else(|| DataIntegrityError::UnknownLine(name.to_string()))
    }

    pub fn track(&self, line: &str, name: &str) -> Result<&Track, DataIntegrityError> {
        self.line(line)?.track(name).ok_or_else(|| DataIntegrityError::UnknownTrack {
            line: line.to_string(),
            name: name.to_string(),
        })
    }

    /// Train categories to try, in order, when a speed section has no speed
    /// for `tag` itself.
    pub fn set_tag_fallbacks(&mut self, tag: &str, fallbacks: Vec<String>) {
        self.tag_fallbacks.insert(tag.to_string(), fallbacks);
    }

    pub fn tag_fallbacks(&self, tag: &str) -> &[String] {
        self.tag_fallbacks.get(tag).map_or(&[][..], |v| v.as_slice())
    }
}
