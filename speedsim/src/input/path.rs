use super::{content_lines, number, regex, ParseError};
use crate::envelope::SpeedLimitSource;
use crate::infra::{PathError, PathProperties, SimplePath, SpeedLimitEntry};
use crate::units::kmh_to_ms;

/// A parsed path, with the offset where the train should stop.
#[derive(Clone, Debug)]
pub struct PathInput {
    pub path: SimplePath,
    pub stop: Option<f64>,
}

/// Parses path descriptions:
///
/// ```text
/// length 5000
/// limit 0 2000 160            # from (m), to (m), km/h
/// limit 1500 1800 80 MA100    # applies only to category MA100
/// slope 0 0                   # from (m), m/km
/// slope 3000 -5.5
/// stop 4800
/// ```
///
/// `length` must come before any other statement.
pub fn parse_path(input: &str) -> Result<PathInput, ParseError> {
    let length_re = regex(r"^length\s+(?P<length>\S+)$")?;
    let limit_re = regex(r"^limit\s+(?P<from>\S+)\s+(?P<to>\S+)\s+(?P<speed>\S+)(\s+(?P<category>\w+))?$")?;
    let slope_re = regex(r"^slope\s+(?P<from>\S+)\s+(?P<grade>\S+)$")?;
    let stop_re = regex(r"^stop\s+(?P<offset>\S+)$")?;

    let mut path: Option<SimplePath> = None;
    let mut stop = None;

    for (line_no, line) in content_lines(input) {
        if let Some(groups) = length_re.captures(line) {
            if path.is_some() {
                return Err(ParseError::Unrecognized(line_no, line.to_string()));
            }
            path = Some(SimplePath::new(number(&groups["length"], line_no)?)?);
            continue;
        }

        let current = match path.as_mut() {
            Some(p) => p,
            None => return Err(ParseError::MissingField("length")),
        };

        if let Some(groups) = limit_re.captures(line) {
            let category = groups.name("category").map(|m| m.as_str());
            let entry = SpeedLimitEntry {
                lower: number(&groups["from"], line_no)?,
                upper: number(&groups["to"], line_no)?,
                speed: kmh_to_ms(number(&groups["speed"], line_no)?),
                source: category.map(|c| SpeedLimitSource::GivenTrainTag(c.to_string())),
            };
            current.add_speed_limit(category, entry)?;
        } else if let Some(groups) = slope_re.captures(line) {
            current.add_slope(number(&groups["from"], line_no)?, number(&groups["grade"], line_no)?)?;
        } else if let Some(groups) = stop_re.captures(line) {
            stop = Some(number(&groups["offset"], line_no)?);
        } else {
            return Err(ParseError::Unrecognized(line_no, line.to_string()));
        }
    }

    let path = path.ok_or(ParseError::MissingField("length"))?;
    if let Some(offset) = stop {
        if !(offset >= 0.0 && offset <= path.length()) {
            return Err(ParseError::Path(PathError::StopOutOfPath { offset, length: path.length() }));
        }
    }
    Ok(PathInput { path, stop })
}
