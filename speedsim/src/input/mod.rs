//! Line based text formats for rolling stock and path descriptions.
//! Values are given in the usual operational units (km/h, m/km) and are
//! converted to SI units while parsing.

pub mod rollingstock;
pub mod path;

use regex::Regex;

use crate::infra::PathError;
use crate::railway::rollingstock::RollingStockError;

#[derive(Debug, Fail)]
pub enum ParseError {
    #[fail(display = "error in regular expression: {}", _0)]
    RegexError(String),
    #[fail(display = "error converting number \"{}\" on line {}", _0, _1)]
    NumberError(String, usize),
    #[fail(display = "unrecognized line {}: {}", _0, _1)]
    Unrecognized(usize, String),
    #[fail(display = "missing field \"{}\"", _0)]
    MissingField(&'static str),
    #[fail(display = "invalid rolling stock: {}", _0)]
    RollingStock(#[cause] RollingStockError),
    #[fail(display = "invalid path: {}", _0)]
    Path(#[cause] PathError),
}

impl From<RollingStockError> for ParseError {
    fn from(e: RollingStockError) -> Self {
        ParseError::RollingStock(e)
    }
}

impl From<PathError> for ParseError {
    fn from(e: PathError) -> Self {
        ParseError::Path(e)
    }
}

fn regex(re: &str) -> Result<Regex, ParseError> {
    Regex::new(re).map_err(|e| ParseError::RegexError(format!("{:?}", e)))
}

fn number(s: &str, line: usize) -> Result<f64, ParseError> {
    match s.parse::<f64>() {
        Ok(x) if x.is_finite() => Ok(x),
        _ => Err(ParseError::NumberError(s.to_string(), line)),
    }
}

/// Lines with content, numbered from 1, without comments.
fn content_lines(input: &str) -> impl Iterator<Item = (usize, &str)> {
    input.lines().enumerate().filter_map(|(i, line)| {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() { None } else { Some((i + 1, line)) }
    })
}
