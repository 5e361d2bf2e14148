use super::{content_lines, number, regex, ParseError};
use crate::railway::rollingstock::{DavisResistance, RollingStock};
use crate::units::kmh_to_ms;

/// Parses rolling stock descriptions:
///
/// ```text
/// name = tgv
/// length = 200           # m
/// mass = 400000          # kg
/// inertia_coefficient = 1.05
/// rolling_resistance = 2500 30 6.5   # A (N), B (N per m/s), C (N per (m/s)²)
/// max_speed = 300        # km/h
/// startup_time = 10      # s
/// startup_acceleration = 0.05
/// comfort_acceleration = 0.25
/// gamma = 0.5
/// effort = 0 300000      # km/h, N (repeated)
/// ```
pub fn parse_rolling_stock(input: &str) -> Result<RollingStock, ParseError> {
    let field_re = regex(r"^(?P<key>\w+)\s*=\s*(?P<value>.+)$")?;

    let mut name = None;
    let mut length = None;
    let mut mass = None;
    let mut inertia_coefficient = None;
    let mut resistance = None;
    let mut max_speed = None;
    let mut startup_time = None;
    let mut startup_acceleration = None;
    let mut comfort_acceleration = None;
    let mut gamma = None;
    let mut effort_curve = Vec::new();

    for (line_no, line) in content_lines(input) {
        let groups = field_re.captures(line)
            .ok_or_else(|| ParseError::Unrecognized(line_no, line.to_string()))?;
        let value = groups["value"].trim();
        let numbers = || -> Result<Vec<f64>, ParseError> {
            value.split_whitespace().map(|x| number(x, line_no)).collect()
        };
        let single = || number(value, line_no);
        match &groups["key"] {
            "name" => name = Some(value.to_string()),
            "length" => length = Some(single()?),
            "mass" => mass = Some(single()?),
            "inertia_coefficient" => inertia_coefficient = Some(single()?),
            "max_speed" => max_speed = Some(kmh_to_ms(single()?)),
            "startup_time" => startup_time = Some(single()?),
            "startup_acceleration" => startup_acceleration = Some(single()?),
            "comfort_acceleration" => comfort_acceleration = Some(single()?),
            "gamma" => gamma = Some(single()?),
            "rolling_resistance" => match numbers()?.as_slice() {
                &[a, b, c] => resistance = Some(DavisResistance { a, b, c }),
                _ => return Err(ParseError::Unrecognized(line_no, line.to_string())),
            },
            "effort" => match numbers()?.as_slice() {
                &[speed, force] => effort_curve.push((kmh_to_ms(speed), force)),
                _ => return Err(ParseError::Unrecognized(line_no, line.to_string())),
            },
            _ => return Err(ParseError::Unrecognized(line_no, line.to_string())),
        }
    }

    let rolling_stock = RollingStock {
        name: name.ok_or(ParseError::MissingField("name"))?,
        length: length.ok_or(ParseError::MissingField("length"))?,
        mass: mass.ok_or(ParseError::MissingField("mass"))?,
        inertia_coefficient: inertia_coefficient.ok_or(ParseError::MissingField("inertia_coefficient"))?,
        resistance: resistance.ok_or(ParseError::MissingField("rolling_resistance"))?,
        max_speed: max_speed.ok_or(ParseError::MissingField("max_speed"))?,
        startup_time: startup_time.unwrap_or(0.0),
        startup_acceleration: startup_acceleration.ok_or(ParseError::MissingField("startup_acceleration"))?,
        comfort_acceleration: comfort_acceleration.ok_or(ParseError::MissingField("comfort_acceleration"))?,
        gamma: gamma.ok_or(ParseError::MissingField("gamma"))?,
        effort_curve,
    };
    rolling_stock.validate()?;
    Ok(rolling_stock)
}
