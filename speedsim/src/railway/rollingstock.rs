/// Davis rolling resistance `A + B·v + C·v²`, in newtons for `v` in m/s.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DavisResistance {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl DavisResistance {
    pub fn force(&self, speed: f64) -> f64 {
        self.a + self.b * speed + self.c * speed * speed
    }
}

#[derive(Debug, Fail, PartialEq)]
pub enum RollingStockError {
    #[fail(display = "{} must be positive, got {}", _0, _1)]
    NotPositive(&'static str, f64),
    #[fail(display = "{} must be finite and not negative, got {}", _0, _1)]
    Negative(&'static str, f64),
    #[fail(display = "tractive effort curve speeds must be strictly increasing")]
    UnsortedEffortCurve,
}

/// Physical constants of a train. All values in SI units.
#[derive(Clone, Debug, PartialEq)]
pub struct RollingStock {
    pub name: String,
    pub length: f64,
    pub mass: f64,
    /// Multiplied with the mass to get the effective mass, accounting for
    /// rotating parts.
    pub inertia_coefficient: f64,
    pub resistance: DavisResistance,
    pub max_speed: f64,
    /// Time spent in the start up phase before regular operation.
    pub startup_time: f64,
    pub startup_acceleration: f64,
    pub comfort_acceleration: f64,
    /// Service braking deceleration.
    pub gamma: f64,
    /// Maximum traction by speed, as `(speed, force)` pairs sorted by speed.
    pub effort_curve: Vec<(f64, f64)>,
}

fn positive(name: &'static str, x: f64) -> Result<(), RollingStockError> {
    if x > 0.0 && x.is_finite() { Ok(()) } else { Err(RollingStockError::NotPositive(name, x)) }
}

fn not_negative(name: &'static str, x: f64) -> Result<(), RollingStockError> {
    if x >= 0.0 && x.is_finite() { Ok(()) } else { Err(RollingStockError::Negative(name, x)) }
}

impl RollingStock {
    pub fn validate(&self) -> Result<(), RollingStockError> {
        positive("length", self.length)?;
        positive("mass", self.mass)?;
        positive("inertia coefficient", self.inertia_coefficient)?;
        positive("max speed", self.max_speed)?;
        positive("start up acceleration", self.startup_acceleration)?;
        positive("comfort acceleration", self.comfort_acceleration)?;
        positive("gamma", self.gamma)?;
        not_negative("resistance A", self.resistance.a)?;
        not_negative("resistance B", self.resistance.b)?;
        not_negative("resistance C", self.resistance.c)?;
        not_negative("start up time", self.startup_time)?;
        for &(speed, force) in &self.effort_curve {
            not_negative("effort curve speed", speed)?;
            not_negative("effort curve force", force)?;
        }
        if !self.effort_curve.windows(2).all(|w| w[0].0 < w[1].0) {
            return Err(RollingStockError::UnsortedEffortCurve);
        }
        Ok(())
    }

    pub fn effective_mass(&self) -> f64 {
        self.mass * self.inertia_coefficient
    }

    /// Maximum traction at `speed`, interpolated on the effort curve.
    /// Without a curve, traction is unbounded.
    pub fn max_action_force(&self, speed: f64) -> f64 {
        let curve = &self.effort_curve;
        let (first, last) = match (curve.first(), curve.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return std::f64::INFINITY,
        };
        if speed <= first.0 {
            return first.1;
        }
        if speed >= last.0 {
            return last.1;
        }
        let idx = curve.partition_point(|&(s, _)| s <= speed);
        let (s0, f0) = curve[idx - 1];
        let (s1, f1) = curve[idx];
        f0 + (f1 - f0) * (speed - s0) / (s1 - s0)
    }

    /// Maximum braking force, as a negative force.
    pub fn min_action_force(&self) -> f64 {
        -self.gamma * self.effective_mass()
    }

    /// Deceleration used to plan braking curves, within comfort limits.
    pub fn service_deceleration(&self) -> f64 {
        self.gamma.min(self.comfort_acceleration)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    pub fn rolling_stock() -> RollingStock {
        RollingStock {
            name: "test".to_string(),
            length: 20.0,
            mass: 100_000.0,
            inertia_coefficient: 1.05,
            resistance: DavisResistance { a: 1000.0, b: 20.0, c: 5.0 },
            max_speed: 40.0,
            startup_time: 5.0,
            startup_acceleration: 0.1,
            comfort_acceleration: 0.5,
            gamma: 1.0,
            effort_curve: vec![(0.0, 200_000.0), (20.0, 200_000.0), (40.0, 100_000.0)],
        }
    }

    #[test]
    fn davis_resistance() {
        let r = DavisResistance { a: 1.0, b: 2.0, c: 3.0 };
        assert_eq!(r.force(0.0), 1.0);
        assert_eq!(r.force(2.0), 1.0 + 4.0 + 12.0);
    }

    #[test]
    fn effort_curve_interpolation() {
        let rs = rolling_stock();
        assert_eq!(rs.max_action_force(0.0), 200_000.0);
        assert_eq!(rs.max_action_force(30.0), 150_000.0);
        assert_eq!(rs.max_action_force(80.0), 100_000.0);
        let unbounded = RollingStock { effort_curve: vec![], ..rolling_stock() };
        assert_eq!(unbounded.max_action_force(10.0), std::f64::INFINITY);
    }

    #[test]
    fn braking_force() {
        let rs = rolling_stock();
        assert!((rs.min_action_force() + 105_000.0).abs() < 1e-6);
        assert_eq!(rs.service_deceleration(), 0.5);
    }

    #[test]
    fn validation() {
        assert_eq!(rolling_stock().validate(), Ok(()));
        let no_inertia = RollingStock { inertia_coefficient: 0.0, ..rolling_stock() };
        assert_eq!(no_inertia.validate(), Err(RollingStockError::NotPositive("inertia coefficient", 0.0)));
        let negative = RollingStock { resistance: DavisResistance { a: -1.0, b: 0.0, c: 0.0 }, ..rolling_stock() };
        assert!(negative.validate().is_err());
        let unsorted = RollingStock { effort_curve: vec![(10.0, 1.0), (5.0, 1.0)], ..rolling_stock() };
        assert_eq!(unsorted.validate(), Err(RollingStockError::UnsortedEffortCurve));
    }
}
