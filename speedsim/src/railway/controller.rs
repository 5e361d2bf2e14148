//! Speed control policies. Each controller proposes one action per tick;
//! the train applies the most restrictive proposal.

use std::fmt::Debug;
use std::sync::Arc;

use super::action::Action;
use super::rollingstock::RollingStock;
use crate::envelope::Envelope;

/// What a controller may look at when proposing an action.
#[derive(Copy, Clone, Debug)]
pub struct ControlContext<'a> {
    pub rolling_stock: &'a RollingStock,
    pub head: f64,
    pub speed: f64,
    /// Resistance and grade forces currently acting against the train.
    pub drag_force: f64,
    pub time_delta: f64,
}

impl<'a> ControlContext<'a> {
    /// The force bringing the train to `target` speed by the end of the tick.
    pub fn force_toward(&self, target: f64) -> f64 {
        (target - self.speed) / self.time_delta * self.rolling_stock.effective_mass() + self.drag_force
    }
}

pub trait SpeedController: Debug + Send + Sync {
    fn action(&self, context: &ControlContext) -> Action;
}

/// Braking curve speed: the highest speed from which `target` can be
/// reached within `distance` at constant `deceleration`.
fn braking_curve(target: f64, distance: f64, deceleration: f64) -> f64 {
    (target * target + 2.0 * deceleration * distance.max(0.0)).sqrt()
}

/// Keeps the train under a speed envelope, braking ahead of the
/// restrictions in front of the train.
#[derive(Clone, Debug)]
pub struct EnvelopeFollower {
    envelope: Arc<Envelope>,
    deceleration: f64,
}

impl EnvelopeFollower {
    pub fn new(envelope: Arc<Envelope>, deceleration: f64) -> Self {
        EnvelopeFollower { envelope, deceleration }
    }

    pub fn allowed_speed(&self, head: f64) -> f64 {
        let mut allowed = match self.envelope.speed_at(head) {
            Some(speed) => speed,
            None => return 0.0,
        };
        let reach = self.envelope.max_speed().powi(2) / (2.0 * self.deceleration);
        for segment in self.envelope.segments().iter().filter(|s| s.begin > head) {
            let distance = segment.begin - head;
            if distance > reach {
                break;
            }
            allowed = allowed.min(braking_curve(segment.speed, distance, self.deceleration));
        }
        allowed
    }
}

impl SpeedController for EnvelopeFollower {
    fn action(&self, context: &ControlContext) -> Action {
        Action::with_force(context.force_toward(self.allowed_speed(context.head)))
    }
}

/// Brakes the train to a standstill at a given path offset.
#[derive(Clone, Debug)]
pub struct TargetStopController {
    stop: f64,
    deceleration: f64,
}

impl TargetStopController {
    pub fn new(stop: f64, deceleration: f64) -> Self {
        TargetStopController { stop, deceleration }
    }

    pub fn allowed_speed(&self, head: f64) -> f64 {
        braking_curve(0.0, self.stop - head, self.deceleration)
    }
}

impl SpeedController for TargetStopController {
    fn action(&self, context: &ControlContext) -> Action {
        Action::with_force(context.force_toward(self.allowed_speed(context.head)))
    }
}
