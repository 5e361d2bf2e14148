use ordered_float::OrderedFloat;
use serde::Serialize;
use std::cmp::Ordering;

/// A control decision: a force to apply, and whether it is an emergency brake.
///
/// Actions are ordered by restrictiveness, the most restrictive first:
/// emergency brakes come before anything else, then lower forces before
/// higher ones. An action without a force coasts, and ranks as a zero force.
#[derive(Copy, Clone, Debug, Serialize)]
pub struct Action {
    pub force: Option<f64>,
    pub emergency_brake: bool,
}

impl Action {
    pub fn coast() -> Self {
        Action { force: None, emergency_brake: false }
    }

    pub fn with_force(force: f64) -> Self {
        Action { force: Some(force), emergency_brake: false }
    }

    pub fn emergency(force: f64) -> Self {
        Action { force: Some(force), emergency_brake: true }
    }

    pub fn effective_force(&self) -> f64 {
        self.force.unwrap_or(0.0)
    }

    fn restrictiveness(&self) -> (bool, OrderedFloat<f64>, bool) {
        (!self.emergency_brake, OrderedFloat(self.effective_force()), self.force.is_none())
    }
}

impl Ord for Action {
    fn cmp(&self, other: &Action) -> Ordering {
        self.restrictiveness().cmp(&other.restrictiveness())
    }
}

impl PartialOrd for Action {
    fn partial_cmp(&self, other: &Action) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Action {
    fn eq(&self, other: &Action) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Action {}

/// The most restrictive of the proposed actions.
pub fn most_restrictive<I: IntoIterator<Item = Action>>(actions: I) -> Option<Action> {
    actions.into_iter().min()
}
