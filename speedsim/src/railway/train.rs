use serde::Serialize;
use std::sync::Arc;

use super::action::{most_restrictive, Action};
use super::controller::{ControlContext, SpeedController};
use super::position::PositionTracker;
use super::rollingstock::{RollingStock, RollingStockError};
use crate::units;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum TrainState {
    StartingUp,
    Stop,
    Rolling,
    EmergencyBraking,
    ReachedDestination,
}

/// The outcome of one tick.
#[derive(Copy, Clone, Debug, Serialize)]
pub struct Movement {
    pub action: Option<Action>,
    pub acceleration: f64,
    pub dx: f64,
    pub speed: f64,
}

#[derive(Debug)]
pub struct Train {
    pub rolling_stock: Arc<RollingStock>,
    pub controllers: Vec<Box<dyn SpeedController>>,
    pub position: PositionTracker,
    pub speed: f64,
    state: TrainState,
}

impl Train {
    pub fn new(rolling_stock: Arc<RollingStock>,
               position: PositionTracker,
               initial_speed: f64)
               -> Result<Self, RollingStockError> {
        rolling_stock.validate()?;
        Ok(Train {
            rolling_stock,
            controllers: Vec::new(),
            position,
            speed: initial_speed.max(0.0),
            state: TrainState::StartingUp,
        })
    }

    pub fn with_controller<C: SpeedController + 'static>(mut self, controller: C) -> Self {
        self.controllers.push(Box::new(controller));
        self
    }

    pub fn state(&self) -> TrainState {
        self.state
    }

    /// Panics when leaving `ReachedDestination`: a train that arrived is
    /// never brought back into service.
    pub fn set_state(&mut self, state: TrainState) {
        assert!(self.state != TrainState::ReachedDestination || state == TrainState::ReachedDestination,
                "invalid train state transition {:?} -> {:?}", self.state, state);
        if state != self.state {
            debug!("train state {:?} -> {:?} at {:.1}m, {:.2}m/s", self.state, state, self.position.head(), self.speed);
        }
        self.state = state;
    }

    /// Rolling resistance plus the weight component along the average
    /// grade under the train.
    pub fn drag_force(&self) -> f64 {
        let rs = &self.rolling_stock;
        let angle = units::grade_angle(self.position.average_grade());
        let weight_force = rs.mass * units::GRAVITY * angle.sin();
        rs.resistance.force(self.speed) + weight_force
    }

    fn context(&self, time_delta: f64, drag_force: f64) -> ControlContext {
        ControlContext {
            rolling_stock: &self.rolling_stock,
            head: self.position.head(),
            speed: self.speed,
            drag_force,
            time_delta,
        }
    }

    fn controllers_action(&self, context: &ControlContext) -> Option<Action> {
        most_restrictive(self.controllers.iter().map(|c| c.action(context)))
    }

    /// The action produced in the current state. Trains that reached their
    /// destination produce none.
    pub fn action(&self, time_delta: f64) -> Option<Action> {
        let context = self.context(time_delta, self.drag_force());
        self.state_action(&context)
    }

    fn state_action(&self, context: &ControlContext) -> Option<Action> {
        match self.state {
            TrainState::StartingUp | TrainState::Rolling => self.controllers_action(context),
            TrainState::Stop => Some(Action::with_force(self.rolling_stock.min_action_force())),
            TrainState::EmergencyBraking => Some(Action::emergency(self.rolling_stock.min_action_force())),
            TrainState::ReachedDestination => None,
        }
    }

    fn max_acceleration(&self) -> f64 {
        match self.state {
            TrainState::StartingUp => self.rolling_stock.startup_acceleration,
            _ => self.rolling_stock.comfort_acceleration,
        }
    }

    /// Advances the train by `time_delta` seconds. Does nothing once the
    /// train reached its destination.
    pub fn update(&mut self, time_delta: f64) -> Option<Movement> {
        assert!(time_delta > 0.0 && time_delta.is_finite(), "invalid time step {}", time_delta);
        if self.state == TrainState::ReachedDestination {
            return None;
        }

        let drag_forces = self.drag_force();
        let action = self.state_action(&self.context(time_delta, drag_forces));

        let rs = &self.rolling_stock;
        let action_force = action.map_or(0.0, |a| a.effective_force())
            .max(rs.min_action_force())
            .min(rs.max_action_force(self.speed));

        let mut acceleration = (action_force - drag_forces) / rs.effective_mass();

        // Comfort limits never get in the way of an emergency brake.
        let emergency = action.map_or(false, |a| a.emergency_brake);
        if !emergency {
            let max_acceleration = self.max_acceleration();
            acceleration = acceleration.max(-max_acceleration).min(max_acceleration);
        }

        let v0 = self.speed;
        let mut speed = v0 + acceleration * time_delta;
        let mut dx = v0 * time_delta + 0.5 * acceleration * time_delta * time_delta;
        // Cannot brake to negative velocity.
        if speed < 0.0 {
            speed = 0.0;
            dx = if acceleration < 0.0 { v0 * v0 / (-2.0 * acceleration) } else { 0.0 };
        }

        self.speed = speed;
        self.position.advance(dx);
        trace!("tick {:?}: a={:.3} v={:.3} x={:.1}", self.state, acceleration, speed, self.position.head());
        Some(Movement { action, acceleration, dx, speed })
    }
}
