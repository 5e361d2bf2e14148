//! Train dynamics: rolling stock, control actions, speed controllers and
//! the per-tick physics update.

pub mod rollingstock;
pub mod action;
pub mod position;
pub mod controller;
pub mod train;
pub mod simulation;

pub use self::action::Action;
pub use self::rollingstock::{DavisResistance, RollingStock};
pub use self::train::{Movement, Train, TrainState};
