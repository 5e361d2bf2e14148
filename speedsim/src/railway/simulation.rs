//! Fixed time step driver. Every tick, each train is advanced once and a
//! supervisor decides on its operating state for the next tick.

use std::sync::Arc;

use super::train::{Train, TrainState};
use crate::envelope::Envelope;
use crate::output::history::TrainLogEvent;

const STANDSTILL: f64 = 1e-4;

/// How far from the destination a stopped train still counts as arrived.
pub const ARRIVAL_TOLERANCE: f64 = 1.0;

/// Overspeed above the MRSP tolerated before an emergency brake.
pub const DEFAULT_OVERSPEED_TOLERANCE: f64 = 1.0;

/// Decides on train state transitions.
#[derive(Clone, Debug)]
pub struct Supervisor {
    mrsp: Arc<Envelope>,
    destination: f64,
    overspeed_tolerance: f64,
}

impl Supervisor {
    pub fn new(mrsp: Arc<Envelope>, destination: f64) -> Self {
        Supervisor { mrsp, destination, overspeed_tolerance: DEFAULT_OVERSPEED_TOLERANCE }
    }

    pub fn with_overspeed_tolerance(mut self, tolerance: f64) -> Self {
        self.overspeed_tolerance = tolerance;
        self
    }

    pub fn destination(&self) -> f64 {
        self.destination
    }

    fn overspeed(&self, train: &Train) -> bool {
        self.mrsp.speed_at(train.position.head())
            .map_or(false, |limit| train.speed > limit + self.overspeed_tolerance)
    }

    fn arrived(&self, train: &Train) -> bool {
        train.position.reached_end()
            || (train.speed < STANDSTILL && train.position.head() >= self.destination - ARRIVAL_TOLERANCE)
    }

    /// The state the train should be in, given how long it has been in
    /// its current one.
    pub fn next_state(&self, train: &Train, time_in_state: f64) -> TrainState {
        use self::TrainState::*;
        let standstill = train.speed < STANDSTILL;
        match train.state() {
            ReachedDestination => ReachedDestination,
            _ if self.arrived(train) => ReachedDestination,
            StartingUp | Rolling if self.overspeed(train) => EmergencyBraking,
            StartingUp if time_in_state >= train.rolling_stock.startup_time => Rolling,
            EmergencyBraking if standstill => Stop,
            Stop => StartingUp,
            state => state,
        }
    }
}

/// A train being simulated, with its supervisor and event log.
#[derive(Debug)]
pub struct TrainRun {
    pub name: String,
    pub train: Train,
    pub supervisor: Supervisor,
    pub time: f64,
    state_since: f64,
    pub log: Vec<TrainLogEvent>,
}

impl TrainRun {
    pub fn new(name: &str, train: Train, supervisor: Supervisor) -> Self {
        let log = vec![TrainLogEvent::State { time: 0.0, state: train.state() }];
        TrainRun { name: name.to_string(), train, supervisor, time: 0.0, state_since: 0.0, log }
    }

    pub fn is_finished(&self) -> bool {
        self.train.state() == TrainState::ReachedDestination
    }

    pub fn tick(&mut self, time_delta: f64) {
        if self.is_finished() {
            return;
        }
        if let Some(movement) = self.train.update(time_delta) {
            self.log.push(TrainLogEvent::Move { time_delta, movement });
        }
        self.time += time_delta;

        let next = self.supervisor.next_state(&self.train, self.time - self.state_since);
        if next != self.train.state() {
            self.train.set_state(next);
            self.state_since = self.time;
            self.log.push(TrainLogEvent::State { time: self.time, state: next });
            if next == TrainState::ReachedDestination {
                info!("train {} reached its destination after {:.1}s", self.name, self.time);
            }
        }
    }
}

/// Advances every train by one tick. Distinct trains are independent and
/// may be advanced in parallel.
pub fn tick(runs: &mut [TrainRun], time_delta: f64) {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        runs.par_iter_mut().for_each(|run| run.tick(time_delta));
    }
    #[cfg(not(feature = "parallel"))]
    {
        for run in runs.iter_mut() {
            run.tick(time_delta);
        }
    }
}

/// Ticks until every train reached its destination or `max_time` elapsed.
/// Returns the number of ticks run.
pub fn simulate(runs: &mut [TrainRun], time_delta: f64, max_time: f64) -> usize {
    let mut ticks = 0;
    let mut time = 0.0;
    while time < max_time && !runs.iter().all(|r| r.is_finished()) {
        tick(runs, time_delta);
        time += time_delta;
        ticks += 1;
    }
    let unfinished = runs.iter().filter(|r| !r.is_finished()).count();
    if unfinished > 0 {
        warn!("{} trains did not reach their destination within {}s", unfinished, max_time);
    }
    ticks
}
