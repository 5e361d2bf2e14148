use serde::Serialize;
use std::fmt::Write;

use crate::railway::simulation::TrainRun;
use crate::railway::{Movement, TrainState};

#[derive(Debug, Clone, Serialize)]
pub enum TrainLogEvent {
    State { time: f64, state: TrainState },
    Move { time_delta: f64, movement: Movement },
}

#[derive(Debug, Default, Serialize)]
pub struct History {
    pub trains: Vec<(String, Vec<TrainLogEvent>)>,
}

impl History {
    pub fn from_runs(runs: Vec<TrainRun>) -> History {
        History { trains: runs.into_iter().map(|r| (r.name, r.log)).collect() }
    }
}

/// Print one train state change per line on the following format:
/// `trainname time position state`.
pub fn state_changes(h: &History) -> Result<String, failure::Error> {
    let mut s = String::new();
    for (train_name, events) in &h.trains {
        let mut position = 0.0;
        for ev in events {
            match *ev {
                TrainLogEvent::Move { ref movement, .. } => position += movement.dx,
                TrainLogEvent::State { time, state } => {
                    writeln!(s, "{} {:.1} {:.1} {:?}", train_name, time, position, state)?;
                }
            }
        }
    }
    Ok(s)
}

/// Travelled distance and maximum speed per train.
pub fn summary(h: &History) -> Vec<(String, f64, f64)> {
    h.trains.iter().map(|(name, events)| {
        let (distance, max_speed) = events.iter().fold((0.0, 0.0f64), |(x, v), ev| match ev {
            TrainLogEvent::Move { movement, .. } => (x + movement.dx, v.max(movement.speed)),
            _ => (x, v),
        });
        (name.clone(), distance, max_speed)
    }).collect()
}
