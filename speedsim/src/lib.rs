#[macro_use] extern crate log;
#[macro_use] extern crate failure_derive;

pub mod stairs;
pub mod units;
pub mod infra;
pub mod envelope;
pub mod railway;
pub mod input;
pub mod output;

use std::path::Path;
use std::sync::Arc;

use envelope::Envelope;
use envelope::mrsp::compute_mrsp_for;
use input::path::PathInput;
use output::history::History;
use railway::RollingStock;
use railway::controller::{EnvelopeFollower, TargetStopController};
use railway::position::PositionTracker;
use railway::simulation::{simulate, Supervisor, TrainRun};
use railway::train::Train;

pub type AppResult<T> = Result<T, failure::Error>;

pub fn read_file(f: &Path) -> AppResult<String> {
    use std::fs::File;
    use std::io::prelude::*;
    use std::io::BufReader;

    let file = File::open(f)?;
    let mut file = BufReader::new(&file);
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

pub fn get_rolling_stock(f: &Path) -> AppResult<RollingStock> {
    let contents = read_file(f)?;
    let rs = input::rollingstock::parse_rolling_stock(&contents)?;
    Ok(rs)
}

pub fn get_path(f: &Path) -> AppResult<PathInput> {
    let contents = read_file(f)?;
    let p = input::path::parse_path(&contents)?;
    Ok(p)
}

/// Parameters of a single train run.
#[derive(Clone, Debug)]
pub struct RunParams {
    pub train_tag: Option<String>,
    pub add_rolling_stock_length: bool,
    /// Simulation time step, in seconds.
    pub time_step: f64,
    /// Simulated time after which the run is abandoned, in seconds.
    pub max_time: f64,
}

impl Default for RunParams {
    fn default() -> Self {
        RunParams { train_tag: None, add_rolling_stock_length: true, time_step: 0.5, max_time: 36000.0 }
    }
}

/// Computes the MRSP of `rolling_stock` on the path, then runs a train
/// from the start of the path to its stop (or its end) under that MRSP.
pub fn evaluate_run(rolling_stock: RollingStock, path: &PathInput, params: &RunParams)
                    -> AppResult<(Envelope, History)> {
    if !(params.time_step > 0.0) {
        return Err(failure::err_msg(format!("time step must be positive, got {}", params.time_step)));
    }

    let mrsp = Arc::new(compute_mrsp_for(&path.path, &rolling_stock, params.add_rolling_stock_length,
                                         params.train_tag.as_ref().map(|t| t.as_str())));
    info!("MRSP has {} segments, speeds between {:.2} and {:.2} m/s",
          mrsp.segments().len(), mrsp.min_speed(), mrsp.max_speed());

    let rolling_stock = Arc::new(rolling_stock);
    let deceleration = rolling_stock.service_deceleration();
    let destination = path.stop.unwrap_or_else(|| mrsp.end());

    let position = PositionTracker::new(&path.path, rolling_stock.length);
    let train = Train::new(rolling_stock.clone(), position, 0.0)?
        .with_controller(EnvelopeFollower::new(mrsp.clone(), deceleration))
        .with_controller(TargetStopController::new(destination, deceleration));

    let mut runs = vec![TrainRun::new(&rolling_stock.name, train, Supervisor::new(mrsp.clone(), destination))];
    let ticks = simulate(&mut runs, params.time_step, params.max_time);
    debug!("simulation finished after {} ticks", ticks);

    let history = History::from_runs(runs);
    let mrsp = Arc::try_unwrap(mrsp).unwrap_or_else(|shared| (*shared).clone());
    Ok((mrsp, history))
}
