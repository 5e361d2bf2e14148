#[macro_use] extern crate log;

use speedsim::*;
use speedsim::units::ms_to_kmh;
use std::path::PathBuf;
use structopt::StructOpt;

/// Speedsim -- speed envelopes and train runs on a path
#[derive(StructOpt, Debug)]
#[structopt(name = "speedsim")]
struct Opt {
    /// Verbose mode (-v, -vv, -vvv)
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbose: u8,

    /// Rolling stock description file
    #[structopt(parse(from_os_str))]
    rolling_stock: PathBuf,

    /// Path description file
    #[structopt(parse(from_os_str))]
    path: PathBuf,

    /// Train category used to select speed limits
    #[structopt(short = "t", long = "tag")]
    tag: Option<String>,

    /// Release speed limits at the head instead of the rear of the train
    #[structopt(short = "l", long = "head-only")]
    head_only: bool,

    /// Time step, in seconds
    #[structopt(short = "d", long = "time-step", default_value = "0.5")]
    timestep: f64,

    /// Maximum simulated time, in seconds
    #[structopt(short = "m", long = "max-time", default_value = "36000")]
    max_time: f64,

    /// Output JSON report file
    #[structopt(short = "j", long = "json", parse(from_os_str))]
    json: Option<PathBuf>,
}

fn run(opt: &Opt) -> AppResult<()> {
    let rolling_stock = get_rolling_stock(&opt.rolling_stock)?;
    debug!("rolling stock: {:?}", rolling_stock);
    let path = get_path(&opt.path)?;
    debug!("path: {:?}", path);

    let params = RunParams {
        train_tag: opt.tag.clone(),
        add_rolling_stock_length: !opt.head_only,
        time_step: opt.timestep,
        max_time: opt.max_time,
    };
    let (mrsp, history) = evaluate_run(rolling_stock, &path, &params)?;

    println!("# MRSP:");
    for seg in mrsp.segments() {
        println!("{:>10.1} {:>10.1} {:>7.1} km/h  {:?} {:?}",
                 seg.begin, seg.end, ms_to_kmh(seg.speed), seg.tags.limit, seg.tags.source);
    }

    println!("# State changes:");
    print!("{}", output::history::state_changes(&history)?);

    for (name, distance, max_speed) in output::history::summary(&history) {
        println!("# Train \"{}\" ran {:.1}m, top speed {:.1} km/h", name, distance, ms_to_kmh(max_speed));
    }

    if let Some(ref json) = opt.json {
        use std::fs::File;
        use std::io::BufWriter;
        let file = File::create(json)?;
        let mut writer = BufWriter::new(&file);
        output::json::json_report(&mrsp, &history, &mut writer)?;
    }

    Ok(())
}

pub fn main() {
    let opt = Opt::from_args();
    let level = match opt.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&opt) {
        Ok(()) => {},
        Err(e) => {
            println!("Error:\n{}", e.as_fail());
            std::process::exit(1);
        },
    }
}
