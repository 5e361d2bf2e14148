use maplit::hashmap;

use speedsim::envelope::mrsp::compute_mrsp;
use speedsim::envelope::{LimitKind, SpeedLimitSource};
use speedsim::infra::{InfraPath, Infra, PathProperties, SpeedSection, Track, TrackRange, TrainPath};
use speedsim::input::path::parse_path;
use speedsim::input::rollingstock::parse_rolling_stock;
use speedsim::output::history::{state_changes, summary, TrainLogEvent};
use speedsim::railway::TrainState;
use speedsim::units::kmh_to_ms;
use speedsim::{evaluate_run, RunParams};

const ROLLING_STOCK: &str = "
    name = commuter
    length = 80
    mass = 150000
    inertia_coefficient = 1.05
    rolling_resistance = 1200 15 5
    max_speed = 108
    startup_time = 3
    startup_acceleration = 0.4
    comfort_acceleration = 0.7
    gamma = 0.6
    effort = 0 200000
    effort = 54 200000
    effort = 108 90000
";

const PATH: &str = "
    length 4000
    limit 1500 2000 54
    slope 0 0
    slope 2500 4
    stop 3800
";

fn states(events: &[TrainLogEvent]) -> Vec<TrainState> {
    events.iter().filter_map(|e| match *e {
        TrainLogEvent::State { state, .. } => Some(state),
        _ => None,
    }).collect()
}

#[test]
fn train_runs_to_its_stop() {
    let rs = parse_rolling_stock(ROLLING_STOCK).unwrap();
    let path = parse_path(PATH).unwrap();
    let (mrsp, history) = evaluate_run(rs, &path, &RunParams::default()).unwrap();

    // 54 km/h from 1500m until the rear of the train has passed 2000m.
    assert_eq!(mrsp.segments().len(), 3);
    assert_eq!(mrsp.segments()[1].begin, 1500.0);
    assert_eq!(mrsp.segments()[1].end, 2080.0);
    assert!((mrsp.segments()[1].speed - 15.0).abs() < 1e-9);
    assert_eq!(mrsp.segments()[1].tags.limit, LimitKind::SpeedLimit);

    assert_eq!(history.trains.len(), 1);
    let (ref name, ref events) = history.trains[0];
    assert_eq!(name, "commuter");

    let states = states(events);
    assert_eq!(states.first(), Some(&TrainState::StartingUp));
    assert_eq!(states.get(1), Some(&TrainState::Rolling));
    assert_eq!(states.last(), Some(&TrainState::ReachedDestination));
    assert!(!states.contains(&TrainState::EmergencyBraking));

    let (_, distance, max_speed) = summary(&history)[0].clone();
    assert!((distance - 3800.0).abs() <= 1.0, "stopped at {}", distance);
    assert!(max_speed <= kmh_to_ms(108.0) + 1e-6);

    // The train respects the restriction.
    let mut position = 0.0;
    for e in events {
        if let TrainLogEvent::Move { ref movement, .. } = *e {
            position += movement.dx;
            if position > 1500.0 && position < 2080.0 {
                assert!(movement.speed <= 15.0 + 0.5, "{} m/s at {}m", movement.speed, position);
            }
        }
    }

    let text = state_changes(&history).unwrap();
    assert!(text.lines().last().unwrap().ends_with("ReachedDestination"));
}

#[test]
fn category_limits_apply_to_tagged_trains() {
    let path = parse_path("length 1000\nlimit 0 1000 90\nlimit 200 400 36 freight").unwrap();
    let rs = parse_rolling_stock(ROLLING_STOCK).unwrap();

    let untagged = compute_mrsp(&path.path, rs.max_speed, rs.length, false, None);
    assert_eq!(untagged.segments().len(), 1);

    let freight = compute_mrsp(&path.path, rs.max_speed, rs.length, false, Some("freight"));
    let restricted = freight.segment_at(300.0).unwrap();
    assert!((restricted.speed - 10.0).abs() < 1e-9);
    assert_eq!(restricted.tags.source, Some(SpeedLimitSource::GivenTrainTag("freight".to_string())));
}

#[test]
fn invalid_time_step_is_an_error() {
    let rs = parse_rolling_stock(ROLLING_STOCK).unwrap();
    let path = parse_path(PATH).unwrap();
    let params = RunParams { time_step: 0.0, ..RunParams::default() };
    assert!(evaluate_run(rs, &path, &params).is_err());
}

#[test]
fn infrastructure_speed_limits_use_tag_fallbacks() {
    let mut infra = Infra::new();
    {
        let line = infra.add_line("north").unwrap();
        let t1 = Track::create_and_register(line, "1", "T1", 1000.0).unwrap();
        t1.speed_limit.push(0.0, SpeedSection {
            default_speed: 40.0,
            by_tag: hashmap!{ "HLP".to_string() => 30.0, "MA80".to_string() => 20.0 },
        }).unwrap();
        t1.speed_limit.push(600.0, SpeedSection::new(35.0)).unwrap();
    }
    infra.set_tag_fallbacks("MA100", vec!["MA80".to_string(), "HLP".to_string()]);

    let train_path = TrainPath::new(vec![TrackRange::new("north", "T1", 100.0, 900.0)]);
    let path = InfraPath::new(&infra, &train_path).unwrap();
    assert_eq!(path.length(), 800.0);

    let mrsp = compute_mrsp(&path, 50.0, 0.0, false, Some("MA100"));
    let first = mrsp.segment_at(0.0).unwrap();
    assert_eq!(first.end, 500.0);
    assert_eq!(first.speed, 20.0);
    assert_eq!(first.tags.source, Some(SpeedLimitSource::FallbackTag("MA80".to_string())));

    let second = mrsp.segment_at(700.0).unwrap();
    assert_eq!(second.speed, 35.0);
    assert_eq!(second.tags.source, Some(SpeedLimitSource::UnknownTag));

    let hlp = compute_mrsp(&path, 50.0, 0.0, false, Some("HLP"));
    assert_eq!(hlp.speed_at(100.0), Some(30.0));
    assert_eq!(hlp.segment_at(100.0).unwrap().tags.source,
               Some(SpeedLimitSource::GivenTrainTag("HLP".to_string())));
}
