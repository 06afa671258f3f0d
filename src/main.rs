use std::error::Error;
use std::io::{self, BufRead};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mapout::codec::FileSlot;
use mapout::controller::{
    FormSurface, MapView, Notifier, SessionController, WorkoutList, DEFAULT_ZOOM,
};
use mapout::form::FormFields;
use mapout::runtime::{self, EventSource, SessionEvent};
use mapout::workout::{GeoPoint, Workout, WorkoutKind};

/// log running and cycling workouts on an interactive map
#[derive(Parser, Debug)]
#[clap(
    version,
    about,
    long_about = "Drop running and cycling records on a map and get them back next session. \
This binary drives the session core through a line-oriented console frontend; \
type `help` at the prompt for the command set."
)]
struct Cli {
    /// latitude of the starting position (omit to simulate a failed location fix)
    #[clap(long, requires = "lng")]
    lat: Option<f64>,

    /// longitude of the starting position
    #[clap(long, requires = "lat")]
    lng: Option<f64>,

    /// where the workout snapshot is stored
    #[clap(long)]
    data_file: Option<PathBuf>,

    /// map zoom level used when centering
    #[clap(long, default_value_t = DEFAULT_ZOOM)]
    zoom: u8,

    /// increase log verbosity (-v, -vv)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// decrease log verbosity (-q, -qq)
    #[clap(short, long, action = clap::ArgAction::Count)]
    quiet: u8,
}

/// Console stand-in for the map widget, the form surface, and the workout
/// list: markers and centering become log lines, entries become stdout text.
#[derive(Debug, Default)]
struct ConsoleFrontend;

impl MapView for ConsoleFrontend {
    fn center_on(&mut self, point: GeoPoint, zoom: u8) {
        println!("[map] centered on {point} (zoom {zoom})");
    }

    fn place_marker(&mut self, point: GeoPoint, popup: &str, style: &str) {
        println!("[map] marker at {point}: {popup} ({style})");
    }
}

impl FormSurface for ConsoleFrontend {
    fn show(&mut self) {
        println!("[form] open, cursor in the distance field");
    }

    fn hide_and_clear(&mut self) {
        println!("[form] cleared and hidden");
    }

    fn swap_extra_field(&mut self, kind: WorkoutKind) {
        let field = match kind {
            WorkoutKind::Running => "cadence",
            WorkoutKind::Cycling => "elevation",
        };
        println!("[form] now asking for {field}");
    }
}

impl WorkoutList for ConsoleFrontend {
    fn push_entry(&mut self, workout: &Workout) {
        println!(
            "[{}] {}: {}",
            workout.id(),
            workout.description(),
            workout.summary().join(", ")
        );
    }
}

impl Notifier for ConsoleFrontend {
    fn notify(&mut self, message: &str) {
        println!("[notice] {message}");
    }
}

const USAGE: &str = "commands:
  click <lat> <lng>          drop a pin and open the record form
  type <running|cycling>     switch the form's workout kind
  log <dist> <dur> <extra>   submit the form (extra = cadence or elevation)
  goto <id>                  recenter the map on a logged workout
  help                       show this text
  quit                       end the session";

enum Command {
    Event(SessionEvent),
    Help,
    Quit,
    Empty,
}

fn parse_command(line: &str, selected: &mut WorkoutKind) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(Command::Empty);
    };
    let rest: Vec<&str> = words.collect();

    let number = |raw: &str, what: &str| -> Result<f64, String> {
        raw.parse::<f64>()
            .map_err(|_| format!("{what} must be a number, got `{raw}`"))
    };

    match verb {
        "click" => match rest.as_slice() {
            [lat, lng] => {
                let point = GeoPoint::new(number(lat, "lat")?, number(lng, "lng")?);
                Ok(Command::Event(SessionEvent::MapClicked(point)))
            }
            _ => Err("usage: click <lat> <lng>".into()),
        },
        "type" => match rest.as_slice() {
            ["running"] => {
                *selected = WorkoutKind::Running;
                Ok(Command::Event(SessionEvent::KindToggled(*selected)))
            }
            ["cycling"] => {
                *selected = WorkoutKind::Cycling;
                Ok(Command::Event(SessionEvent::KindToggled(*selected)))
            }
            _ => Err("usage: type <running|cycling>".into()),
        },
        "log" => match rest.as_slice() {
            [distance, duration, extra] => {
                // raw strings go straight through; the form surface does not
                // pre-validate, the controller does
                let mut fields = FormFields {
                    kind: *selected,
                    distance: (*distance).to_string(),
                    duration: (*duration).to_string(),
                    ..FormFields::default()
                };
                match *selected {
                    WorkoutKind::Running => fields.cadence = (*extra).to_string(),
                    WorkoutKind::Cycling => fields.elevation = (*extra).to_string(),
                }
                Ok(Command::Event(SessionEvent::FormSubmitted(fields)))
            }
            _ => Err("usage: log <distance-km> <duration-min> <cadence|elevation>".into()),
        },
        "goto" => match rest.as_slice() {
            [id] => Ok(Command::Event(SessionEvent::EntrySelected((*id).into()))),
            _ => Err("usage: goto <id>".into()),
        },
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command `{other}`, try `help`")),
    }
}

/// Turns stdin lines into session events. Local commands (`help`, malformed
/// input) are answered here without waking the controller.
struct StdinEventSource<R: BufRead> {
    lines: io::Lines<R>,
    selected: WorkoutKind,
}

impl<R: BufRead> StdinEventSource<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            selected: WorkoutKind::default(),
        }
    }
}

impl<R: BufRead> EventSource for StdinEventSource<R> {
    fn recv(&mut self) -> Option<SessionEvent> {
        loop {
            let line = self.lines.next()?.ok()?;
            match parse_command(&line, &mut self.selected) {
                Ok(Command::Event(event)) => return Some(event),
                Ok(Command::Help) => println!("{USAGE}"),
                Ok(Command::Empty) => {}
                Ok(Command::Quit) => return None,
                Err(message) => eprintln!("{message}"),
            }
        }
    }
}

fn init_logging(verbose: u8, quiet: u8) {
    let level = match verbose as i8 - quiet as i8 {
        i8::MIN..=-2 => "error",
        -1 => "warn",
        0 => "info",
        1 => "debug",
        2..=i8::MAX => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,mapout={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let slot = match &cli.data_file {
        Some(path) => FileSlot::with_path(path),
        None => FileSlot::new(),
    };

    let mut controller = SessionController::with_zoom(ConsoleFrontend, slot, cli.zoom);

    // one-shot location provider: resolved from the flags or failed outright
    match (cli.lat, cli.lng) {
        (Some(lat), Some(lng)) => {
            controller.handle(SessionEvent::LocationResolved(GeoPoint::new(lat, lng)));
        }
        _ => controller.handle(SessionEvent::LocationFailed),
    }

    let mut source = StdinEventSource::new(io::stdin().lock());
    runtime::run(&mut source, &mut controller);

    Ok(())
}
