use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use tracing::error;

const DEFAULT_OUT_DIR: &str = "emotewarp-frames";
const DEFAULT_DURATION_MS: u64 = 5000;
const DEFAULT_TICK_MS: u64 = 16;
const DEFAULT_LOG_DIR: &str = "logs";

pub const USAGE: &str = "usage: emotewarp <id> [--out DIR] [--duration-ms N] [--tick-ms N] [--config PATH] [--logdir DIR]";

#[derive(Debug, PartialEq)]
pub struct Args {
    /// Emote key or picture url
    pub id: Option<String>,
    pub out: PathBuf,
    pub duration: Duration,
    /// Simulated render tick
    pub tick: Duration,
    pub config: Option<PathBuf>,
    pub logdir: PathBuf,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            id: None,
            out: PathBuf::from(DEFAULT_OUT_DIR),
            duration: Duration::from_millis(DEFAULT_DURATION_MS),
            tick: Duration::from_millis(DEFAULT_TICK_MS),
            config: None,
            logdir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

fn parse_millis(arg: &str, value: Option<&String>) -> Option<Duration> {
    let Some(value) = value else {
        error!("{arg} argument missing?");
        return None;
    };

    match value.parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(err) => {
            error!("failed to parse {arg} value '{value}': {err}");
            None
        }
    }
}

impl Args {
    // parse arguments (without the program name), return set of unrecognized args
    pub fn parse(args: &[String]) -> (Self, BTreeSet<String>) {
        let mut unrecognized_args = BTreeSet::new();
        let mut res = Args::default();

        let mut i = 0;
        let len = args.len();
        while i < len {
            let arg = &args[i];

            if arg == "--out" {
                i += 1;
                match args.get(i) {
                    Some(dir) => res.out = PathBuf::from(dir),
                    None => error!("--out argument missing?"),
                }
            } else if arg == "--duration-ms" {
                i += 1;
                if let Some(duration) = parse_millis(arg, args.get(i)) {
                    res.duration = duration;
                }
            } else if arg == "--tick-ms" {
                i += 1;
                if let Some(tick) = parse_millis(arg, args.get(i)) {
                    if tick.is_zero() {
                        error!("--tick-ms must be positive");
                    } else {
                        res.tick = tick;
                    }
                }
            } else if arg == "--config" {
                i += 1;
                match args.get(i) {
                    Some(path) => res.config = Some(PathBuf::from(path)),
                    None => error!("--config argument missing?"),
                }
            } else if arg == "--logdir" {
                i += 1;
                match args.get(i) {
                    Some(dir) => res.logdir = PathBuf::from(dir),
                    None => error!("--logdir argument missing?"),
                }
            } else if arg.starts_with("--") || res.id.is_some() {
                unrecognized_args.insert(arg.clone());
            } else {
                res.id = Some(arg.clone());
            }

            i += 1;
        }

        (res, unrecognized_args)
    }
}
