mod args;
mod export;

use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use emotewarp::{EmoteConfig, EmoteId, Emotes, Error, HttpFetcher};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::args::{Args, USAGE};

fn setup_logging(logdir: &Path) -> WorkerGuard {
    use tracing_appender::{
        non_blocking,
        rolling::{RollingFileAppender, Rotation},
    };
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let file_appender = RollingFileAppender::new(
        Rotation::DAILY,
        logdir,
        format!("emotewarp-{}.log", env!("CARGO_PKG_VERSION")),
    );
    let (non_blocking_writer, guard) = non_blocking(file_appender);

    // Log to stdout (if you run with `RUST_LOG=debug`).
    let console_layer = fmt::layer().with_target(true).with_writer(std::io::stdout);
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(non_blocking_writer);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("emotewarp=info"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(env_filter)
        .init();

    guard
}

fn main() -> emotewarp::Result<()> {
    let raw: Vec<String> = std::env::args().skip(1).collect();
    let (args, unrecognized) = Args::parse(&raw);

    // keep the guard alive so buffered log lines are flushed on exit
    let _guard = setup_logging(&args.logdir);

    for arg in &unrecognized {
        warn!("unrecognized argument '{arg}'");
    }

    let Some(raw_id) = args.id.as_deref() else {
        eprintln!("{USAGE}");
        return Err(Error::Generic("missing emote id".to_owned()));
    };

    let config = match &args.config {
        Some(path) => EmoteConfig::load(path)?,
        None => EmoteConfig::default(),
    };
    std::fs::create_dir_all(&args.out)?;

    let mut emotes = Emotes::new(Arc::new(config), Box::new(HttpFetcher));
    let id = EmoteId::parse(raw_id);
    emotes.acquire(&id);
    info!("playing {id} for {:?}, tick {:?}", args.duration, args.tick);

    let start = Instant::now();
    let mut written = 0;
    loop {
        let now = Instant::now();
        if now.duration_since(start) >= args.duration {
            break;
        }

        emotes.update(now);
        if let Some(image) = emotes.texture_mut(&id).and_then(|t| t.take_update()) {
            export::save_png(&args.out, written, image)?;
            written += 1;
        }

        thread::sleep(args.tick);
    }

    if let Some(player) = emotes.player(&id) {
        info!("{id} ended as {:?}", player.kind());
    }
    emotes.release(&id);

    info!("wrote {written} textures to {}", args.out.display());
    Ok(())
}
