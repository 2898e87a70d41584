use anyhow::{Context, Result};
use clap::Parser;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use termreel::hero::{hero_script, on_ready};
use termreel::parser::parse_duration;
use termreel::{AnimationSegment, Engine, LocalScheduler, TerminalSurface, Timing, parse_file};
use tokio::task::LocalSet;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "termreel",
    about = "Play a scripted terminal typing animation",
    version
)]
struct Args {
    /// Path to the script file (defaults to the built-in hero script)
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Delay before the first character, e.g. 500ms or 1.5s
    #[arg(long, value_parser = parse_duration, default_value = "500ms")]
    initial_delay: Duration,

    /// Random extra delay added to each character
    #[arg(long, value_parser = parse_duration, default_value = "0ms")]
    jitter: Duration,

    /// Render everything without delays
    #[arg(long)]
    instant: bool,

    /// Disable ANSI styling
    #[arg(long)]
    no_color: bool,

    /// Do not clear the screen before playing
    #[arg(long)]
    no_clear: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let script: Rc<[AnimationSegment]> = match &args.script {
        Some(path) => parse_file(path)
            .with_context(|| format!("Failed to parse script file: {}", path.display()))?
            .into(),
        None => hero_script().into(),
    };

    let (timing, initial_delay) = if args.instant {
        (Timing::instant(), Duration::ZERO)
    } else {
        (Timing::default().with_jitter(args.jitter), args.initial_delay)
    };

    let stdout = std::io::stdout();
    let color = !args.no_color && stdout.is_terminal();
    let surface = Rc::new(
        TerminalSurface::new(stdout)
            .with_color(color)
            .with_clear_screen(!args.no_clear),
    );

    let local = LocalSet::new();
    local
        .run_until(async {
            let scheduler = Rc::new(LocalScheduler::new());
            let engine = Rc::new(Engine::with_timing(scheduler.clone(), timing));
            on_ready(
                &engine,
                &*scheduler,
                Some(surface.clone()),
                script,
                initial_delay,
            );
        })
        .await;
    // Resolves once the hook and every step it scheduled have run.
    local.await;

    let mut stdout = std::io::stdout();
    writeln!(stdout).context("Failed to write to stdout")?;
    stdout.flush()?;

    Ok(())
}
