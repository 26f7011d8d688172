use anyhow::Context;
use inkwright::{
    init_logging, CharacterLibrary, ControllerLink, MotionDriver, TelemetryClient,
    TrajectoryCache, WriterConfig, WritingSession, BUILD_DATE, VERSION,
};
use std::io::{BufRead, Write};
use std::path::Path;

/// Default scale factor from library units to meters
const DEFAULT_SCALE: f64 = 0.0004;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    init_logging()?;
    tracing::info!(version = VERSION, built = BUILD_DATE, "inkwright starting");

    // Optional config file path as the sole argument
    let config = match std::env::args().nth(1) {
        Some(path) => WriterConfig::load_from_file(Path::new(&path))
            .with_context(|| format!("loading config from {}", path))?,
        None => WriterConfig::default(),
    };

    let library = CharacterLibrary::load_from_file(&config.library_path)
        .with_context(|| format!("loading character library {}", config.library_path.display()))?;
    let cache = TrajectoryCache::open(&config.cache_path)
        .with_context(|| format!("opening trajectory cache {}", config.cache_path.display()))?;

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let text = prompt_text(&mut input).context("reading text to write")?;
    let scale = prompt_scale(&mut input).context("reading scale factor")?;

    let link = ControllerLink::connect(&config.link).context("connecting to the controller")?;
    let telemetry = TelemetryClient::new(&config.link);
    let driver = MotionDriver::new(link, telemetry, config.motion.clone());

    let mut session = WritingSession::new(driver, library, cache);
    session.write(&text, scale).context("writing run failed")?;

    tracing::info!(text = %text, "writing run complete");
    Ok(())
}

/// Prompt until a non-empty line of text is entered
fn prompt_text<R: BufRead>(input: &mut R) -> anyhow::Result<String> {
    loop {
        print!("Text to write: ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            anyhow::bail!("stdin closed before any text was entered");
        }
        let text = line.trim();
        if !text.is_empty() {
            return Ok(text.to_string());
        }
        println!("Please enter at least one character.");
    }
}

/// Prompt for a positive scale factor; an empty line takes the default
fn prompt_scale<R: BufRead>(input: &mut R) -> anyhow::Result<f64> {
    loop {
        print!("Scale factor [{}]: ", DEFAULT_SCALE);
        std::io::stdout().flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            anyhow::bail!("stdin closed before a scale was entered");
        }
        let entry = line.trim();
        if entry.is_empty() {
            return Ok(DEFAULT_SCALE);
        }
        match entry.parse::<f64>() {
            Ok(scale) if scale > 0.0 && scale.is_finite() => return Ok(scale),
            _ => println!("Scale must be a positive number."),
        }
    }
}
