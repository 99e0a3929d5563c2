use anyhow::Context;
use clap::{Parser, Subcommand};
use logchain::config::Config;
use logchain::{call_context, values, ConsoleLogger, DirLogger, InputStream, Level, LineFormat, Logger};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "logchain", about = "Composable loggers - demo and topic-file tools")]
struct Cli {
    /// Write debug logs to /tmp/logchain-debug.log (tail -f to inspect).
    #[arg(long)]
    debug: bool,

    /// TOML file layered over the built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Trace a primality check through console, filter, and time decorators.
    Demo {
        #[arg(default_values_t = [41u64, 103, 91])]
        numbers: Vec<u64>,
    },
    /// Append one call to a topic file inside a fresh directory.
    Write {
        /// Directory to create (defaults to `[dir] path` from the config).
        #[arg(long)]
        dir: Option<PathBuf>,
        #[arg(long)]
        topic: String,
        level: Level,
        values: Vec<String>,
    },
    /// Print a log file line by line.
    Read { file: PathBuf },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/logchain-debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("logchain debug log started - tail -f /tmp/logchain-debug.log");
    }

    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Cmd::Demo { numbers } => {
            let logger = config
                .apply_filter(&ConsoleLogger::stdio())
                .prepend_time_with(&config.format.time_format);
            for n in numbers {
                is_prime(n, &logger);
            }
        }
        Cmd::Write {
            dir,
            topic,
            level,
            values,
        } => {
            let dir = dir.unwrap_or_else(|| config.dir.path.clone());
            let registry = DirLogger::new(&dir, LineFormat::from_config(&config.format))?;
            write_topic(&registry, &config, &topic, level, values)?;
            println!("{}", registry.resolve(&topic).display());
        }
        Cmd::Read { file } => {
            let mut input = InputStream::open(&file)?;
            while let Some(line) = input.next_line()? {
                println!("{line}");
            }
        }
    }
    Ok(())
}

/// Append one call to `topic`, then close every file the registry holds,
/// whether or not the write succeeded.
fn write_topic(
    registry: &DirLogger,
    config: &Config,
    topic: &str,
    level: Level,
    values: Vec<String>,
) -> anyhow::Result<()> {
    let written = registry
        .get(topic)
        .map_err(anyhow::Error::from)
        .and_then(|logger| {
            config
                .apply_filter(&logger)
                .no_panic(level, values)
                .map_err(anyhow::Error::from)
        });
    let errors = registry.close_all();
    written?;
    if let Some(first) = errors.into_iter().next() {
        return Err(first.into());
    }
    Ok(())
}

fn is_factor(n: u64, f: u64, logger: &Logger) -> bool {
    let logger = call_context!(logger, n, f);
    let factor = n % f == 0;
    logger.trace([factor]);
    factor
}

fn is_prime(n: u64, logger: &Logger) -> bool {
    let logger = call_context!(logger, n);
    if n < 2 || (n > 2 && n % 2 == 0) {
        logger.info(values!["trivially not prime"]);
        return false;
    }
    let root = (n as f64).sqrt() as u64;
    logger.info(values!["square root", root]);
    let mut f = 3;
    while f <= root {
        if is_factor(n, f, &logger) {
            logger.debug(values!["is not prime, factor", f, "found"]);
            return false;
        }
        f += 2;
    }
    logger.log(Level::Info, ["is prime"]);
    true
}
