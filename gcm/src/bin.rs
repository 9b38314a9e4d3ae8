use clap::Parser;
use gcm_config::FleetConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Runs a small in-process demonstration of the exchange subsystem
/// against a fleet topology loaded from a TOML file.
#[derive(Parser, Debug)]
#[command(name = "gcm")]
struct Args {
    /// Fleet-topology TOML file (zone->rank map, coupling toggle).
    #[arg(long)]
    config: PathBuf,

    /// Which rank's final tau gets printed to stdout.
    #[arg(long, default_value_t = 0)]
    rank: u32,

    /// Number of demonstration steps to run.
    #[arg(long, default_value_t = 4)]
    steps: usize,

    /// Raise log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match FleetConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load {}: {err:?}", args.config.display());
            return ExitCode::FAILURE;
        }
    };
    install_logging(&args, config.log_level.as_deref());

    match gcm::run_demo(&config, args.steps, args.rank) {
        Ok(tau) => {
            println!("rank {}: final admissible tau = {tau}", args.rank);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("demo run failed: {err:?}");
            ExitCode::FAILURE
        }
    }
}

/// `-v` always wins over the config file; with neither given, `info`.
fn install_logging(args: &Args, config_log_level: Option<&str>) {
    let default_level = match args.verbose {
        0 => config_log_level.unwrap_or("info"),
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
