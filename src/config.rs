use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::SimulationRequest;

#[derive(Parser, Debug)]
#[command(
    name = "park-sim",
    version,
    about = "Monte Carlo evaluation of parking facility designs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Simulate every scenario in a request file
    Run(RunArgs),
    /// Print the merged configuration without simulating
    ShowConfig(RunArgs),
    /// Print parking-duration variability tiers
    ListVariability,
}

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Request file (.toml or .json)
    #[arg(long)]
    pub config: PathBuf,
    #[arg(long)]
    pub iterations: Option<u32>,
    #[arg(long, allow_negative_numbers = true)]
    pub seed: Option<i64>,
    /// Minutes excluded from metrics at the start of each replication
    #[arg(long)]
    pub warm_up: Option<f64>,
    /// Post-peak settling window in minutes
    #[arg(long)]
    pub buffer: Option<f64>,
    #[arg(long)]
    pub max_rejection_rate: Option<f64>,
    /// Exit p95 wait threshold in minutes
    #[arg(long)]
    pub max_exit_p95: Option<f64>,
    /// Worker threads; defaults to one per core
    #[arg(long)]
    pub threads: Option<usize>,
    #[arg(long, value_enum, default_value_t = FormatArg::Human)]
    pub format: FormatArg,
}

#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum FormatArg {
    Human,
    Summary,
    Json,
}

pub fn parse_args() -> Result<Cli> {
    Cli::try_parse().map_err(|err| match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
        _ => Error::Cli(err.to_string()),
    })
}

pub fn load_request(path: &Path) -> Result<SimulationRequest> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .unwrap_or("");
    if ext != "toml" && ext != "json" {
        let label = if ext.is_empty() { "unknown" } else { ext };
        return Err(Error::UnsupportedConfigFormat(label.to_string()));
    }

    let contents = fs::read_to_string(path).map_err(|err| {
        Error::ConfigIo(format!(
            "failed to read config '{}': {}",
            path.display(),
            err
        ))
    })?;

    if ext == "toml" {
        toml::from_str(&contents)
            .map_err(|err| Error::ConfigParse(format!("failed to parse TOML: {}", err)))
    } else {
        serde_json::from_str(&contents)
            .map_err(|err| Error::ConfigParse(format!("failed to parse JSON: {}", err)))
    }
}

/// Command-line flags win over values from the request file.
pub fn apply_overrides(mut request: SimulationRequest, args: &RunArgs) -> SimulationRequest {
    let config = &mut request.config;
    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if let Some(seed) = args.seed {
        config.master_seed = seed;
    }
    if let Some(warm_up) = args.warm_up {
        config.warm_up_minutes = warm_up;
    }
    if let Some(buffer) = args.buffer {
        config.stabilization_buffer_minutes = buffer;
    }
    if let Some(rate) = args.max_rejection_rate {
        config.thresholds.rejection_rate = rate;
    }
    if let Some(minutes) = args.max_exit_p95 {
        config.thresholds.exit_p95_sla_minutes = minutes;
    }
    request
}

pub fn build_request(args: &RunArgs) -> Result<SimulationRequest> {
    let request = load_request(&args.config)?;
    Ok(apply_overrides(request, args))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(config: &str) -> RunArgs {
        RunArgs {
            config: PathBuf::from(config),
            iterations: None,
            seed: None,
            warm_up: None,
            buffer: None,
            max_rejection_rate: None,
            max_exit_p95: None,
            threads: None,
            format: FormatArg::Human,
        }
    }

    #[test]
    fn parses_run_subcommand() {
        let cli = Cli::try_parse_from([
            "park-sim",
            "run",
            "--config",
            "lot.toml",
            "--iterations",
            "25",
            "--warm-up",
            "15",
            "--max-exit-p95",
            "2.5",
            "--format",
            "json",
        ])
        .unwrap();
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.config, PathBuf::from("lot.toml"));
                assert_eq!(args.iterations, Some(25));
                assert_eq!(args.warm_up, Some(15.0));
                assert_eq!(args.max_exit_p95, Some(2.5));
                assert_eq!(args.format, FormatArg::Json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn accepts_negative_seed() {
        let cli = Cli::try_parse_from(["park-sim", "run", "--config", "lot.toml", "--seed", "-7"])
            .unwrap();
        match cli.command {
            Command::Run(args) => assert_eq!(args.seed, Some(-7)),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn run_requires_config() {
        assert!(Cli::try_parse_from(["park-sim", "run"]).is_err());
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let request: SimulationRequest =
            serde_json::from_str(r#"{ "scenarios": [], "config": { "iterations": 10 } }"#)
                .unwrap();
        let mut flags = args("unused.json");
        flags.seed = Some(7);
        flags.max_rejection_rate = Some(0.2);
        let merged = apply_overrides(request, &flags);
        assert_eq!(merged.config.iterations, 10);
        assert_eq!(merged.config.master_seed, 7);
        assert_eq!(merged.config.thresholds.rejection_rate, 0.2);
        assert_eq!(merged.config.thresholds.exit_p95_sla_minutes, 3.0);
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = load_request(Path::new("request.yaml")).unwrap_err();
        assert_eq!(err.to_string(), "unsupported config format 'yaml'");
        let err = load_request(Path::new("request")).unwrap_err();
        assert_eq!(err.to_string(), "unsupported config format 'unknown'");
    }

    #[test]
    fn reports_missing_file() {
        let err = load_request(Path::new("does-not-exist.toml")).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("failed to read config 'does-not-exist.toml'"));
    }
}
