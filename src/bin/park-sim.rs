use log::LevelFilter;
use park_sim::config::{self, Command, FormatArg, RunArgs};
use park_sim::error::Result;
use park_sim::output::{self, Formatter, HumanFormatter, JsonFormatter, SummaryFormatter};
use park_sim::request;
use park_sim::validation;

fn main() {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Warn)
        .parse_default_env()
        .format_timestamp(None)
        .init();

    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = config::parse_args()?;
    match cli.command {
        Command::Run(args) => run_simulation(&args),
        Command::ShowConfig(args) => show_config(&args),
        Command::ListVariability => {
            print!("{}", output::describe_variability());
            Ok(())
        }
    }
}

fn run_simulation(args: &RunArgs) -> Result<()> {
    let request = config::build_request(args)?;
    let response = match args.threads {
        Some(threads) => request::simulate_with_threads(&request, threads)?,
        None => request::simulate(&request)?,
    };

    let formatter = formatter_for(&args.format);
    let output = formatter.write(&response)?;
    print!("{}", output);

    Ok(())
}

fn show_config(args: &RunArgs) -> Result<()> {
    let request = config::build_request(args)?;
    validation::validate_request(&request)?;
    let warning = validation::capacity_warning(&request.scenarios);
    print!("{}", output::describe_request(&request, warning.as_deref()));
    Ok(())
}

fn formatter_for(format: &FormatArg) -> Box<dyn Formatter> {
    match format {
        FormatArg::Human => Box::new(HumanFormatter),
        FormatArg::Summary => Box::new(SummaryFormatter),
        FormatArg::Json => Box::new(JsonFormatter),
    }
}
