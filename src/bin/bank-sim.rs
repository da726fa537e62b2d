use std::io::Write;

use bank_queue_sim::config::{self, Command, FormatArg, RunArgs};
use bank_queue_sim::engine;
use bank_queue_sim::error::Result;
use bank_queue_sim::models::AssignmentPolicy;
use bank_queue_sim::output::{self, Formatter, HumanFormatter, JsonFormatter, SummaryFormatter};

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = config::parse_args()?;
    match cli.command {
        Some(Command::ListPolicies) => {
            for policy in AssignmentPolicy::ALL {
                println!("{}", policy);
            }
        }
        Some(Command::ShowConfig(args)) => {
            let (config, _) = config::build_config(args)?;
            print!("{}", output::render_config(&config));
        }
        Some(Command::Run(args)) => simulate(args)?,
        None => simulate(cli.run)?,
    }
    Ok(())
}

fn simulate(args: RunArgs) -> Result<()> {
    let (config, format) = config::build_config(args)?;
    let report = engine::run_simulation(&config)?;

    let formatter = formatter_for(&format);
    let output = formatter.write(&report);
    print!("{}", output);

    Ok(())
}

fn formatter_for(format: &FormatArg) -> Box<dyn Formatter> {
    match format {
        FormatArg::Human => Box::new(HumanFormatter),
        FormatArg::Summary => Box::new(SummaryFormatter),
        FormatArg::Json => Box::new(JsonFormatter),
    }
}

/// Logs go to stderr and are off unless `RUST_LOG` is set.
fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .try_init();
}
