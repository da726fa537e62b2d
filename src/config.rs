use clap::{Args, Parser, Subcommand, ValueEnum};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::validate_config;
use crate::error::{Error, Result};
use crate::models::{AssignmentPolicy, PriorityAging, SimConfig};

#[derive(Parser, Debug)]
#[command(name = "bank-sim", version, about = "Discrete-event simulation of a bank teller line")]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a simulation and print the report.
    Run(RunArgs),
    /// Print the supported teller assignment policies.
    ListPolicies,
    /// Print the resolved configuration without running it.
    ShowConfig(RunArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// TOML or JSON file; flags given on the command line take precedence.
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub tellers: Option<usize>,
    /// Per-teller speed multiplier. Repeat once per teller.
    #[arg(long = "efficiency")]
    pub efficiencies: Vec<f64>,
    #[arg(long)]
    pub duration: Option<f64>,
    #[arg(long)]
    pub arrival_interval: Option<f64>,
    #[arg(long)]
    pub service_time: Option<f64>,
    #[arg(long)]
    pub service_variance: Option<f64>,
    /// Mean patience; `inf` disables abandonment.
    #[arg(long)]
    pub patience: Option<f64>,
    #[arg(long)]
    pub patience_variance: Option<f64>,
    #[arg(long)]
    pub queue_capacity: Option<usize>,
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long)]
    pub vip_rate: Option<f64>,
    #[arg(long)]
    pub elderly_rate: Option<f64>,
    #[arg(long)]
    pub appointment_rate: Option<f64>,
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,
    /// Promote waiting customers one class after this long in their current class.
    #[arg(long)]
    pub aging_threshold: Option<f64>,
    #[arg(long, requires = "aging_threshold")]
    pub aging_bonus: Option<f64>,
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,
    /// Shorthand for `--format summary`.
    #[arg(long, conflicts_with = "format")]
    pub summary: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyArg {
    IdleLongest,
    PriorityBiased,
}

impl From<PolicyArg> for AssignmentPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::IdleLongest => AssignmentPolicy::IdleLongest,
            PolicyArg::PriorityBiased => AssignmentPolicy::PriorityBiased,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FormatArg {
    #[default]
    Human,
    Summary,
    Json,
}

pub fn parse_args() -> Result<Cli> {
    Cli::try_parse().map_err(|e| Error::Cli(e.to_string()))
}

/// Resolves defaults, the optional config file and command-line overrides into a
/// validated configuration.
pub fn build_config(args: RunArgs) -> Result<(SimConfig, FormatArg)> {
    let mut config = match &args.config {
        Some(path) => {
            debug!("loading config from {}", path.display());
            load_config(path)?
        }
        None => SimConfig::default(),
    };

    if !args.efficiencies.is_empty() {
        if args.tellers.is_none() {
            config.teller_count = args.efficiencies.len();
        }
        config.teller_efficiencies = Some(args.efficiencies);
    }
    if let Some(tellers) = args.tellers {
        config.teller_count = tellers;
    }
    if let Some(duration) = args.duration {
        config.run_duration = duration;
    }
    if let Some(interval) = args.arrival_interval {
        config.mean_arrival_interval = interval;
    }
    if let Some(service_time) = args.service_time {
        config.mean_service_time = service_time;
    }
    if let Some(variance) = args.service_variance {
        config.service_time_variance = variance;
    }
    if let Some(patience) = args.patience {
        config.mean_patience = patience;
    }
    if let Some(variance) = args.patience_variance {
        config.patience_variance = variance;
    }
    if let Some(capacity) = args.queue_capacity {
        config.queue_capacity = Some(capacity);
    }
    if let Some(seed) = args.seed {
        config.random_seed = Some(seed);
    }
    if let Some(rate) = args.vip_rate {
        config.priority_distribution.vip = rate;
    }
    if let Some(rate) = args.elderly_rate {
        config.priority_distribution.elderly = rate;
    }
    if let Some(rate) = args.appointment_rate {
        config.priority_distribution.appointment = rate;
    }
    if let Some(policy) = args.policy {
        config.assignment_policy = policy.into();
    }
    if let Some(threshold) = args.aging_threshold {
        let previous_bonus = config
            .priority_aging
            .map(|aging| aging.patience_bonus)
            .unwrap_or(0.0);
        config.priority_aging = Some(PriorityAging {
            threshold,
            patience_bonus: args.aging_bonus.unwrap_or(previous_bonus),
        });
    }

    validate_config(&config)?;

    let format = if args.summary {
        FormatArg::Summary
    } else {
        args.format.unwrap_or_default()
    };
    Ok((config, format))
}

pub fn load_config(path: &Path) -> Result<SimConfig> {
    let contents = fs::read_to_string(path).map_err(|err| {
        Error::ConfigIo(format!(
            "failed to read config '{}': {}",
            path.display(),
            err
        ))
    })?;
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .unwrap_or("");

    match ext {
        "toml" => toml::from_str(&contents)
            .map_err(|err| Error::ConfigParse(format!("failed to parse TOML: {}", err))),
        "json" => serde_json::from_str(&contents)
            .map_err(|err| Error::ConfigParse(format!("failed to parse JSON: {}", err))),
        "" => Err(Error::UnsupportedConfigFormat("unknown".to_string())),
        _ => Err(Error::UnsupportedConfigFormat(ext.to_string())),
    }
}
