use thiserror::Error;

use crate::teller::TellerId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("teller_count must be greater than 0")]
    NoTellers,
    #[error("expected {expected} teller efficiencies, got {actual}")]
    EfficiencyCountMismatch { expected: usize, actual: usize },
    #[error("teller efficiency must be > 0 (got {0})")]
    InvalidEfficiency(f64),
    #[error("run duration must be > 0 (got {0})")]
    InvalidDuration(f64),
    #[error("mean arrival interval must be > 0 (got {0})")]
    InvalidArrivalInterval(f64),
    #[error("mean service time must be > 0 (got {0})")]
    InvalidServiceTime(f64),
    #[error("mean patience must be > 0 (got {0})")]
    InvalidPatience(f64),
    #[error("{name} must be finite and >= 0 (got {value})")]
    InvalidVariance { name: &'static str, value: f64 },
    #[error("probability for {class} must be within [0, 1] (got {value})")]
    InvalidProbability { class: String, value: f64 },
    #[error("priority probabilities must sum to <= 1.0 (got {0})")]
    PriorityDistributionSum(f64),
    #[error("invalid scripted arrival #{index}: {reason}")]
    InvalidScriptedArrival { index: usize, reason: String },
    #[error("aging threshold must be > 0 (got {0})")]
    InvalidAgingThreshold(f64),
    #[error("aging patience bonus must be finite and >= 0 (got {0})")]
    InvalidAgingBonus(f64),
    #[error("cannot schedule event at {time} (current time {now})")]
    InvalidTime { time: f64, now: f64 },
    #[error("invalid state: teller {teller_id} {reason}")]
    InvalidState {
        teller_id: TellerId,
        reason: &'static str,
    },
    #[error("unknown teller {0}")]
    UnknownTeller(TellerId),
    #[error("facility cannot be reopened once closed")]
    FacilityReopened,
    #[error("{0}")]
    ConfigIo(String),
    #[error("{0}")]
    ConfigParse(String),
    #[error("unsupported config format '{0}'")]
    UnsupportedConfigFormat(String),
    #[error("{0}")]
    Cli(String),
}

pub type Result<T> = std::result::Result<T, Error>;
