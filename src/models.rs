use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub teller_count: usize,
    pub teller_efficiencies: Option<Vec<f64>>,
    pub run_duration: f64,
    pub mean_arrival_interval: f64,
    pub mean_service_time: f64,
    pub service_time_variance: f64,
    pub priority_distribution: PriorityDistribution,
    /// `inf` gives every customer unbounded patience.
    pub mean_patience: f64,
    pub patience_variance: f64,
    pub queue_capacity: Option<usize>,
    pub random_seed: Option<u64>,
    pub assignment_policy: AssignmentPolicy,
    pub priority_aging: Option<PriorityAging>,
    pub arrivals: ArrivalProfile,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            teller_count: 3,
            teller_efficiencies: None,
            run_duration: 480.0,
            mean_arrival_interval: 2.0,
            mean_service_time: 5.0,
            service_time_variance: 2.0,
            priority_distribution: PriorityDistribution::default(),
            mean_patience: 15.0,
            patience_variance: 5.0,
            queue_capacity: None,
            random_seed: None,
            assignment_policy: AssignmentPolicy::default(),
            priority_aging: None,
            arrivals: ArrivalProfile::default(),
        }
    }
}

impl SimConfig {
    /// Efficiency per teller, falling back to 1.0 for every teller when none are configured.
    pub fn efficiencies(&self) -> Vec<f64> {
        match &self.teller_efficiencies {
            Some(values) => values.clone(),
            None => vec![1.0; self.teller_count],
        }
    }
}

/// Customer classes, highest priority first. Lower ordinal is served first.
#[derive(
    Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum PriorityClass {
    Vip = 1,
    Elderly = 2,
    Appointment = 3,
    #[default]
    Regular = 4,
}

impl PriorityClass {
    pub const ALL: [PriorityClass; 4] = [
        PriorityClass::Vip,
        PriorityClass::Elderly,
        PriorityClass::Appointment,
        PriorityClass::Regular,
    ];

    /// The next class up, or `None` for VIP.
    pub fn promoted(self) -> Option<PriorityClass> {
        match self {
            PriorityClass::Vip => None,
            PriorityClass::Elderly => Some(PriorityClass::Vip),
            PriorityClass::Appointment => Some(PriorityClass::Elderly),
            PriorityClass::Regular => Some(PriorityClass::Appointment),
        }
    }

    pub fn is_priority(self) -> bool {
        self != PriorityClass::Regular
    }
}

impl fmt::Display for PriorityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PriorityClass::Vip => "VIP",
            PriorityClass::Elderly => "ELDERLY",
            PriorityClass::Appointment => "APPOINTMENT",
            PriorityClass::Regular => "REGULAR",
        };
        f.write_str(label)
    }
}

/// Arrival probability per class. Whatever the listed classes leave over goes to REGULAR.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PriorityDistribution {
    pub vip: f64,
    pub elderly: f64,
    pub appointment: f64,
    pub regular: Option<f64>,
}

impl Default for PriorityDistribution {
    fn default() -> Self {
        Self {
            vip: 0.05,
            elderly: 0.15,
            appointment: 0.10,
            regular: None,
        }
    }
}

impl PriorityDistribution {
    pub fn explicit(&self) -> [(PriorityClass, f64); 3] {
        [
            (PriorityClass::Vip, self.vip),
            (PriorityClass::Elderly, self.elderly),
            (PriorityClass::Appointment, self.appointment),
        ]
    }

    pub fn total(&self) -> f64 {
        self.vip + self.elderly + self.appointment + self.regular.unwrap_or(0.0)
    }

    pub fn regular_share(&self) -> f64 {
        match self.regular {
            Some(value) => value,
            None => (1.0 - self.vip - self.elderly - self.appointment).max(0.0),
        }
    }

    /// Cumulative thresholds in class order; draws past the last one fall through to REGULAR.
    pub fn cumulative(&self) -> Vec<(PriorityClass, f64)> {
        let mut cumulative = 0.0;
        self.explicit()
            .iter()
            .chain(std::iter::once(&(PriorityClass::Regular, self.regular_share())))
            .map(|(class, probability)| {
                cumulative += probability;
                (*class, cumulative)
            })
            .collect()
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AssignmentPolicy {
    #[default]
    IdleLongest,
    PriorityBiased,
}

impl AssignmentPolicy {
    pub const ALL: [AssignmentPolicy; 2] =
        [AssignmentPolicy::IdleLongest, AssignmentPolicy::PriorityBiased];
}

impl fmt::Display for AssignmentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AssignmentPolicy::IdleLongest => "idle-longest",
            AssignmentPolicy::PriorityBiased => "priority-biased",
        };
        f.write_str(label)
    }
}

/// Promotes a waiting customer one class after `threshold` time units in its current class.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub struct PriorityAging {
    pub threshold: f64,
    #[serde(default)]
    pub patience_bonus: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Default)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ArrivalProfile {
    #[default]
    Random,
    Scripted { customers: Vec<ScriptedArrival> },
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ScriptedArrival {
    pub time: f64,
    #[serde(default)]
    pub priority: PriorityClass,
    pub service_time: f64,
    /// Omitted means the customer never abandons.
    #[serde(default)]
    pub patience: Option<f64>,
}
