//! Simulation configuration.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while reading the configuration or resolving algorithms from it.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can't read file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("can't parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),
    #[error("invalid value of option {option}: {value}")]
    InvalidOption { option: String, value: String },
    #[error("missing option: {0}")]
    MissingOption(String),
}

/// Holds raw simulation config parsed from YAML file.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
struct RawSimulationConfig {
    pub seed: Option<u64>,
    pub message_delay: Option<f64>,
    pub max_recovery_rounds: Option<u32>,
    pub binding_algorithm: Option<String>,
    pub datacenters: Option<Vec<DatacenterConfig>>,
    pub vms: Option<Vec<VmConfig>>,
    pub jobs: Option<Vec<JobConfig>>,
}

/// Represents physical host(s) configuration.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct HostConfig {
    /// Host name. Should be set if count = 1
    pub name: Option<String>,
    /// Host name prefix. Full name is produced by appending instance number to the prefix.
    /// Should be set if count > 1
    pub name_prefix: Option<String>,
    /// Number of processing elements
    pub pes: u32,
    /// Capacity of each processing element
    pub mips: f64,
    /// Number of such hosts
    pub count: Option<u32>,
}

/// Represents datacenter configuration.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct DatacenterConfig {
    pub name: String,
    /// VM placement algorithm used by this datacenter
    pub placement_algorithm: Option<String>,
    pub hosts: Vec<HostConfig>,
}

/// Represents requested VM(s) configuration.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct VmConfig {
    pub pes: u32,
    pub mips: f64,
    /// Number of such VMs
    pub count: Option<u32>,
}

/// Represents submitted job(s) configuration.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct JobConfig {
    pub length: u64,
    pub pes: Option<u32>,
    /// Number of such jobs
    pub count: Option<u32>,
    /// VM the jobs are pinned to
    pub vm: Option<u32>,
}

/// Represents simulation configuration.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Seed of the kernel and binding random generators
    pub seed: u64,
    /// Delay applied by datacenters to their replies
    pub message_delay: f64,
    /// How many times the broker may re-provision VMs for postponed jobs before giving up
    pub max_recovery_rounds: u32,
    /// Job binding algorithm used by the broker
    pub binding_algorithm: String,
    pub datacenters: Vec<DatacenterConfig>,
    pub vms: Vec<VmConfig>,
    pub jobs: Vec<JobConfig>,
}

impl SimulationConfig {
    /// Creates simulation config with default parameter values.
    pub fn new() -> Self {
        Self {
            seed: 123,
            message_delay: 0.,
            max_recovery_rounds: 5,
            binding_algorithm: "RoundRobin".to_string(),
            datacenters: Vec::new(),
            vms: Vec::new(),
            jobs: Vec::new(),
        }
    }

    /// Creates simulation config by reading parameter values from .yaml file (uses default values if some parameters are absent).
    pub fn from_file(file_name: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(file_name).map_err(|source| ConfigError::Io {
            path: file_name.to_string(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    /// Creates simulation config from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let data: RawSimulationConfig = serde_yaml::from_str(yaml)?;
        let default = Self::new();
        Ok(Self {
            seed: data.seed.unwrap_or(default.seed),
            message_delay: data.message_delay.unwrap_or(default.message_delay),
            max_recovery_rounds: data.max_recovery_rounds.unwrap_or(default.max_recovery_rounds),
            binding_algorithm: data.binding_algorithm.unwrap_or(default.binding_algorithm),
            datacenters: data.datacenters.unwrap_or_default(),
            vms: data.vms.unwrap_or_default(),
            jobs: data.jobs.unwrap_or_default(),
        })
    }

    /// Returns total hosts count over all datacenters.
    pub fn number_of_hosts(&self) -> u32 {
        self.datacenters
            .iter()
            .flat_map(|dc| dc.hosts.iter())
            .map(|host| host.count.unwrap_or(1))
            .sum()
    }

    /// Returns total count of requested VMs.
    pub fn number_of_vms(&self) -> u32 {
        self.vms.iter().map(|vm| vm.count.unwrap_or(1)).sum()
    }

    /// Returns total count of submitted jobs.
    pub fn number_of_jobs(&self) -> u32 {
        self.jobs.iter().map(|job| job.count.unwrap_or(1)).sum()
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses config value string, which consists of two parts - name and options.
///
/// Example: `CostMinimizingClustered[min=1,max=50]` parts are name `CostMinimizingClustered`
/// and options string `min=1,max=50`.
pub fn parse_config_value(config_str: &str) -> (String, Option<String>) {
    match config_str.split_once('[') {
        Some((l, r)) => (l.trim().to_string(), Some(r.replace(']', ""))),
        None => (config_str.trim().to_string(), None),
    }
}

/// Parses options string from config value, returns map with option names and values.
pub fn parse_options(options_str: &str) -> HashMap<String, String> {
    let mut options = HashMap::new();
    for option_str in options_str.split(',') {
        if let Some((name, value)) = option_str.split_once('=') {
            options.insert(name.trim().to_string(), value.trim().to_string());
        }
    }
    options
}

/// Returns the parsed value of the option or the default value if the option is absent.
pub fn option_or<T: FromStr>(options: &HashMap<String, String>, name: &str, default: T) -> Result<T, ConfigError> {
    match options.get(name) {
        None => Ok(default),
        Some(value) => value.parse::<T>().map_err(|_| ConfigError::InvalidOption {
            option: name.to_string(),
            value: value.clone(),
        }),
    }
}

/// Returns the parsed value of the required option.
pub fn required_option<T: FromStr>(options: &HashMap<String, String>, name: &str) -> Result<T, ConfigError> {
    match options.get(name) {
        None => Err(ConfigError::MissingOption(name.to_string())),
        Some(value) => value.parse::<T>().map_err(|_| ConfigError::InvalidOption {
            option: name.to_string(),
            value: value.clone(),
        }),
    }
}
