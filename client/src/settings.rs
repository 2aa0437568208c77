use std::default::Default;
use std::env;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use oddsboard_game::model::{ParseVariantError, Variant};

pub fn load() -> Result<Settings, ConfigError> {
    let run_mode = env::var(RUN_MODE_ENV).unwrap_or_else(|_| "development".into());
    Config::builder()
        .add_source(File::with_name(DEFAULT_CFG_PATH))
        .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
        .add_source(File::with_name(LOCAL_CFG_PATH).required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?
        .try_deserialize()
}

const DEFAULT_CFG_PATH: &str = "config/default";
const LOCAL_CFG_PATH: &str = "config/local";
const RUN_MODE_ENV: &str = "ODDSBOARD_RUN_MODE";
const ENV_PREFIX: &str = "ODDSBOARD";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub logging: Logging,
    pub runtime: Runtime,
    pub service: Service,
    pub table: Table,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
}

impl Default for Logging {
    fn default() -> Self {
        Logging {
            level: "info".into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Runtime {
    pub threaded: bool,
    pub worker_threads: usize,
    pub thread_name: String,
}

impl Default for Runtime {
    fn default() -> Self {
        Runtime {
            threaded: false,
            worker_threads: num_cpus::get_physical(),
            thread_name: "oddsboard-worker".into(),
        }
    }
}

/// Where the odds service listens.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Service {
    pub addr: String,
}

impl Default for Service {
    fn default() -> Self {
        Service {
            addr: "127.0.0.1:7000".into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Table {
    /// A preset name, optionally with a seat count, e.g. `holdem:6`.
    pub variant: String,
}

impl Table {
    pub fn variant(&self) -> Result<Variant, ParseVariantError> {
        self.variant.parse()
    }
}

impl Default for Table {
    fn default() -> Self {
        Table {
            variant: Variant::default().to_string(),
        }
    }
}
