//! Concurrency slot counts supplied by the process.

use serde::{Deserialize, Serialize};

/// Environment variable prefix read by [`PreallocationConfiguration::from_env`].
pub const ENV_PREFIX: &str = "GLOBAL_SCHEDULE_";

fn default_threads() -> u32 {
    u32::try_from(num_cpus::get()).unwrap_or(1).max(1)
}

const fn default_one() -> u32 {
    1
}

/// How many concurrent streams, runs, luminosity blocks and process blocks
/// the process will have in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreallocationConfiguration {
    /// Worker threads available to the outer engine.
    #[serde(default = "default_threads")]
    pub number_of_threads: u32,
    /// Event streams.
    #[serde(default = "default_one")]
    pub number_of_streams: u32,
    /// Concurrent luminosity blocks.
    #[serde(default = "default_one")]
    pub number_of_luminosity_blocks: u32,
    /// Concurrent runs.
    #[serde(default = "default_one")]
    pub number_of_runs: u32,
    /// Concurrent process blocks.
    #[serde(default = "default_one")]
    pub number_of_process_blocks: u32,
}

impl Default for PreallocationConfiguration {
    fn default() -> Self {
        Self {
            number_of_threads: default_threads(),
            number_of_streams: 1,
            number_of_luminosity_blocks: 1,
            number_of_runs: 1,
            number_of_process_blocks: 1,
        }
    }
}

impl PreallocationConfiguration {
    /// Configuration with explicit lumi and run slot counts.
    pub fn new(number_of_luminosity_blocks: u32, number_of_runs: u32) -> Self {
        Self {
            number_of_luminosity_blocks,
            number_of_runs,
            ..Self::default()
        }
    }

    /// Set the process-block slot count.
    #[must_use]
    pub const fn with_process_blocks(mut self, n: u32) -> Self {
        self.number_of_process_blocks = n;
        self
    }

    /// Set the stream count.
    #[must_use]
    pub const fn with_streams(mut self, n: u32) -> Self {
        self.number_of_streams = n;
        self
    }

    /// Validate slot counts.
    pub fn validate(&self) -> Result<(), String> {
        if self.number_of_threads == 0 {
            return Err("number_of_threads must be greater than 0".into());
        }
        if self.number_of_streams == 0 {
            return Err("number_of_streams must be greater than 0".into());
        }
        if self.number_of_luminosity_blocks == 0 {
            return Err("number_of_luminosity_blocks must be greater than 0".into());
        }
        if self.number_of_runs == 0 {
            return Err("number_of_runs must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build from `GLOBAL_SCHEDULE_*` environment variables, loading a
    /// `.env` file first if one exists. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup using the `from_env` variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str, default: u32| -> Result<u32, String> {
            let key = format!("{ENV_PREFIX}{name}");
            lookup(&key).map_or(Ok(default), |raw| {
                raw.trim()
                    .parse::<u32>()
                    .map_err(|e| format!("{key}: {e}"))
            })
        };
        let defaults = Self::default();
        let cfg = Self {
            number_of_threads: read("THREADS", defaults.number_of_threads)?,
            number_of_streams: read("STREAMS", defaults.number_of_streams)?,
            number_of_luminosity_blocks: read("CONCURRENT_LUMIS", defaults.number_of_luminosity_blocks)?,
            number_of_runs: read("CONCURRENT_RUNS", defaults.number_of_runs)?,
            number_of_process_blocks: read("CONCURRENT_PROCESS_BLOCKS", defaults.number_of_process_blocks)?,
        };
        cfg.validate()?;
        Ok(cfg)
    }
}
