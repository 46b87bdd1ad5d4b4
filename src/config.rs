use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use thiserror::Error;

use crate::drift::{InvalidConfig, SimulationConfig};

// Runtime/server settings (not drift tuning; that lives in drift::config).

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:9001";
pub const DEFAULT_TICK: Duration = Duration::from_millis(16);
pub const DEFAULT_POINTER_IDLE: Duration = Duration::from_millis(3000);
pub const DEFAULT_ARENA: [f32; 2] = [800.0, 600.0];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key}={value:?} is not a valid value")]
    InvalidVar { key: &'static str, value: String },

    #[error("failed to read simulation config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse simulation config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid simulation config: {0}")]
    Invalid(#[from] InvalidConfig),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub tick_interval: Duration,
    /// Upper bound on a single frame's dt. `None` integrates whatever the
    /// clock measured.
    pub max_delta_time: Option<Duration>,
    pub sim_config_path: Option<PathBuf>,
    pub sprite_path: Option<PathBuf>,
    pub pointer_idle: Duration,
    pub arena: [f32; 2],
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` is the process-environment case.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = parse_var(&lookup, "DRIFT_BIND_ADDR")?
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 9001)));

        let tick_ms: u64 = parse_var(&lookup, "DRIFT_TICK_MS")?
            .unwrap_or(DEFAULT_TICK.as_millis() as u64);
        if tick_ms == 0 {
            return Err(ConfigError::InvalidVar {
                key: "DRIFT_TICK_MS",
                value: "0".into(),
            });
        }

        let max_delta_time = parse_var::<u64, _>(&lookup, "DRIFT_MAX_DT_MS")?
            .map(Duration::from_millis);

        let pointer_idle = parse_var(&lookup, "DRIFT_POINTER_IDLE_MS")?
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POINTER_IDLE);

        let arena = [
            parse_var(&lookup, "DRIFT_ARENA_W")?.unwrap_or(DEFAULT_ARENA[0]),
            parse_var(&lookup, "DRIFT_ARENA_H")?.unwrap_or(DEFAULT_ARENA[1]),
        ];
        for (key, v) in [("DRIFT_ARENA_W", arena[0]), ("DRIFT_ARENA_H", arena[1])] {
            if !(v.is_finite() && v > 0.0) {
                return Err(ConfigError::InvalidVar {
                    key,
                    value: v.to_string(),
                });
            }
        }

        Ok(Self {
            bind_addr,
            tick_interval: Duration::from_millis(tick_ms),
            max_delta_time,
            sim_config_path: non_empty(lookup("DRIFT_CONFIG")).map(PathBuf::from),
            sprite_path: non_empty(lookup("DRIFT_SPRITE_PATH")).map(PathBuf::from),
            pointer_idle,
            arena,
        })
    }

    /// Defaults, overridden by the JSON file at `DRIFT_CONFIG` when set.
    pub fn load_simulation_config(&self) -> Result<SimulationConfig, ConfigError> {
        let cfg = match &self.sim_config_path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                serde_json::from_str::<SimulationConfig>(&text).map_err(|source| {
                    ConfigError::Parse {
                        path: path.clone(),
                        source,
                    }
                })?
            }
            None => SimulationConfig::default(),
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match non_empty(lookup(key)) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidVar { key, value: raw }),
    }
}
