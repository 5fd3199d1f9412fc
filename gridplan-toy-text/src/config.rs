//! Configuration of [`ToyTextEnv`](crate::ToyTextEnv).
use anyhow::Result;
use gridplan_core::error::GridplanError;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Names accepted by [`ToyTextEnvConfig::registered()`] and [`make()`](crate::make).
pub const REGISTERED_ENVS: [&str; 3] = ["CliffWalking-v0", "FrozenLake-v1", "FrozenLake8x8-v1"];

/// Configuration of [`ToyTextEnv`](crate::ToyTextEnv).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ToyTextEnvConfig {
    /// Name of the environment, one of [`REGISTERED_ENVS`].
    pub name: String,

    /// Predefined FrozenLake map, `"4x4"` or `"8x8"`.
    pub map_name: String,

    /// Custom FrozenLake map, one string per row. Overrides `map_name`.
    pub desc: Option<Vec<String>>,

    /// If `true`, FrozenLake moves are slippery.
    pub is_slippery: bool,

    /// The episode is truncated after this number of steps.
    pub max_episode_steps: Option<usize>,
}

impl Default for ToyTextEnvConfig {
    fn default() -> Self {
        Self {
            name: "CliffWalking-v0".to_string(),
            map_name: "4x4".to_string(),
            desc: None,
            is_slippery: true,
            max_episode_steps: None,
        }
    }
}

impl ToyTextEnvConfig {
    /// Returns the configuration registered with the given name.
    ///
    /// The episode length limits follow the usual registrations: none for
    /// CliffWalking, 100 steps for the 4x4 lake, 200 steps for the 8x8 lake.
    pub fn registered(name: &str) -> Result<Self, GridplanError> {
        let config = Self::default().name(name);
        match name {
            "CliffWalking-v0" => Ok(config),
            "FrozenLake-v1" => Ok(config.max_episode_steps(Some(100))),
            "FrozenLake8x8-v1" => Ok(config.map_name("8x8").max_episode_steps(Some(200))),
            _ => Err(GridplanError::UnknownEnv(name.to_string())),
        }
    }

    /// Sets the name of the environment.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the predefined map.
    pub fn map_name(mut self, map_name: impl Into<String>) -> Self {
        self.map_name = map_name.into();
        self
    }

    /// Sets a custom map.
    pub fn desc(mut self, desc: Vec<String>) -> Self {
        self.desc = Some(desc);
        self
    }

    /// Sets the slippery flag.
    pub fn is_slippery(mut self, v: bool) -> Self {
        self.is_slippery = v;
        self
    }

    /// Sets the maximum length of an episode.
    pub fn max_episode_steps(mut self, v: Option<usize>) -> Self {
        self.max_episode_steps = v;
        self
    }

    /// Constructs [`ToyTextEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ToyTextEnvConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_registered() {
        let config = ToyTextEnvConfig::registered("FrozenLake8x8-v1").unwrap();
        assert_eq!(config.map_name, "8x8");
        assert_eq!(config.max_episode_steps, Some(200));
        assert_eq!(
            ToyTextEnvConfig::registered("Taxi-v3"),
            Err(GridplanError::UnknownEnv("Taxi-v3".to_string()))
        );
    }

    #[test]
    fn test_serde_config() -> Result<()> {
        let config = ToyTextEnvConfig::registered("FrozenLake-v1")?
            .is_slippery(false)
            .desc(vec!["SF".to_string(), "HG".to_string()]);

        let dir = TempDir::new("toy_text_env_config")?;
        let path = dir.path().join("env.yaml");
        config.save(&path)?;
        let config_ = ToyTextEnvConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }
}
