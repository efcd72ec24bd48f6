use crate::core::config::data::Config;
use crate::core::config::io::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

#[derive(Default)]
pub(crate) struct ConfigCacheState {
    config: Option<Config>,
    modified: Option<SystemTime>,
}

/// Caches the parsed config and reloads it when the file's mtime changes.
pub(crate) struct ConfigOrchestrator {
    path: PathBuf,
    state: Mutex<ConfigCacheState>,
}

static CONFIG_ORCHESTRATOR: LazyLock<Option<ConfigOrchestrator>> =
    LazyLock::new(|| Config::config_path().ok().map(ConfigOrchestrator::new));

#[cfg(test)]
pub(crate) static TEST_ORCHESTRATOR: LazyLock<Mutex<Option<ConfigOrchestrator>>> =
    LazyLock::new(|| Mutex::new(None));

impl ConfigOrchestrator {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self {
            path,
            state: Mutex::new(ConfigCacheState::default()),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, ConfigCacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn refresh(&self, state: &mut ConfigCacheState) -> Result<Config, ConfigError> {
        let disk_modified = modified_time(&self.path);
        if state.config.is_none() || state.modified != disk_modified {
            state.config = Some(Config::load_from_path(&self.path)?);
            state.modified = disk_modified;
        }
        Ok(state.config.clone().unwrap_or_default())
    }

    pub(crate) fn load_with_cache(&self) -> Result<Config, ConfigError> {
        let mut state = self.lock();
        self.refresh(&mut state)
    }

    pub(crate) fn persist(&self, config: Config) -> Result<(), ConfigError> {
        config.save_to_path(&self.path)?;
        let mut state = self.lock();
        state.modified = modified_time(&self.path);
        state.config = Some(config);
        Ok(())
    }

    /// Loads the freshest config, applies `mutator`, and saves the result.
    /// Nothing is written when the mutator fails.
    pub(crate) fn mutate<F, T>(&self, mutator: F) -> Result<T, Box<dyn std::error::Error>>
    where
        F: FnOnce(&mut Config) -> Result<T, Box<dyn std::error::Error>>,
    {
        let mut working = {
            let mut state = self.lock();
            self.refresh(&mut state)?
        };
        let result = mutator(&mut working)?;
        self.persist(working)?;
        Ok(result)
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).ok()?.modified().ok()
}

fn with_orchestrator<T>(
    action: impl FnOnce(&ConfigOrchestrator) -> Result<T, Box<dyn std::error::Error>>,
) -> Result<T, Box<dyn std::error::Error>> {
    #[cfg(test)]
    {
        let guard = TEST_ORCHESTRATOR
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(orchestrator) = guard.as_ref() {
            return action(orchestrator);
        }
    }
    match CONFIG_ORCHESTRATOR.as_ref() {
        Some(orchestrator) => action(orchestrator),
        None => Err(Box::new(ConfigError::NoConfigDir)),
    }
}

impl Config {
    pub fn load() -> Result<Config, Box<dyn std::error::Error>> {
        with_orchestrator(|orchestrator| Ok(orchestrator.load_with_cache()?))
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        with_orchestrator(|orchestrator| Ok(orchestrator.persist(self.clone())?))
    }

    pub fn mutate<F, T>(mutator: F) -> Result<T, Box<dyn std::error::Error>>
    where
        F: FnOnce(&mut Config) -> Result<T, Box<dyn std::error::Error>>,
    {
        with_orchestrator(|orchestrator| orchestrator.mutate(mutator))
    }

    /// Path of the file [`Config::load`] reads, for display.
    pub fn active_path() -> Option<PathBuf> {
        with_orchestrator(|orchestrator| Ok(orchestrator.path().to_path_buf())).ok()
    }

    #[cfg(test)]
    pub(crate) fn set_test_config_path(path: PathBuf) {
        let mut guard = TEST_ORCHESTRATOR
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Some(ConfigOrchestrator::new(path));
    }

    #[cfg(test)]
    pub(crate) fn clear_test_config_override() {
        let mut guard = TEST_ORCHESTRATOR
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        guard.take();
    }
}
