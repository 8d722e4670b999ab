//! Configuration types for specimen generation and theory execution.

use crate::error::ConfigError;

/// How numeric specimens are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberGeneration {
    /// Small positive values drawn from the fixture's RNG
    #[default]
    Random,
    /// 1, 2, 3, ... from a counter shared by every numeric type
    Sequential,
}

/// What happens when an object graph nests deeper than `max_depth`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecursionPolicy {
    /// Fail with `DataError::RecursionLimit`
    #[default]
    Throw,
    /// Stop at the limit: `Option` becomes `None`, collections come back empty
    Omit,
}

/// Configuration for a [`Fixture`](crate::Fixture)
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureConfig {
    /// Optional seed for reproducible specimens
    pub seed: Option<u64>,
    /// Numeric generation mode
    pub number_generation: NumberGeneration,
    /// Number of elements in generated collections
    pub repeat_count: usize,
    /// Maximum nesting depth for generated object graphs
    pub max_depth: usize,
    /// Behaviour when `max_depth` is exceeded
    pub recursion_policy: RecursionPolicy,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            seed: None,
            number_generation: NumberGeneration::Random,
            repeat_count: 3,
            max_depth: 16,
            recursion_policy: RecursionPolicy::Throw,
        }
    }
}

impl FixtureConfig {
    /// Create a new fixture configuration with validation
    pub fn new(
        seed: Option<u64>,
        number_generation: NumberGeneration,
        repeat_count: usize,
        max_depth: usize,
        recursion_policy: RecursionPolicy,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            seed,
            number_generation,
            repeat_count,
            max_depth,
            recursion_policy,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the fixture configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidMaxDepth(self.max_depth));
        }
        Ok(())
    }

    /// Fill unset fields from the global defaults
    pub fn merge_with_global(self, global: &GlobalConfig) -> Self {
        Self {
            seed: self.seed.or(global.default_seed),
            ..self
        }
    }
}

/// Configuration for a [`TheoryRunner`](crate::TheoryRunner)
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    /// Run registered theories on worker threads
    pub parallel: bool,
    /// Number of worker threads when running in parallel
    pub workers: usize,
    /// Print per-theory progress lines
    pub verbose: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            workers: num_cpus::get(),
            verbose: false,
        }
    }
}

impl RunnerConfig {
    /// Create a new runner configuration with validation
    pub fn new(parallel: bool, workers: usize, verbose: bool) -> Result<Self, ConfigError> {
        let config = Self {
            parallel,
            workers,
            verbose,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the runner configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidWorkers(self.workers));
        }
        Ok(())
    }
}

/// Process defaults picked up by fixtures and runners that are created
/// without explicit configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalConfig {
    /// Seed used by fixtures that do not set their own
    pub default_seed: Option<u64>,
    /// Default fixture configuration
    pub fixture_config: FixtureConfig,
    /// Default runner configuration
    pub runner_config: RunnerConfig,
}

impl GlobalConfig {
    /// Validate the global configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fixture_config.validate()?;
        self.runner_config.validate()?;
        Ok(())
    }

    /// Fixture configuration inheriting the global seed
    pub fn fixture_config(&self) -> FixtureConfig {
        self.fixture_config.clone().merge_with_global(self)
    }
}

// Thread-local so parallel `cargo test` threads do not observe each other's overrides
thread_local! {
    static GLOBAL_CONFIG: std::cell::RefCell<GlobalConfig> = std::cell::RefCell::new(GlobalConfig::default());
}

/// Get the current global configuration
pub fn get_global_config() -> GlobalConfig {
    GLOBAL_CONFIG.with(|config| config.borrow().clone())
}

/// Set the global configuration
pub fn set_global_config(config: GlobalConfig) -> Result<(), ConfigError> {
    config.validate()?;
    GLOBAL_CONFIG.with(|current| *current.borrow_mut() = config);
    Ok(())
}

/// Reset the global configuration to its defaults
pub fn reset_global_config() {
    GLOBAL_CONFIG.with(|current| *current.borrow_mut() = GlobalConfig::default());
}
