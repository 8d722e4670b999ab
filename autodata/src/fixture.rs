//! The default generation configuration.
//!
//! A [`Fixture`] resolves a requested type in this order:
//!
//! 1. a factory registered for the type (`inject`, `register`, `freeze`),
//! 2. the type's [`Specimen`] implementation,
//! 3. otherwise the request fails with [`DataError::NoSpecimenBuilder`].
//!
//! Customizations are applied while the fixture is being set up (`&mut self`).
//! Once handed to [`AutoData`](crate::AutoData) it is only ever used through
//! `&self`, so the same fixture can serve theories on several threads.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::builder::{SpecimenBuilder, SpecimenRegistry};
use crate::config::{FixtureConfig, NumberGeneration, RecursionPolicy, get_global_config};
use crate::customization::Customization;
use crate::error::{ConfigError, DataError};
use crate::signature::ParameterType;
use crate::specimen::Specimen;
use crate::value::{Datum, Value};

/// Creates anonymous test values, honouring a set of customizations
pub struct Fixture {
    config: FixtureConfig,
    registry: SpecimenRegistry,
    rng: Mutex<StdRng>,
    sequence: AtomicU64,
}

fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

impl Fixture {
    /// Create a fixture from the global defaults
    pub fn new() -> Self {
        Self::with_config(get_global_config().fixture_config())
    }

    /// Create a fixture with an explicit configuration
    pub fn with_config(config: FixtureConfig) -> Self {
        Self {
            rng: Mutex::new(rng_for(config.seed)),
            config,
            registry: SpecimenRegistry::new(),
            sequence: AtomicU64::new(0),
        }
    }

    /// Create a fixture, rejecting an invalid configuration
    pub fn try_with_config(config: FixtureConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    /// Create a fixture producing the same specimens on every run
    pub fn seeded(seed: u64) -> Self {
        Self::with_config(FixtureConfig {
            seed: Some(seed),
            ..get_global_config().fixture_config()
        })
    }

    pub fn config(&self) -> &FixtureConfig {
        &self.config
    }

    pub fn registry(&self) -> &SpecimenRegistry {
        &self.registry
    }

    /// Reseed the random source
    pub fn set_seed(&mut self, seed: u64) -> &mut Self {
        self.config.seed = Some(seed);
        self.rng = Mutex::new(rng_for(Some(seed)));
        self
    }

    pub fn set_number_generation(&mut self, mode: NumberGeneration) -> &mut Self {
        self.config.number_generation = mode;
        self
    }

    pub fn set_recursion_policy(&mut self, policy: RecursionPolicy) -> &mut Self {
        self.config.recursion_policy = policy;
        self
    }

    pub fn set_repeat_count(&mut self, count: usize) -> &mut Self {
        self.config.repeat_count = count;
        self
    }

    /// Apply a customization and return the fixture, for chained setup
    pub fn customize(mut self, customization: impl Customization) -> Self {
        customization.customize(&mut self);
        self
    }

    /// Apply a customization in place
    pub fn apply(&mut self, customization: &dyn Customization) -> &mut Self {
        customization.customize(self);
        self
    }

    /// Hand out a clone of `value` for every request of `T`
    pub fn inject<T: Datum + Clone>(&mut self, value: T) -> &mut Self {
        log::trace!("injecting {:?} for {}", value, std::any::type_name::<T>());
        self.registry.inject(value);
        self
    }

    /// Create every `T` with `factory`
    pub fn register<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Datum,
        F: Fn(&mut SpecimenContext<'_>) -> Result<T, DataError> + Send + Sync + 'static,
    {
        self.registry.register(factory);
        self
    }

    /// Create one `T`, inject it, and return it
    ///
    /// Every later request for `T` yields the same value.
    pub fn freeze<T: Specimen + Datum + Clone>(&mut self) -> Result<T, DataError> {
        let value: T = self.create()?;
        self.inject(value.clone());
        Ok(value)
    }

    /// Create an anonymous `T`
    pub fn create<T: Specimen>(&self) -> Result<T, DataError> {
        SpecimenContext::new(self).create()
    }

    /// Create an anonymous `T` for something called `name`
    pub fn create_named<T: Specimen>(&self, name: &str) -> Result<T, DataError> {
        SpecimenContext::new(self).create_named(name)
    }

    /// Create `repeat_count` anonymous values
    pub fn create_many<T: Specimen>(&self) -> Result<Vec<T>, DataError> {
        self.create_count(self.config.repeat_count)
    }

    /// Create exactly `count` anonymous values
    pub fn create_count<T: Specimen>(&self, count: usize) -> Result<Vec<T>, DataError> {
        let mut ctx = SpecimenContext::new(self);
        (0..count).map(|_| ctx.create()).collect()
    }

    /// Create a type-erased value for a parameter type
    pub fn create_value(&self, parameter: &ParameterType) -> Result<Value, DataError> {
        SpecimenContext::new(self).create_value(parameter)
    }

    fn resolve<T: Specimen>(&self, ctx: &mut SpecimenContext<'_>) -> Result<T, DataError> {
        match self.registry.get(std::any::TypeId::of::<T>()) {
            Some(factory) => {
                log::trace!("registered factory for {}", std::any::type_name::<T>());
                factory(ctx)?.into_unique::<T>()
            }
            None => T::create(ctx),
        }
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn with_rng<R>(&self, f: impl FnOnce(&mut StdRng) -> R) -> R {
        // A panic while holding the lock cannot leave the RNG in a bad state
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut *rng)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Fixture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fixture")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish()
    }
}

impl SpecimenBuilder for Fixture {
    fn create(&self, parameter: &ParameterType) -> Result<Value, DataError> {
        self.create_value(parameter)
    }

    fn create_named(&self, parameter: &ParameterType, name: &str) -> Result<Value, DataError> {
        let mut ctx = SpecimenContext::new(self);
        ctx.pending_name = Some(name.to_string());
        ctx.create_value(parameter)
    }
}

/// State of a single creation request, handed to [`Specimen::create`] and
/// registered factories
pub struct SpecimenContext<'a> {
    fixture: &'a Fixture,
    depth: usize,
    name: Option<String>,
    pending_name: Option<String>,
}

impl<'a> SpecimenContext<'a> {
    pub fn new(fixture: &'a Fixture) -> Self {
        Self {
            fixture,
            depth: 0,
            name: None,
            pending_name: None,
        }
    }

    pub fn fixture(&self) -> &'a Fixture {
        self.fixture
    }

    pub fn config(&self) -> &'a FixtureConfig {
        &self.fixture.config
    }

    /// Nesting depth of the value currently being created (1 for the root)
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Name of the field or parameter currently being created, if known
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether nested values should be left out because of the recursion limit
    pub fn should_omit(&self) -> bool {
        self.config().recursion_policy == RecursionPolicy::Omit
            && self.depth >= self.config().max_depth
    }

    /// Create a nested `T` through the fixture
    pub fn create<T: Specimen>(&mut self) -> Result<T, DataError> {
        let fixture = self.fixture;
        let type_name = std::any::type_name::<T>();
        let mut limit = self.config().max_depth;
        if self.should_omit() {
            if fixture.registry.contains::<T>() {
                // Registered values are served one level past the limit
                limit += 1;
            } else if let Some(omitted) = T::omitted() {
                self.pending_name = None;
                return Ok(omitted);
            }
        }
        self.enter_within(type_name, limit, |ctx| fixture.resolve::<T>(ctx))
    }

    /// Create a nested `T` for something called `name`
    pub fn create_named<T: Specimen>(&mut self, name: &str) -> Result<T, DataError> {
        self.pending_name = Some(name.to_string());
        self.create()
    }

    /// Create `repeat_count` nested values, or none at the recursion limit
    /// under [`RecursionPolicy::Omit`]
    pub fn create_many<T: Specimen>(&mut self) -> Result<Vec<T>, DataError> {
        if self.should_omit() {
            return Ok(Vec::new());
        }
        let items = (0..self.config().repeat_count)
            .map(|_| self.create())
            .collect();
        self.omit_on_limit(items, Vec::new)
    }

    /// Replace a recursion limit hit further down with `fallback` under
    /// [`RecursionPolicy::Omit`]
    ///
    /// Lets optional values and collections prune a branch that cannot be
    /// completed within `max_depth`.
    pub fn omit_on_limit<R>(
        &self,
        result: Result<R, DataError>,
        fallback: impl FnOnce() -> R,
    ) -> Result<R, DataError> {
        match result {
            Err(DataError::RecursionLimit { type_name, depth })
                if self.config().recursion_policy == RecursionPolicy::Omit =>
            {
                log::trace!("omitting branch cut at {} (depth {})", type_name, depth);
                Ok(fallback())
            }
            other => other,
        }
    }

    /// Create a type-erased value for a parameter type
    pub fn create_value(&mut self, parameter: &ParameterType) -> Result<Value, DataError> {
        log::debug!("creating specimen for {}", parameter.name());
        let fixture = self.fixture;
        if let Some(factory) = fixture.registry.get(parameter.id()) {
            return self.enter(parameter.name(), |ctx| factory(ctx));
        }
        match parameter.factory() {
            Some(factory) => factory(self),
            None => Err(DataError::NoSpecimenBuilder {
                type_name: parameter.name(),
            }),
        }
    }

    /// Next value of the fixture's sequence counter, starting at 1
    pub fn next_sequence(&mut self) -> u64 {
        self.fixture.next_sequence()
    }

    /// Run `f` with the fixture's random source
    pub fn with_rng<R>(&mut self, f: impl FnOnce(&mut StdRng) -> R) -> R {
        self.fixture.with_rng(f)
    }

    /// Random index below `len`
    pub fn choose_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.with_rng(|rng| rng.gen_range(0..len))
    }

    fn enter<R>(
        &mut self,
        type_name: &'static str,
        f: impl FnOnce(&mut Self) -> Result<R, DataError>,
    ) -> Result<R, DataError> {
        self.enter_within(type_name, self.config().max_depth, f)
    }

    /// Run `f` one level deeper, failing once the depth exceeds `limit`
    ///
    /// A pending name is consumed even when the limit is hit.
    fn enter_within<R>(
        &mut self,
        type_name: &'static str,
        limit: usize,
        f: impl FnOnce(&mut Self) -> Result<R, DataError>,
    ) -> Result<R, DataError> {
        let name = self.pending_name.take();
        let depth = self.depth + 1;
        if depth > limit {
            log::debug!("recursion limit reached at {} (depth {})", type_name, depth);
            return Err(DataError::RecursionLimit { type_name, depth });
        }
        let outer_depth = std::mem::replace(&mut self.depth, depth);
        let outer_name = std::mem::replace(&mut self.name, name);
        let result = f(self);
        self.depth = outer_depth;
        self.name = outer_name;
        result
    }
}
