//! Reusable bundles of fixture setup.

use crate::config::{NumberGeneration, RecursionPolicy};
use crate::fixture::Fixture;
use crate::value::Datum;

/// A reusable piece of fixture setup
///
/// ```rust
/// use autodata::{Customization, Fixture};
///
/// struct TheAnswer;
///
/// impl Customization for TheAnswer {
///     fn customize(&self, fixture: &mut Fixture) {
///         fixture.inject(42i32);
///     }
/// }
///
/// let fixture = Fixture::new().customize(TheAnswer);
/// assert_eq!(fixture.create::<i32>().unwrap(), 42);
/// ```
pub trait Customization {
    fn customize(&self, fixture: &mut Fixture);
}

impl<F: Fn(&mut Fixture)> Customization for F {
    fn customize(&self, fixture: &mut Fixture) {
        self(fixture)
    }
}

/// Always hand out the same value for `T`
#[derive(Debug, Clone)]
pub struct Inject<T>(pub T);

impl<T: Datum + Clone> Customization for Inject<T> {
    fn customize(&self, fixture: &mut Fixture) {
        fixture.inject(self.0.clone());
    }
}

/// Reseed the fixture's random source
#[derive(Debug, Clone, Copy)]
pub struct Seeded(pub u64);

impl Customization for Seeded {
    fn customize(&self, fixture: &mut Fixture) {
        fixture.set_seed(self.0);
    }
}

/// Switch numbers to 1, 2, 3, ...
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialNumbers;

impl Customization for SequentialNumbers {
    fn customize(&self, fixture: &mut Fixture) {
        fixture.set_number_generation(NumberGeneration::Sequential);
    }
}

/// Cut recursive object graphs off at the depth limit instead of failing
#[derive(Debug, Clone, Copy, Default)]
pub struct OmitOnRecursion;

impl Customization for OmitOnRecursion {
    fn customize(&self, fixture: &mut Fixture) {
        fixture.set_recursion_policy(RecursionPolicy::Omit);
    }
}

/// Several customizations applied in order
#[derive(Default)]
pub struct CompositeCustomization {
    customizations: Vec<Box<dyn Customization + Send + Sync>>,
}

impl CompositeCustomization {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, customization: impl Customization + Send + Sync + 'static) -> Self {
        self.customizations.push(Box::new(customization));
        self
    }

    pub fn len(&self) -> usize {
        self.customizations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customizations.is_empty()
    }
}

impl Customization for CompositeCustomization {
    fn customize(&self, fixture: &mut Fixture) {
        for customization in &self.customizations {
            customization.customize(fixture);
        }
    }
}
