//! The specimen-building capability and the type-keyed builder registry.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::DataError;
use crate::fixture::SpecimenContext;
use crate::signature::ParameterType;
use crate::value::{Datum, Value};

/// Anything that can produce a value for a parameter type
///
/// This is the only capability [`AutoData`](crate::AutoData) relies on.
/// [`Fixture`](crate::Fixture) is the stock implementation; custom generation
/// behaviour is supplied by passing a different implementation.
pub trait SpecimenBuilder: Send + Sync {
    /// Produce a value assignable to `parameter`
    fn create(&self, parameter: &ParameterType) -> Result<Value, DataError>;

    /// Produce a value for a named parameter
    ///
    /// Builders that have no use for names fall back to [`create`](Self::create).
    fn create_named(&self, parameter: &ParameterType, _name: &str) -> Result<Value, DataError> {
        self.create(parameter)
    }
}

impl<B: SpecimenBuilder + ?Sized> SpecimenBuilder for Arc<B> {
    fn create(&self, parameter: &ParameterType) -> Result<Value, DataError> {
        (**self).create(parameter)
    }

    fn create_named(&self, parameter: &ParameterType, name: &str) -> Result<Value, DataError> {
        (**self).create_named(parameter, name)
    }
}

impl<B: SpecimenBuilder + ?Sized> SpecimenBuilder for Box<B> {
    fn create(&self, parameter: &ParameterType) -> Result<Value, DataError> {
        (**self).create(parameter)
    }

    fn create_named(&self, parameter: &ParameterType, name: &str) -> Result<Value, DataError> {
        (**self).create_named(parameter, name)
    }
}

/// Type-erased factory stored in a [`SpecimenRegistry`]
pub type ErasedFactory =
    Arc<dyn Fn(&mut SpecimenContext<'_>) -> Result<Value, DataError> + Send + Sync>;

/// Type-keyed registry of factories overriding the default creation of a type
#[derive(Clone, Default)]
pub struct SpecimenRegistry {
    factories: HashMap<TypeId, (&'static str, ErasedFactory)>,
}

impl SpecimenRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for a specific type, replacing any previous one
    pub fn register<T, F>(&mut self, factory: F)
    where
        T: Datum,
        F: Fn(&mut SpecimenContext<'_>) -> Result<T, DataError> + Send + Sync + 'static,
    {
        let erased: ErasedFactory =
            Arc::new(move |ctx: &mut SpecimenContext<'_>| factory(ctx).map(Value::new));
        self.factories
            .insert(TypeId::of::<T>(), (std::any::type_name::<T>(), erased));
    }

    /// Register a value handed out (cloned) for every request of its type
    pub fn inject<T: Datum + Clone>(&mut self, value: T) {
        self.register::<T, _>(move |_| Ok(value.clone()));
    }

    /// Get the factory for a type id
    pub fn get(&self, id: TypeId) -> Option<&ErasedFactory> {
        self.factories.get(&id).map(|(_, factory)| factory)
    }

    /// Check if a factory is registered for a specific type
    pub fn contains<T: 'static>(&self) -> bool {
        self.factories.contains_key(&TypeId::of::<T>())
    }

    /// Remove the factory for a specific type
    pub fn remove<T: 'static>(&mut self) -> bool {
        self.factories.remove(&TypeId::of::<T>()).is_some()
    }

    /// Names of the registered types, sorted
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.values().map(|(name, _)| *name).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for SpecimenRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecimenRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}
