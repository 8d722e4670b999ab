//! Type-erased values flowing from data sources into theory arguments.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::error::DataError;

/// Anything that can travel through a data row
///
/// Blanket-implemented; it only exists to keep bounds short.
pub trait Datum: Any + Send + Sync + fmt::Debug {}

impl<T: Any + Send + Sync + fmt::Debug> Datum for T {}

/// A single argument value with its concrete type erased
///
/// Cloning shares the underlying datum.
#[derive(Clone)]
pub struct Value {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    render: fn(&(dyn Any + Send + Sync), &mut fmt::Formatter<'_>) -> fmt::Result,
}

fn render_as<T: Datum>(value: &(dyn Any + Send + Sync), f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value.downcast_ref::<T>() {
        Some(value) => fmt::Debug::fmt(value, f),
        None => f.write_str("<?>"),
    }
}

impl Value {
    /// Wrap a value
    pub fn new<T: Datum>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            type_name: std::any::type_name::<T>(),
            render: render_as::<T>,
        }
    }

    /// `TypeId` of the wrapped value
    pub fn type_id(&self) -> TypeId {
        (*self.inner).type_id()
    }

    /// Name of the wrapped value's type
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the wrapped value is a `T`
    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Borrow the wrapped value as a `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Whether two values share the same datum
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Extract the value as a `T`, cloning only when the datum is shared
    pub fn into_inner<T: Datum + Clone>(self, position: usize) -> Result<T, DataError> {
        let actual = self.type_name;
        let typed = self
            .inner
            .downcast::<T>()
            .map_err(|_| DataError::type_mismatch(position, std::any::type_name::<T>(), actual))?;
        Ok(Arc::try_unwrap(typed).unwrap_or_else(|shared| (*shared).clone()))
    }

    /// Extract the value as a `T` without cloning
    ///
    /// Only succeeds when this `Value` holds the last reference to its datum,
    /// which is the case for freshly created specimens.
    pub(crate) fn into_unique<T: Any + Send + Sync>(self) -> Result<T, DataError> {
        let type_name = self.type_name;
        let typed = self.inner.downcast::<T>().map_err(|_| {
            DataError::internal(format!(
                "specimen of type {} requested as {}",
                type_name,
                std::any::type_name::<T>()
            ))
        })?;
        Arc::try_unwrap(typed).map_err(|_| {
            DataError::internal(format!("specimen of type {} is shared", type_name))
        })
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self.render)(&*self.inner, f)
    }
}

/// One set of arguments for a single theory invocation
pub type Row = Vec<Value>;

/// Render a row the way it shows up in theory reports
pub fn format_row(row: &[Value]) -> String {
    let rendered: Vec<String> = row.iter().map(|value| format!("{:?}", value)).collect();
    format!("({})", rendered.join(", "))
}
