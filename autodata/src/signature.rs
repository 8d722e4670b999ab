//! Parameter lists of theories.

use std::any::{Any, TypeId};
use std::fmt;

use crate::error::DataError;
use crate::fixture::SpecimenContext;
use crate::specimen::Specimen;
use crate::value::{Datum, Row, Value};

type Factory = fn(&mut SpecimenContext<'_>) -> Result<Value, DataError>;

fn create_erased<T: Specimen + Datum>(ctx: &mut SpecimenContext<'_>) -> Result<Value, DataError> {
    ctx.create::<T>().map(Value::new)
}

/// The type of a single parameter
#[derive(Clone, Copy)]
pub struct ParameterType {
    id: TypeId,
    name: &'static str,
    factory: Option<Factory>,
}

impl ParameterType {
    /// Parameter type whose values can be created through [`Specimen`]
    pub fn of<T: Specimen + Datum>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            factory: Some(create_erased::<T>),
        }
    }

    /// Parameter type with no built-in way of creating values
    ///
    /// Values must come from literals or from a builder registered on the
    /// fixture.
    pub fn opaque<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            factory: None,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn factory(&self) -> Option<Factory> {
        self.factory
    }

    /// Whether `value` can be passed for this parameter
    pub fn accepts(&self, value: &Value) -> bool {
        value.type_id() == self.id
    }
}

impl fmt::Debug for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterType")
            .field("name", &self.name)
            .field("creatable", &self.factory.is_some())
            .finish()
    }
}

impl PartialEq for ParameterType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ParameterType {}

/// A declared parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub position: usize,
    pub name: Option<String>,
    pub ty: ParameterType,
}

/// Ordered parameter list of a theory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    parameters: Vec<Parameter>,
}

impl Signature {
    /// Signature of a parameter tuple
    pub fn of<P: Parameters>() -> Self {
        P::signature()
    }

    pub fn builder() -> SignatureBuilder {
        SignatureBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Parameter> {
        self.parameters.get(position)
    }

    pub fn as_slice(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.parameters.iter()
    }

    /// Check that a full row fits this signature
    pub fn check_row(&self, row: &[Value]) -> Result<(), DataError> {
        if row.len() != self.len() {
            return Err(DataError::parameter_count(self.len(), row.len()));
        }
        self.check_values(0, row)
    }

    /// Check that `values` fit the parameters starting at `start`
    pub fn check_values(&self, start: usize, values: &[Value]) -> Result<(), DataError> {
        let available = self.len().saturating_sub(start);
        if values.len() > available {
            return Err(DataError::parameter_count(self.len(), start + values.len()));
        }
        for (offset, value) in values.iter().enumerate() {
            let parameter = &self.parameters[start + offset];
            if !parameter.ty.accepts(value) {
                return Err(DataError::type_mismatch(
                    parameter.position,
                    parameter.ty.name(),
                    value.type_name(),
                ));
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Signature {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.iter()
    }
}

/// Builder for signatures that are not spelled as a tuple type
#[derive(Debug, Default)]
pub struct SignatureBuilder {
    parameters: Vec<Parameter>,
}

impl SignatureBuilder {
    pub fn param<T: Specimen + Datum>(self) -> Self {
        self.push(None, ParameterType::of::<T>())
    }

    pub fn named<T: Specimen + Datum>(self, name: impl Into<String>) -> Self {
        self.push(Some(name.into()), ParameterType::of::<T>())
    }

    pub fn opaque<T: Any>(self) -> Self {
        self.push(None, ParameterType::opaque::<T>())
    }

    pub fn parameter(self, name: Option<String>, ty: ParameterType) -> Self {
        self.push(name, ty)
    }

    fn push(mut self, name: Option<String>, ty: ParameterType) -> Self {
        let position = self.parameters.len();
        self.parameters.push(Parameter { position, name, ty });
        self
    }

    pub fn build(self) -> Signature {
        Signature {
            parameters: self.parameters,
        }
    }
}

/// Argument tuples a theory can be declared over
pub trait Parameters: Sized {
    /// Parameter list in declaration order
    fn signature() -> Signature;

    /// Convert a row into typed arguments
    fn from_row(row: Row) -> Result<Self, DataError>;
}

impl Parameters for () {
    fn signature() -> Signature {
        Signature::default()
    }

    fn from_row(row: Row) -> Result<Self, DataError> {
        if !row.is_empty() {
            return Err(DataError::parameter_count(0, row.len()));
        }
        Ok(())
    }
}

macro_rules! impl_parameters {
    ($count:expr; $($name:ident => $index:tt),+) => {
        impl<$($name),+> Parameters for ($($name,)+)
        where
            $($name: Specimen + Datum + Clone,)+
        {
            fn signature() -> Signature {
                Signature::builder()
                    $(.param::<$name>())+
                    .build()
            }

            fn from_row(row: Row) -> Result<Self, DataError> {
                if row.len() != $count {
                    return Err(DataError::parameter_count($count, row.len()));
                }
                let mut values = row.into_iter();
                Ok(($(
                    match values.next() {
                        Some(value) => value.into_inner::<$name>($index)?,
                        None => return Err(DataError::internal("row ended early")),
                    },
                )+))
            }
        }
    };
}

impl_parameters!(1; A => 0);
impl_parameters!(2; A => 0, B => 1);
impl_parameters!(3; A => 0, B => 1, C => 2);
impl_parameters!(4; A => 0, B => 1, C => 2, D => 3);
impl_parameters!(5; A => 0, B => 1, C => 2, D => 3, E => 4);
impl_parameters!(6; A => 0, B => 1, C => 2, D => 3, E => 4, F => 5);
impl_parameters!(7; A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6);
impl_parameters!(8; A => 0, B => 1, C => 2, D => 3, E => 4, F => 5, G => 6, H => 7);
