//! Instances, explicit arguments and bound parameter lists.
//!
//! Callers hand the container an ordered list of [`Argument`]s. The binder
//! turns that list into [`Arguments`]: one slot per declared parameter, each
//! either filled with a positional argument, filled with an auto-wired
//! instance, or left empty when the positional arguments ran out.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ContainerError, Result};
use crate::identifier::Identifier;

/// A shared, type-erased instance owned by the container.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Wraps a value into an [`Instance`].
#[inline]
pub fn instance<T: Send + Sync + 'static>(value: T) -> Instance {
    Arc::new(value)
}

/// Downcasts an [`Instance`] to `Arc<T>`.
///
/// # Errors
/// [`ContainerError::TypeMismatch`] when the instance is not a `T`.
pub fn downcast<T: Send + Sync + 'static>(id: &Identifier, instance: Instance) -> Result<Arc<T>> {
    instance
        .downcast::<T>()
        .map_err(|_| ContainerError::TypeMismatch {
            id: id.clone(),
            expected: type_name::<T>(),
        })
}

/// A primitive explicit argument.
///
/// Deserializes from plain JSON-like data, so bindings can be declared in
/// configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// One explicit argument: a primitive value or a live instance.
#[derive(Clone)]
pub enum Argument {
    Value(Value),
    Instance(Instance),
}

impl Argument {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Argument::Value(v) => Some(v),
            Argument::Instance(_) => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Argument::Instance(i) => Some(i),
            Argument::Value(_) => None,
        }
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Value(v) => write!(f, "Value({v:?})"),
            Argument::Instance(_) => f.write_str("Instance(..)"),
        }
    }
}

impl From<Value> for Argument {
    fn from(v: Value) -> Self {
        Argument::Value(v)
    }
}

macro_rules! argument_from {
    ($($ty:ty),+) => {
        $(impl From<$ty> for Argument {
            fn from(v: $ty) -> Self {
                Argument::Value(v.into())
            }
        })+
    };
}

argument_from!(bool, i64, i32, u32, f64, &str, String);

/// Builds a `Vec<Argument>` from heterogeneous literals.
///
/// ```
/// use sanduq_container::args;
///
/// let list = args!["localhost", 5432, true];
/// assert_eq!(list.len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    () => { ::std::vec::Vec::<$crate::value::Argument>::new() };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::value::Argument::from($arg)),+]
    };
}

/// Parameters bound for one constructor, setter, method or function call.
///
/// Slot `i` belongs to declared parameter `i`. Empty slots are the
/// positional parameters for which no explicit argument was left.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    owner: Option<Identifier>,
    slots: Vec<Option<Argument>>,
}

impl Arguments {
    pub(crate) fn bound(owner: Option<Identifier>, slots: Vec<Option<Argument>>) -> Self {
        Self { owner, slots }
    }

    /// Wraps explicit arguments verbatim, one filled slot each.
    pub fn positional(args: Vec<Argument>) -> Self {
        Self {
            owner: None,
            slots: args.into_iter().map(Some).collect(),
        }
    }

    /// Number of slots (declared parameters, or explicit arguments for
    /// [`Arguments::positional`]).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots that were actually filled.
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn get(&self, index: usize) -> Option<&Argument> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn value(&self, index: usize) -> Option<&Value> {
        self.get(index).and_then(Argument::as_value)
    }

    pub fn str(&self, index: usize) -> Option<&str> {
        self.value(index).and_then(Value::as_str)
    }

    pub fn int(&self, index: usize) -> Option<i64> {
        self.value(index).and_then(Value::as_int)
    }

    pub fn float(&self, index: usize) -> Option<f64> {
        self.value(index).and_then(Value::as_float)
    }

    pub fn bool(&self, index: usize) -> Option<bool> {
        self.value(index).and_then(Value::as_bool)
    }

    /// Downcasts the instance in slot `index`.
    ///
    /// # Errors
    /// - [`ContainerError::MissingArgument`] when the slot is empty or holds a value
    /// - [`ContainerError::TypeMismatch`] when the instance is not a `T`
    pub fn instance<T: Send + Sync + 'static>(&self, index: usize) -> Result<Arc<T>> {
        let owner = self.owner.clone().unwrap_or_else(|| Identifier::from("<call>"));
        match self.get(index) {
            Some(Argument::Instance(i)) => downcast::<T>(&owner, i.clone()),
            _ => Err(ContainerError::MissingArgument { owner, index }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&Argument>> {
        self.slots.iter().map(Option::as_ref)
    }
}
