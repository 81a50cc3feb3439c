//! Identifiers for components, aliases and cached instances.
//!
//! An [`Identifier`] is a plain string: either a Rust type name produced by
//! [`Identifier::of`] or a logical key such as `"mailer"` or `"db.primary"`.
//! Comparison is exact and case-sensitive everywhere, alias lookup included.

use std::any::type_name;
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use sanduq_support::rendering::shorten_type_name;

/// Names a type or a logical binding slot in the container.
///
/// Cheap to clone: the string is shared.
///
/// # Examples
/// ```
/// use sanduq_container::identifier::Identifier;
///
/// let key = Identifier::of::<String>();
/// assert_eq!(key.as_str(), "alloc::string::String");
///
/// let logical = Identifier::from("mailer");
/// assert_eq!(logical, "mailer");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(Arc<str>);

impl Identifier {
    /// Creates an identifier from any string-like value.
    #[inline]
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Identifier for type `T`, taken from [`std::any::type_name`].
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self(Arc::from(type_name::<T>()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier with module paths stripped, for log output.
    pub fn short(&self) -> String {
        shorten_type_name(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Identifier {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl From<&String> for Identifier {
    fn from(id: &String) -> Self {
        Self::new(id)
    }
}

impl From<&Identifier> for Identifier {
    fn from(id: &Identifier) -> Self {
        id.clone()
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Identifier {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Identifier {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({:?})", &*self.0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
