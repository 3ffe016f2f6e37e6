//! Type-erased values passed between the repository, composites and the
//! shrink search.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Anything a generator can produce: debuggable, comparable, shareable.
///
/// Implemented for every `T: Any + Debug + PartialEq + Send + Sync`.
pub trait Datum: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn eq_datum(&self, other: &dyn Datum) -> bool;

    fn type_name(&self) -> &'static str;
}

impl<T> Datum for T
where
    T: Any + fmt::Debug + PartialEq + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_datum(&self, other: &dyn Datum) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Immutable, cheaply clonable generated value
#[derive(Clone)]
pub struct Value(Arc<dyn Datum>);

impl Value {
    pub fn new<T: Datum>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn is<T: Any>(&self) -> bool {
        self.0.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Clone the inner value out if it has type `T`
    pub fn extract<T: Any + Clone>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }

    /// Rust type name of the runtime value
    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.eq_datum(&*other.0)
    }
}
