//! Per-session generation status threaded through one generation call tree.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

/// Typed key into the status side channel.
///
/// Two keys address the same slot only if both name and value type match.
pub struct Key<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Key<T> {}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key<{}>({})", std::any::type_name::<T>(), self.name)
    }
}

/// Size, attempt count and side-channel values for one parameter's session.
///
/// The driving context updates `size` before every draw and bumps `attempts`
/// once per draw, discarded or not; generators only read them.
#[derive(Default)]
pub struct GenerationStatus {
    size: usize,
    attempts: usize,
    values: HashMap<(&'static str, std::any::TypeId), Box<dyn Any + Send>>,
}

impl GenerationStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status with a fixed size, for driving a generator outside a session
    pub fn with_size(size: usize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn set_size(&mut self, size: usize) {
        self.size = size;
    }

    /// Record one draw attempt and return the new total
    pub fn record_attempt(&mut self) -> usize {
        self.attempts += 1;
        self.attempts
    }

    /// Store a value for later generators in the same session
    pub fn set_value<T: Any + Send>(&mut self, key: Key<T>, value: T) -> &mut Self {
        self.values
            .insert((key.name, std::any::TypeId::of::<T>()), Box::new(value));
        self
    }

    pub fn value_of<T: Any + Send>(&self, key: Key<T>) -> Option<&T> {
        self.values
            .get(&(key.name, std::any::TypeId::of::<T>()))
            .and_then(|value| value.downcast_ref::<T>())
    }

    pub fn remove_value<T: Any + Send>(&mut self, key: Key<T>) -> Option<T> {
        self.values
            .remove(&(key.name, std::any::TypeId::of::<T>()))
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
    }
}

impl fmt::Debug for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationStatus")
            .field("size", &self.size)
            .field("attempts", &self.attempts)
            .field("values", &self.values.len())
            .finish()
    }
}
