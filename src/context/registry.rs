//! Per-element-type slot holding the active [`Builder`].
//!
//! Each `Scalar` implementation owns one `static` slot, so looking up the
//! builder for `T` never inspects `T` at runtime. The slot is filled lazily on
//! first access; [`RegistrySlot::replace`] swaps in a new builder for later
//! lookups without touching matrices that already exist.

use std::sync::{Arc, OnceLock, RwLock};

use crate::context::builder::Builder;
use crate::core::scalar::Scalar;

pub struct RegistrySlot<T> {
    cell: OnceLock<RwLock<Arc<Builder<T>>>>,
}

impl<T> RegistrySlot<T> {
    pub const fn new() -> Self {
        Self { cell: OnceLock::new() }
    }
}

impl<T: Scalar> RegistrySlot<T> {
    fn lock(&self) -> &RwLock<Arc<Builder<T>>> {
        self.cell.get_or_init(|| RwLock::new(Arc::new(Builder::new())))
    }

    /// The active builder.
    pub fn get(&self) -> Arc<Builder<T>> {
        match self.lock().read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Install `builder`, returning the one it replaces.
    pub fn replace(&self, builder: Builder<T>) -> Arc<Builder<T>> {
        let mut guard = match self.lock().write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, Arc::new(builder))
    }
}

impl<T> Default for RegistrySlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
