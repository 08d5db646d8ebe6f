// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Shared reference compared and hashed by pointer, for sets of parse tree
/// nodes where two structurally equal nodes at different places in the text
/// must stay distinct.
pub struct ByIdentity<T>(pub Arc<T>);

impl<T> ByIdentity<T> {
    pub fn new(value: &Arc<T>) -> Self {
        ByIdentity(Arc::clone(value))
    }

    pub fn get(&self) -> &Arc<T> {
        &self.0
    }
}

impl<T> Clone for ByIdentity<T> {
    fn clone(&self) -> Self {
        ByIdentity(Arc::clone(&self.0))
    }
}

impl<T> PartialEq for ByIdentity<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Eq for ByIdentity<T> {}

impl<T> Hash for ByIdentity<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state)
    }
}

impl<T: fmt::Debug> fmt::Debug for ByIdentity<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:p}", self.0, Arc::as_ptr(&self.0))
    }
}
