use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

/// Surfaces created by this toolkit.
///
/// Pointer focus on any other surface (a decoration drawn by another
/// client, a sub-surface we do not own) is ignored.
#[derive(Debug)]
pub struct OwnedSurfaces<S> {
    owned: HashSet<S>,
}

impl<S> Default for OwnedSurfaces<S> {
    fn default() -> Self {
        Self {
            owned: HashSet::new(),
        }
    }
}

impl<S: Eq + Hash + Debug> OwnedSurfaces<S> {
    pub fn claim(&mut self, surface: S) {
        tracing::trace!(?surface, "Claimed surface");
        self.owned.insert(surface);
    }

    pub fn release(&mut self, surface: &S) -> bool {
        self.owned.remove(surface)
    }

    pub fn owns(&self, surface: &S) -> bool {
        self.owned.contains(surface)
    }

    pub fn is_empty(&self) -> bool {
        self.owned.is_empty()
    }
}
