use std::collections::HashMap;
use std::sync::Arc;

/// Stable per-session identity for a shared scene object.
///
/// Identities are dense, start at 1 and are never reused within one table.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Identity(u64);

impl Identity {
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle-allocation table: object reference → identity.
///
/// Keyed by the address of the shared allocation, not by content, so two
/// separately constructed objects with equal content get distinct identities
/// while clones of one handle share an identity.
///
/// The table keeps a clone of every observed `Arc`, which pins the allocation:
/// its address cannot be recycled for a different object while the table lives.
#[derive(Debug)]
pub struct IdentityTable<T> {
    entries: HashMap<usize, (Identity, Arc<T>)>,
    next: u64,
}

impl<T> Default for IdentityTable<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            next: 1,
        }
    }
}

impl<T> IdentityTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the identity of `object`, assigning a fresh one on first sight.
    pub fn identify(&mut self, object: &Arc<T>) -> Identity {
        let key = Arc::as_ptr(object) as *const () as usize;
        if let Some((id, _)) = self.entries.get(&key) {
            return *id;
        }
        let id = Identity(self.next);
        self.next += 1;
        self.entries.insert(key, (id, Arc::clone(object)));
        id
    }

    /// Returns the identity of `object` if it has been seen.
    pub fn lookup(&self, object: &Arc<T>) -> Option<Identity> {
        let key = Arc::as_ptr(object) as *const () as usize;
        self.entries.get(&key).map(|(id, _)| *id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
