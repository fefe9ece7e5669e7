//! Session-scoped record of enrolled identifiers.

use crate::Identifier;

/// Identifiers enrolled during the current session, in enrollment order.
///
/// Append-only: there is no removal operation. The set lives exactly as long
/// as the session that owns it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentSet {
    entries: Vec<Identifier>,
}

impl EnrollmentSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` (and leaves the set untouched) if `id` is already present.
    pub fn insert(&mut self, id: Identifier) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.entries.push(id);
        true
    }

    #[must_use]
    pub fn contains(&self, id: &Identifier) -> bool {
        self.entries.iter().any(|entry| entry == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Identifier> {
        self.entries.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Identifier] {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a EnrollmentSet {
    type Item = &'a Identifier;
    type IntoIter = std::slice::Iter<'a, Identifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
