use serde::Serialize;

use crate::ContentId;

/// Content ids the user picked as retrieval context for the next query.
///
/// Ids are unique. Insertion order is preserved for display, but nothing
/// depends on it except [`SourceSelectionSet::primary`], which the backend
/// uses as the only honored source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SourceSelectionSet {
    ids: Vec<ContentId>,
}

impl SourceSelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` if absent, remove it if present. Returns whether it is now selected.
    pub fn toggle(&mut self, id: ContentId) -> bool {
        if let Some(pos) = self.ids.iter().position(|existing| *existing == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id);
            true
        }
    }

    pub fn contains(&self, id: ContentId) -> bool {
        self.ids.contains(&id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn primary(&self) -> Option<ContentId> {
        self.ids.first().copied()
    }

    pub fn ids(&self) -> &[ContentId] {
        &self.ids
    }
}

impl FromIterator<ContentId> for SourceSelectionSet {
    fn from_iter<I: IntoIterator<Item = ContentId>>(iter: I) -> Self {
        let mut set = Self::new();
        for id in iter {
            if !set.contains(id) {
                set.ids.push(id);
            }
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_adds_then_removes() {
        let mut set = SourceSelectionSet::new();
        assert!(set.toggle(7));
        assert!(set.contains(7));
        assert!(!set.toggle(7));
        assert!(set.is_empty());
    }

    #[test]
    fn keeps_insertion_order_for_display() {
        let mut set = SourceSelectionSet::new();
        set.toggle(3);
        set.toggle(1);
        set.toggle(2);
        set.toggle(1);
        set.toggle(1);
        assert_eq!(set.ids(), &[3, 2, 1]);
        assert_eq!(set.primary(), Some(3));
    }

    #[test]
    fn collecting_drops_duplicates() {
        let set: SourceSelectionSet = [5, 5, 9, 5].into_iter().collect();
        assert_eq!(set.ids(), &[5, 9]);
        assert_eq!(set.len(), 2);
    }
}
