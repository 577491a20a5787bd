use crate::ids::SessionId;
use std::collections::BTreeSet;

/// Session ids the operator has selected in the results table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<SessionId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the id was already selected
    pub fn select(&mut self, id: SessionId) -> bool {
        self.ids.insert(id)
    }

    /// Returns false if the id was not selected
    pub fn deselect(&mut self, id: &SessionId) -> bool {
        self.ids.remove(id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SessionId> {
        self.ids.iter()
    }
}

impl FromIterator<SessionId> for SelectionSet {
    fn from_iter<T: IntoIterator<Item = SessionId>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

impl Extend<SessionId> for SelectionSet {
    fn extend<T: IntoIterator<Item = SessionId>>(&mut self, iter: T) {
        self.ids.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_and_deselect() {
        let mut sel = SelectionSet::new();
        assert!(sel.select(SessionId::from("a")));
        assert!(!sel.select(SessionId::from("a")));
        assert_eq!(sel.len(), 1);
        assert!(sel.deselect(&SessionId::from("a")));
        assert!(!sel.deselect(&SessionId::from("a")));
        assert!(sel.is_empty());
    }

    #[test]
    fn iteration_order_is_stable() {
        let sel: SelectionSet = ["c", "a", "b"].into_iter().map(SessionId::from).collect();
        let ids: Vec<_> = sel.iter().map(SessionId::as_str).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
