use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::AttributeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureEntry {
    pub team: AttributeSet,
    pub closure: AttributeSet,
}

/// Closures of every team submitted during a match, in submission order.
/// Entries are only ever appended.
#[derive(Debug, Clone, Default)]
pub struct ClosureRecord {
    entries: Vec<ClosureEntry>,
    index: HashMap<AttributeSet, usize>,
}

impl ClosureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` and leaves the record untouched if `team` is already present.
    pub fn record(&mut self, team: AttributeSet, closure: AttributeSet) -> bool {
        if self.index.contains_key(&team) {
            return false;
        }
        self.index.insert(team.clone(), self.entries.len());
        self.entries.push(ClosureEntry { team, closure });
        true
    }

    pub fn get(&self, team: &AttributeSet) -> Option<&AttributeSet> {
        self.index.get(team).map(|&idx| &self.entries[idx].closure)
    }

    pub fn contains(&self, team: &AttributeSet) -> bool {
        self.index.contains_key(team)
    }

    pub fn entries(&self) -> &[ClosureEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attribute_set::attrs;

    #[test]
    fn test_record_is_append_only() {
        let mut record = ClosureRecord::new();
        assert!(record.record(attrs("A"), attrs("ABC")));
        assert!(record.record(attrs("B"), attrs("B")));
        assert!(!record.record(attrs("A"), attrs("A")));

        assert_eq!(record.len(), 2);
        assert_eq!(record.get(&attrs("A")), Some(&attrs("ABC")));
        assert_eq!(record.entries()[1].team, attrs("B"));
        assert!(!record.contains(&attrs("C")));
    }
}
