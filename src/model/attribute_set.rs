use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Attribute;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseAttributeError {
    #[error("'{0}' is not an attribute letter")]
    InvalidCharacter(char),
}

/// A set of attributes. Iteration, `Display` and serialization are always in
/// alphabetical order, so the rendered form doubles as a lookup key ("ABC").
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct AttributeSet(BTreeSet<Attribute>);

impl AttributeSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// The first `n` letters of the alphabet, capped at `MAX_ATTRIBUTES`.
    pub fn universe(n: usize) -> Self {
        (0..n).filter_map(Attribute::from_index).collect()
    }

    pub fn single(attribute: Attribute) -> Self {
        Self(BTreeSet::from([attribute]))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, attribute: &Attribute) -> bool {
        self.0.contains(attribute)
    }

    pub fn insert(&mut self, attribute: Attribute) -> bool {
        self.0.insert(attribute)
    }

    pub fn remove(&mut self, attribute: &Attribute) -> bool {
        self.0.remove(attribute)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> + '_ {
        self.0.iter()
    }

    pub fn is_subset(&self, other: &AttributeSet) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn is_superset(&self, other: &AttributeSet) -> bool {
        self.0.is_superset(&other.0)
    }

    pub fn is_proper_subset(&self, other: &AttributeSet) -> bool {
        self.len() < other.len() && self.is_subset(other)
    }

    /// Neither set contains the other.
    pub fn is_incomparable(&self, other: &AttributeSet) -> bool {
        !self.is_subset(other) && !other.is_subset(self)
    }

    pub fn is_disjoint(&self, other: &AttributeSet) -> bool {
        self.0.is_disjoint(&other.0)
    }

    pub fn union(&self, other: &AttributeSet) -> AttributeSet {
        self.0.union(&other.0).copied().collect()
    }

    pub fn difference(&self, other: &AttributeSet) -> AttributeSet {
        self.0.difference(&other.0).copied().collect()
    }

    /// Returns `true` if anything was added.
    pub fn extend_from(&mut self, other: &AttributeSet) -> bool {
        let before = self.len();
        self.0.extend(other.0.iter().copied());
        self.len() != before
    }

    pub fn without(&self, attribute: &Attribute) -> AttributeSet {
        let mut set = self.clone();
        set.remove(attribute);
        set
    }

    pub fn to_vec(&self) -> Vec<Attribute> {
        self.0.iter().copied().collect()
    }
}

impl FromIterator<Attribute> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a AttributeSet {
    type Item = &'a Attribute;
    type IntoIter = std::collections::btree_set::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromStr for AttributeSet {
    type Err = ParseAttributeError;

    /// Parses "ABC", "a b c" or "A,B,C". Duplicates collapse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .filter(|c| !c.is_whitespace() && *c != ',')
            .map(|c| Attribute::from_char(c).ok_or(ParseAttributeError::InvalidCharacter(c)))
            .collect()
    }
}

impl TryFrom<String> for AttributeSet {
    type Error = ParseAttributeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AttributeSet> for String {
    fn from(set: AttributeSet) -> Self {
        set.to_string()
    }
}

impl std::fmt::Display for AttributeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for attribute in self.0.iter() {
            write!(f, "{}", attribute)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for AttributeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self)
    }
}

#[cfg(test)]
pub(crate) fn attrs(s: &str) -> AttributeSet {
    s.parse().unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_canonical() {
        let set: AttributeSet = "cab".parse().unwrap();
        assert_eq!(set.to_string(), "ABC");

        let set: AttributeSet = "B, A, B".parse().unwrap();
        assert_eq!(set.to_string(), "AB");
        assert_eq!(set.len(), 2);

        assert_eq!(
            "A1".parse::<AttributeSet>(),
            Err(ParseAttributeError::InvalidCharacter('1'))
        );
    }

    #[test]
    fn test_universe() {
        assert_eq!(AttributeSet::universe(4).to_string(), "ABCD");
        assert!(AttributeSet::universe(0).is_empty());
        assert_eq!(AttributeSet::universe(40).len(), 26);
    }

    #[test]
    fn test_set_relations() {
        assert!(attrs("AB").is_subset(&attrs("ABC")));
        assert!(attrs("AB").is_proper_subset(&attrs("ABC")));
        assert!(!attrs("AB").is_proper_subset(&attrs("AB")));
        assert!(attrs("AB").is_incomparable(&attrs("BC")));
        assert!(!attrs("A").is_incomparable(&attrs("AB")));
        assert_eq!(attrs("ABC").difference(&attrs("B")), attrs("AC"));
        assert_eq!(attrs("AB").union(&attrs("BD")), attrs("ABD"));
    }

    #[test]
    fn test_extend_reports_growth() {
        let mut set = attrs("A");
        assert!(set.extend_from(&attrs("AB")));
        assert!(!set.extend_from(&attrs("B")));
        assert_eq!(set, attrs("AB"));
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&attrs("CA")).unwrap();
        assert_eq!(json, "\"AC\"");
        let back: AttributeSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, attrs("AC"));
    }
}
