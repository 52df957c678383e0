use serde::{Deserialize, Serialize};

use super::AttributeSet;

/// `determinant -> dependent`
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FunctionalDependency {
    pub determinant: AttributeSet,
    pub dependent: AttributeSet,
}

impl FunctionalDependency {
    pub fn new(determinant: AttributeSet, dependent: AttributeSet) -> Self {
        Self {
            determinant,
            dependent,
        }
    }

    /// Fires on `set` and would add something to it.
    pub fn expands(&self, set: &AttributeSet) -> bool {
        self.determinant.is_subset(set) && !self.dependent.is_subset(set)
    }

    /// Same dependency with determinant attributes removed from the dependent side.
    pub fn without_trivial_part(&self) -> Self {
        Self {
            determinant: self.determinant.clone(),
            dependent: self.dependent.difference(&self.determinant),
        }
    }

    #[cfg(test)]
    /// Parse a dependency of the form "AB->CD"
    pub fn parse(s: &str) -> Self {
        let (lhs, rhs) = s.split_once("->").unwrap();
        Self::new(lhs.parse().unwrap(), rhs.parse().unwrap())
    }
}

impl std::fmt::Display for FunctionalDependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.determinant, self.dependent)
    }
}

impl std::fmt::Debug for FunctionalDependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.determinant, self.dependent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attribute_set::attrs;

    #[test]
    fn test_parse_and_display() {
        let fd = FunctionalDependency::parse("BA->DC");
        assert_eq!(fd.determinant, attrs("AB"));
        assert_eq!(fd.dependent, attrs("CD"));
        assert_eq!(fd.to_string(), "AB -> CD");
    }

    #[test]
    fn test_expands() {
        let fd = FunctionalDependency::parse("AB->C");
        assert!(fd.expands(&attrs("AB")));
        assert!(!fd.expands(&attrs("ABC")));
        assert!(!fd.expands(&attrs("A")));
    }

    #[test]
    fn test_without_trivial_part() {
        let fd = FunctionalDependency::parse("AB->BC").without_trivial_part();
        assert_eq!(fd, FunctionalDependency::parse("AB->C"));
    }
}
