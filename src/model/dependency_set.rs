use serde::{Deserialize, Serialize};

use super::{AttributeSet, FunctionalDependency};

/// Ordered list of dependencies. Order only matters for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySet {
    dependencies: Vec<FunctionalDependency>,
}

impl DependencySet {
    pub fn new(dependencies: Vec<FunctionalDependency>) -> Self {
        Self { dependencies }
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionalDependency> + '_ {
        self.dependencies.iter()
    }

    pub fn as_slice(&self) -> &[FunctionalDependency] {
        &self.dependencies
    }

    /// Every attribute mentioned on either side
    pub fn attributes(&self) -> AttributeSet {
        let mut set = AttributeSet::new();
        for fd in self.dependencies.iter() {
            set.extend_from(&fd.determinant);
            set.extend_from(&fd.dependent);
        }
        set
    }

    pub fn closure(&self, start: &AttributeSet) -> AttributeSet {
        crate::game::closure(&self.dependencies, start)
    }
}

impl<'a> IntoIterator for &'a DependencySet {
    type Item = &'a FunctionalDependency;
    type IntoIter = std::slice::Iter<'a, FunctionalDependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.dependencies.iter()
    }
}

impl std::fmt::Display for DependencySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (idx, fd) in self.dependencies.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", fd)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attribute_set::attrs;

    #[test]
    fn test_attributes_and_display() {
        let set = DependencySet::new(vec![
            FunctionalDependency::parse("A->BC"),
            FunctionalDependency::parse("BC->D"),
        ]);
        assert_eq!(set.attributes(), attrs("ABCD"));
        assert_eq!(set.to_string(), "A -> BC\nBC -> D");
        assert_eq!(set.closure(&attrs("A")), attrs("ABCD"));
    }
}
