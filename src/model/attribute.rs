use serde::{Deserialize, Serialize};

use super::ParseAttributeError;

/// Letters available for attribute names.
pub const MAX_ATTRIBUTES: usize = 26;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(into = "char", try_from = "char")]
pub struct Attribute(char); // 'A'-'Z'

impl Attribute {
    pub fn from_index(index: usize) -> Option<Self> {
        if index < MAX_ATTRIBUTES {
            Some(Self((b'A' + index as u8) as char))
        } else {
            None
        }
    }

    /// Accepts either case; anything outside the alphabet is rejected.
    pub fn from_char(c: char) -> Option<Self> {
        let upper = c.to_ascii_uppercase();
        if upper.is_ascii_uppercase() {
            Some(Self(upper))
        } else {
            None
        }
    }

    pub fn index(&self) -> usize {
        self.0 as usize - 'A' as usize
    }

    pub fn as_char(&self) -> char {
        self.0
    }
}

impl TryFrom<char> for Attribute {
    type Error = ParseAttributeError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Self::from_char(c).ok_or(ParseAttributeError::InvalidCharacter(c))
    }
}

impl From<Attribute> for char {
    fn from(attribute: Attribute) -> Self {
        attribute.0
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        let attr = Attribute::from_index(0).unwrap();
        assert_eq!(attr.as_char(), 'A');
        assert_eq!(attr.index(), 0);

        let attr = Attribute::from_index(25).unwrap();
        assert_eq!(attr.as_char(), 'Z');
        assert_eq!(attr.index(), 25);

        assert!(Attribute::from_index(26).is_none());
    }

    #[test]
    fn test_from_char() {
        assert_eq!(Attribute::from_char('c'), Attribute::from_index(2));
        assert_eq!(Attribute::from_char('C'), Attribute::from_index(2));
        assert!(Attribute::from_char('1').is_none());
        assert!(Attribute::from_char('é').is_none());
    }

    #[test]
    fn test_deserialize_checks_letter() {
        let attr: Attribute = serde_json::from_str("\"c\"").unwrap();
        assert_eq!(attr.index(), 2);
        assert_eq!(serde_json::to_string(&attr).unwrap(), "\"C\"");
        assert!(serde_json::from_str::<Attribute>("\"1\"").is_err());
        assert!(serde_json::from_str::<Attribute>("\"é\"").is_err());
    }

    #[test]
    fn test_ordering() {
        let a = Attribute::from_char('A').unwrap();
        let b = Attribute::from_char('B').unwrap();
        assert!(a < b);
    }
}
