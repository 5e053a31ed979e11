//! Identifier and kind types shared by every layer.

use std::{fmt, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};

/// Host-assigned identifier of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ItemId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl FromStr for ItemId {
    type Err = ParseIntError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.trim().parse::<u64>().map(Self)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of content item as the host names it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemKind {
    Post,
    Page,
    Revision,
    Comment,
    Other(String),
}

impl ItemKind {
    pub fn as_str(&self) -> &str {
        match self {
            ItemKind::Post => "post",
            ItemKind::Page => "page",
            ItemKind::Revision => "revision",
            ItemKind::Comment => "comment",
            ItemKind::Other(name) => name.as_str(),
        }
    }

    pub fn is_revision(&self) -> bool {
        matches!(self, ItemKind::Revision)
    }
}

impl From<&str> for ItemKind {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "post" => ItemKind::Post,
            "page" => ItemKind::Page,
            "revision" => ItemKind::Revision,
            "comment" => ItemKind::Comment,
            other => ItemKind::Other(other.to_string()),
        }
    }
}

impl From<String> for ItemKind {
    fn from(value: String) -> Self {
        ItemKind::from(value.as_str())
    }
}

impl From<ItemKind> for String {
    fn from(kind: ItemKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parsing_is_case_insensitive() {
        assert_eq!(ItemKind::from("Post"), ItemKind::Post);
        assert_eq!(ItemKind::from(" revision "), ItemKind::Revision);
        assert_eq!(
            ItemKind::from("attachment"),
            ItemKind::Other("attachment".into())
        );
    }

    #[test]
    fn item_id_parses_padded_numbers() {
        assert_eq!(" 42 ".parse::<ItemId>().unwrap(), ItemId::new(42));
        assert!("abc".parse::<ItemId>().is_err());
    }
}
