//! Block type enumeration shared by blocks, patches and notification hints.
//!
//! # Design
//! The wire format is a lowercase string. Deserialization never fails on an
//! unrecognised string; it lands in `BlockType::Unknown` so a newer server
//! cannot break an older client. Explicit parsing through `FromStr` is
//! strict and reports the offending string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The kind of content a block holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Board,
    Card,
    View,
    Text,
    Checkbox,
    Comment,
    Image,
    Attachment,
    Divider,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Returned when a string does not name any known block type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0} is an invalid block type.")]
pub struct InvalidBlockType(pub String);

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Board => "board",
            BlockType::Card => "card",
            BlockType::View => "view",
            BlockType::Text => "text",
            BlockType::Checkbox => "checkbox",
            BlockType::Comment => "comment",
            BlockType::Image => "image",
            BlockType::Attachment => "attachment",
            BlockType::Divider => "divider",
            BlockType::Unknown => "unknown",
        }
    }

    /// Parse `s`, falling back to `Unknown` instead of failing.
    pub fn parse_lossy(s: &str) -> Self {
        s.parse().unwrap_or(BlockType::Unknown)
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = InvalidBlockType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "board" => Ok(BlockType::Board),
            "card" => Ok(BlockType::Card),
            "view" => Ok(BlockType::View),
            "text" => Ok(BlockType::Text),
            "checkbox" => Ok(BlockType::Checkbox),
            "comment" => Ok(BlockType::Comment),
            "image" => Ok(BlockType::Image),
            "attachment" => Ok(BlockType::Attachment),
            "divider" => Ok(BlockType::Divider),
            _ => Err(InvalidBlockType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Card".parse::<BlockType>().unwrap(), BlockType::Card);
        assert_eq!("DIVIDER".parse::<BlockType>().unwrap(), BlockType::Divider);
        assert_eq!("checkbox".parse::<BlockType>().unwrap(), BlockType::Checkbox);
    }

    #[test]
    fn rejects_unknown_string() {
        let err = "widget".parse::<BlockType>().unwrap_err();
        assert_eq!(err, InvalidBlockType("widget".to_string()));
        assert_eq!(err.to_string(), "widget is an invalid block type.");
    }

    #[test]
    fn unknown_is_not_a_parseable_name() {
        assert!("unknown".parse::<BlockType>().is_err());
        assert_eq!(BlockType::parse_lossy("unknown"), BlockType::Unknown);
        assert_eq!(BlockType::parse_lossy("Image"), BlockType::Image);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_value(BlockType::Attachment).unwrap(), "attachment");
        assert_eq!(BlockType::View.to_string(), "view");
    }

    #[test]
    fn unrecognised_wire_value_deserializes_to_unknown() {
        let t: BlockType = serde_json::from_str(r#""hologram""#).unwrap();
        assert_eq!(t, BlockType::Unknown);
        let t: BlockType = serde_json::from_str(r#""comment""#).unwrap();
        assert_eq!(t, BlockType::Comment);
    }
}
