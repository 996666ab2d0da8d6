//! Group record - a named, colored cluster of people

use serde::{Deserialize, Serialize};

use crate::types::GroupId;

/// Default color assigned to new groups
pub const DEFAULT_COLOR: &str = "#8b9dc3";

/// A named group of people, rendered as a colored hull on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Unique identifier
    pub id: GroupId,

    /// Display name
    pub name: String,

    /// Fill color as a `#rrggbb` hex string
    pub color: String,

    /// Unix timestamp when the group was created
    pub created_at: i64,
}

impl Group {
    /// Create a new group with the default color
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: GroupId::new(),
            name: name.into(),
            color: DEFAULT_COLOR.to_string(),
            created_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// Validate a `#rrggbb` hex color string
pub fn is_valid_color(color: &str) -> bool {
    let Some(hex) = color.strip_prefix('#') else {
        return false;
    };
    hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_group_has_default_color() {
        let group = Group::new("Book club");
        assert_eq!(group.color, DEFAULT_COLOR);
        assert!(is_valid_color(&group.color));
    }

    #[test]
    fn test_color_validation() {
        assert!(is_valid_color("#00ff0A"));
        assert!(!is_valid_color("00ff0A"));
        assert!(!is_valid_color("#00ff0"));
        assert!(!is_valid_color("#00ff0g"));
        assert!(!is_valid_color("#00ff0A00"));
    }
}
