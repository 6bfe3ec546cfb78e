//! Node kinds, type qualifiers and document orientation

use serde::Serialize;
use std::fmt;

/// One element of the pattern language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Bulletml,
    Bullet,
    Action,
    Fire,
    ChangeDirection,
    ChangeSpeed,
    Accel,
    Wait,
    Repeat,
    BulletRef,
    ActionRef,
    FireRef,
    Vanish,
    Horizontal,
    Vertical,
    Term,
    Times,
    Direction,
    Speed,
    Param,
}

const ELEMENT_NAMES: &[(&str, NodeKind)] = &[
    ("bulletml", NodeKind::Bulletml),
    ("bullet", NodeKind::Bullet),
    ("action", NodeKind::Action),
    ("fire", NodeKind::Fire),
    ("changeDirection", NodeKind::ChangeDirection),
    ("changeSpeed", NodeKind::ChangeSpeed),
    ("accel", NodeKind::Accel),
    ("wait", NodeKind::Wait),
    ("repeat", NodeKind::Repeat),
    ("bulletRef", NodeKind::BulletRef),
    ("actionRef", NodeKind::ActionRef),
    ("fireRef", NodeKind::FireRef),
    ("vanish", NodeKind::Vanish),
    ("horizontal", NodeKind::Horizontal),
    ("vertical", NodeKind::Vertical),
    ("term", NodeKind::Term),
    ("times", NodeKind::Times),
    ("direction", NodeKind::Direction),
    ("speed", NodeKind::Speed),
    ("param", NodeKind::Param),
];

impl NodeKind {
    /// Exact, case-sensitive element name lookup
    pub fn from_element_name(name: &str) -> Option<Self> {
        ELEMENT_NAMES
            .iter()
            .find(|(element, _)| *element == name)
            .map(|(_, kind)| *kind)
    }

    pub fn element_name(&self) -> &'static str {
        ELEMENT_NAMES
            .iter()
            .find(|(_, kind)| kind == self)
            .map(|(element, _)| *element)
            .unwrap_or("unknown")
    }

    /// Kind a reference of this kind must resolve to
    pub fn referenced_kind(&self) -> Option<NodeKind> {
        match self {
            NodeKind::BulletRef => Some(NodeKind::Bullet),
            NodeKind::ActionRef => Some(NodeKind::Action),
            NodeKind::FireRef => Some(NodeKind::Fire),
            _ => None,
        }
    }

    pub fn is_reference(&self) -> bool {
        self.referenced_kind().is_some()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_name())
    }
}

/// The `type` attribute of a non-root node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    #[default]
    None,
    Aim,
    Absolute,
    Relative,
    Sequence,
}

impl NodeType {
    pub fn from_attribute(value: &str) -> Option<Self> {
        match value {
            "" | "none" => Some(NodeType::None),
            "aim" => Some(NodeType::Aim),
            "absolute" => Some(NodeType::Absolute),
            "relative" => Some(NodeType::Relative),
            "sequence" => Some(NodeType::Sequence),
            _ => None,
        }
    }

    /// Direction nodes only distinguish absolute, relative and sequence;
    /// everything else aims
    pub fn for_direction(self) -> Self {
        match self {
            NodeType::Absolute | NodeType::Relative | NodeType::Sequence => self,
            NodeType::None | NodeType::Aim => NodeType::Aim,
        }
    }
}

/// The root `type` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    None,
    Vertical,
    Horizontal,
}

impl Orientation {
    /// Case-insensitive
    pub fn from_attribute(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "none" => Some(Orientation::None),
            "vertical" => Some(Orientation::Vertical),
            "horizontal" => Some(Orientation::Horizontal),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_names_are_exact() {
        assert_eq!(
            NodeKind::from_element_name("changeDirection"),
            Some(NodeKind::ChangeDirection)
        );
        assert_eq!(NodeKind::from_element_name("changedirection"), None);
        assert_eq!(NodeKind::from_element_name("laser"), None);
        assert_eq!(NodeKind::FireRef.element_name(), "fireRef");
    }

    #[test]
    fn test_reference_kinds() {
        assert_eq!(NodeKind::ActionRef.referenced_kind(), Some(NodeKind::Action));
        assert!(NodeKind::BulletRef.is_reference());
        assert!(!NodeKind::Bullet.is_reference());
    }

    #[test]
    fn test_direction_qualifier_defaults_to_aim() {
        assert_eq!(NodeType::None.for_direction(), NodeType::Aim);
        assert_eq!(NodeType::Sequence.for_direction(), NodeType::Sequence);
        assert_eq!(NodeType::from_attribute("bogus"), None);
    }

    #[test]
    fn test_orientation_case_insensitive() {
        assert_eq!(Orientation::from_attribute("VERTICAL"), Some(Orientation::Vertical));
        assert_eq!(Orientation::from_attribute("Horizontal"), Some(Orientation::Horizontal));
        assert_eq!(Orientation::from_attribute("diagonal"), None);
    }
}
