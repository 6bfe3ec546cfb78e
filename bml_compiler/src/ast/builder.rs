//! Element tree to pattern tree

use super::error::{AstResult, FormatError};
use super::kind::{NodeKind, NodeType, Orientation};
use super::node::{Node, NodeId};
use super::tree::PatternTree;
use crate::config::constants::compile_time::references::MAX_LABEL_LENGTH;
use crate::config::constants::compile_time::syntax::ROOT_ELEMENT;
use crate::config::runtime::LoaderPreferences;
use crate::expression::Expression;
use crate::logging::codes;
use crate::syntax::{Document, Element};
use crate::log_warning;

pub struct TreeBuilder<'p> {
    preferences: &'p LoaderPreferences,
    tree: PatternTree,
    orientation: Orientation,
}

impl<'p> TreeBuilder<'p> {
    pub fn new(preferences: &'p LoaderPreferences) -> Self {
        Self {
            preferences,
            tree: PatternTree::new(),
            orientation: Orientation::None,
        }
    }

    pub fn build(mut self, document: &Document) -> AstResult<(PatternTree, Orientation)> {
        let root = &document.root;
        if root.name != ROOT_ELEMENT {
            return Err(FormatError::WrongRootElement {
                expected: ROOT_ELEMENT,
                found: root.name.clone(),
                span: root.span,
            });
        }

        self.build_node(root, None)?;
        Ok((self.tree, self.orientation))
    }

    fn build_node(&mut self, element: &Element, parent: Option<NodeId>) -> AstResult<NodeId> {
        let kind = NodeKind::from_element_name(&element.name)
            .ok_or_else(|| FormatError::unknown_element(&element.name, element.span))?;

        let mut node = Node::new(kind, parent, element.span);
        self.read_attributes(element, &mut node)?;

        if kind == NodeKind::Direction {
            node.node_type = node.node_type.for_direction();
        }

        let text = element.text();
        node.expression = Expression::parse(&text).map_err(|error| FormatError::InvalidExpression {
            element: element.name.clone(),
            span: element.span,
            error,
        })?;

        let id = self.tree.push(node);
        for child in element.child_elements() {
            self.build_node(child, Some(id))?;
        }
        Ok(id)
    }

    fn read_attributes(&mut self, element: &Element, node: &mut Node) -> AstResult<()> {
        for attribute in &element.attributes {
            match attribute.name.as_str() {
                "type" if node.kind == NodeKind::Bulletml => {
                    self.orientation = Orientation::from_attribute(&attribute.value).ok_or_else(|| {
                        FormatError::InvalidOrientation {
                            value: attribute.value.clone(),
                            span: attribute.span,
                        }
                    })?;
                }
                "type" => {
                    node.node_type = NodeType::from_attribute(&attribute.value).ok_or_else(|| {
                        FormatError::invalid_type(&element.name, &attribute.value, attribute.span)
                    })?;
                }
                "label" => {
                    if attribute.value.len() > MAX_LABEL_LENGTH {
                        return Err(FormatError::LabelTooLong {
                            length: attribute.value.len(),
                            max_length: MAX_LABEL_LENGTH,
                            span: attribute.span,
                        });
                    }
                    node.label = Some(attribute.value.clone());
                }
                "name" => node.pattern_name = Some(attribute.value.clone()),
                other => {
                    if self.preferences.warn_unknown_attributes {
                        log_warning!(code = codes::ast::UNKNOWN_ATTRIBUTE,
                            "Ignoring unknown attribute",
                            span = attribute.span,
                            "element" => element.name,
                            "attribute" => other
                        );
                    }
                }
            }
        }
        Ok(())
    }
}

/// Build the pattern tree and read the document orientation
pub fn build_tree(
    document: &Document,
    preferences: &LoaderPreferences,
) -> AstResult<(PatternTree, Orientation)> {
    TreeBuilder::new(preferences).build(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::SimpleContext;
    use crate::lexical::tokenize;
    use crate::syntax::parse_document;
    use assert_matches::assert_matches;

    fn build(source: &str) -> AstResult<(PatternTree, Orientation)> {
        let document = parse_document(tokenize(source).unwrap()).unwrap();
        build_tree(&document, &LoaderPreferences::default())
    }

    #[test]
    fn test_builds_nodes_in_document_order() {
        let (tree, orientation) = build(
            r#"<bulletml type="Vertical">
                 <action label="top">
                   <wait>10 + $1</wait>
                   <vanish/>
                 </action>
               </bulletml>"#,
        )
        .unwrap();

        assert_eq!(orientation, Orientation::Vertical);
        assert_eq!(tree.len(), 4);
        let action = tree.find_label_node(tree.root(), "top", NodeKind::Action).unwrap();
        let wait = tree.get_child(action, NodeKind::Wait).unwrap();
        assert_eq!(tree.node(wait).parent, Some(action));

        let mut ctx = SimpleContext::new(vec![5.0], 0.0, Default::default());
        assert_eq!(tree.value(wait, &mut ctx), 15.0);
    }

    #[test]
    fn test_direction_defaults_to_aim() {
        let (tree, _) = build(
            r#"<bulletml><fire><direction>0</direction><speed type="relative">1</speed><bullet/></fire></bulletml>"#,
        )
        .unwrap();

        let fire = tree.get_child(tree.root(), NodeKind::Fire).unwrap();
        let direction = tree.get_child(fire, NodeKind::Direction).unwrap();
        let speed = tree.get_child(fire, NodeKind::Speed).unwrap();
        assert_eq!(tree.node(direction).node_type, NodeType::Aim);
        assert_eq!(tree.node(speed).node_type, NodeType::Relative);
    }

    #[test]
    fn test_default_orientation_and_pattern_name() {
        let (tree, orientation) =
            build(r#"<bulletml><bullet label="b" name="spark"><action/></bullet></bulletml>"#)
                .unwrap();

        assert_eq!(orientation, Orientation::None);
        let bullet = tree.get_child(tree.root(), NodeKind::Bullet).unwrap();
        let action = tree.get_child(bullet, NodeKind::Action).unwrap();
        assert_eq!(tree.pattern_name(action), Some("spark"));
    }

    #[test]
    fn test_format_errors() {
        assert_matches!(build("<pattern/>"), Err(FormatError::WrongRootElement { .. }));
        assert_matches!(
            build("<bulletml><laser/></bulletml>"),
            Err(FormatError::UnknownElement { name, .. }) if name == "laser"
        );
        assert_matches!(
            build(r#"<bulletml><wait type="sideways">1</wait></bulletml>"#),
            Err(FormatError::InvalidTypeQualifier { .. })
        );
        assert_matches!(
            build(r#"<bulletml type="diagonal"/>"#),
            Err(FormatError::InvalidOrientation { .. })
        );
        assert_matches!(
            build("<bulletml><wait>1 +</wait></bulletml>"),
            Err(FormatError::InvalidExpression { .. })
        );
    }

    #[test]
    fn test_unknown_attribute_ignored() {
        let (tree, _) = build(r#"<bulletml><action label="top" color="red"/></bulletml>"#).unwrap();
        assert!(tree.find_label_node(tree.root(), "top", NodeKind::Action).is_some());
    }
}
