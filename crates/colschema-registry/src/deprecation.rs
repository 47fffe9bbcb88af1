//! Deprecated-field discovery.
//!
//! Walks a schema document depth-first and reports every property marked
//! `deprecated: true`, with its dotted path from the root. Object
//! properties are descended into whether or not they are themselves
//! deprecated. Object-shaped array elements are descended into as well,
//! with the array field's path segment written `<field>[]`.

use serde::Serialize;

use crate::document::SchemaNode;

/// One deprecated field in a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeprecatedField {
    /// Dotted path from the document root, e.g. `protocols.grpc.endpoint`.
    pub path: String,
    /// The field's description, or empty if it has none.
    pub description: String,
    /// The field's declared type keyword.
    #[serde(rename = "type")]
    pub declared_type: String,
}

/// Every deprecated field under `root`, in depth-first order with
/// siblings sorted by name.
pub fn scan(root: &SchemaNode) -> Vec<DeprecatedField> {
    let mut found = Vec::new();
    walk(root, "", &mut found);
    found
}

fn walk(node: &SchemaNode, prefix: &str, found: &mut Vec<DeprecatedField>) {
    for (name, child) in &node.properties {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };

        if child.is_deprecated() {
            found.push(DeprecatedField {
                path: path.clone(),
                description: child.description.clone().unwrap_or_default(),
                declared_type: child.kind.to_string(),
            });
        }

        if child.is_object() {
            walk(child, &path, found);
        } else if let Some(items) = child.array_items().filter(|items| items.is_object()) {
            walk(items, &format!("{path}[]"), found);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NodeKind;

    fn string_field() -> SchemaNode {
        SchemaNode::new(NodeKind::String)
    }

    #[test]
    fn finds_nested_deprecated_field() {
        let root = SchemaNode::new(NodeKind::Object).with_property(
            "a",
            SchemaNode::new(NodeKind::Object).with_property(
                "b",
                string_field().with_description("old").deprecated(),
            ),
        );
        assert_eq!(
            scan(&root),
            vec![DeprecatedField {
                path: "a.b".to_string(),
                description: "old".to_string(),
                declared_type: "string".to_string(),
            }]
        );
    }

    #[test]
    fn no_deprecated_fields_yields_empty() {
        let root = SchemaNode::new(NodeKind::Object)
            .with_property("endpoint", string_field())
            .with_property("tls", SchemaNode::new(NodeKind::Object));
        assert!(scan(&root).is_empty());
    }

    #[test]
    fn deprecated_object_is_reported_and_descended() {
        let root = SchemaNode::new(NodeKind::Object).with_property(
            "legacy",
            SchemaNode::new(NodeKind::Object)
                .deprecated()
                .with_property("inner", string_field().deprecated()),
        );
        let paths: Vec<String> = scan(&root).into_iter().map(|f| f.path).collect();
        assert_eq!(paths, vec!["legacy", "legacy.inner"]);
    }

    #[test]
    fn missing_description_is_empty() {
        let root = SchemaNode::new(NodeKind::Object)
            .with_property("topic", string_field().deprecated());
        assert_eq!(scan(&root)[0].description, "");
    }

    #[test]
    fn siblings_are_reported_in_name_order() {
        let root = SchemaNode::new(NodeKind::Object)
            .with_property("zeta", string_field().deprecated())
            .with_property("alpha", string_field().deprecated())
            .with_property("mid", string_field());
        let paths: Vec<String> = scan(&root).into_iter().map(|f| f.path).collect();
        assert_eq!(paths, vec!["alpha", "zeta"]);
    }

    #[test]
    fn descends_into_object_array_items() {
        let root = SchemaNode::new(NodeKind::Object).with_property(
            "headers",
            SchemaNode::new(NodeKind::Array).with_items(
                SchemaNode::new(NodeKind::Object)
                    .with_property("from_context", string_field().deprecated()),
            ),
        );
        let found = scan(&root);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "headers[].from_context");
    }

    #[test]
    fn deprecated_array_reports_its_declared_type() {
        let root = SchemaNode::new(NodeKind::Object).with_property(
            "brokers",
            SchemaNode::new(NodeKind::Array)
                .with_items(string_field())
                .deprecated(),
        );
        assert_eq!(scan(&root)[0].declared_type, "array");
    }

    #[test]
    fn serializes_type_key() {
        let field = DeprecatedField {
            path: "a".to_string(),
            description: String::new(),
            declared_type: "boolean".to_string(),
        };
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value["type"], "boolean");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_node() -> impl Strategy<Value = SchemaNode> {
            let leaf = any::<bool>().prop_map(|dep| {
                let node = SchemaNode::new(NodeKind::String);
                if dep {
                    node.deprecated()
                } else {
                    node
                }
            });
            leaf.prop_recursive(4, 32, 4, |inner| {
                (
                    prop::collection::btree_map("[a-z]{1,4}", inner, 0..4),
                    any::<bool>(),
                )
                    .prop_map(|(children, dep)| {
                        let mut node = SchemaNode::new(NodeKind::Object);
                        node.properties = children;
                        if dep {
                            node.deprecated()
                        } else {
                            node
                        }
                    })
            })
        }

        fn count_deprecated(node: &SchemaNode) -> usize {
            node.properties
                .values()
                .map(|child| usize::from(child.is_deprecated()) + count_deprecated(child))
                .sum()
        }

        proptest! {
            #[test]
            fn reports_exactly_the_deprecated_properties(root in arb_node()) {
                let found = scan(&root);
                prop_assert_eq!(found.len(), count_deprecated(&root));
            }

            #[test]
            fn every_path_resolves_to_a_deprecated_node(root in arb_node()) {
                for field in scan(&root) {
                    let mut node = &root;
                    for segment in field.path.split('.') {
                        node = &node.properties[segment];
                    }
                    prop_assert!(node.is_deprecated());
                }
            }
        }
    }
}
