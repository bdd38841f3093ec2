//! Extracts localized elements from markup documents.

use tree_sitter::Node;

use super::html::{
    self,
    decode_entities,
    node_text,
};
use super::types::{
    AnalyzerError,
    Candidate,
};
use super::walk_preorder;

/// Localize attribute names in lookup order: the configured names, then
/// their `data-` variants.
fn lookup_names(localize_attributes: &[String]) -> Vec<String> {
    let names: Vec<String> =
        localize_attributes.iter().map(|attr| attr.to_ascii_lowercase()).collect();
    let data_names: Vec<String> = names.iter().map(|name| format!("data-{name}")).collect();
    names.into_iter().chain(data_names).collect()
}

/// Finds every element carrying a localize attribute.
///
/// An attribute with a non-empty value yields that value. An empty one on
/// the primary attribute (the first configured name or its `data-` variant)
/// yields the element content, with `" />"` rewritten to `">"`. Candidates
/// come out in document order.
///
/// # Errors
/// Returns `AnalyzerError` if the document cannot be parsed.
pub fn extract_markup_messages(
    text: &str,
    localize_attributes: &[String],
) -> Result<Vec<Candidate>, AnalyzerError> {
    let tree = html::parse(text)?;
    let names = lookup_names(localize_attributes);
    let primary = localize_attributes.first().map(|attr| attr.to_ascii_lowercase());
    let is_primary = |name: &str| {
        primary.as_deref().is_some_and(|primary| {
            name == primary || name.strip_prefix("data-") == Some(primary)
        })
    };

    let mut candidates = Vec::new();
    walk_preorder(tree.root_node(), |node| {
        if node.kind() != "element" {
            return true;
        }
        let Some(tag) = opening_tag(node) else {
            return true;
        };
        let attributes = read_attributes(tag, text);
        for name in &names {
            let Some(value) = attributes.iter().find(|(attr, _)| attr == name).map(|(_, v)| v)
            else {
                continue;
            };
            // Valueless attributes may be reported with their own name as value
            let value = if value == name { "" } else { value.as_str() };
            if !value.is_empty() {
                candidates.push(Candidate::Text(value.to_string()));
            } else if is_primary(name) {
                candidates.push(Candidate::Markup(inner_html(node, tag, text)));
            }
        }
        true
    });
    Ok(candidates)
}

/// The start tag (or self-closing tag) of an element.
fn opening_tag(element: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = element.walk();
    element
        .children(&mut cursor)
        .find(|child| matches!(child.kind(), "start_tag" | "self_closing_tag"))
}

/// Attribute names (lowercased) and decoded values of a tag, first
/// occurrence first.
fn read_attributes(tag: Node<'_>, text: &str) -> Vec<(String, String)> {
    let mut cursor = tag.walk();
    let mut attributes = Vec::new();
    for attribute in tag.children(&mut cursor).filter(|child| child.kind() == "attribute") {
        let mut attr_cursor = attribute.walk();
        let mut name = None;
        let mut value = String::new();
        for part in attribute.children(&mut attr_cursor) {
            match part.kind() {
                "attribute_name" => name = Some(node_text(part, text).to_ascii_lowercase()),
                "attribute_value" => value = decode_entities(node_text(part, text)),
                "quoted_attribute_value" => {
                    let mut quoted_cursor = part.walk();
                    value = part
                        .children(&mut quoted_cursor)
                        .find(|inner| inner.kind() == "attribute_value")
                        .map(|inner| decode_entities(node_text(inner, text)))
                        .unwrap_or_default();
                }
                _ => {}
            }
        }
        if let Some(name) = name {
            attributes.push((name, value));
        }
    }
    attributes
}

/// Source text between the opening tag and the end tag, HTML5 style for
/// empty tags.
fn inner_html(element: Node<'_>, tag: Node<'_>, text: &str) -> String {
    if tag.kind() == "self_closing_tag" {
        return String::new();
    }
    let mut cursor = element.walk();
    let end = element
        .children(&mut cursor)
        .find(|child| child.kind() == "end_tag")
        .map_or_else(|| element.end_byte(), |end_tag| end_tag.start_byte());
    text.get(tag.end_byte()..end).unwrap_or_default().replace(" />", ">")
}
