//! Reading message candidates out of source artifacts.

pub mod html;
pub mod literal;
pub mod markup;
pub mod script;
pub mod types;

use tree_sitter::Node;
pub use types::{
    AnalyzerError,
    Candidate,
};

use crate::input::source::{
    ArtifactKind,
    SourceFile,
};
use crate::types::SourcePosition;

/// Extracts the message candidates of one source file.
///
/// # Errors
/// Returns `AnalyzerError` if the file cannot be parsed.
pub fn extract_candidates(
    file: &SourceFile,
    localize_attributes: &[String],
    method_identifiers: &[String],
) -> Result<Vec<Candidate>, AnalyzerError> {
    match file.kind {
        ArtifactKind::Markup => markup::extract_markup_messages(&file.text, localize_attributes),
        ArtifactKind::Script(language) => script::extract_script_messages(
            &file.text,
            &language.tree_sitter_language(),
            method_identifiers,
        )
        .map(|messages| messages.into_iter().map(Candidate::Text).collect()),
    }
}

/// Visits `root` and its descendants in source order. Returning `false`
/// from `visit` skips the children of that node.
pub(crate) fn walk_preorder<'tree, F>(root: Node<'tree>, mut visit: F)
where
    F: FnMut(Node<'tree>) -> bool,
{
    let mut cursor = root.walk();
    let mut descend = visit(cursor.node());
    loop {
        if descend && cursor.goto_first_child() {
            descend = visit(cursor.node());
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                descend = visit(cursor.node());
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

/// Position of the first error or missing node in source order.
pub(crate) fn first_error_position(root_node: Node<'_>) -> SourcePosition {
    let mut position: Option<SourcePosition> = None;
    walk_preorder(root_node, |node| {
        if position.is_some() {
            return false;
        }
        if node.is_error() || node.is_missing() {
            position = Some(node.start_position().into());
            return false;
        }
        node.has_error()
    });
    position.unwrap_or_else(|| root_node.start_position().into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::input::source::ProgrammingLanguage;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[rstest]
    fn extract_candidates_dispatches_on_kind() {
        let markup = SourceFile {
            label: "index.html".to_string(),
            text: "<p localize>Hi</p>".to_string(),
            kind: ArtifactKind::Markup,
        };
        let script = SourceFile {
            label: "app.js".to_string(),
            text: r#"localize("Hi");"#.to_string(),
            kind: ArtifactKind::Script(ProgrammingLanguage::JavaScript),
        };

        let from_markup = extract_candidates(&markup, &names(&["localize"]), &[]).unwrap();
        let from_script = extract_candidates(&script, &[], &names(&["localize"])).unwrap();

        assert_eq!(from_markup, vec![Candidate::Markup("Hi".to_string())]);
        assert_eq!(from_script, vec![Candidate::Text("Hi".to_string())]);
    }

    #[rstest]
    fn walk_preorder_visits_in_source_order() {
        let tree = html::parse("<a><b></b></a><c></c>").unwrap();
        let text = "<a><b></b></a><c></c>";
        let mut tags = Vec::new();

        walk_preorder(tree.root_node(), |node| {
            if node.kind() == "tag_name" {
                tags.push(html::node_text(node, text).to_string());
            }
            true
        });

        assert_eq!(tags, ["a", "b", "b", "a", "c", "c"]);
    }
}
