//! Markup helpers shared by extraction, sanitizing and compilation.

use tree_sitter::{
    Node,
    Parser,
    Tree,
};

use super::types::AnalyzerError;
use super::walk_preorder;

/// Nodes that do not contribute to the text content of a fragment.
const NON_TEXT_KINDS: &[&str] =
    &["start_tag", "end_tag", "self_closing_tag", "comment", "doctype", "erroneous_end_tag"];

/// Parses a document or fragment with the HTML grammar.
///
/// # Errors
/// Returns `AnalyzerError` if the grammar cannot be loaded or parsing fails.
pub fn parse(text: &str) -> Result<Tree, AnalyzerError> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_html::LANGUAGE.into())?;
    parser.parse(text, None).ok_or(AnalyzerError::ParseFailed)
}

/// Returns the text content of a fragment: tags and comments removed,
/// character references decoded.
///
/// # Errors
/// Returns `AnalyzerError` if the fragment cannot be parsed.
pub fn text_content(fragment: &str) -> Result<String, AnalyzerError> {
    let tree = parse(fragment)?;
    let mut removed = Vec::new();
    walk_preorder(tree.root_node(), |node| {
        if NON_TEXT_KINDS.contains(&node.kind()) {
            removed.push(node.byte_range());
            return false;
        }
        true
    });

    let mut text = String::with_capacity(fragment.len());
    let mut cursor = 0;
    for range in removed {
        if range.start > cursor {
            text.push_str(fragment.get(cursor..range.start).unwrap_or_default());
        }
        cursor = cursor.max(range.end);
    }
    text.push_str(fragment.get(cursor..).unwrap_or_default());
    Ok(decode_entities(&text))
}

/// Text of a node, empty when the range is not valid UTF-8.
pub(crate) fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or_default()
}

/// Decodes HTML character references, named or numeric.
#[must_use]
pub fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::plain("Hello World", "Hello World")]
    #[case::inline_tags("Hello <b>World</b>!", "Hello World!")]
    #[case::link(r#"See <a href="http://example.org">this</a>"#, "See this")]
    #[case::void_tag("Line<br>break", "Linebreak")]
    #[case::comment("a<!-- note -->b", "ab")]
    #[case::entities("Fish &amp; Chips &lt;3", "Fish & Chips <3")]
    #[case::placeholder("Hello {name}!", "Hello {name}!")]
    fn test_text_content(#[case] fragment: &str, #[case] expected: &str) {
        assert_that!(text_content(fragment).unwrap(), eq(expected));
    }

    #[rstest]
    #[case::quotes("&quot;x&quot; &apos;y&apos;", "\"x\" 'y'")]
    #[case::accents("Caf&eacute; &hellip;", "Caf\u{e9} \u{2026}")]
    #[case::decimal("&#65;&#66;", "AB")]
    #[case::hex("&#x41;&#x42;", "AB")]
    #[case::nbsp("a&nbsp;b", "a\u{a0}b")]
    #[case::copy("&copy; 2024", "\u{a9} 2024")]
    #[case::bare_ampersand("a & b", "a & b")]
    fn test_decode_entities(#[case] text: &str, #[case] expected: &str) {
        assert_that!(decode_entities(text), eq(expected));
    }

    #[rstest]
    fn text_content_decodes_named_references() {
        assert_that!(
            text_content("<em>Caf&eacute;</em> &hellip;").unwrap(),
            eq("Caf\u{e9} \u{2026}")
        );
    }
}
