//! Extracts localize calls from script sources by scanning the token stream.

use tree_sitter::{
    Language,
    Node,
    Parser,
};

use super::html::node_text;
use super::literal::unescape;
use super::types::AnalyzerError;
use super::{
    first_error_position,
    walk_preorder,
};

/// Lexical class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    /// A name, possibly a localize call.
    Identifier,
    /// `(`, `)`, `,` and other punctuation.
    Punctuator,
    /// A string literal.
    String,
    /// Anything else, including template literals.
    Other,
}

/// One token of the source, in source order.
#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    /// Lexical class.
    kind: TokenKind,
    /// Source text of the token.
    text: &'a str,
}

/// Returns the evaluated string literals passed as first argument to one of
/// `identifiers`: the token window `identifier ( "literal" )` or
/// `identifier ( "literal" ,`.
///
/// # Errors
/// Returns `AnalyzerError::Syntax` with the first offending position if the
/// source does not parse, or an error for a malformed literal.
pub fn extract_script_messages(
    source: &str,
    language: &Language,
    identifiers: &[String],
) -> Result<Vec<String>, AnalyzerError> {
    let mut parser = Parser::new();
    parser.set_language(language)?;
    let tree = parser.parse(source, None).ok_or(AnalyzerError::ParseFailed)?;
    let root_node = tree.root_node();

    if root_node.has_error() {
        let position = first_error_position(root_node);
        return Err(AnalyzerError::Syntax { position });
    }

    let tokens = tokenize(root_node, source);
    let mut messages = Vec::new();
    for window in tokens.windows(4) {
        let [name, open, literal, close] = window else {
            continue;
        };
        if name.kind == TokenKind::Identifier
            && identifiers.iter().any(|identifier| identifier == name.text)
            && open.kind == TokenKind::Punctuator
            && open.text == "("
            && literal.kind == TokenKind::String
            && close.kind == TokenKind::Punctuator
            && matches!(close.text, ")" | ",")
        {
            messages.push(unescape(literal.text)?);
        }
    }
    Ok(messages)
}

/// Flattens the syntax tree into leaf tokens, comments dropped. String,
/// template and regex literals are kept whole.
fn tokenize<'a>(root_node: Node<'_>, source: &'a str) -> Vec<Token<'a>> {
    let mut tokens = Vec::new();
    walk_preorder(root_node, |node| {
        if node.is_missing() {
            return false;
        }
        let kind = node.kind();
        match kind {
            "comment" | "html_comment" => return false,
            // `string` is also the anonymous keyword of TypeScript type annotations
            "string" if node.is_named() => {
                tokens.push(Token { kind: TokenKind::String, text: node_text(node, source) });
                return false;
            }
            "template_string" | "regex" if node.is_named() => {
                tokens.push(Token { kind: TokenKind::Other, text: node_text(node, source) });
                return false;
            }
            _ => {}
        }
        if node.child_count() > 0 {
            return true;
        }
        let token_kind = if kind.ends_with("identifier") {
            TokenKind::Identifier
        } else if node.is_named() {
            TokenKind::Other
        } else {
            TokenKind::Punctuator
        };
        tokens.push(Token { kind: token_kind, text: node_text(node, source) });
        false
    });
    tokens
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;
    use crate::input::source::ProgrammingLanguage;

    #[fixture]
    fn identifiers() -> Vec<String> {
        vec!["localize".to_string()]
    }

    fn extract(source: &str, language: ProgrammingLanguage, identifiers: &[String]) -> Vec<String> {
        extract_script_messages(source, &language.tree_sitter_language(), identifiers).unwrap()
    }

    #[rstest]
    #[case::closing_paren(r#"localize("Hello");"#, &["Hello"])]
    #[case::trailing_argument(r"localize('Hello {name}!', {name: n});", &["Hello {name}!"])]
    #[case::escaped(r#"var s = localize("Say \"hi\"\n");"#, &["Say \"hi\"\n"])]
    #[case::member_call(r#"window.localize("Member");"#, &["Member"])]
    #[case::template_literal("localize(`Hello`);", &[])]
    #[case::concatenation(r#"localize("a" + b);"#, &[])]
    #[case::other_identifier(r#"translate("Hello");"#, &[])]
    #[case::in_comment(r#"// localize("Hidden")"#, &[])]
    #[case::multiple(r#"localize("One"); if (x) { localize("Two", 1); }"#, &["One", "Two"])]
    fn test_extract_javascript(
        identifiers: Vec<String>,
        #[case] source: &str,
        #[case] expected: &[&str],
    ) {
        let messages = extract(source, ProgrammingLanguage::JavaScript, &identifiers);

        assert_eq!(messages, expected);
    }

    #[rstest]
    fn extracts_from_typescript(identifiers: Vec<String>) {
        let source = r#"const greeting: string = localize("Typed");"#;

        let messages = extract(source, ProgrammingLanguage::TypeScript, &identifiers);

        assert_that!(messages, elements_are![eq("Typed")]);
    }

    #[rstest]
    fn extracts_from_tsx(identifiers: Vec<String>) {
        let source = r#"const View = () => <p title={localize("Title")}>x</p>;"#;

        let messages = extract(source, ProgrammingLanguage::Tsx, &identifiers);

        assert_that!(messages, elements_are![eq("Title")]);
    }

    #[rstest]
    fn custom_identifiers(identifiers: Vec<String>) {
        let mut identifiers = identifiers;
        identifiers.push("_t".to_string());

        let messages =
            extract(r#"_t("A"); localize("B");"#, ProgrammingLanguage::JavaScript, &identifiers);

        assert_that!(messages, elements_are![eq("A"), eq("B")]);
    }

    #[rstest]
    fn syntax_error_reports_position(identifiers: Vec<String>) {
        let language = ProgrammingLanguage::JavaScript.tree_sitter_language();

        let result = extract_script_messages("localize(\"ok\");\nvar = ;", &language, &identifiers);

        let Err(AnalyzerError::Syntax { position }) = result else {
            panic!("expected a syntax error, got {result:?}");
        };
        assert_that!(position.line, eq(2));
    }
}
