//! Evaluation of quoted string literals to their runtime value.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiteralError {
    #[error("String literal is not quoted: {0}")]
    NotQuoted(String),
    #[error("Unterminated string literal: {0}")]
    Unterminated(String),
    #[error("Invalid escape sequence '{sequence}' in string literal")]
    InvalidEscape { sequence: String },
}

/// Returns the value of a single or double quoted literal, quotes included
/// in `literal`.
///
/// Handles the single character escapes, `\xHH`, `\uHHHH` (surrogate pairs
/// combined), `\u{H..}` and line continuations. Any other escaped character
/// stands for itself.
///
/// # Errors
/// Returns `LiteralError` for unquoted input, a dangling backslash or a
/// malformed hex escape.
pub fn unescape(literal: &str) -> Result<String, LiteralError> {
    let mut chars = literal.chars();
    let quote = match chars.next() {
        Some(q @ ('"' | '\'')) => q,
        _ => return Err(LiteralError::NotQuoted(literal.to_string())),
    };
    if chars.next_back() != Some(quote) {
        return Err(LiteralError::Unterminated(literal.to_string()));
    }

    let mut value = String::with_capacity(literal.len());
    let mut chars = chars.peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            value.push(ch);
            continue;
        }
        let Some(escaped) = chars.next() else {
            return Err(LiteralError::Unterminated(literal.to_string()));
        };
        match escaped {
            'n' => value.push('\n'),
            't' => value.push('\t'),
            'r' => value.push('\r'),
            'b' => value.push('\u{8}'),
            'f' => value.push('\u{c}'),
            'v' => value.push('\u{b}'),
            '0' => value.push('\0'),
            'x' => {
                let code = read_hex(&mut chars, 2)
                    .ok_or_else(|| invalid_escape(&format!("\\x{}", rest_preview(&chars))))?;
                value.push(to_char(code, "\\x")?);
            }
            'u' => {
                let code = read_unicode_escape(&mut chars)?;
                if (0xD800..0xDC00).contains(&code) {
                    let low = read_low_surrogate(&mut chars);
                    match low {
                        Some(low) => {
                            let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                            value.push(to_char(combined, "\\u")?);
                        }
                        None => value.push(char::REPLACEMENT_CHARACTER),
                    }
                } else if (0xDC00..0xE000).contains(&code) {
                    value.push(char::REPLACEMENT_CHARACTER);
                } else {
                    value.push(to_char(code, "\\u")?);
                }
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => value.push(other),
        }
    }
    Ok(value)
}

/// Reads exactly `digits` hex digits.
fn read_hex<I>(chars: &mut std::iter::Peekable<I>, digits: usize) -> Option<u32>
where
    I: Iterator<Item = char> + Clone,
{
    let lookahead: String = chars.clone().take(digits).collect();
    if lookahead.chars().count() != digits || !lookahead.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    for _ in 0..digits {
        chars.next();
    }
    u32::from_str_radix(&lookahead, 16).ok()
}

/// Reads the part of a `\u` escape after the `u`.
fn read_unicode_escape<I>(chars: &mut std::iter::Peekable<I>) -> Result<u32, LiteralError>
where
    I: Iterator<Item = char> + Clone,
{
    if chars.peek() == Some(&'{') {
        chars.next();
        let mut digits = String::new();
        while let Some(&c) = chars.peek() {
            chars.next();
            if c == '}' {
                return u32::from_str_radix(&digits, 16)
                    .ok()
                    .filter(|code| *code <= 0x0010_FFFF)
                    .ok_or_else(|| invalid_escape(&format!("\\u{{{digits}}}")));
            }
            digits.push(c);
        }
        return Err(invalid_escape(&format!("\\u{{{digits}")));
    }
    read_hex(chars, 4).ok_or_else(|| invalid_escape(&format!("\\u{}", rest_preview(chars))))
}

/// Consumes a `\uDC00`..`\uDFFF` escape if one follows.
fn read_low_surrogate<I>(chars: &mut std::iter::Peekable<I>) -> Option<u32>
where
    I: Iterator<Item = char> + Clone,
{
    let mut lookahead = chars.clone();
    if lookahead.next() != Some('\\') || lookahead.next() != Some('u') {
        return None;
    }
    let mut lookahead = lookahead.peekable();
    let low = read_hex(&mut lookahead, 4).filter(|low| (0xDC00..0xE000).contains(low))?;
    for _ in 0..6 {
        chars.next();
    }
    Some(low)
}

/// Converts a code point, rejecting values that are not scalar values.
fn to_char(code: u32, prefix: &str) -> Result<char, LiteralError> {
    char::from_u32(code).ok_or_else(|| invalid_escape(&format!("{prefix}{code:x}")))
}

/// Up to four characters following a failed escape, for error messages.
fn rest_preview<I>(chars: &std::iter::Peekable<I>) -> String
where
    I: Iterator<Item = char> + Clone,
{
    chars.clone().take(4).collect()
}

/// Error for a malformed escape sequence.
fn invalid_escape(sequence: &str) -> LiteralError {
    LiteralError::InvalidEscape { sequence: sequence.to_string() }
}
