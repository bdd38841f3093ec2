//! Parser for the message format grammar.
//!
//! ```text
//! message  := (text | '{' element '}')*
//! element  := id
//!           | id ',' 'select' ',' cases
//!           | id ',' ('plural' | 'selectordinal') ',' ['offset:' N] cases
//! cases    := (key '{' message '}')+        -- `other` is required
//! ```
//!
//! Inside a plural body `#` stands for the (offset) number. A backslash
//! escapes `{`, `}`, `#` and itself, and `\uHHHH` names a character.

use super::FormatError;

/// A parsed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Literal(String),
    Argument(String),
    Select { argument: String, cases: Vec<Case> },
    Plural { argument: String, offset: u32, ordinal: bool, cases: Vec<Case> },
    /// `#` inside a plural case
    Octothorpe,
}

/// One branch of a select or plural element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    pub key: CaseKey,
    /// Message shown when the case is selected.
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseKey {
    /// `=N`, compared against the value before the offset is applied
    Exact(u32),
    /// A select value or plural category; `other` is the fallback
    Named(String),
}

impl CaseKey {
    /// The mandatory fallback case.
    fn is_other(&self) -> bool {
        matches!(self, Self::Named(name) if name == "other")
    }
}

/// Parses `source`.
///
/// # Errors
/// Returns a `SyntaxError` with the 1-indexed line and column of the first
/// unexpected character.
pub fn parse(source: &str) -> Result<Message, FormatError> {
    let mut parser = Parser { chars: source.chars().collect(), pos: 0 };
    let elements = parser.message(false, false)?;
    Ok(Message { elements })
}

/// Recursive descent state over the characters of a message.
struct Parser {
    /// Source characters.
    chars: Vec<char>,
    /// Index into `chars` of the next character.
    pos: usize,
}

impl Parser {
    /// Character at the current position.
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Advances past whitespace.
    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    /// Whether `text` follows at the current position.
    fn starts_with(&self, text: &str) -> bool {
        text.chars().enumerate().all(|(offset, ch)| self.chars.get(self.pos + offset) == Some(&ch))
    }

    /// Consumes `expected` or fails on whatever is there.
    fn expect(&mut self, expected: char) -> Result<(), FormatError> {
        if self.peek() == Some(expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(&format!("\"{expected}\"")))
        }
    }

    /// Error for the character at the current position.
    fn unexpected(&self, expected: &str) -> FormatError {
        let found =
            self.peek().map_or_else(|| "end of input".to_string(), |ch| format!("\"{ch}\""));
        self.error_at(self.pos, format!("Expected {expected} but {found} found."))
    }

    /// Syntax error at `pos`, with a 1-indexed line and column.
    fn error_at(&self, pos: usize, message: String) -> FormatError {
        let mut line = 1;
        let mut column = 1;
        for ch in self.chars.iter().take(pos) {
            if *ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        FormatError::syntax(message, line, column)
    }

    /// Text and elements up to the end of input (top level) or the closing
    /// `}` of a case (nested), which is left unconsumed.
    fn message(&mut self, in_plural: bool, nested: bool) -> Result<Vec<Element>, FormatError> {
        let mut elements = Vec::new();
        let mut text = String::new();
        loop {
            match self.peek() {
                None if nested => return Err(self.unexpected("\"}\"")),
                None => break,
                Some('}') if nested => break,
                Some('}') => return Err(self.unexpected("\"{\" or text")),
                Some('{') => {
                    self.pos += 1;
                    flush_literal(&mut elements, &mut text);
                    elements.push(self.element(in_plural)?);
                }
                Some('#') if in_plural => {
                    self.pos += 1;
                    flush_literal(&mut elements, &mut text);
                    elements.push(Element::Octothorpe);
                }
                Some('\\') => {
                    self.pos += 1;
                    text.push_str(&self.escape());
                }
                Some(ch) => {
                    self.pos += 1;
                    text.push(ch);
                }
            }
        }
        flush_literal(&mut elements, &mut text);
        Ok(elements)
    }

    /// The text of an escape, positioned after the backslash.
    fn escape(&mut self) -> String {
        match self.peek() {
            Some(ch @ ('{' | '}' | '#' | '\\')) => {
                self.pos += 1;
                ch.to_string()
            }
            Some('u') => {
                let digits: String = self.chars.iter().skip(self.pos + 1).take(4).collect();
                let decoded = (digits.chars().count() == 4)
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match decoded {
                    Some(ch) => {
                        self.pos += 5;
                        ch.to_string()
                    }
                    None => "\\".to_string(),
                }
            }
            _ => "\\".to_string(),
        }
    }

    /// An element, positioned after its opening `{`; consumes the closing `}`.
    fn element(&mut self, in_plural: bool) -> Result<Element, FormatError> {
        self.skip_whitespace();
        let argument = self.identifier();
        if argument.is_empty() {
            return Err(self.unexpected("argument name"));
        }
        self.skip_whitespace();
        match self.peek() {
            Some('}') => {
                self.pos += 1;
                return Ok(Element::Argument(argument));
            }
            Some(',') => self.pos += 1,
            _ => return Err(self.unexpected("\"}\" or \",\"")),
        }

        self.skip_whitespace();
        let type_pos = self.pos;
        let format_type = self.identifier();
        self.skip_whitespace();
        let element = match format_type.as_str() {
            "select" => {
                self.expect(',')?;
                let cases = self.cases(in_plural, false)?;
                Element::Select { argument, cases }
            }
            "plural" | "selectordinal" => {
                self.expect(',')?;
                self.skip_whitespace();
                let offset = self.offset()?;
                let cases = self.cases(true, true)?;
                Element::Plural { argument, offset, ordinal: format_type == "selectordinal", cases }
            }
            "" => return Err(self.unexpected("format type")),
            other => {
                return Err(self.error_at(type_pos, format!("Unsupported format type \"{other}\".")));
            }
        };
        Ok(element)
    }

    /// Optional `offset:N` of a plural element.
    fn offset(&mut self) -> Result<u32, FormatError> {
        if !self.starts_with("offset:") {
            return Ok(0);
        }
        self.pos += "offset:".len();
        self.skip_whitespace();
        let offset = self.number().ok_or_else(|| self.unexpected("offset number"))?;
        Ok(offset)
    }

    /// A run of ASCII digits, `None` if there is none or it overflows.
    fn number(&mut self) -> Option<u32> {
        let digits: String =
            self.chars.iter().skip(self.pos).take_while(|c| c.is_ascii_digit()).collect();
        let value = digits.parse().ok()?;
        self.pos += digits.len();
        Some(value)
    }

    /// Letters, digits, `_` and `$`; possibly empty.
    fn identifier(&mut self) -> String {
        let mut id = String::new();
        while let Some(ch) = self.peek().filter(|c| c.is_alphanumeric() || matches!(c, '_' | '$')) {
            self.pos += 1;
            id.push(ch);
        }
        id
    }

    /// The cases of a select or plural element and its closing `}`.
    fn cases(&mut self, in_plural: bool, allow_exact: bool) -> Result<Vec<Case>, FormatError> {
        let mut cases = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('}') if !cases.is_empty() => {
                    let close = self.pos;
                    self.pos += 1;
                    if !cases.iter().any(|case: &Case| case.key.is_other()) {
                        return Err(self.error_at(close, "Missing \"other\" case.".to_string()));
                    }
                    return Ok(cases);
                }
                Some('=') if allow_exact => {
                    self.pos += 1;
                    let value = self.number().ok_or_else(|| self.unexpected("number"))?;
                    let elements = self.case_body(in_plural)?;
                    cases.push(Case { key: CaseKey::Exact(value), elements });
                }
                _ => {
                    let key = self.identifier();
                    if key.is_empty() {
                        return Err(self.unexpected("case key"));
                    }
                    let elements = self.case_body(in_plural)?;
                    cases.push(Case { key: CaseKey::Named(key), elements });
                }
            }
        }
    }

    /// `{ message }` of one case.
    fn case_body(&mut self, in_plural: bool) -> Result<Vec<Element>, FormatError> {
        self.skip_whitespace();
        self.expect('{')?;
        let elements = self.message(in_plural, true)?;
        self.expect('}')?;
        Ok(elements)
    }
}

/// Moves pending text into `elements` as one literal.
fn flush_literal(elements: &mut Vec<Element>, text: &mut String) {
    if !text.is_empty() {
        elements.push(Element::Literal(std::mem::take(text)));
    }
}
