//! Precompiles parsed messages into JavaScript function source.

use std::fmt::Write as _;

use super::parser::{
    Case,
    CaseKey,
    Element,
    Message,
};

/// Returns `function(d){ ... }` source building the message text from the
/// argument object `d`. Plural categories are resolved at runtime through
/// `MessageFormat.locale[language]`.
#[must_use]
pub fn precompile(message: &Message, language: &str) -> String {
    let mut generator = Generator { language, plural_count: 0, out: String::new() };
    generator.out.push_str("function(d){\nvar r = \"\";\n");
    generator.elements(&message.elements, None);
    generator.out.push_str("return r;\n}");
    generator.out
}

/// Quotes text as a script string literal.
fn quote(text: &str) -> String {
    // JSON strings are valid script string literals
    serde_json::Value::from(text).to_string()
}

/// Output buffer plus the counter naming plural variables.
struct Generator<'a> {
    /// Language whose plural rules the generated code calls.
    language: &'a str,
    /// Plural elements emitted so far, for distinct variable names.
    plural_count: usize,
    /// Generated source.
    out: String,
}

impl Generator<'_> {
    /// Emits statements appending `elements` to `r`. `plural` is the index of
    /// the innermost enclosing plural, which `#` refers to.
    fn elements(&mut self, elements: &[Element], plural: Option<usize>) {
        for element in elements {
            match element {
                Element::Literal(text) => {
                    let _ = writeln!(self.out, "r += {};", quote(text));
                }
                Element::Argument(argument) => {
                    let _ = writeln!(self.out, "d = d || {{}};\nr += d[{}];", quote(argument));
                }
                Element::Octothorpe => match plural {
                    Some(index) => {
                        let _ = writeln!(self.out, "r += (k_{index} - off_{index});");
                    }
                    None => self.out.push_str("r += \"#\";\n"),
                },
                Element::Select { argument, cases } => self.select(argument, cases, plural),
                Element::Plural { argument, offset, ordinal, cases } => {
                    self.plural(argument, *offset, *ordinal, cases);
                }
            }
        }
    }

    /// `switch` over the string value of `argument`.
    fn select(&mut self, argument: &str, cases: &[Case], plural: Option<usize>) {
        let _ = writeln!(self.out, "d = d || {{}};\nswitch (String(d[{}])) {{", quote(argument));
        self.switch_cases(cases, plural);
        self.out.push_str("}\n");
    }

    /// Exact cases first, then the plural category of the offset count.
    fn plural(&mut self, argument: &str, offset: u32, ordinal: bool, cases: &[Case]) {
        self.plural_count += 1;
        let index = self.plural_count;
        let _ = writeln!(
            self.out,
            "d = d || {{}};\nvar k_{index} = d[{}];\nvar off_{index} = {offset};",
            quote(argument)
        );

        let mut exact_cases = 0;
        for case in cases {
            if let CaseKey::Exact(value) = case.key {
                let _ = writeln!(self.out, "if (k_{index} === {value}) {{");
                self.elements(&case.elements, Some(index));
                self.out.push_str("} else ");
                exact_cases += 1;
            }
        }
        if exact_cases > 0 {
            self.out.push_str("{\n");
        }

        let ordinal_arg = if ordinal { ", true" } else { "" };
        let _ = writeln!(
            self.out,
            "switch (MessageFormat.locale[{}](k_{index} - off_{index}{ordinal_arg})) {{",
            quote(self.language)
        );
        self.switch_cases(cases, Some(index));
        self.out.push_str("}\n");

        if exact_cases > 0 {
            self.out.push_str("}\n");
        }
    }

    /// Named cases as `case` labels, `other` as `default`. Exact cases are
    /// handled by the caller.
    fn switch_cases(&mut self, cases: &[Case], plural: Option<usize>) {
        let mut other = None;
        for case in cases {
            match &case.key {
                CaseKey::Named(name) if name == "other" => other = Some(case),
                CaseKey::Named(name) => {
                    let _ = writeln!(self.out, "case {}:", quote(name));
                    self.elements(&case.elements, plural);
                    self.out.push_str("break;\n");
                }
                CaseKey::Exact(_) => {}
            }
        }
        if let Some(case) = other {
            self.out.push_str("default:\n");
            self.elements(&case.elements, plural);
        }
    }
}
