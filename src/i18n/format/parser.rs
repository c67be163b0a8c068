//! Parser for ICU-style message patterns.
//!
//! Supported syntax:
//!
//! ```text
//! message  := (text | '#' | '{' argument '}')*
//! argument := name
//!           | name ',' 'number' [',' ('integer' | 'percent' | 'decimal')]
//!           | name ',' 'plural' ',' ['offset:' int] (selector '{' message '}')+
//!           | name ',' 'select' ',' (keyword '{' message '}')+
//! selector := '=' int | keyword
//! ```
//!
//! `#` is only special inside a plural branch. Apostrophes quote syntax
//! characters the way ICU does: `''` is a literal apostrophe and `'{'` a
//! literal brace; a lone apostrophe before ordinary text is kept as is.

use crate::i18n::FormatError;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    /// `#` inside a plural branch
    Pound,
    Argument { name: String, kind: ArgumentKind },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentKind {
    Simple,
    Number(NumberStyle),
    Plural {
        offset: i64,
        branches: Vec<(PluralSelector, Vec<Node>)>,
    },
    Select {
        branches: Vec<(String, Vec<Node>)>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberStyle {
    Decimal,
    Integer,
    Percent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluralSelector {
    Exact(i64),
    Category(String),
}

/// Parse a pattern into nodes.
pub fn parse(pattern: &str) -> Result<Vec<Node>, FormatError> {
    let mut parser = Parser {
        chars: pattern.chars().collect(),
        pos: 0,
        depth: 0,
    };
    parser.message(false, false)
}

/// Names of all arguments referenced anywhere in a pattern.
pub fn argument_names(pattern: &str) -> Result<BTreeSet<String>, FormatError> {
    let nodes = parse(pattern)?;
    let mut names = BTreeSet::new();
    collect_names(&nodes, &mut names);
    Ok(names)
}

fn collect_names(nodes: &[Node], names: &mut BTreeSet<String>) {
    for node in nodes {
        if let Node::Argument { name, kind } = node {
            names.insert(name.clone());
            match kind {
                ArgumentKind::Plural { branches, .. } => {
                    branches.iter().for_each(|(_, body)| collect_names(body, names))
                }
                ArgumentKind::Select { branches } => {
                    branches.iter().for_each(|(_, body)| collect_names(body, names))
                }
                ArgumentKind::Simple | ArgumentKind::Number(_) => {}
            }
        }
    }
}

/// Deepest allowed nesting of arguments inside plural/select branches.
pub const MAX_NESTING: usize = 32;

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn error<T>(&self, message: impl Into<String>) -> Result<T, FormatError> {
        Err(FormatError::Syntax {
            position: self.pos,
            message: message.into(),
        })
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), FormatError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => self.error(format!("expected '{expected}', found '{c}'")),
            None => self.error(format!("expected '{expected}', found end of pattern")),
        }
    }

    /// Read a run of characters up to whitespace or a syntax character.
    fn word(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| !c.is_whitespace() && !matches!(c, '{' | '}' | ','))
        {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    /// Parse message text until end of input (top level) or an unconsumed `}` (nested).
    fn message(&mut self, in_plural: bool, nested: bool) -> Result<Vec<Node>, FormatError> {
        let mut nodes = Vec::new();
        let mut text = String::new();

        loop {
            match self.peek() {
                None if nested => return self.error("unterminated branch"),
                None => break,
                Some('}') if nested => break,
                Some('}') => return self.error("unmatched '}'"),
                Some('{') => {
                    flush(&mut text, &mut nodes);
                    self.pos += 1;
                    nodes.push(self.argument(in_plural)?);
                }
                Some('#') if in_plural => {
                    flush(&mut text, &mut nodes);
                    self.pos += 1;
                    nodes.push(Node::Pound);
                }
                Some('\'') => self.apostrophe(in_plural, &mut text),
                Some(c) => {
                    text.push(c);
                    self.pos += 1;
                }
            }
        }

        flush(&mut text, &mut nodes);
        Ok(nodes)
    }

    fn apostrophe(&mut self, in_plural: bool, text: &mut String) {
        let next = self.chars.get(self.pos + 1).copied();
        match next {
            Some('\'') => {
                text.push('\'');
                self.pos += 2;
            }
            Some('{') | Some('}') => self.quoted(text),
            Some('#') if in_plural => self.quoted(text),
            _ => {
                text.push('\'');
                self.pos += 1;
            }
        }
    }

    /// Copy quoted text literally up to the closing apostrophe (or end of input).
    fn quoted(&mut self, text: &mut String) {
        self.pos += 1;
        while let Some(c) = self.peek() {
            if c == '\'' {
                if self.chars.get(self.pos + 1) == Some(&'\'') {
                    text.push('\'');
                    self.pos += 2;
                    continue;
                }
                self.pos += 1;
                return;
            }
            text.push(c);
            self.pos += 1;
        }
    }

    /// Parse an argument; the opening `{` has been consumed.
    fn argument(&mut self, in_plural: bool) -> Result<Node, FormatError> {
        if self.depth >= MAX_NESTING {
            return self.error("nesting too deep");
        }
        self.depth += 1;
        let node = self.argument_body(in_plural);
        self.depth -= 1;
        node
    }

    fn argument_body(&mut self, in_plural: bool) -> Result<Node, FormatError> {
        self.skip_whitespace();
        let name = self.word();
        if name.is_empty() {
            return self.error("empty argument name");
        }
        self.skip_whitespace();

        let kind = match self.peek() {
            Some('}') => ArgumentKind::Simple,
            Some(',') => {
                self.pos += 1;
                self.skip_whitespace();
                let kind_pos = self.pos;
                let kind = self.word();
                self.skip_whitespace();
                match kind.as_str() {
                    "number" => ArgumentKind::Number(self.number_style()?),
                    "plural" => {
                        self.expect(',')?;
                        self.plural()?
                    }
                    "select" => {
                        self.expect(',')?;
                        self.select(in_plural)?
                    }
                    _ => {
                        self.pos = kind_pos;
                        return self.error(format!("unknown argument type '{kind}'"));
                    }
                }
            }
            Some(c) => return self.error(format!("unexpected '{c}' in argument '{name}'")),
            None => return self.error("unterminated argument"),
        };

        self.skip_whitespace();
        self.expect('}')?;
        Ok(Node::Argument { name, kind })
    }

    fn number_style(&mut self) -> Result<NumberStyle, FormatError> {
        if self.peek() != Some(',') {
            return Ok(NumberStyle::Decimal);
        }
        self.pos += 1;
        self.skip_whitespace();
        let style = self.word();
        match style.as_str() {
            "integer" => Ok(NumberStyle::Integer),
            "percent" => Ok(NumberStyle::Percent),
            "decimal" | "" => Ok(NumberStyle::Decimal),
            _ => self.error(format!("unknown number style '{style}'")),
        }
    }

    fn plural(&mut self) -> Result<ArgumentKind, FormatError> {
        let mut offset = 0;
        let mut branches = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('}') | None => break,
                _ => {}
            }

            let selector_pos = self.pos;
            let selector = self.word();
            if let Some(raw) = selector.strip_prefix("offset:") {
                offset = match raw.parse() {
                    Ok(value) => value,
                    Err(_) => {
                        self.pos = selector_pos;
                        return self.error(format!("invalid plural offset '{raw}'"));
                    }
                };
                continue;
            }

            let selector = match selector.strip_prefix('=') {
                Some(raw) => match raw.parse() {
                    Ok(value) => PluralSelector::Exact(value),
                    Err(_) => {
                        self.pos = selector_pos;
                        return self.error(format!("invalid exact selector '{selector}'"));
                    }
                },
                None if selector.is_empty() => return self.error("missing plural selector"),
                None => PluralSelector::Category(selector),
            };

            let body = self.branch(true)?;
            branches.push((selector, body));
        }

        let has_other = branches
            .iter()
            .any(|(selector, _)| matches!(selector, PluralSelector::Category(c) if c == "other"));
        if !has_other {
            return Err(FormatError::MissingOther("plural"));
        }

        Ok(ArgumentKind::Plural { offset, branches })
    }

    fn select(&mut self, in_plural: bool) -> Result<ArgumentKind, FormatError> {
        let mut branches = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('}') | None => break,
                _ => {}
            }

            let keyword = self.word();
            if keyword.is_empty() {
                return self.error("missing select keyword");
            }
            let body = self.branch(in_plural)?;
            branches.push((keyword, body));
        }

        if !branches.iter().any(|(keyword, _)| keyword == "other") {
            return Err(FormatError::MissingOther("select"));
        }

        Ok(ArgumentKind::Select { branches })
    }

    /// Parse `{ message }` of a plural/select branch.
    fn branch(&mut self, in_plural: bool) -> Result<Vec<Node>, FormatError> {
        self.skip_whitespace();
        self.expect('{')?;
        let body = self.message(in_plural, true)?;
        self.expect('}')?;
        Ok(body)
    }
}

fn flush(text: &mut String, nodes: &mut Vec<Node>) {
    if !text.is_empty() {
        nodes.push(Node::Text(std::mem::take(text)));
    }
}
