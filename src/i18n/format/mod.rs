//! ICU-style message formatting.
//!
//! [`MessageFormatter`] renders a pattern (see [`parser`] for the syntax)
//! against named or positional [`Args`]. Numbers are formatted with the
//! locale's separators, plural branches are chosen with CLDR rules.

pub mod number;
pub mod parser;
pub mod plural;

use crate::i18n::{FormatError, Locale};
use parser::{ArgumentKind, Node, NumberStyle, PluralSelector};
use plural::PluralRulesCache;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single argument value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl ArgValue {
    /// Numeric value; strings are accepted when they parse as a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArgValue::Int(i) => Some(*i as f64),
            ArgValue::Float(f) => Some(*f),
            ArgValue::Str(s) => s.trim().parse().ok(),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Str(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Str(value)
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        ArgValue::Int(value)
    }
}

impl From<i32> for ArgValue {
    fn from(value: i32) -> Self {
        ArgValue::Int(value.into())
    }
}

impl From<u32> for ArgValue {
    fn from(value: u32) -> Self {
        ArgValue::Int(value.into())
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        ArgValue::Float(value)
    }
}

/// Named message arguments. Positional arguments use the names `"0"`, `"1"`, ...
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Args(BTreeMap<String, ArgValue>);

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Positional arguments, addressed as `{0}`, `{1}`, ...
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ArgValue>,
    {
        Args(
            values
                .into_iter()
                .enumerate()
                .map(|(i, value)| (i.to_string(), value.into()))
                .collect(),
        )
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ArgValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.0.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Renders message patterns. Keeps plural rules per language between calls.
#[derive(Debug, Default)]
pub struct MessageFormatter {
    plurals: PluralRulesCache,
}

impl MessageFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn format(
        &mut self,
        locale: &Locale,
        pattern: &str,
        args: &Args,
    ) -> Result<String, FormatError> {
        let nodes = parser::parse(pattern)?;
        let mut out = String::with_capacity(pattern.len());
        self.render(locale, &nodes, args, None, &mut out)?;
        Ok(out)
    }

    /// Render `nodes`; `pound` is the formatted number of the innermost plural.
    fn render(
        &mut self,
        locale: &Locale,
        nodes: &[Node],
        args: &Args,
        pound: Option<&str>,
        out: &mut String,
    ) -> Result<(), FormatError> {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Pound => out.push_str(pound.unwrap_or("#")),
                Node::Argument { name, kind } => {
                    let value = args
                        .get(name)
                        .ok_or_else(|| FormatError::MissingArgument(name.clone()))?;
                    self.render_argument(locale, name, kind, value, args, pound, out)?;
                }
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn render_argument(
        &mut self,
        locale: &Locale,
        name: &str,
        kind: &ArgumentKind,
        value: &ArgValue,
        args: &Args,
        pound: Option<&str>,
        out: &mut String,
    ) -> Result<(), FormatError> {
        match kind {
            ArgumentKind::Simple => match value {
                ArgValue::Str(s) => out.push_str(s),
                ArgValue::Int(i) => out.push_str(&number::format_integer(locale, *i)),
                ArgValue::Float(f) => out.push_str(&number::format_number(locale, *f, 3)),
            },
            ArgumentKind::Number(style) => {
                let n = numeric(name, value)?;
                let formatted = match style {
                    NumberStyle::Decimal => number::format_number(locale, n, 3),
                    NumberStyle::Integer => number::format_number(locale, n, 0),
                    NumberStyle::Percent => number::format_percent(locale, n),
                };
                out.push_str(&formatted);
            }
            ArgumentKind::Plural { offset, branches } => {
                let n = numeric(name, value)?;
                let adjusted = n - *offset as f64;

                let exact = branches.iter().find(|(selector, _)| {
                    matches!(selector, PluralSelector::Exact(v) if *v as f64 == n)
                });
                let branch = match exact {
                    Some((_, body)) => body,
                    None => {
                        let category = self.plurals.category(locale.language_code(), adjusted);
                        select_branch(branches, category)?
                    }
                };

                let formatted = number::format_number(locale, adjusted, 3);
                self.render(locale, branch, args, Some(&formatted), out)?;
            }
            ArgumentKind::Select { branches } => {
                let key = match value {
                    ArgValue::Str(s) => s.clone(),
                    ArgValue::Int(i) => i.to_string(),
                    ArgValue::Float(f) => f.to_string(),
                };
                let branch = branches
                    .iter()
                    .find(|(keyword, _)| *keyword == key)
                    .or_else(|| branches.iter().find(|(keyword, _)| keyword == "other"))
                    .map(|(_, body)| body)
                    .ok_or(FormatError::MissingOther("select"))?;
                self.render(locale, branch, args, pound, out)?;
            }
        }
        Ok(())
    }
}

fn numeric(name: &str, value: &ArgValue) -> Result<f64, FormatError> {
    value
        .as_f64()
        .ok_or_else(|| FormatError::NotANumber(name.to_string()))
}

fn select_branch<'a>(
    branches: &'a [(PluralSelector, Vec<Node>)],
    category: &str,
) -> Result<&'a Vec<Node>, FormatError> {
    let find = |wanted: &str| {
        branches.iter().find_map(|(selector, body)| match selector {
            PluralSelector::Category(c) if c == wanted => Some(body),
            _ => None,
        })
    };
    find(category)
        .or_else(|| find("other"))
        .ok_or(FormatError::MissingOther("plural"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn en() -> Locale {
        Locale::parse("en_US").unwrap()
    }

    fn de() -> Locale {
        Locale::parse("de_AT").unwrap()
    }

    fn format(locale: &Locale, pattern: &str, args: &Args) -> Result<String, FormatError> {
        MessageFormatter::new().format(locale, pattern, args)
    }

    // ==================== Placeholder Tests ====================

    #[test]
    fn test_named_placeholder() {
        let args = Args::new().with("name", "Richard");
        assert_eq!(format(&en(), "Hello {name}!", &args).unwrap(), "Hello Richard!");
    }

    #[test]
    fn test_positional_placeholders() {
        let args = Args::positional(["Brazil", "1985"]);
        assert_eq!(
            format(&en(), "{0} ({1})", &args).unwrap(),
            "Brazil (1985)"
        );
    }

    #[test]
    fn test_integer_placeholder_is_grouped() {
        let args = Args::new().with("votes", 12345);
        assert_eq!(format(&en(), "{votes} votes", &args).unwrap(), "12,345 votes");
        assert_eq!(format(&de(), "{votes} Stimmen", &args).unwrap(), "12.345 Stimmen");
    }

    #[test]
    fn test_missing_argument() {
        let result = format(&en(), "Hello {name}", &Args::new());
        assert_eq!(result, Err(FormatError::MissingArgument("name".into())));
    }

    #[test]
    fn test_extra_arguments_ignored() {
        let args = Args::new().with("unused", 1);
        assert_eq!(format(&en(), "Plain", &args).unwrap(), "Plain");
    }

    // ==================== Number Tests ====================

    #[test]
    fn test_number_styles() {
        let args = Args::new().with("n", 0.256);
        assert_eq!(format(&en(), "{n, number}", &args).unwrap(), "0.256");
        assert_eq!(format(&en(), "{n, number, integer}", &args).unwrap(), "0");
        assert_eq!(format(&en(), "{n, number, percent}", &args).unwrap(), "26%");
    }

    #[test]
    fn test_number_from_numeric_string() {
        let args = Args::new().with("n", "1500");
        assert_eq!(format(&de(), "{n, number}", &args).unwrap(), "1.500");
    }

    #[test]
    fn test_number_rejects_text() {
        let args = Args::new().with("n", "many");
        assert_eq!(
            format(&en(), "{n, number}", &args),
            Err(FormatError::NotANumber("n".into()))
        );
    }

    // ==================== Plural Tests ====================

    #[test]
    fn test_plural_english() {
        let pattern = "{count, plural, one{# movie} other{# movies}}";
        for (count, expected) in [
            (0, "0 movies"),
            (1, "1 movie"),
            (2, "2 movies"),
            (1000, "1,000 movies"),
        ] {
            let args = Args::new().with("count", count);
            assert_eq!(format(&en(), pattern, &args).unwrap(), expected);
        }
    }

    #[test]
    fn test_plural_exact_match_wins() {
        let pattern = "{count, plural, =0{No movies} one{One movie} other{# movies}}";
        let args = Args::new().with("count", 0);
        assert_eq!(format(&en(), pattern, &args).unwrap(), "No movies");
    }

    #[test]
    fn test_plural_offset() {
        let pattern = "{n, plural, offset:1 =0{nobody} =1{{host}} one{{host} and # other} other{{host} and # others}}";
        let args = |n: i64| Args::new().with("n", n).with("host", "Ana");
        assert_eq!(format(&en(), pattern, &args(0)).unwrap(), "nobody");
        assert_eq!(format(&en(), pattern, &args(1)).unwrap(), "Ana");
        assert_eq!(format(&en(), pattern, &args(2)).unwrap(), "Ana and 1 other");
        assert_eq!(format(&en(), pattern, &args(3)).unwrap(), "Ana and 2 others");
    }

    #[test]
    fn test_plural_fraction_uses_other() {
        let pattern = "{n, plural, one{# star} other{# stars}}";
        let args = Args::new().with("n", 1.5);
        assert_eq!(format(&en(), pattern, &args).unwrap(), "1.5 stars");
        assert_eq!(format(&de(), pattern, &args).unwrap(), "1,5 stars");
    }

    #[test]
    fn test_plural_falls_back_to_other() {
        // Russian "few" is not provided, so "other" is used
        let ru = Locale::parse("ru_RU").unwrap();
        let pattern = "{n, plural, one{# фильм} other{# фильмов}}";
        let args = Args::new().with("n", 3);
        assert_eq!(format(&ru, pattern, &args).unwrap(), "3 фильмов");
    }

    #[test]
    fn test_pound_with_quoting() {
        let pattern = "{n, plural, other{'#'# items}}";
        let args = Args::new().with("n", 4);
        assert_eq!(format(&en(), pattern, &args).unwrap(), "#4 items");
    }

    // ==================== Select Tests ====================

    #[test]
    fn test_select() {
        let pattern = "{gender, select, female{She} male{He} other{They}} directed it";
        let args = |g: &str| Args::new().with("gender", g);
        assert_eq!(format(&en(), pattern, &args("female")).unwrap(), "She directed it");
        assert_eq!(format(&en(), pattern, &args("male")).unwrap(), "He directed it");
        assert_eq!(format(&en(), pattern, &args("unknown")).unwrap(), "They directed it");
    }

    #[test]
    fn test_select_nested_in_plural() {
        let pattern = "{n, plural, one{{g, select, female{# actress} other{# actor}}} other{{g, select, female{# actresses} other{# actors}}}}";
        let args = Args::new().with("n", 2).with("g", "female");
        assert_eq!(format(&en(), pattern, &args).unwrap(), "2 actresses");
    }

    // ==================== Error Tests ====================

    #[test]
    fn test_malformed_pattern() {
        let result = format(&en(), "Hello {name", &Args::new().with("name", "x"));
        assert!(matches!(result, Err(FormatError::Syntax { .. })));
    }

    // ==================== Args Tests ====================

    #[test]
    fn test_args_deserialize_from_json() {
        let args: Args =
            serde_json::from_str(r#"{"name": "Ana", "count": 3, "rating": 4.5}"#).unwrap();
        assert_eq!(args.get("name"), Some(&ArgValue::Str("Ana".into())));
        assert_eq!(args.get("count"), Some(&ArgValue::Int(3)));
        assert_eq!(args.get("rating"), Some(&ArgValue::Float(4.5)));
        assert_eq!(args.len(), 3);
    }
}
