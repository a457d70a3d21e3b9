//! A module implementing lexical analysis (tokenization) for the Jobs language.
//!
//! The lexer is a list of `(pattern, kind)` rules tried in order against the
//! unconsumed rest of the line. The first rule that matches wins; there is no
//! longest-match. Rules derived from the installed commands come first, then
//! the built-in ones: quoted content, the `with` connective, whitespace
//! (skipped) and unquoted content.
//!
//! Because of first-match, a command spelling also wins at the start of a
//! longer unquoted literal when a non-word character follows it: `log-file`
//! lexes as the command `log` followed by the content `-file`. Quote the
//! literal to avoid this.

use crate::error::{JobsError, RegistryError, Result};
use crate::registry::Registry;
use regex::Regex;
use std::fmt;

/// Category of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// One of the installed verbs, identified by its internal tag.
    Command(String),
    /// A literal, quoted (quotes still attached) or unquoted.
    Content,
    /// The `with` connective.
    With,
}

impl TokenKind {
    /// Lower-case label used in error messages, e.g. `content` or `show`.
    pub fn label(&self) -> String {
        match self {
            TokenKind::Command(tag) => tag.to_lowercase(),
            TokenKind::Content => "content".to_string(),
            TokenKind::With => "with".to_string(),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Command(tag) => write!(f, "{tag}"),
            TokenKind::Content => write!(f, "CONTENT"),
            TokenKind::With => write!(f, "WITH"),
        }
    }
}

/// Represents a token resulting from lexical analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// The matched text, exactly as typed.
    pub value: String,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.value)
    }
}

struct Rule {
    /// Anchored at the start of the remaining input.
    pattern: Regex,
    /// `None` means "match and discard".
    kind: Option<TokenKind>,
}

impl Rule {
    fn new(pattern: &str, kind: Option<TokenKind>) -> std::result::Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(&format!("^(?:{pattern})"))?,
            kind,
        })
    }
}

const BUILTIN_RULES: [(&str, Option<TokenKind>); 4] = [
    (r#""[^"]*""#, Some(TokenKind::Content)),
    (r"\bwith\b", Some(TokenKind::With)),
    (r"\s+", None),
    (r"\S+", Some(TokenKind::Content)),
];

/// Ordered rule list assembled from a [`Registry`].
pub struct Lexer {
    rules: Vec<Rule>,
}

impl Lexer {
    /// Build the rule list: one rule per command, in registration order, then
    /// the built-in rules.
    pub fn new(registry: &Registry) -> std::result::Result<Self, RegistryError> {
        let mut rules = Vec::with_capacity(registry.len() + BUILTIN_RULES.len());

        for command in registry.all() {
            let kind = Some(TokenKind::Command(command.name().to_string()));
            let rule = Rule::new(&command.match_pattern(), kind).map_err(|source| {
                RegistryError::InvalidPattern {
                    name: command.name().to_string(),
                    source,
                }
            })?;
            rules.push(rule);
        }

        for (pattern, kind) in BUILTIN_RULES {
            let rule = Rule::new(pattern, kind).map_err(|source| RegistryError::InvalidPattern {
                name: "builtin".to_string(),
                source,
            })?;
            rules.push(rule);
        }

        Ok(Self { rules })
    }

    /// Split `input` into tokens.
    ///
    /// Whitespace is dropped, quoted content keeps its quotes. An empty input
    /// gives an empty list. Fails with a syntax error naming the offending
    /// character when no rule matches.
    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>> {
        let mut out = Vec::new();
        let mut rest = input;

        while let Some(ch) = rest.chars().next() {
            let (len, kind) = self
                .match_prefix(rest)
                .ok_or_else(|| JobsError::syntax(format!("unexpected symbol '{ch}'")))?;

            if let Some(kind) = kind {
                out.push(Token::new(kind.clone(), &rest[..len]));
            }
            rest = &rest[len..];
        }

        Ok(out)
    }

    /// First rule that consumes at least one character of `rest`.
    fn match_prefix(&self, rest: &str) -> Option<(usize, &Option<TokenKind>)> {
        self.rules.iter().find_map(|rule| {
            rule.pattern
                .find(rest)
                .filter(|m| !m.is_empty())
                .map(|m| (m.end(), &rule.kind))
        })
    }
}
