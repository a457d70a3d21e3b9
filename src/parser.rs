use crate::error::{JobsError, Result};
use crate::lexer::{Token, TokenKind};
use crate::registry::Registry;
use std::fmt;

/// AST node for the Jobs language
///
/// A line parses into a statement: a command applied to zero or more
/// argument leaves. Only statements have children and only leaves carry a
/// value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstNode {
    /// A **statement**: the internal tag of a command and its ordered arguments.
    Command {
        name: String,
        /// Always [`AstNode::Content`] leaves.
        arguments: Vec<AstNode>,
    },

    /// An **argument leaf** holding an unquoted literal.
    Content(String),
}

impl AstNode {
    /// Tag of the node: the command's internal name, or `CONTENT` for a leaf.
    pub fn tag(&self) -> &str {
        match self {
            AstNode::Command { name, .. } => name,
            AstNode::Content(_) => "CONTENT",
        }
    }

    /// Literal value of a leaf; statements have none.
    pub fn value(&self) -> Option<&str> {
        match self {
            AstNode::Command { .. } => None,
            AstNode::Content(value) => Some(value),
        }
    }

    /// Argument leaves of a statement; leaves have none.
    pub fn children(&self) -> &[AstNode] {
        match self {
            AstNode::Command { arguments, .. } => arguments,
            AstNode::Content(_) => &[],
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result {
        write!(f, "{}{}", "  ".repeat(level), self.tag())?;
        if let Some(value) = self.value() {
            write!(f, ": {value}")?;
        }
        for child in self.children() {
            writeln!(f)?;
            child.fmt_indented(f, level + 1)?;
        }
        Ok(())
    }
}

/// Indented tree, two spaces per level.
impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

struct AstBuilder<'r> {
    tokens: Vec<Token>,
    pos: usize,
    registry: &'r Registry,
}

impl<'r> AstBuilder<'r> {
    fn new(tokens: Vec<Token>, registry: &'r Registry) -> Self {
        AstBuilder {
            tokens,
            pos: 0,
            registry,
        }
    }

    fn build_ast(mut self) -> Result<Vec<AstNode>> {
        let statements = vec![self.parse_statement()?];

        // One statement per line: anything left over is garbage.
        if let Some(token) = self.peek() {
            return Err(JobsError::syntax(format!("unexpected token {}", token.value)));
        }

        Ok(statements)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Parse a statement: COMMAND (CONTENT (WITH CONTENT)*)?
    fn parse_statement(&mut self) -> Result<AstNode> {
        let name = match self.consume() {
            Some(Token {
                kind: TokenKind::Command(tag),
                ..
            }) if self.registry.lookup(&tag).is_some() => tag,
            _ => return Err(JobsError::syntax("unknown command")),
        };

        let mut arguments = Vec::new();
        let Some(next) = self.peek() else {
            return Ok(AstNode::Command { name, arguments });
        };
        if next.kind != TokenKind::Content {
            return Err(JobsError::syntax(format!(
                "unexpected {} after command. It should be nothing or some content",
                next.kind.label()
            )));
        }
        arguments.push(self.parse_content()?);

        while let Some(token) = self.consume() {
            if token.kind != TokenKind::With {
                return Err(JobsError::syntax(format!(
                    "unexpected {} after content. It should be nothing or \"with\"",
                    token.kind.label()
                )));
            }
            arguments.push(self.parse_content()?);
        }

        Ok(AstNode::Command { name, arguments })
    }

    /// Parse a CONTENT token into an argument leaf, stripping one pair of quotes.
    fn parse_content(&mut self) -> Result<AstNode> {
        match self.consume() {
            Some(Token {
                kind: TokenKind::Content,
                value,
            }) => Ok(AstNode::Content(unquote(&value).to_string())),
            Some(token) => Err(JobsError::syntax(format!(
                "unexpected {} after \"with\". It should be some content",
                token.kind.label()
            ))),
            None => Err(JobsError::syntax(
                "unexpected end of line after \"with\". It should be some content",
            )),
        }
    }
}

/// Remove one leading and one trailing `"` when both are present.
fn unquote(literal: &str) -> &str {
    literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(literal)
}

/// Constructs the statement list of one line from its tokens.
///
/// The first token must be a command installed in `registry`; it may be
/// followed by content arguments chained with `with`. Argument counts are not
/// checked here, that is up to each command.
pub fn construct_ast(tokens: Vec<Token>, registry: &Registry) -> Result<Vec<AstNode>> {
    AstBuilder::new(tokens, registry).build_ast()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandDescriptor, Value};

    fn registry() -> Registry {
        Registry::from_descriptors([
            CommandDescriptor::from_fn("LOG", &["log"], |_, _, _| Ok(Value::Bool(true))),
            CommandDescriptor::from_fn("EXIT", &["exit"], |_, _, _| Ok(Value::Bool(true))),
        ])
        .unwrap()
    }

    fn cmd(tag: &str) -> Token {
        Token::new(TokenKind::Command(tag.to_string()), tag.to_lowercase())
    }

    fn content(s: &str) -> Token {
        Token::new(TokenKind::Content, s)
    }

    fn with() -> Token {
        Token::new(TokenKind::With, "with")
    }

    fn lit(s: &str) -> AstNode {
        AstNode::Content(s.to_string())
    }

    #[test]
    fn test_zero_argument_command() {
        let ast = construct_ast(vec![cmd("EXIT")], &registry()).unwrap();
        assert_eq!(
            ast,
            vec![AstNode::Command {
                name: "EXIT".to_string(),
                arguments: vec![],
            }]
        );
    }

    #[test]
    fn test_arguments_chained_with_with() {
        let tokens = vec![cmd("LOG"), content("\"a\""), with(), content("\"b\"")];
        let ast = construct_ast(tokens, &registry()).unwrap();

        assert_eq!(ast.len(), 1);
        assert_eq!(ast[0].tag(), "LOG");
        assert_eq!(ast[0].children(), &[lit("a"), lit("b")]);
    }

    #[test]
    fn test_unquoted_content_is_kept_verbatim() {
        let tokens = vec![cmd("LOG"), content("files"), with(), content("\"\"")];
        let ast = construct_ast(tokens, &registry()).unwrap();
        assert_eq!(ast[0].children(), &[lit("files"), lit("")]);
    }

    #[test]
    fn test_unquote_only_strips_a_full_pair() {
        assert_eq!(unquote("\"abc\""), "abc");
        assert_eq!(unquote("\"abc"), "\"abc");
        assert_eq!(unquote("abc\""), "abc\"");
        assert_eq!(unquote("\"\"a\"\""), "\"a\"");
        assert_eq!(unquote("\""), "\"");
    }

    #[test]
    fn test_empty_token_stream_is_unknown_command() {
        let err = construct_ast(vec![], &registry()).unwrap_err();
        assert_eq!(err, JobsError::syntax("unknown command"));
    }

    #[test]
    fn test_leading_content_is_unknown_command() {
        let err = construct_ast(vec![content("hello")], &registry()).unwrap_err();
        assert_eq!(err, JobsError::syntax("unknown command"));
    }

    #[test]
    fn test_unregistered_command_tag_is_unknown_command() {
        let err = construct_ast(vec![cmd("SHOW")], &registry()).unwrap_err();
        assert_eq!(err, JobsError::syntax("unknown command"));
    }

    #[test]
    fn test_command_followed_by_with_is_rejected() {
        let err = construct_ast(vec![cmd("LOG"), with(), content("a")], &registry()).unwrap_err();
        assert!(matches!(err, JobsError::Syntax(ref m) if m.starts_with("unexpected with")));
    }

    #[test]
    fn test_missing_with_between_contents() {
        let tokens = vec![cmd("LOG"), content("\"a\""), content("\"b\"")];
        let err = construct_ast(tokens, &registry()).unwrap_err();
        assert!(matches!(err, JobsError::Syntax(ref m) if m.contains("\"with\"")));
    }

    #[test]
    fn test_dangling_with() {
        let tokens = vec![cmd("LOG"), content("a"), with()];
        let err = construct_ast(tokens, &registry()).unwrap_err();
        assert!(matches!(err, JobsError::Syntax(ref m) if m.contains("end of line")));
    }

    #[test]
    fn test_second_command_is_rejected() {
        let tokens = vec![cmd("LOG"), content("a"), with(), cmd("EXIT")];
        let err = construct_ast(tokens, &registry()).unwrap_err();
        assert!(matches!(err, JobsError::Syntax(ref m) if m.starts_with("unexpected exit")));
    }

    #[test]
    fn test_display_renders_indented_tree() {
        let node = AstNode::Command {
            name: "LOG".to_string(),
            arguments: vec![lit("a"), lit("b")],
        };
        assert_eq!(node.to_string(), "LOG\n  CONTENT: a\n  CONTENT: b");
    }
}
