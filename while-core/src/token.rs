//! Token vocabulary of the While language.

use core::fmt;

use crate::span::Span;

/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    // Delimiters
    BraceL, // {
    BraceR, // }
    ParenL, // (
    ParenR, // )

    // Keywords
    And,
    Or,
    Not,
    Bool,
    Int,
    True,
    False,
    Return,
    If,   // reserved, never produced by the lexer
    Else, // reserved, never produced by the lexer
    While,

    // Misc
    Sym,
    Lit,
    Eof,

    // Operators
    Add,       // +
    Sub,       // -
    Mul,       // *
    Eq,        // ==
    Ne,        // !=
    Lt,        // <
    Le,        // <=
    Gt,        // >
    Ge,        // >=
    Assign,    // =
    Semicolon, // ;
}

impl Tag {
    /// Canonical spelling used in diagnostics and in printed source.
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::BraceL => "{",
            Tag::BraceR => "}",
            Tag::ParenL => "(",
            Tag::ParenR => ")",
            Tag::And => "and",
            Tag::Or => "or",
            Tag::Not => "not",
            Tag::Bool => "bool",
            Tag::Int => "int",
            Tag::True => "true",
            Tag::False => "false",
            Tag::Return => "return",
            Tag::If => "if",
            Tag::Else => "else",
            Tag::While => "while",
            Tag::Sym => "<identifier>",
            Tag::Lit => "<literal>",
            Tag::Eof => "<end of file>",
            Tag::Add => "+",
            Tag::Sub => "-",
            Tag::Mul => "*",
            Tag::Eq => "==",
            Tag::Ne => "!=",
            Tag::Lt => "<",
            Tag::Le => "<=",
            Tag::Gt => ">",
            Tag::Ge => ">=",
            Tag::Assign => "=",
            Tag::Semicolon => ";",
        }
    }

    /// Map an identifier-shaped word to its keyword tag.
    pub fn keyword(word: &str) -> Option<Tag> {
        Some(match word {
            "and" => Tag::And,
            "or" => Tag::Or,
            "not" => Tag::Not,
            "bool" => Tag::Bool,
            "int" => Tag::Int,
            "true" => Tag::True,
            "false" => Tag::False,
            "return" => Tag::Return,
            "while" => Tag::While,
            _ => return None,
        })
    }

    pub fn is_type(self) -> bool {
        matches!(self, Tag::Bool | Tag::Int)
    }

    pub fn is_arith(self) -> bool {
        matches!(self, Tag::Add | Tag::Sub | Tag::Mul)
    }

    pub fn is_rel(self) -> bool {
        matches!(
            self,
            Tag::Eq | Tag::Ne | Tag::Lt | Tag::Le | Tag::Gt | Tag::Ge
        )
    }

    /// Binary logical operators; `not` is unary only.
    pub fn is_logic(self) -> bool {
        matches!(self, Tag::And | Tag::Or)
    }

    pub fn is_bin_op(self) -> bool {
        self.is_arith() || self.is_rel() || self.is_logic()
    }

    pub fn is_unary(self) -> bool {
        matches!(self, Tag::Add | Tag::Sub | Tag::Not)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload carried by identifier and literal tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenValue {
    None,
    Sym(String),
    Int(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub span: Span,
    pub tag: Tag,
    pub value: TokenValue,
}

impl Token {
    pub fn new(span: Span, tag: Tag) -> Self {
        Token {
            span,
            tag,
            value: TokenValue::None,
        }
    }

    pub fn sym(span: Span, name: impl Into<String>) -> Self {
        Token {
            span,
            tag: Tag::Sym,
            value: TokenValue::Sym(name.into()),
        }
    }

    pub fn lit(span: Span, value: i64) -> Self {
        Token {
            span,
            tag: Tag::Lit,
            value: TokenValue::Int(value),
        }
    }

    pub fn isa(&self, tag: Tag) -> bool {
        self.tag == tag
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            TokenValue::Sym(name) => f.write_str(name),
            TokenValue::Int(value) => write!(f, "{value}"),
            TokenValue::None => f.write_str(self.tag.as_str()),
        }
    }
}
