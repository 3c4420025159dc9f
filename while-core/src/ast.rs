//! Abstract syntax tree produced by the parser.
//!
//! The tree is immutable once built. Semantic annotations (resolved types and
//! bindings) live in a side table keyed by [`NodeId`], see
//! [`crate::typecheck::Semantics`].

use core::fmt;

use crate::span::Span;
use crate::token::Tag;
use crate::types::Type;

/// Identity of an expression or statement node, unique within one parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Creation-order counter of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Placeholder name for an identifier the parser could not find.
pub const ERROR_SYMBOL: &str = "<error>";

/// An identifier as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub span: Span,
}

impl Symbol {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Symbol {
            name: name.into(),
            span,
        }
    }

    pub fn error(span: Span) -> Self {
        Symbol::new(ERROR_SYMBOL, span)
    }

    pub fn is_error(&self) -> bool {
        self.name == ERROR_SYMBOL
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub span: Span,
    pub body: StmtList,
    pub ret: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StmtList {
    pub span: Span,
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stmt {
    pub id: NodeId,
    pub span: Span,
    pub kind: StmtKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StmtKind {
    Decl(Declaration),
    Assign(Assignment),
    While(While),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub decl: DeclId,
    pub ty: Type,
    pub name: Symbol,
    pub init: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub name: Symbol,
    pub init: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct While {
    pub cond: Expr,
    pub body: StmtList,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub id: NodeId,
    pub span: Span,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    Binary {
        lhs: Box<Expr>,
        op: BinOp,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
    },
    Bool(bool),
    Int(i64),
    Ident(Symbol),
    /// Stands in for an expression that failed to parse.
    Error,
}

/// Operand class of a binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpClass {
    Arith,
    Rel,
    Logic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinOp {
    pub fn from_tag(tag: Tag) -> Option<BinOp> {
        Some(match tag {
            Tag::Add => BinOp::Add,
            Tag::Sub => BinOp::Sub,
            Tag::Mul => BinOp::Mul,
            Tag::Eq => BinOp::Eq,
            Tag::Ne => BinOp::Ne,
            Tag::Lt => BinOp::Lt,
            Tag::Le => BinOp::Le,
            Tag::Gt => BinOp::Gt,
            Tag::Ge => BinOp::Ge,
            Tag::And => BinOp::And,
            Tag::Or => BinOp::Or,
            _ => return None,
        })
    }

    pub fn tag(self) -> Tag {
        match self {
            BinOp::Add => Tag::Add,
            BinOp::Sub => Tag::Sub,
            BinOp::Mul => Tag::Mul,
            BinOp::Eq => Tag::Eq,
            BinOp::Ne => Tag::Ne,
            BinOp::Lt => Tag::Lt,
            BinOp::Le => Tag::Le,
            BinOp::Gt => Tag::Gt,
            BinOp::Ge => Tag::Ge,
            BinOp::And => Tag::And,
            BinOp::Or => Tag::Or,
        }
    }

    pub fn class(self) -> OpClass {
        let tag = self.tag();
        if tag.is_arith() {
            OpClass::Arith
        } else if tag.is_rel() {
            OpClass::Rel
        } else {
            OpClass::Logic
        }
    }

    /// Required operand type and result type.
    pub fn signature(self) -> (Type, Type) {
        match self.class() {
            OpClass::Arith => (Type::Int, Type::Int),
            OpClass::Rel => (Type::Int, Type::Bool),
            OpClass::Logic => (Type::Bool, Type::Bool),
        }
    }

    pub fn as_str(self) -> &'static str {
        self.tag().as_str()
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Plus,
    Neg,
    Not,
}

impl UnOp {
    pub fn from_tag(tag: Tag) -> Option<UnOp> {
        match tag {
            Tag::Add => Some(UnOp::Plus),
            Tag::Sub => Some(UnOp::Neg),
            Tag::Not => Some(UnOp::Not),
            _ => None,
        }
    }

    /// Required operand type, which is also the result type.
    pub fn operand_type(self) -> Type {
        match self {
            UnOp::Not => Type::Bool,
            UnOp::Plus | UnOp::Neg => Type::Int,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UnOp::Plus => Tag::Add.as_str(),
            UnOp::Neg => Tag::Sub.as_str(),
            UnOp::Not => Tag::Not.as_str(),
        }
    }
}

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StmtList {
    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }
}
