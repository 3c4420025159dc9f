//! Types of While values.
//!
//! There are two real types, `int` and `bool`. `Unknown` is given to
//! expressions whose type could not be determined because an error was
//! already reported; it is compatible with every type so one mistake does
//! not produce a chain of follow-up diagnostics.

use core::fmt;

use crate::token::Tag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Bool,
    Unknown,
}

impl Type {
    /// Type named by a type keyword tag.
    pub fn from_tag(tag: Tag) -> Option<Type> {
        match tag {
            Tag::Int => Some(Type::Int),
            Tag::Bool => Some(Type::Bool),
            _ => None,
        }
    }

    pub fn is_unknown(self) -> bool {
        matches!(self, Type::Unknown)
    }

    /// Whether a value of type `self` is acceptable where `expected` is
    /// required. `Unknown` on either side always matches.
    pub fn matches(self, expected: Type) -> bool {
        self.is_unknown() || expected.is_unknown() || self == expected
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Type::Int => "int",
            Type::Bool => "bool",
            Type::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
