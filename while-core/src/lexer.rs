//! Lexer for While.
//!
//! Tokens are produced on demand by [`Lexer::next_token`]. Every recognizer is
//! built from one primitive, [`Lexer::accept_if`], which peeks at the next
//! byte and either commits it or leaves the lexer untouched.
//!
//! Source text is a single-byte character set: each byte is one character.

use log::trace;

use crate::diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::span::{FileId, Pos, Span};
use crate::token::{Tag, Token};

pub struct Lexer<'src> {
    file: FileId,
    chars: &'src [u8],
    index: usize,
    /// Position of the next unread character.
    peek: Pos,
    /// Span of the token being recognized.
    begin: Pos,
    end: Pos,
    /// Characters accepted for the current token.
    text: Vec<u8>,
    done: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(file: FileId, source: &'src [u8]) -> Self {
        Lexer {
            file,
            chars: source,
            index: 0,
            peek: Pos::default(),
            begin: Pos::default(),
            end: Pos::default(),
            text: Vec::new(),
            done: false,
        }
    }

    /// Produce the next token. After the end of input has been reached every
    /// further call yields another end-of-file token.
    pub fn next_token(&mut self, diags: &mut Diagnostics) -> Token {
        let token = self.lex(diags);
        trace!("lexed {:?} '{}' at {:?}", token.tag, token, token.span);
        token
    }

    fn lex(&mut self, diags: &mut Diagnostics) -> Token {
        loop {
            self.begin = self.peek;
            self.end = self.peek;
            self.text.clear();

            if self.at_eof() {
                self.done = true;
                return self.simple(Tag::Eof);
            }
            if self.accept_if(is_whitespace) {
                continue;
            }
            if self.accept(b'{') {
                return self.simple(Tag::BraceL);
            }
            if self.accept(b'}') {
                return self.simple(Tag::BraceR);
            }
            if self.accept(b'(') {
                return self.simple(Tag::ParenL);
            }
            if self.accept(b')') {
                return self.simple(Tag::ParenR);
            }
            if self.accept(b'+') {
                return self.simple(Tag::Add);
            }
            if self.accept(b'-') {
                return self.simple(Tag::Sub);
            }
            if self.accept(b'*') {
                return self.simple(Tag::Mul);
            }
            if self.accept(b';') {
                return self.simple(Tag::Semicolon);
            }
            if self.accept(b'=') {
                let tag = if self.accept(b'=') { Tag::Eq } else { Tag::Assign };
                return self.simple(tag);
            }
            if self.accept(b'<') {
                let tag = if self.accept(b'=') { Tag::Le } else { Tag::Lt };
                return self.simple(tag);
            }
            if self.accept(b'>') {
                let tag = if self.accept(b'=') { Tag::Ge } else { Tag::Gt };
                return self.simple(tag);
            }
            if self.accept(b'!') {
                if self.accept(b'=') {
                    return self.simple(Tag::Ne);
                }
                self.invalid_char(diags, "; maybe you wanted to use '!='?");
                continue;
            }

            if self.accept_if(is_digit) {
                while self.accept_if(is_digit) {}
                return self.literal();
            }

            if self.accept_if(is_letter) {
                while self.accept_if(|ch| is_letter(ch) || is_digit(ch)) {}
                return self.word();
            }

            self.accept_if(|_| true);
            self.invalid_char(diags, "");
        }
    }

    /// Commit the next character if `pred` holds for it. On failure nothing
    /// changes.
    fn accept_if(&mut self, pred: impl Fn(u8) -> bool) -> bool {
        let Some(&ch) = self.chars.get(self.index) else {
            return false;
        };
        if !pred(ch) {
            return false;
        }

        self.index += 1;
        self.text.push(ch);
        self.end = self.peek;
        if ch == b'\n' {
            self.peek.row += 1;
            self.peek.col = 1;
        } else {
            self.peek.col += 1;
        }
        true
    }

    fn accept(&mut self, expected: u8) -> bool {
        self.accept_if(|ch| ch == expected)
    }

    fn at_eof(&self) -> bool {
        self.index >= self.chars.len()
    }

    fn span(&self) -> Span {
        Span::new(self.file, self.begin, self.end)
    }

    fn simple(&self, tag: Tag) -> Token {
        Token::new(self.span(), tag)
    }

    fn literal(&self) -> Token {
        // Wrapping: literals larger than i64 are not diagnosed.
        let value = self.text.iter().fold(0i64, |acc, &digit| {
            acc.wrapping_mul(10).wrapping_add(i64::from(digit - b'0'))
        });
        Token::lit(self.span(), value)
    }

    fn word(&self) -> Token {
        // Only ASCII letters and digits were accepted.
        let word: String = self.text.iter().map(|&b| char::from(b)).collect();
        match Tag::keyword(&word) {
            Some(tag) => self.simple(tag),
            None => Token::sym(self.span(), word),
        }
    }

    fn invalid_char(&self, diags: &mut Diagnostics, hint: &str) {
        let ch = self.text.first().map(|&b| char::from(b)).unwrap_or('?');
        diags.push(Diagnostic::error(
            DiagnosticKind::Lex,
            format!("invalid input char '{ch}'{hint}"),
            self.span().to_begin(),
        ));
    }

    /// Whether the end-of-file token has been produced.
    pub fn is_done(&self) -> bool {
        self.done
    }
}

/// Lex a whole source buffer, including the final end-of-file token.
pub fn tokenize(file: FileId, source: &[u8], diags: &mut Diagnostics) -> Vec<Token> {
    let mut lexer = Lexer::new(file, source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token(diags);
        let eof = token.isa(Tag::Eof);
        tokens.push(token);
        if eof {
            return tokens;
        }
    }
}

fn is_whitespace(ch: u8) -> bool {
    matches!(ch, b' ' | b'\t' | b'\n' | b'\r' | b'\x0b' | b'\x0c')
}

fn is_digit(ch: u8) -> bool {
    ch.is_ascii_digit()
}

fn is_letter(ch: u8) -> bool {
    ch.is_ascii_alphabetic()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenValue;
    use test_log::test;

    fn lex(source: &str) -> (Vec<Token>, Diagnostics) {
        let mut diags = Diagnostics::new();
        let tokens = tokenize(FileId(0), source.as_bytes(), &mut diags);
        (tokens, diags)
    }

    fn tags(source: &str) -> Vec<Tag> {
        lex(source).0.into_iter().map(|t| t.tag).collect()
    }

    #[test]
    fn lexes_keywords_and_identifiers() {
        let (tokens, diags) = lex("int x1 = while");
        assert!(diags.is_empty());
        assert_eq!(tokens[0].tag, Tag::Int);
        assert_eq!(tokens[1].value, TokenValue::Sym("x1".into()));
        assert_eq!(tokens[2].tag, Tag::Assign);
        assert_eq!(tokens[3].tag, Tag::While);
        assert_eq!(tokens[4].tag, Tag::Eof);
    }

    #[test]
    fn keywords_need_whole_word() {
        let (tokens, _) = lex("whilex notb");
        assert_eq!(tokens[0].value, TokenValue::Sym("whilex".into()));
        assert_eq!(tokens[1].value, TokenValue::Sym("notb".into()));
    }

    #[test]
    fn lexes_two_char_operators_with_fallback() {
        assert_eq!(
            tags("== = != <= < >= >"),
            vec![
                Tag::Eq,
                Tag::Assign,
                Tag::Ne,
                Tag::Le,
                Tag::Lt,
                Tag::Ge,
                Tag::Gt,
                Tag::Eof
            ]
        );
        assert_eq!(tags("a<=b"), vec![Tag::Sym, Tag::Le, Tag::Sym, Tag::Eof]);
    }

    #[test]
    fn lexes_integer_literals() {
        let (tokens, _) = lex("0 42 007");
        assert_eq!(tokens[0].value, TokenValue::Int(0));
        assert_eq!(tokens[1].value, TokenValue::Int(42));
        assert_eq!(tokens[2].value, TokenValue::Int(7));
    }

    #[test]
    fn digits_then_letters_split() {
        let (tokens, _) = lex("12ab");
        assert_eq!(tokens[0].value, TokenValue::Int(12));
        assert_eq!(tokens[1].value, TokenValue::Sym("ab".into()));
    }

    #[test]
    fn tracks_positions_across_lines() {
        let (tokens, _) = lex("int x\n  = 10;");
        assert_eq!(tokens[0].span.begin, Pos::new(1, 1));
        assert_eq!(tokens[0].span.end, Pos::new(1, 3));
        assert_eq!(tokens[1].span.begin, Pos::new(1, 5));
        assert_eq!(tokens[1].span.end, Pos::new(1, 5));
        assert_eq!(tokens[2].span.begin, Pos::new(2, 3));
        assert_eq!(tokens[3].span.begin, Pos::new(2, 5));
        assert_eq!(tokens[3].span.end, Pos::new(2, 6));
        let eof = tokens.last().expect("eof");
        assert_eq!(eof.span.begin, Pos::new(2, 8));
        assert_eq!(eof.span.begin, eof.span.end);
    }

    #[test]
    fn reports_invalid_char_and_resumes() {
        let (tokens, diags) = lex("a $ b");
        assert_eq!(diags.error_count(), 1);
        assert_eq!(diags.count_of(DiagnosticKind::Lex), 1);
        let diag = diags.iter().next().expect("diagnostic");
        assert_eq!(diag.message, "invalid input char '$'");
        assert_eq!(diag.span.begin, Pos::new(1, 3));
        let kinds: Vec<Tag> = tokens.iter().map(|t| t.tag).collect();
        assert_eq!(kinds, vec![Tag::Sym, Tag::Sym, Tag::Eof]);
    }

    #[test]
    fn lone_bang_suggests_not_equal() {
        let (tokens, diags) = lex("a !b");
        assert_eq!(diags.error_count(), 1);
        let diag = diags.iter().next().expect("diagnostic");
        assert!(diag.message.contains("maybe you wanted to use '!='?"));
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn eof_is_sticky() {
        let mut diags = Diagnostics::new();
        let mut lexer = Lexer::new(FileId(0), b"x");
        assert_eq!(lexer.next_token(&mut diags).tag, Tag::Sym);
        assert!(!lexer.is_done());
        assert_eq!(lexer.next_token(&mut diags).tag, Tag::Eof);
        assert_eq!(lexer.next_token(&mut diags).tag, Tag::Eof);
        assert!(lexer.is_done());
    }

    #[test]
    fn non_ascii_bytes_are_single_characters() {
        let mut diags = Diagnostics::new();
        let tokens = tokenize(FileId(0), &[b'a', 0xe9, b'b'], &mut diags);
        assert_eq!(diags.error_count(), 1);
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].span.begin, Pos::new(1, 3));
    }
}
