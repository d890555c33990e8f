//! Script tokenizer.
//!
//! Splits script text into tokens carrying their byte offset so the parser can
//! report the position of the offending token.

use std::fmt;

use crate::domain::error::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Ident(String),
    Str(String),
    True,
    False,
    And,
    Or,
    Not,
    Plus,
    Minus,
    Star,
    Slash,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    NotEq,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "{}", n),
            TokenKind::Ident(name) => write!(f, "{}", name),
            TokenKind::Str(s) => write!(f, "\"{}\"", s),
            TokenKind::True => write!(f, "true"),
            TokenKind::False => write!(f, "false"),
            TokenKind::And => write!(f, "and"),
            TokenKind::Or => write!(f, "or"),
            TokenKind::Not => write!(f, "not"),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Lt => write!(f, "<"),
            TokenKind::Le => write!(f, "<="),
            TokenKind::Gt => write!(f, ">"),
            TokenKind::Ge => write!(f, ">="),
            TokenKind::EqEq => write!(f, "=="),
            TokenKind::NotEq => write!(f, "!="),
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::LBracket => write!(f, "["),
            TokenKind::RBracket => write!(f, "]"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token's first character.
    pub position: usize,
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.remaining().chars().nth(1)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn error(&self, message: impl Into<String>, position: usize) -> ParseError {
        ParseError {
            message: message.into(),
            position,
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_whitespace();
        let start = self.pos;

        let Some(ch) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                position: start,
            });
        };

        let kind = match ch {
            '0'..='9' | '.' => self.lex_number()?,
            c if c.is_ascii_alphabetic() || c == '_' => self.lex_word(),
            '"' | '\'' => self.lex_string()?,
            _ => self.lex_symbol()?,
        };

        Ok(Token {
            kind,
            position: start,
        })
    }

    fn lex_number(&mut self) -> Result<TokenKind, ParseError> {
        let start = self.pos;
        let mut has_dot = false;
        let mut digits = 0;

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits += 1;
                self.advance();
            } else if ch == '.' && !has_dot {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        if digits == 0 {
            return Err(self.error("expected digit after '.'", start));
        }
        if self.input[start..self.pos].ends_with('.') {
            return Err(self.error("expected digit after '.'", self.pos));
        }

        let num_str = &self.input[start..self.pos];
        num_str
            .parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| self.error(format!("invalid number: {}", num_str), start))
    }

    fn lex_word(&mut self) -> TokenKind {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }

        match &self.input[start..self.pos] {
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            word => TokenKind::Ident(word.to_string()),
        }
    }

    fn lex_string(&mut self) -> Result<TokenKind, ParseError> {
        let start = self.pos;
        let quote = self.advance();
        let mut text = String::new();

        loop {
            match self.advance() {
                Some(ch) if Some(ch) == quote => return Ok(TokenKind::Str(text)),
                Some(ch) => text.push(ch),
                None => return Err(self.error("unterminated string literal", start)),
            }
        }
    }

    fn lex_symbol(&mut self) -> Result<TokenKind, ParseError> {
        let start = self.pos;
        let ch = self.peek();
        let next = self.peek_second();

        let (kind, width) = match (ch, next) {
            (Some('<'), Some('=')) => (TokenKind::Le, 2),
            (Some('>'), Some('=')) => (TokenKind::Ge, 2),
            (Some('='), Some('=')) => (TokenKind::EqEq, 2),
            (Some('!'), Some('=')) => (TokenKind::NotEq, 2),
            (Some('&'), Some('&')) => (TokenKind::And, 2),
            (Some('|'), Some('|')) => (TokenKind::Or, 2),
            (Some('<'), _) => (TokenKind::Lt, 1),
            (Some('>'), _) => (TokenKind::Gt, 1),
            (Some('!'), _) => (TokenKind::Not, 1),
            (Some('+'), _) => (TokenKind::Plus, 1),
            (Some('-'), _) => (TokenKind::Minus, 1),
            (Some('*'), _) => (TokenKind::Star, 1),
            (Some('/'), _) => (TokenKind::Slash, 1),
            (Some('('), _) => (TokenKind::LParen, 1),
            (Some(')'), _) => (TokenKind::RParen, 1),
            (Some('['), _) => (TokenKind::LBracket, 1),
            (Some(']'), _) => (TokenKind::RBracket, 1),
            (Some(','), _) => (TokenKind::Comma, 1),
            (Some('='), _) => return Err(self.error("expected '==', found '='", start)),
            (Some('&'), _) => return Err(self.error("expected '&&', found '&'", start)),
            (Some('|'), _) => return Err(self.error("expected '||', found '|'", start)),
            (Some(c), _) => {
                return Err(self.error(format!("unexpected character '{}'", c), start));
            }
            (None, _) => return Err(self.error("unexpected end of input", start)),
        };

        for _ in 0..width {
            self.advance();
        }
        Ok(kind)
    }
}

/// Tokenize `input`; the returned vector always ends with an `Eof` token.
pub fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}
