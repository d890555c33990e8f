//! Script parser.
//!
//! Recursive descent over the token stream, one function per precedence level:
//!
//! ```text
//! or         := and (("or" | "||") and)*
//! and        := comparison (("and" | "&&") comparison)*
//! comparison := additive (("<" | "<=" | ">" | ">=" | "==" | "!=") additive)*
//! additive   := multiplicative (("+" | "-") multiplicative)*
//! multiplicative := unary (("*" | "/") unary)*
//! unary      := ("not" | "!" | "-") unary | postfix
//! postfix    := primary ("[" integer "]")*
//! primary    := number | string | "true" | "false" | ident | ident "(" args ")" | "(" or ")"
//! ```
//!
//! Nesting (parentheses, call arguments, unary operators, operator chains and
//! index suffixes) is capped at `MAX_DEPTH` so evaluating a compiled script
//! never recurses deeper than that.

use crate::domain::error::ParseError;
use crate::domain::expr::{BinaryOp, Expr, UnaryOp};
use crate::domain::lexer::{Token, TokenKind, tokenize};

pub const MAX_DEPTH: usize = 256;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// One level deeper; callers restore `depth` once the nested part is parsed.
    fn descend(&mut self, position: usize) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError {
                message: "expression nested too deeply".to_string(),
                position,
            });
        }
        Ok(())
    }

    fn peek(&self) -> &Token {
        // tokenize() guarantees a trailing Eof, and advance() never moves past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn consume(&mut self, kind: &TokenKind) -> bool {
        if &self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let token = self.peek();
        if token.kind == kind {
            Ok(self.advance())
        } else {
            Err(ParseError {
                message: format!("expected '{}', found '{}'", kind, token.kind),
                position: token.position,
            })
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let depth = self.depth;
        let mut left = self.parse_and()?;
        while self.peek().kind == TokenKind::Or {
            let position = self.advance().position;
            self.descend(position)?;
            let right = self.parse_and()?;
            left = Expr::binary(BinaryOp::Or, left, right);
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let depth = self.depth;
        let mut left = self.parse_comparison()?;
        while self.peek().kind == TokenKind::And {
            let position = self.advance().position;
            self.descend(position)?;
            let right = self.parse_comparison()?;
            left = Expr::binary(BinaryOp::And, left, right);
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let depth = self.depth;
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Le => BinaryOp::Le,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::Ge => BinaryOp::Ge,
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::Ne,
                _ => {
                    self.depth = depth;
                    return Ok(left);
                }
            };
            let position = self.advance().position;
            self.descend(position)?;
            let right = self.parse_additive()?;
            left = Expr::binary(op, left, right);
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let depth = self.depth;
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => {
                    self.depth = depth;
                    return Ok(left);
                }
            };
            let position = self.advance().position;
            self.descend(position)?;
            let right = self.parse_multiplicative()?;
            left = Expr::binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let depth = self.depth;
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => {
                    self.depth = depth;
                    return Ok(left);
                }
            };
            let position = self.advance().position;
            self.descend(position)?;
            let right = self.parse_unary()?;
            left = Expr::binary(op, left, right);
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek().kind {
            TokenKind::Not => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            _ => return self.parse_postfix(),
        };
        let position = self.advance().position;
        self.descend(position)?;
        let operand = self.parse_unary()?;
        self.depth -= 1;
        Ok(match (op, operand) {
            (UnaryOp::Neg, Expr::Number(n)) => Expr::Number(-n),
            (op, operand) => Expr::unary(op, operand),
        })
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let depth = self.depth;
        let mut expr = self.parse_primary()?;
        while self.peek().kind == TokenKind::LBracket {
            let position = self.advance().position;
            self.descend(position)?;
            let offset = self.parse_index()?;
            self.expect(TokenKind::RBracket)?;
            expr = Expr::Index {
                target: Box::new(expr),
                offset,
            };
        }
        self.depth = depth;
        Ok(expr)
    }

    fn parse_index(&mut self) -> Result<usize, ParseError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number(n) if n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64 => {
                Ok(n as usize)
            }
            other => Err(ParseError {
                message: format!("expected non-negative integer index, found '{}'", other),
                position: token.position,
            }),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number(n) => Ok(Expr::Number(n)),
            TokenKind::Str(s) => Ok(Expr::Text(s)),
            TokenKind::True => Ok(Expr::Bool(true)),
            TokenKind::False => Ok(Expr::Bool(false)),
            TokenKind::Ident(name) => {
                if self.consume(&TokenKind::LParen) {
                    let args = self.parse_args()?;
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Variable(name))
                }
            }
            TokenKind::LParen => {
                self.descend(token.position)?;
                let inner = self.parse_or()?;
                self.expect(TokenKind::RParen)?;
                self.depth -= 1;
                Ok(inner)
            }
            other => Err(ParseError {
                message: format!("expected expression, found '{}'", other),
                position: token.position,
            }),
        }
    }

    /// Arguments after the opening parenthesis, through the closing one.
    fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if self.consume(&TokenKind::RParen) {
            return Ok(args);
        }
        self.descend(self.peek().position)?;
        loop {
            args.push(self.parse_or()?);
            if self.consume(&TokenKind::RParen) {
                self.depth -= 1;
                return Ok(args);
            }
            self.expect(TokenKind::Comma)?;
        }
    }

    fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_or()?;
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            return Err(ParseError {
                message: format!("unexpected input after expression: '{}'", token.kind),
                position: token.position,
            });
        }
        Ok(expr)
    }
}

pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser::new(tokens);
    parser.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Expr {
        Expr::Number(n)
    }

    fn var(name: &str) -> Expr {
        Expr::Variable(name.into())
    }

    fn call(name: &str, args: Vec<Expr>) -> Expr {
        Expr::Call {
            name: name.into(),
            args,
        }
    }

    #[test]
    fn parse_simple_comparison() {
        let expr = parse("rsi(14) < 30").unwrap();
        assert_eq!(
            expr,
            Expr::binary(BinaryOp::Lt, call("rsi", vec![num(14.0)]), num(30.0))
        );
    }

    #[test]
    fn parse_precedence_and_over_or() {
        let expr = parse("a or b and c").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Or,
                var("a"),
                Expr::binary(BinaryOp::And, var("b"), var("c"))
            )
        );
    }

    #[test]
    fn parse_precedence_arithmetic() {
        let expr = parse("1 + 2 * 3 > 4").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Gt,
                Expr::binary(
                    BinaryOp::Add,
                    num(1.0),
                    Expr::binary(BinaryOp::Mul, num(2.0), num(3.0))
                ),
                num(4.0)
            )
        );
    }

    #[test]
    fn parse_left_associative() {
        let expr = parse("10 - 4 - 3").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Sub,
                Expr::binary(BinaryOp::Sub, num(10.0), num(4.0)),
                num(3.0)
            )
        );
    }

    #[test]
    fn parse_dual_ma_cross() {
        let expr = parse("sma(5) > sma(20) and sma(5)[1] <= sma(20)[1]").unwrap();
        match expr {
            Expr::Binary {
                op: BinaryOp::And,
                right,
                ..
            } => match *right {
                Expr::Binary {
                    op: BinaryOp::Le,
                    left,
                    ..
                } => assert!(matches!(*left, Expr::Index { offset: 1, .. })),
                other => panic!("expected <= comparison, got {:?}", other),
            },
            other => panic!("expected and, got {:?}", other),
        }
    }

    #[test]
    fn parse_symbolic_aliases() {
        assert_eq!(parse("a && !b").unwrap(), parse("a and not b").unwrap());
        assert_eq!(parse("a || b").unwrap(), parse("a or b").unwrap());
    }

    #[test]
    fn parse_negative_literal_folds() {
        assert_eq!(parse("-5").unwrap(), num(-5.0));
        assert_eq!(
            parse("-close").unwrap(),
            Expr::unary(UnaryOp::Neg, var("close"))
        );
    }

    #[test]
    fn parse_unary_binds_tighter_than_multiply() {
        let expr = parse("not a * b").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Mul,
                Expr::unary(UnaryOp::Not, var("a")),
                var("b")
            )
        );
    }

    #[test]
    fn parse_literals() {
        assert_eq!(parse("true").unwrap(), Expr::Bool(true));
        assert_eq!(parse("'AAPL'").unwrap(), Expr::Text("AAPL".into()));
        assert_eq!(parse("( 0.5 )").unwrap(), num(0.5));
    }

    #[test]
    fn parse_call_without_args() {
        assert_eq!(parse("macd()").unwrap(), call("macd", vec![]));
    }

    #[test]
    fn parse_nested_calls() {
        let expr = parse("cross_above(ema(prices, 12), ema(26))").unwrap();
        assert_eq!(
            expr,
            call(
                "cross_above",
                vec![
                    call("ema", vec![var("prices"), num(12.0)]),
                    call("ema", vec![num(26.0)])
                ]
            )
        );
    }

    #[test]
    fn parse_chained_index() {
        let expr = parse("prices[1][2]").unwrap();
        assert_eq!(
            expr,
            Expr::Index {
                target: Box::new(Expr::Index {
                    target: Box::new(var("prices")),
                    offset: 1
                }),
                offset: 2
            }
        );
    }

    #[test]
    fn parse_display_roundtrip() {
        let text = "sma(5) > sma(20) and sma(5)[1] <= sma(20)[1]";
        assert_eq!(parse(text).unwrap().to_string(), text);
    }

    #[test]
    fn error_empty_input() {
        let err = parse("").unwrap_err();
        assert!(err.message.contains("expected expression"));
        assert_eq!(err.position, 0);
    }

    #[test]
    fn error_whitespace_only() {
        let err = parse("   ").unwrap_err();
        assert!(err.message.contains("expected expression"));
        assert_eq!(err.position, 3);
    }

    #[test]
    fn error_missing_operand() {
        let err = parse("rsi(14) < ").unwrap_err();
        assert!(err.message.contains("expected expression"));
        assert_eq!(err.position, 10);
    }

    #[test]
    fn error_missing_paren() {
        let err = parse("sma(20").unwrap_err();
        assert!(err.message.contains("expected ')'"));
    }

    #[test]
    fn error_missing_comma() {
        let err = parse("sma(prices 20)").unwrap_err();
        assert!(err.message.contains("expected ','"));
        assert_eq!(err.position, 11);
    }

    #[test]
    fn error_trailing_input() {
        let err = parse("close > 1 2").unwrap_err();
        assert!(err.message.contains("unexpected input"));
        assert_eq!(err.position, 10);
    }

    #[test]
    fn error_fractional_index() {
        let err = parse("prices[1.5]").unwrap_err();
        assert!(err.message.contains("integer index"));
        assert_eq!(err.position, 7);
    }

    #[test]
    fn error_negative_index() {
        assert!(parse("prices[-1]").is_err());
    }

    #[test]
    fn error_lexer_position_propagates() {
        let err = parse("close # 1").unwrap_err();
        assert_eq!(err.position, 6);
    }

    #[test]
    fn error_display_with_context() {
        let input = "sma(5) > > 3";
        let err = parse(input).unwrap_err();
        let ctx = err.display_with_context(input);
        assert!(ctx.contains("         ^"));
        assert!(ctx.contains("position 9"));
    }

    fn assert_too_deep(input: &str) -> ParseError {
        let err = parse(input).unwrap_err();
        assert_eq!(err.message, "expression nested too deeply");
        err
    }

    #[test]
    fn error_deep_parentheses() {
        let input = format!("{}1{} > 0", "(".repeat(10_000), ")".repeat(10_000));
        let err = assert_too_deep(&input);
        assert_eq!(err.position, MAX_DEPTH);
    }

    #[test]
    fn error_deep_unary() {
        assert_too_deep(&format!("{}true", "not ".repeat(10_000)));
        assert_too_deep(&format!("{}1", "!".repeat(10_000)));
        assert_too_deep(&format!("{}close", "- ".repeat(10_000)));
    }

    #[test]
    fn error_deep_calls() {
        let input = format!("{}prices{}", "abs(".repeat(10_000), ")".repeat(10_000));
        assert_too_deep(&input);
    }

    #[test]
    fn error_long_operator_chain() {
        assert_too_deep(&vec!["1"; 10_000].join(" + "));
        assert_too_deep(&vec!["a"; 10_000].join(" and "));
        assert_too_deep(&format!("prices{}", "[1]".repeat(10_000)));
    }

    #[test]
    fn nesting_up_to_the_limit_parses() {
        let input = format!("{}1{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert_eq!(parse(&input).unwrap(), num(1.0));
        assert!(parse(&vec!["1"; MAX_DEPTH + 1].join(" + ")).is_ok());
        assert!(parse(&vec!["1"; MAX_DEPTH + 2].join(" + ")).is_err());
    }

    #[test]
    fn sibling_groups_do_not_accumulate_depth() {
        let input = vec!["(1)"; 200].join(" > 0 or ");
        assert!(parse(&input).is_ok());
        let input = vec!["sma(5)"; 100].join(" > 0 and ");
        assert!(parse(&input).is_ok());
    }
}
