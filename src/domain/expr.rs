//! Script AST.
//!
//! - `Expr`: literals, variable references, calls, history index, operators
//! - `UnaryOp` / `BinaryOp`: operator tags with their source symbols
//!
//! Nodes are immutable once built; compiled scripts are shared behind `Arc`.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Or => "or",
            BinaryOp::And => "and",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }

    /// Binding strength, higher binds tighter.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => 3,
            BinaryOp::Add | BinaryOp::Sub => 4,
            BinaryOp::Mul | BinaryOp::Div => 5,
        }
    }

    pub fn is_comparison(&self) -> bool {
        self.precedence() == 3
    }
}

const UNARY_PRECEDENCE: u8 = 6;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Bool(bool),
    Text(String),
    Variable(String),
    Call {
        name: String,
        args: Vec<Expr>,
    },
    /// `target[offset]`: the value `offset` points before the latest one.
    Index {
        target: Box<Expr>,
        offset: usize,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Binary { op, .. } => op.precedence(),
            Expr::Unary { .. } => UNARY_PRECEDENCE,
            Expr::Number(n) if *n < 0.0 => UNARY_PRECEDENCE,
            _ => u8::MAX,
        }
    }

    /// Names of every function called anywhere in the tree, in source order.
    pub fn function_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_function_names(&mut names);
        names
    }

    fn collect_function_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expr::Call { name, args } => {
                names.push(name);
                for arg in args {
                    arg.collect_function_names(names);
                }
            }
            Expr::Index { target, .. } => target.collect_function_names(names),
            Expr::Unary { operand, .. } => operand.collect_function_names(names),
            Expr::Binary { left, right, .. } => {
                left.collect_function_names(names);
                right.collect_function_names(names);
            }
            Expr::Number(_) | Expr::Bool(_) | Expr::Text(_) | Expr::Variable(_) => {}
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, min_precedence: u8) -> fmt::Result {
    if expr.precedence() < min_precedence {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Bool(b) => write!(f, "{}", b),
            Expr::Text(s) => write!(f, "\"{}\"", s),
            Expr::Variable(name) => write!(f, "{}", name),
            Expr::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expr::Index { target, offset } => {
                write_operand(f, target, u8::MAX)?;
                write!(f, "[{}]", offset)
            }
            Expr::Unary { op, operand } => {
                match op {
                    UnaryOp::Not => write!(f, "not ")?,
                    UnaryOp::Neg => write!(f, "-")?,
                }
                write_operand(f, operand, UNARY_PRECEDENCE)
            }
            Expr::Binary { op, left, right } => {
                let prec = op.precedence();
                write_operand(f, left, prec)?;
                write!(f, " {} ", op.symbol())?;
                // Left-associative: an equal-precedence right child needs parentheses.
                write_operand(f, right, prec + 1)
            }
        }
    }
}
