//! Tree-walking evaluator for compiled scripts.
//!
//! Function arguments are evaluated left to right before the call. Both sides
//! of `and`/`or` are always evaluated, so name and arity errors surface no
//! matter what the data says.

use crate::domain::builtins;
use crate::domain::context::EvaluationContext;
use crate::domain::error::EvalError;
use crate::domain::expr::{BinaryOp, Expr, UnaryOp};
use crate::domain::value::Value;

pub fn evaluate(expr: &Expr, ctx: &mut EvaluationContext) -> Result<Value, EvalError> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Text(s) => Ok(Value::Text(s.clone())),
        Expr::Variable(name) => builtins::variable(name, ctx),
        Expr::Call { name, args } => {
            let values = args
                .iter()
                .map(|arg| evaluate(arg, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            builtins::call(name, &values, ctx)
        }
        Expr::Index { target, offset } => evaluate(target, ctx)?.index(*offset),
        Expr::Unary { op, operand } => {
            let value = evaluate(operand, ctx)?;
            match op {
                UnaryOp::Neg => value.negate(),
                UnaryOp::Not => Ok(value
                    .truthy("not")?
                    .map_or(Value::Undefined, |b| Value::Bool(!b))),
            }
        }
        Expr::Binary { op, left, right } => {
            let lhs = evaluate(left, ctx)?;
            let rhs = evaluate(right, ctx)?;
            apply_binary(*op, &lhs, &rhs)
        }
    }
}

fn apply_binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::And => {
            let l = lhs.truthy("and")?.unwrap_or(false);
            let r = rhs.truthy("and")?.unwrap_or(false);
            Ok(Value::Bool(l && r))
        }
        BinaryOp::Or => {
            let l = lhs.truthy("or")?.unwrap_or(false);
            let r = rhs.truthy("or")?.unwrap_or(false);
            Ok(Value::Bool(l || r))
        }
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => lhs.arithmetic(op, rhs),
        BinaryOp::Eq
        | BinaryOp::Ne
        | BinaryOp::Lt
        | BinaryOp::Le
        | BinaryOp::Gt
        | BinaryOp::Ge => lhs.compare(op, rhs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::expr_parser::parse;
    use crate::domain::series::{PriceSeries, Quote};

    fn ctx(closes: Vec<f64>) -> EvaluationContext {
        EvaluationContext::from_history("TEST", PriceSeries::from_closes(closes)).unwrap()
    }

    fn eval(script: &str, ctx: &mut EvaluationContext) -> Result<Value, EvalError> {
        evaluate(&parse(script).unwrap(), ctx)
    }

    fn rising(count: usize) -> Vec<f64> {
        (1..=count).map(|i| i as f64).collect()
    }

    #[test]
    fn arithmetic_and_precedence() {
        let mut c = ctx(vec![1.0]);
        assert_eq!(eval("1 + 2 * 3", &mut c).unwrap(), Value::Number(7.0));
        assert_eq!(eval("(1 + 2) * 3", &mut c).unwrap(), Value::Number(9.0));
        assert_eq!(eval("10 - 4 - 3", &mut c).unwrap(), Value::Number(3.0));
        assert_eq!(eval("-2 * 3", &mut c).unwrap(), Value::Number(-6.0));
    }

    #[test]
    fn division_by_zero_compares_false() {
        let mut c = ctx(vec![1.0]);
        assert_eq!(eval("1/0", &mut c).unwrap(), Value::Number(0.0));
        assert_eq!(eval("1/0 > 0", &mut c).unwrap(), Value::Bool(false));
    }

    #[test]
    fn quote_comparison() {
        let mut c = EvaluationContext::new("Q", Quote::new(101.0, 0.03), PriceSeries::default());
        assert_eq!(eval("close > 100", &mut c).unwrap(), Value::Bool(true));
        assert_eq!(
            eval("change_percent >= 3 and change < 0.05", &mut c).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn logical_operators_and_not() {
        let mut c = ctx(vec![1.0]);
        assert_eq!(eval("true and not false", &mut c).unwrap(), Value::Bool(true));
        assert_eq!(eval("false or 0", &mut c).unwrap(), Value::Bool(false));
        assert_eq!(eval("!(1 > 2) && 3", &mut c).unwrap(), Value::Bool(true));
    }

    #[test]
    fn undefined_propagation() {
        let mut c = ctx(rising(5));
        assert_eq!(eval("sma(50) > 0", &mut c).unwrap(), Value::Bool(false));
        assert_eq!(eval("sma(50) <= 0", &mut c).unwrap(), Value::Bool(false));
        assert_eq!(eval("not sma(50)", &mut c).unwrap(), Value::Undefined);
        assert_eq!(eval("sma(50) or true", &mut c).unwrap(), Value::Bool(true));
        assert_eq!(eval("sma(50) + 1", &mut c).unwrap().to_scalar(), Value::Undefined);
        assert_eq!(eval("abs(sma(50))", &mut c).unwrap(), Value::Undefined);
    }

    #[test]
    fn no_short_circuit_for_and() {
        let mut c = ctx(vec![1.0]);
        let err = eval("false and foo(1)", &mut c).unwrap_err();
        assert!(matches!(err, EvalError::UnknownFunction { .. }));
        let err = eval("true or missing_var", &mut c).unwrap_err();
        assert!(matches!(err, EvalError::UnknownVariable { .. }));
    }

    #[test]
    fn history_index() {
        let mut c = ctx(rising(10));
        assert_eq!(eval("prices[0]", &mut c).unwrap().to_scalar(), Value::Number(10.0));
        assert_eq!(eval("prices[3]", &mut c).unwrap().to_scalar(), Value::Number(7.0));
        assert_eq!(eval("prices[10]", &mut c).unwrap(), Value::Undefined);
        assert_eq!(eval("sma(3)[1]", &mut c).unwrap().to_scalar(), Value::Number(8.0));
        assert_eq!(eval("close[0]", &mut c).unwrap(), Value::Number(10.0));
        assert!(eval("close[1]", &mut c).is_err());
    }

    #[test]
    fn dual_moving_average_cross() {
        // flat then a jump on the last bar: sma(2) crosses above sma(4)
        let mut c = ctx(vec![10.0, 10.0, 10.0, 10.0, 10.0, 14.0]);
        let script = "sma(2) > sma(4) and sma(2)[1] <= sma(4)[1]";
        assert_eq!(eval(script, &mut c).unwrap(), Value::Bool(true));
    }

    #[test]
    fn cross_above_function() {
        let mut c = ctx(vec![10.0, 10.0, 10.0, 10.0, 10.0, 14.0]);
        assert_eq!(
            eval("cross_above(sma(2), sma(4))", &mut c).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            eval("cross_below(sma(2), sma(4))", &mut c).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn repeated_indicator_hits_cache() {
        let mut c = ctx(rising(30));
        eval("sma(20) > 0 and sma(20) < 100 and sma(5) > sma(20)", &mut c).unwrap();
        assert_eq!(c.cache().misses(), 2);
        assert_eq!(c.cache().hits(), 2);
    }

    #[test]
    fn series_arithmetic_in_script() {
        let mut c = ctx(rising(10));
        // spread between two averages, compared on the latest point
        assert_eq!(
            eval("sma(2) - sma(4) == 1", &mut c).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            eval("sma(prices - 1, 2)", &mut c).unwrap().to_scalar(),
            Value::Number(8.5)
        );
    }

    #[test]
    fn type_errors() {
        let mut c = ctx(vec![1.0]);
        assert!(matches!(
            eval("'a' and true", &mut c).unwrap_err(),
            EvalError::TypeMismatch { op: "and", .. }
        ));
        assert!(matches!(
            eval("1 < 2 < 3", &mut c).unwrap_err(),
            EvalError::TypeMismatch { op: "<", .. }
        ));
        assert!(matches!(
            eval("-true", &mut c).unwrap_err(),
            EvalError::TypeMismatch { op: "-", .. }
        ));
    }
}
