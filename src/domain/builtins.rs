//! Builtin variables and functions available to scripts.
//!
//! Indicator functions take an optional leading series argument defaulting to
//! `prices`. Calls over a context series go through the context cache; calls
//! over derived series (arithmetic results, shifted series) are computed
//! directly.

use tracing::trace;

use crate::domain::context::EvaluationContext;
use crate::domain::error::EvalError;
use crate::domain::indicator::{
    IndicatorField, IndicatorOutput, IndicatorType, bollinger, calculate_crossover, kdj, macd,
    rsi, williams_r,
};
use crate::domain::series::SeriesSource;
use crate::domain::value::{SeriesValue, Value};

pub const VARIABLES: &[&str] = &[
    "close",
    "price",
    "change",
    "change_percent",
    "prices",
    "highs",
    "lows",
    "high",
    "low",
];

pub const FUNCTIONS: &[&str] = &[
    "sma",
    "ema",
    "wma",
    "roc",
    "stddev",
    "rsi",
    "macd",
    "macd_signal",
    "macd_hist",
    "boll_upper",
    "boll_middle",
    "boll_lower",
    "kdj_k",
    "kdj_d",
    "kdj_j",
    "williams_r",
    "wr",
    "cross_above",
    "cross_below",
    "abs",
    "max",
    "min",
    "round",
    "floor",
    "ceil",
];

pub fn is_function(name: &str) -> bool {
    FUNCTIONS.contains(&name)
}

/// Resolve a builtin variable against the context.
pub fn variable(name: &str, ctx: &EvaluationContext) -> Result<Value, EvalError> {
    let quote = ctx.quote();
    let value = match name {
        "close" | "price" => Value::Number(quote.price),
        "change" => Value::Number(quote.change),
        "change_percent" => Value::Number(quote.change_percent()),
        "prices" => context_series(ctx, SeriesSource::Close),
        "highs" => context_series(ctx, SeriesSource::High),
        "lows" => context_series(ctx, SeriesSource::Low),
        "high" => context_series(ctx, SeriesSource::High).to_scalar(),
        "low" => context_series(ctx, SeriesSource::Low).to_scalar(),
        _ => {
            return Err(EvalError::UnknownVariable {
                name: name.to_string(),
            });
        }
    };
    Ok(value)
}

fn context_series(ctx: &EvaluationContext, source: SeriesSource) -> Value {
    match ctx.series().source(source) {
        Some(points) => Value::Series(SeriesValue {
            points: points.clone(),
            source: Some(source),
        }),
        None => Value::Undefined,
    }
}

/// Invoke a builtin function with already-evaluated arguments.
pub fn call(name: &str, args: &[Value], ctx: &mut EvaluationContext) -> Result<Value, EvalError> {
    trace!(function = name, args = args.len(), "builtin call");
    match name {
        "sma" => single_line(name, args, ctx, None, IndicatorType::Sma),
        "ema" => single_line(name, args, ctx, None, IndicatorType::Ema),
        "wma" => single_line(name, args, ctx, None, IndicatorType::Wma),
        "roc" => single_line(name, args, ctx, None, IndicatorType::Roc),
        "stddev" => single_line(name, args, ctx, None, IndicatorType::Stddev),
        "rsi" => single_line(
            name,
            args,
            ctx,
            Some(rsi::DEFAULT_PERIOD),
            IndicatorType::Rsi,
        ),
        "macd" => macd_call(name, args, ctx, IndicatorField::MacdLine),
        "macd_signal" => macd_call(name, args, ctx, IndicatorField::MacdSignal),
        "macd_hist" => macd_call(name, args, ctx, IndicatorField::MacdHistogram),
        "boll_upper" => bollinger_call(name, args, ctx, IndicatorField::BollingerUpper),
        "boll_middle" => bollinger_call(name, args, ctx, IndicatorField::BollingerMiddle),
        "boll_lower" => bollinger_call(name, args, ctx, IndicatorField::BollingerLower),
        "kdj_k" => kdj_call(name, args, ctx, IndicatorField::KdjK),
        "kdj_d" => kdj_call(name, args, ctx, IndicatorField::KdjD),
        "kdj_j" => kdj_call(name, args, ctx, IndicatorField::KdjJ),
        "williams_r" | "wr" => williams_r_call(name, args, ctx),
        "cross_above" => crossover_call(name, args, true),
        "cross_below" => crossover_call(name, args, false),
        "abs" => unary_math(name, args, f64::abs),
        "floor" => unary_math(name, args, f64::floor),
        "ceil" => unary_math(name, args, f64::ceil),
        "round" => round_call(name, args),
        "max" => extremum(name, args, f64::max),
        "min" => extremum(name, args, f64::min),
        _ => Err(EvalError::UnknownFunction {
            name: name.to_string(),
        }),
    }
}

fn arity(function: &str, expected: &'static str, found: usize) -> EvalError {
    EvalError::Arity {
        function: function.to_string(),
        expected,
        found,
    }
}

fn invalid(function: &str, reason: impl Into<String>) -> EvalError {
    EvalError::InvalidArgument {
        function: function.to_string(),
        reason: reason.into(),
    }
}

/// A positive integer parameter (period, smoothing length).
fn period_arg(function: &str, value: &Value) -> Result<usize, EvalError> {
    match *value {
        Value::Number(n) if n >= 1.0 && n.fract() == 0.0 && n <= u32::MAX as f64 => Ok(n as usize),
        Value::Number(n) => Err(invalid(
            function,
            format!("period must be a positive integer, got {}", n),
        )),
        _ => Err(invalid(
            function,
            format!("period must be a number, got {}", value.type_name()),
        )),
    }
}

fn number_arg(function: &str, value: &Value) -> Result<Option<f64>, EvalError> {
    match value.to_scalar() {
        Value::Number(n) => Ok(Some(n)),
        Value::Undefined => Ok(None),
        other => Err(invalid(
            function,
            format!("expected a number, got {}", other.type_name()),
        )),
    }
}

fn periods_arg<const N: usize>(
    function: &str,
    args: &[Value],
    defaults: [usize; N],
) -> Result<[usize; N], EvalError> {
    let mut periods = defaults;
    for (slot, arg) in periods.iter_mut().zip(args) {
        *slot = period_arg(function, arg)?;
    }
    Ok(periods)
}

/// Where an indicator reads its input from.
enum Input {
    Context(SeriesSource),
    Derived(SeriesValue),
    Missing,
}

fn series_input(function: &str, value: &Value) -> Result<Input, EvalError> {
    match value {
        Value::Series(SeriesValue {
            source: Some(source),
            ..
        }) => Ok(Input::Context(*source)),
        Value::Series(series) => Ok(Input::Derived(series.clone())),
        Value::Undefined => Ok(Input::Missing),
        other => Err(invalid(
            function,
            format!("first argument must be a series, got {}", other.type_name()),
        )),
    }
}

fn run_indicator(
    ctx: &mut EvaluationContext,
    indicator: IndicatorType,
    input: Input,
) -> Option<IndicatorOutput> {
    match input {
        Input::Context(source) => ctx.indicator(indicator, source),
        Input::Derived(series) => indicator.compute(&series.points, None),
        Input::Missing => None,
    }
}

fn field_value(output: Option<IndicatorOutput>, field: IndicatorField) -> Value {
    output
        .as_ref()
        .and_then(|out| out.field(field))
        .map_or(Value::Undefined, |points| {
            Value::Series(SeriesValue::derived(points.clone()))
        })
}

/// `name([series,] period)`, with an optional default period.
fn single_line(
    name: &str,
    args: &[Value],
    ctx: &mut EvaluationContext,
    default_period: Option<usize>,
    make: fn(usize) -> IndicatorType,
) -> Result<Value, EvalError> {
    let expected = if default_period.is_some() {
        "0 to 2"
    } else {
        "1 or 2"
    };

    let (input, period) = match (args, default_period) {
        ([], Some(period)) => (Input::Context(SeriesSource::Close), period),
        ([only @ (Value::Series(_) | Value::Undefined)], Some(period)) => {
            (series_input(name, only)?, period)
        }
        ([period], _) => (
            Input::Context(SeriesSource::Close),
            period_arg(name, period)?,
        ),
        ([series, period], _) => (series_input(name, series)?, period_arg(name, period)?),
        _ => return Err(arity(name, expected, args.len())),
    };

    let output = run_indicator(ctx, make(period), input);
    Ok(field_value(output, IndicatorField::Value))
}

fn macd_call(
    name: &str,
    args: &[Value],
    ctx: &mut EvaluationContext,
    field: IndicatorField,
) -> Result<Value, EvalError> {
    if !matches!(args.len(), 0 | 3) {
        return Err(arity(name, "0 or 3", args.len()));
    }
    let [fast, slow, signal] = periods_arg(
        name,
        args,
        [macd::DEFAULT_FAST, macd::DEFAULT_SLOW, macd::DEFAULT_SIGNAL],
    )?;
    if fast >= slow {
        return Err(invalid(name, "fast period must be shorter than slow period"));
    }

    let indicator = IndicatorType::Macd { fast, slow, signal };
    let output = ctx.indicator(indicator, SeriesSource::Close);
    Ok(field_value(output, field))
}

fn bollinger_call(
    name: &str,
    args: &[Value],
    ctx: &mut EvaluationContext,
    field: IndicatorField,
) -> Result<Value, EvalError> {
    if args.len() > 2 {
        return Err(arity(name, "0 to 2", args.len()));
    }
    let [period] = periods_arg(name, &args[..args.len().min(1)], [bollinger::DEFAULT_PERIOD])?;
    let multiplier = match args.get(1) {
        Some(arg) => match number_arg(name, arg)? {
            Some(k) if k.is_finite() && k > 0.0 => k,
            _ => return Err(invalid(name, "multiplier must be a positive number")),
        },
        None => bollinger::DEFAULT_MULTIPLIER,
    };

    let output = ctx.indicator(
        IndicatorType::bollinger(period, multiplier),
        SeriesSource::Close,
    );
    Ok(field_value(output, field))
}

fn require_high_low(name: &str, ctx: &EvaluationContext) -> Result<(), EvalError> {
    if ctx.series().hlc().is_none() {
        return Err(invalid(name, "requires high and low series"));
    }
    Ok(())
}

fn kdj_call(
    name: &str,
    args: &[Value],
    ctx: &mut EvaluationContext,
    field: IndicatorField,
) -> Result<Value, EvalError> {
    if !matches!(args.len(), 0 | 1 | 3) {
        return Err(arity(name, "0, 1 or 3", args.len()));
    }
    let [period, k_smooth, d_smooth] = periods_arg(
        name,
        args,
        [
            kdj::DEFAULT_PERIOD,
            kdj::DEFAULT_K_SMOOTH,
            kdj::DEFAULT_D_SMOOTH,
        ],
    )?;
    require_high_low(name, ctx)?;

    let indicator = IndicatorType::Kdj {
        period,
        k_smooth,
        d_smooth,
    };
    let output = ctx.indicator(indicator, SeriesSource::Close);
    Ok(field_value(output, field))
}

fn williams_r_call(
    name: &str,
    args: &[Value],
    ctx: &mut EvaluationContext,
) -> Result<Value, EvalError> {
    if args.len() > 1 {
        return Err(arity(name, "0 or 1", args.len()));
    }
    let [period] = periods_arg(name, args, [williams_r::DEFAULT_PERIOD])?;
    require_high_low(name, ctx)?;

    let output = ctx.indicator(IndicatorType::WilliamsR(period), SeriesSource::Close);
    Ok(field_value(output, IndicatorField::Value))
}

/// Points for a crossover operand; a number is a flat line.
fn crossover_operand(name: &str, value: &Value) -> Result<Option<Vec<f64>>, EvalError> {
    match value {
        Value::Series(series) => Ok(Some(series.points.to_vec())),
        Value::Number(n) => Ok(Some(vec![*n, *n])),
        Value::Undefined => Ok(None),
        other => Err(invalid(
            name,
            format!("expected a series or number, got {}", other.type_name()),
        )),
    }
}

fn crossover_call(name: &str, args: &[Value], bullish: bool) -> Result<Value, EvalError> {
    let [a, b] = args else {
        return Err(arity(name, "2", args.len()));
    };
    let (Some(a), Some(b)) = (crossover_operand(name, a)?, crossover_operand(name, b)?) else {
        return Ok(Value::Bool(false));
    };
    let cross = calculate_crossover(&a, &b);
    Ok(Value::Bool(if bullish {
        cross.bullish
    } else {
        cross.bearish
    }))
}

fn unary_math(name: &str, args: &[Value], f: fn(f64) -> f64) -> Result<Value, EvalError> {
    let [x] = args else {
        return Err(arity(name, "1", args.len()));
    };
    Ok(number_arg(name, x)?.map_or(Value::Undefined, |n| Value::Number(f(n))))
}

fn round_call(name: &str, args: &[Value]) -> Result<Value, EvalError> {
    let (x, digits) = match args {
        [x] => (x, 0),
        [x, digits] => match number_arg(name, digits)? {
            Some(d) if d >= 0.0 && d.fract() == 0.0 && d <= 15.0 => (x, d as i32),
            _ => return Err(invalid(name, "digits must be an integer between 0 and 15")),
        },
        _ => return Err(arity(name, "1 or 2", args.len())),
    };
    let scale = 10f64.powi(digits);
    Ok(number_arg(name, x)?.map_or(Value::Undefined, |n| {
        Value::Number((n * scale).round() / scale)
    }))
}

fn extremum(name: &str, args: &[Value], pick: fn(f64, f64) -> f64) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(arity(name, "at least 1", 0));
    }
    let mut result: Option<f64> = None;
    let mut undefined = false;
    for arg in args {
        match number_arg(name, arg)? {
            Some(n) => result = Some(result.map_or(n, |r| pick(r, n))),
            None => undefined = true,
        }
    }
    Ok(match result {
        Some(n) if !undefined => Value::Number(n),
        _ => Value::Undefined,
    })
}
