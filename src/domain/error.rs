//! Domain error types.

/// A parse error with position information for script parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        let column = input
            .get(..self.position.min(input.len()))
            .map(|prefix| prefix.chars().count())
            .unwrap_or(self.position);
        let caret = " ".repeat(column) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// Errors raised while evaluating a compiled script against a context.
///
/// Missing history is not an error: indicators return empty series and the
/// evaluator carries them as undefined values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("unknown variable '{name}'")]
    UnknownVariable { name: String },

    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    #[error("{function}() expects {expected} argument(s), found {found}")]
    Arity {
        function: String,
        expected: &'static str,
        found: usize,
    },

    #[error("{function}(): {reason}")]
    InvalidArgument { function: String, reason: String },

    #[error("cannot apply '{op}' to {left} and {right}")]
    TypeMismatch {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },
}

/// Top-level error type for stratscript.
#[derive(Debug, thiserror::Error)]
pub enum StratscriptError {
    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("strategy store error: {reason}")]
    StrategyStore { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    ScriptParse(#[from] ParseError),

    #[error("invalid script in {strategy}: {reason}")]
    ScriptInvalid { strategy: String, reason: String },

    #[error("no price data for {symbol}")]
    NoData { symbol: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StratscriptError> for std::process::ExitCode {
    fn from(err: &StratscriptError) -> Self {
        let code: u8 = match err {
            StratscriptError::Io(_) => 1,
            StratscriptError::ConfigParse { .. }
            | StratscriptError::ConfigMissing { .. }
            | StratscriptError::ConfigInvalid { .. } => 2,
            StratscriptError::DataSource { .. } | StratscriptError::StrategyStore { .. } => 3,
            StratscriptError::ScriptParse(_) | StratscriptError::ScriptInvalid { .. } => 4,
            StratscriptError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
