#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Reference evaluator for the learner dialect of Robo Trail programs.
//!
//! The dialect is the small, indentation-structured subset of Python the
//! lessons teach: comments, integer and string values, simple arithmetic,
//! `name = value` assignments, `for i in range(n):` loops, single-parameter
//! `def` helpers, and calls to the four robot commands. The engine reports
//! failures in the style of Python's error messages and bounds evaluation
//! with a statement budget so runaway loops end as engine errors.

use std::collections::HashMap;

use robo_trail_core::{EngineError, ScriptEngine, ScriptError, ScriptHost};
use tracing::debug;

mod lexer;
mod parser;

use parser::{BinaryOp, Expr, Function, Stmt, StmtKind};

/// Default number of statements a single program may execute.
pub const DEFAULT_STATEMENT_BUDGET: usize = 100_000;

/// Deepest helper-function nesting allowed before evaluation aborts.
pub const MAX_CALL_DEPTH: usize = 64;

/// Script engine for the learner dialect.
#[derive(Clone, Debug)]
pub struct LessonEngine {
    statement_budget: usize,
}

impl LessonEngine {
    /// Creates an engine with a custom statement budget.
    #[must_use]
    pub fn with_statement_budget(statement_budget: usize) -> Self {
        Self { statement_budget }
    }
}

impl Default for LessonEngine {
    fn default() -> Self {
        Self::with_statement_budget(DEFAULT_STATEMENT_BUDGET)
    }
}

impl ScriptEngine for LessonEngine {
    fn evaluate(&mut self, source: &str, host: &mut dyn ScriptHost) -> Result<(), ScriptError> {
        let program = parser::parse(source)?;
        let mut interpreter = Interpreter {
            host,
            globals: HashMap::new(),
            frames: Vec::new(),
            functions: HashMap::new(),
            fuel: self.statement_budget,
        };
        interpreter.run_block(&program)?;
        debug!(
            executed = self.statement_budget - interpreter.fuel,
            "program evaluated"
        );
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Number(value) if value.fract() == 0.0 => "int",
            Self::Number(_) => "float",
            Self::Text(_) => "str",
        }
    }

    fn display(&self) -> String {
        match self {
            Self::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                format!("{}", *value as i64)
            }
            Self::Number(value) => value.to_string(),
            Self::Text(text) => text.clone(),
        }
    }
}

struct Interpreter<'p, 'h> {
    host: &'h mut dyn ScriptHost,
    globals: HashMap<String, Value>,
    frames: Vec<HashMap<String, Value>>,
    functions: HashMap<&'p str, &'p Function>,
    fuel: usize,
}

impl<'p, 'h> Interpreter<'p, 'h> {
    fn run_block(&mut self, body: &'p [Stmt]) -> Result<(), ScriptError> {
        for stmt in body {
            self.run(stmt)?;
        }
        Ok(())
    }

    fn run(&mut self, stmt: &'p Stmt) -> Result<(), ScriptError> {
        if self.fuel == 0 {
            return Err(EngineError::at_line(
                stmt.line,
                "RuntimeError: the program ran too long. Try smaller loops.",
            )
            .into());
        }
        self.fuel -= 1;

        match &stmt.kind {
            StmtKind::Assign { name, value } => {
                let value = self.eval(value, stmt.line)?;
                self.assign(name, value);
            }
            StmtKind::Call { name, args } => self.call(name, args, stmt.line)?,
            StmtKind::For { var, count, body } => {
                let count = self.eval(count, stmt.line)?;
                let iterations = as_range_bound(&count, stmt.line)?;
                for index in 0..iterations {
                    self.assign(var, Value::Number(index as f64));
                    self.run_block(body)?;
                }
            }
            StmtKind::Def { name, function } => {
                let _ = self.functions.insert(name.as_str(), function);
            }
            StmtKind::Pass => {}
        }
        Ok(())
    }

    fn assign(&mut self, name: &str, value: Value) {
        let scope = self.frames.last_mut().unwrap_or(&mut self.globals);
        let _ = scope.insert(name.to_owned(), value);
    }

    fn lookup(&self, name: &str, line: usize) -> Result<Value, EngineError> {
        self.frames
            .last()
            .and_then(|frame| frame.get(name))
            .or_else(|| self.globals.get(name))
            .cloned()
            .ok_or_else(|| {
                EngineError::at_line(line, format!("NameError: name '{name}' is not defined"))
            })
    }

    fn eval(&self, expr: &Expr, line: usize) -> Result<Value, EngineError> {
        match expr {
            Expr::Number(value) => Ok(Value::Number(*value)),
            Expr::Text(text) => Ok(Value::Text(text.clone())),
            Expr::Name(name) => self.lookup(name, line),
            Expr::Negate(inner) => match self.eval(inner, line)? {
                Value::Number(value) => Ok(Value::Number(-value)),
                other => Err(EngineError::at_line(
                    line,
                    format!(
                        "TypeError: bad operand type for unary -: '{}'",
                        other.type_name()
                    ),
                )),
            },
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.eval(lhs, line)?;
                let rhs = self.eval(rhs, line)?;
                binary(op, lhs, rhs, line)
            }
        }
    }

    fn call(&mut self, name: &str, args: &[Expr], line: usize) -> Result<(), ScriptError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval(arg, line)?);
        }

        match name {
            "move" => {
                let [count] = expect_args::<1>(name, values, line)?;
                let count = match count {
                    Value::Number(value) => value,
                    Value::Text(_) => f64::NAN,
                };
                self.host.move_forward(count)?;
            }
            "turn_left" => {
                let [] = expect_args::<0>(name, values, line)?;
                self.host.turn_left();
            }
            "turn_right" => {
                let [] = expect_args::<0>(name, values, line)?;
                self.host.turn_right();
            }
            "say" => {
                let [message] = expect_args::<1>(name, values, line)?;
                self.host.say(message.display());
            }
            "range" => {
                let [bound] = expect_args::<1>(name, values, line)?;
                let _ = as_range_bound(&bound, line)?;
            }
            _ => self.call_function(name, values, line)?,
        }
        Ok(())
    }

    fn call_function(
        &mut self,
        name: &str,
        values: Vec<Value>,
        line: usize,
    ) -> Result<(), ScriptError> {
        let Some(function) = self.functions.get(name).copied() else {
            return Err(
                EngineError::at_line(line, format!("NameError: name '{name}' is not defined"))
                    .into(),
            );
        };
        if self.frames.len() >= MAX_CALL_DEPTH {
            return Err(EngineError::at_line(
                line,
                "RecursionError: maximum recursion depth exceeded",
            )
            .into());
        }

        let mut frame = HashMap::new();
        match (&function.param, values.len()) {
            (Some(param), 1) => {
                for value in values {
                    let _ = frame.insert(param.clone(), value);
                }
            }
            (None, 0) => {}
            (param, given) => {
                let expected = usize::from(param.is_some());
                return Err(EngineError::at_line(
                    line,
                    format!(
                        "TypeError: {name}() takes {expected} positional argument{} but {given} {} given",
                        if expected == 1 { "" } else { "s" },
                        if given == 1 { "was" } else { "were" },
                    ),
                )
                .into());
            }
        }

        self.frames.push(frame);
        let outcome = self.run_block(&function.body);
        let _ = self.frames.pop();
        outcome
    }
}

fn expect_args<const N: usize>(
    name: &str,
    values: Vec<Value>,
    line: usize,
) -> Result<[Value; N], EngineError> {
    let expected = N;
    let given = values.len();
    values.try_into().map_err(|_| {
        EngineError::at_line(
            line,
            format!(
                "TypeError: {name}() takes {expected} positional argument{} but {given} {} given",
                if expected == 1 { "" } else { "s" },
                if given == 1 { "was" } else { "were" },
            ),
        )
    })
}

fn as_range_bound(value: &Value, line: usize) -> Result<u64, EngineError> {
    match value {
        Value::Number(number) if number.is_finite() && number.fract() == 0.0 => {
            Ok(if *number <= 0.0 { 0 } else { *number as u64 })
        }
        other => Err(EngineError::at_line(
            line,
            format!(
                "TypeError: '{}' object cannot be interpreted as an integer",
                other.type_name()
            ),
        )),
    }
}

fn binary(op: &BinaryOp, lhs: Value, rhs: Value, line: usize) -> Result<Value, EngineError> {
    match (op, lhs, rhs) {
        (BinaryOp::Add, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
        (BinaryOp::Subtract, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
        (BinaryOp::Multiply, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
        (BinaryOp::Add, Value::Text(a), Value::Text(b)) => Ok(Value::Text(a + &b)),
        (op, lhs, rhs) => {
            let symbol = match op {
                BinaryOp::Add => "+",
                BinaryOp::Subtract => "-",
                BinaryOp::Multiply => "*",
            };
            Err(EngineError::at_line(
                line,
                format!(
                    "TypeError: unsupported operand type(s) for {symbol}: '{}' and '{}'",
                    lhs.type_name(),
                    rhs.type_name()
                ),
            ))
        }
    }
}
