//! # Query
//!
//! Match expressions in the jq language, compiled and run by the jaq
//! interpreter (`jaq-core` with the `jaq-std` and `jaq-json` libraries).
//!
//! A [`Query`] is compiled once when a rule set is built and then run
//! against every record. Outputs are produced on demand: the match engine
//! only ever pulls the first one. Records cross into jaq as `jaq_json::Val`
//! and results come back as [`contracts::Value`].

mod error;

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use contracts::Value;
use jaq_core::load::{self, Arena, File, Loader};
use jaq_core::{compile, Compiler, Ctx, Native, RcIter};
use jaq_json::Val;

pub use error::{CompileError, EvalError, EvalResult};

type Filter = jaq_core::Filter<Native<Val>>;

/// A compiled match expression
pub struct Query {
    source: String,
    filter: Filter,
}

impl Query {
    /// Compile an expression against the standard jq definitions
    ///
    /// # Errors
    /// Returns `CompileError` on syntax errors, undefined filters and
    /// unbound variables.
    pub fn compile(expression: &str) -> Result<Self, CompileError> {
        let loader = Loader::new(jaq_std::defs().chain(jaq_json::defs()));
        let arena = Arena::default();
        let program = File {
            code: expression,
            path: (),
        };

        let modules = loader.load(&arena, program).map_err(load_error)?;
        let filter = Compiler::default()
            .with_funs(jaq_std::funs().chain(jaq_json::funs()))
            .compile(modules)
            .map_err(compile_error)?;

        Ok(Self {
            source: expression.to_string(),
            filter,
        })
    }

    /// Expression text this query was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// First output with `input` as `.`, if any
    ///
    /// Later outputs are never computed. A panic inside the interpreter is
    /// reported as an `EvalError` for this input only.
    pub fn first(&self, input: &Value) -> Option<EvalResult<Value>> {
        let input = match serde_json::to_value(input) {
            Ok(json) => Val::from(json),
            Err(e) => return Some(Err(EvalError::new(format!("cannot convert input: {e}")))),
        };

        panic::catch_unwind(AssertUnwindSafe(|| {
            let inputs = RcIter::new(core::iter::empty());
            let mut outputs = self.filter.run((Ctx::new([], &inputs), input));
            let first = outputs.next();
            first.map(|output| {
                output
                    .map(from_val)
                    .map_err(|e| EvalError::new(e.to_string()))
            })
        }))
        .unwrap_or_else(|payload| {
            Some(Err(EvalError::new(format!(
                "evaluation aborted: {}",
                panic_message(payload.as_ref())
            ))))
        })
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Query").field(&self.source).finish()
    }
}

fn from_val(val: Val) -> Value {
    Value::from(serde_json::Value::from(val))
}

/// Byte offset of `at` inside `code`; spans are always subslices of it
fn offset(code: &str, at: &str) -> usize {
    (at.as_ptr() as usize)
        .saturating_sub(code.as_ptr() as usize)
        .min(code.len())
}

fn expected(code: &str, expect: &str, at: &str) -> CompileError {
    let message = if at.is_empty() {
        format!("unexpected end of input, expected {expect}")
    } else {
        format!("expected {expect}")
    };
    CompileError::new(message, offset(code, at))
}

fn load_error(errs: load::Errors<&str, ()>) -> CompileError {
    let mut found = errs.into_iter().flat_map(|(file, err)| {
        let code = file.code;
        match err {
            load::Error::Io(errs) => errs
                .into_iter()
                .map(|(path, message)| CompileError::new(format!("cannot load {path}: {message}"), 0))
                .collect::<Vec<_>>(),
            load::Error::Lex(errs) => errs
                .into_iter()
                .map(|(expect, at)| expected(code, expect.as_str(), at))
                .collect(),
            load::Error::Parse(errs) => errs
                .into_iter()
                .map(|(expect, at)| expected(code, expect.as_str(), at))
                .collect(),
        }
    });
    found
        .next()
        .unwrap_or_else(|| CompileError::new("invalid expression", 0))
}

fn compile_error(errs: compile::Errors<&str, ()>) -> CompileError {
    let mut found = errs.into_iter().flat_map(|(file, errs)| {
        let code = file.code;
        errs.into_iter().map(move |(name, undefined)| {
            CompileError::new(format!("undefined {} {name}", undefined.as_str()), offset(code, name))
        })
    });
    found
        .next()
        .unwrap_or_else(|| CompileError::new("invalid expression", 0))
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("interpreter panic")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(text: &str) -> Value {
        Value::from_json_str(text).unwrap()
    }

    const CREATE_USER: &str =
        r#"select(.eventName == "CreateUser") | "username: \(.responseElements.user.userName)""#;

    #[test]
    fn test_create_user_match() {
        let query = Query::compile(CREATE_USER).unwrap();

        let hit = record(
            r#"{"eventName":"CreateUser","responseElements":{"user":{"userName":"user1"}}}"#,
        );
        assert_eq!(query.first(&hit), Some(Ok(Value::from("username: user1"))));

        let miss = record(r#"{"eventName":"DeleteUser"}"#);
        assert!(query.first(&miss).is_none());
    }

    #[test]
    fn test_first_output_does_not_force_the_rest() {
        let query = Query::compile(r#"1, error("never evaluated")"#).unwrap();
        assert_eq!(query.first(&Value::Null), Some(Ok(Value::from(1i64))));
    }

    #[test]
    fn test_runtime_error_is_reported() {
        let query = Query::compile(".a.b").unwrap();
        assert!(matches!(query.first(&record(r#"{"a":"text"}"#)), Some(Err(_))));
    }

    #[test]
    fn test_compile_errors() {
        for expr in ["select(", "nosuchfn", "$unbound", ".a |"] {
            assert!(Query::compile(expr).is_err(), "{expr}");
        }

        let err = Query::compile(".eventName | nosuchfn").unwrap_err();
        assert!(err.message.contains("nosuchfn"), "{err}");
    }

    #[test]
    fn test_standard_library_over_records() {
        let rec = record(
            r#"{"eventName":"AssumeRole","userIdentity":{"type":"Root"},"tags":["a","b"],"n":3}"#,
        );
        let cases = [
            (r#".eventName | test("^assume"; "i")"#, Value::Bool(true)),
            (r#".userIdentity.type == "Root" and (.tags | length) == 2"#, Value::Bool(true)),
            (r#".tags | map(ascii_upcase) | join(",")"#, Value::from("A,B")),
            (r#"has("eventName")"#, Value::Bool(true)),
            (r#".tags | contains(["b"])"#, Value::Bool(true)),
            (r#".eventName | startswith("Assume")"#, Value::Bool(true)),
            (r#"[.tags[] | select(. != "a")]"#, Value::Array(vec!["b".into()])),
            (".n * 2 + 1", Value::from(7i64)),
            ("keys | first", Value::from("eventName")),
            (r#".missing // "none""#, Value::from("none")),
            (r#"to_entries | map(select(.key == "n")) | from_entries"#, record(r#"{"n":3}"#)),
            ("[limit(1; .tags[])]", Value::Array(vec!["a".into()])),
            (".n | tostring", Value::from("3")),
            (r#"any(.tags[]; . == "b")"#, Value::Bool(true)),
            ("reduce .tags[] as $t (0; . + 1)", Value::from(2i64)),
            ("def twice(f): f | f; .n | twice(. * 2)", Value::from(12i64)),
            ("[range(3)]", record("[0,1,2]")),
            ("[[1,[2]],3] | flatten", record("[1,2,3]")),
            (r#"getpath(["userIdentity","type"])"#, Value::from("Root")),
            (". as {eventName: $e} | $e", Value::from("AssumeRole")),
            (r#".eventName | sub("Role"; "User")"#, Value::from("AssumeUser")),
            (".tags | sort_by(.) | reverse | first", Value::from("b")),
            (r#""hi" | @base64"#, Value::from("aGk=")),
        ];
        for (expr, expected) in cases {
            let query = Query::compile(expr).unwrap_or_else(|e| panic!("{expr}: {e}"));
            assert_eq!(query.first(&rec), Some(Ok(expected)), "{expr}");
        }
    }

    #[test]
    fn test_string_repeat_with_huge_count_does_not_abort() {
        let query = Query::compile(".name * .count").unwrap();
        let out = query.first(&record(r#"{"name":"x","count":1e300}"#));
        assert!(!matches!(out, Some(Ok(Value::String(_)))), "{out:?}");
    }

    #[test]
    fn test_modulo_with_huge_divisor_does_not_abort() {
        let query = Query::compile(".a % .b").unwrap();
        match query.first(&record(r#"{"a":5,"b":-1e19}"#)) {
            Some(Ok(value)) => assert_eq!(value, Value::from(5i64)),
            Some(Err(_)) => {}
            None => panic!("expected one output"),
        }
    }
}
