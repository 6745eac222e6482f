//! `crisp run`: compile a tree and tick it against a stub host built from
//! `--var KEY=VALUE` pairs. There's no embedding application here, so every
//! action invocation on the stub host just returns `Success`.

use std::collections::HashMap;

use crate::cli::RunArgs;
use crate::diagnostics_printer::DiagnosticsPrinter;
use crate::source_loader::load_source;
use crisp_compiler::compile;
use crisp_core::{BtStatus, FuelLimits};
use crisp_interp::{Blackboard, Context, Interpreter, RuntimeError, Value};

use super::{FAIL, OK};

pub fn run(args: RunArgs) -> super::ExitCode {
    let source = match load_source(&args.path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            return FAIL;
        }
    };

    let (ir, diagnostics) = compile(&source, FuelLimits::default());

    if !diagnostics.is_empty() {
        let path = args.path.display().to_string();
        let printer =
            DiagnosticsPrinter::new(&diagnostics).source(&source).path(&path).colored(args.color.should_colorize());
        eprint!("{}", printer.render());
    }

    if diagnostics.has_errors() {
        return FAIL;
    }

    let tree = match &args.tree {
        Some(name) => ir.trees.iter().find(|t| &t.name == name),
        None => ir.trees.first(),
    };
    let Some(tree) = tree else {
        eprintln!("no tree named '{}' in '{}'", args.tree.as_deref().unwrap_or("<first>"), args.path.display());
        return FAIL;
    };

    let vars = match parse_vars(&args.vars) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{e}");
            return FAIL;
        }
    };
    let mut host = StubHost { vars };

    let mut interpreter = Interpreter::new();
    for i in 0..args.ticks {
        match interpreter.tick(&tree.body, &mut host, None, args.dt) {
            Ok(status) => println!("tick {i}: {status}"),
            Err(err) => {
                eprintln!("tick {i}: {err}");
                return FAIL;
            }
        }
    }
    OK
}

fn parse_vars(pairs: &[String]) -> Result<HashMap<String, Value>, String> {
    let mut vars = HashMap::new();
    for pair in pairs {
        let (key, raw) = pair.split_once('=').ok_or_else(|| format!("'{pair}' is not in KEY=VALUE form"))?;
        vars.insert(key.to_string(), parse_value(raw));
    }
    Ok(vars)
}

fn parse_value(raw: &str) -> Value {
    if let Ok(b) = raw.parse::<bool>() {
        return Value::Bool(b);
    }
    if let Ok(i) = raw.parse::<i32>() {
        return Value::Int(i);
    }
    if let Ok(f) = raw.parse::<f32>() {
        return Value::Float(f);
    }
    Value::String(raw.to_string())
}

/// A host with no behavior of its own: member loads answer from `--var`,
/// every action invocation succeeds.
struct StubHost {
    vars: HashMap<String, Value>,
}

impl StubHost {
    fn lookup(&self, path: &[String]) -> Result<Value, RuntimeError> {
        let key = path.join(".");
        self.vars.get(&key).cloned().ok_or_else(|| RuntimeError::MissingMember(key))
    }
}

impl Context for StubHost {
    fn member(&self, path: &[String]) -> Result<Value, RuntimeError> {
        self.lookup(path)
    }

    fn invoke(&mut self, _declaring_type: &str, _name: &str, _args: &[Value]) -> Result<Value, RuntimeError> {
        Ok(Value::BtStatus(BtStatus::Success))
    }
}

impl Blackboard for StubHost {
    fn member(&self, path: &[String]) -> Result<Value, RuntimeError> {
        self.lookup(path)
    }
}
