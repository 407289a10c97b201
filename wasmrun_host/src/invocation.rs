use crate::value::Value;
use std::fmt::{Display, Formatter};

/// How the raw wasm results of an export are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Returns {
    /// The single result as is, or nothing for a function without results.
    #[default]
    Value,
    /// A single `i32`, `0` being `false`.
    Bool,
    /// A `(ptr, len)` pair describing `len` `i32`s in guest memory.
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Separator {
    #[default]
    Eq,
    EqEq,
}

impl Display for Separator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Separator::Eq => write!(f, "="),
            Separator::EqEq => write!(f, "=="),
        }
    }
}

/// A single call of a module export together with how its result is printed.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub(crate) export: String,
    pub(crate) args: Vec<Value>,
    pub(crate) returns: Returns,
    label: Option<String>,
    separator: Separator,
}

impl Invocation {
    pub fn new<S: Into<String>>(export: S) -> Self {
        Self {
            export: export.into(),
            args: Vec::new(),
            returns: Returns::default(),
            label: None,
            separator: Separator::default(),
        }
    }

    pub fn arg<V: Into<Value>>(mut self, value: V) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn args<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.args.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn returns(mut self, returns: Returns) -> Self {
        self.returns = returns;
        self
    }

    pub fn label<S: Into<String>>(mut self, label: S) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn separator(mut self, separator: Separator) -> Self {
        self.separator = separator;
        self
    }

    pub fn export(&self) -> &str {
        &self.export
    }

    pub fn arguments(&self) -> &[Value] {
        &self.args
    }

    /// The explicit label, or `export(arg, ...)` if none was set.
    pub fn display_label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => {
                let args = self.args.iter().map(|a| a.to_string()).collect::<Vec<_>>();
                format!("{}({})", self.export, args.join(", "))
            }
        }
    }
}

/// The result of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub value: Option<Value>,
    pub fuel_consumed: Option<u64>,
}

/// A formatted console line, `<label> <separator> <value>`.
pub struct Line<'a> {
    pub(crate) invocation: &'a Invocation,
    pub(crate) outcome: &'a Outcome,
}

impl Display for Line<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} ",
            self.invocation.display_label(),
            self.invocation.separator
        )?;
        match &self.outcome.value {
            Some(value) => write!(f, "{}", value),
            None => write!(f, "()"),
        }
    }
}

impl Outcome {
    pub fn line<'a>(&'a self, invocation: &'a Invocation) -> Line<'a> {
        Line {
            invocation,
            outcome: self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_label() {
        let inv = Invocation::new("add").arg(42).arg(19);
        assert_eq!(inv.display_label(), "add(42, 19)");

        let inv = Invocation::new("reverse").arg(vec![1, 2]);
        assert_eq!(inv.display_label(), "reverse([1, 2])");
    }

    #[test]
    fn line() {
        let inv = Invocation::new("add")
            .args([42, 19])
            .label("42 + 19")
            .separator(Separator::EqEq);
        let outcome = Outcome {
            value: Some(Value::I32(61)),
            fuel_consumed: None,
        };
        assert_eq!(outcome.line(&inv).to_string(), "42 + 19 == 61");

        let unit = Outcome {
            value: None,
            fuel_consumed: Some(3),
        };
        assert_eq!(
            unit.line(&Invocation::new("run")).to_string(),
            "run() = ()"
        );
    }
}
