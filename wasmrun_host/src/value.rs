use std::fmt::{Display, Formatter};
use std::str::FromStr;
use wasmtime::{Val, ValType};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty value")]
    Empty,
    #[error("invalid {kind} literal: '{literal}'")]
    Invalid { kind: &'static str, literal: String },
    #[error("unterminated list: '{0}'")]
    UnterminatedList(String),
}

/// A value exchanged with a module export.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Bool(bool),
    List(Vec<i32>),
}

impl Value {
    /// Number of wasm parameters this value occupies once lowered.
    pub fn arity(&self) -> usize {
        match self {
            Value::List(_) => 2,
            _ => 1,
        }
    }

    /// Lower a scalar to its wasm representation. Lists live in guest memory and have none.
    pub fn to_val(&self) -> Option<Val> {
        match self {
            Value::I32(v) => Some(Val::I32(*v)),
            Value::I64(v) => Some(Val::I64(*v)),
            Value::F32(v) => Some(Val::F32(v.to_bits())),
            Value::F64(v) => Some(Val::F64(v.to_bits())),
            Value::Bool(v) => Some(Val::I32(*v as i32)),
            Value::List(_) => None,
        }
    }

    pub fn from_val(val: &Val) -> Option<Self> {
        match val {
            Val::I32(v) => Some(Value::I32(*v)),
            Val::I64(v) => Some(Value::I64(*v)),
            Val::F32(bits) => Some(Value::F32(f32::from_bits(*bits))),
            Val::F64(bits) => Some(Value::F64(f64::from_bits(*bits))),
            _ => None,
        }
    }

    /// Whether the lowered value fits a parameter of type `ty`.
    pub(crate) fn fits(&self, ty: &ValType) -> bool {
        match self {
            Value::I32(_) | Value::Bool(_) => matches!(ty, ValType::I32),
            Value::I64(_) => matches!(ty, ValType::I64),
            Value::F32(_) => matches!(ty, ValType::F32),
            Value::F64(_) => matches!(ty, ValType::F64),
            Value::List(_) => matches!(ty, ValType::I32),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Bool(_) => "bool",
            Value::List(_) => "list",
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::I32(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::List(xs) => {
                let items = xs.iter().map(|x| x.to_string()).collect::<Vec<_>>();
                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<Vec<i32>> for Value {
    fn from(v: Vec<i32>) -> Self {
        Value::List(v)
    }
}

impl From<&[i32]> for Value {
    fn from(v: &[i32]) -> Self {
        Value::List(v.to_vec())
    }
}

fn invalid(kind: &'static str, literal: &str) -> ParseError {
    ParseError::Invalid {
        kind,
        literal: literal.to_string(),
    }
}

/// Parses `42`, `42i64`, `1.5`, `1.5f32`, `true` and `[3, 1, 4]`.
impl FromStr for Value {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseError::Empty);
        }

        if let Some(inner) = s.strip_prefix('[') {
            let inner = inner
                .strip_suffix(']')
                .ok_or_else(|| ParseError::UnterminatedList(s.to_string()))?;
            if inner.trim().is_empty() {
                return Ok(Value::List(Vec::new()));
            }
            return inner
                .split(',')
                .map(|item| item.trim().parse::<i32>().map_err(|_| invalid("list item", item.trim())))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List);
        }

        match s {
            "true" => return Ok(Value::Bool(true)),
            "false" => return Ok(Value::Bool(false)),
            _ => {}
        }

        if let Some(n) = s.strip_suffix("i32") {
            return n.parse().map(Value::I32).map_err(|_| invalid("i32", s));
        }
        if let Some(n) = s.strip_suffix("i64") {
            return n.parse().map(Value::I64).map_err(|_| invalid("i64", s));
        }
        if let Some(n) = s.strip_suffix("f32") {
            return n.parse().map(Value::F32).map_err(|_| invalid("f32", s));
        }
        if let Some(n) = s.strip_suffix("f64") {
            return n.parse().map(Value::F64).map_err(|_| invalid("f64", s));
        }

        if s.contains(['.', 'e', 'E']) {
            return s.parse().map(Value::F64).map_err(|_| invalid("f64", s));
        }

        s.parse().map(Value::I32).map_err(|_| invalid("i32", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        assert_eq!("42".parse::<Value>(), Ok(Value::I32(42)));
        assert_eq!("-7".parse::<Value>(), Ok(Value::I32(-7)));
        assert_eq!("42i64".parse::<Value>(), Ok(Value::I64(42)));
        assert_eq!("1.5".parse::<Value>(), Ok(Value::F64(1.5)));
        assert_eq!("1.5f32".parse::<Value>(), Ok(Value::F32(1.5)));
        assert_eq!("true".parse::<Value>(), Ok(Value::Bool(true)));
        assert_eq!(
            "[3, 1,4]".parse::<Value>(),
            Ok(Value::List(vec![3, 1, 4]))
        );
        assert_eq!("[]".parse::<Value>(), Ok(Value::List(vec![])));
    }

    #[test]
    fn parse_errors() {
        assert_eq!("".parse::<Value>(), Err(ParseError::Empty));
        assert!(matches!(
            "[1, 2".parse::<Value>(),
            Err(ParseError::UnterminatedList(_))
        ));
        assert!(matches!(
            "[1, x]".parse::<Value>(),
            Err(ParseError::Invalid { kind: "list item", .. })
        ));
        assert!(matches!(
            "99999999999".parse::<Value>(),
            Err(ParseError::Invalid { kind: "i32", .. })
        ));
    }

    #[test]
    fn display() {
        assert_eq!(Value::I32(61).to_string(), "61");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(
            Value::List(vec![6, 2, 9, 5, 1, 4, 1, 3]).to_string(),
            "[6, 2, 9, 5, 1, 4, 1, 3]"
        );
        assert_eq!(Value::List(vec![]).to_string(), "[]");
    }

    #[test]
    fn lowering() {
        assert!(matches!(Value::Bool(true).to_val(), Some(Val::I32(1))));
        assert!(matches!(Value::Bool(false).to_val(), Some(Val::I32(0))));
        assert!(Value::List(vec![1]).to_val().is_none());

        let f = Value::F64(2.25).to_val().unwrap();
        assert_eq!(Value::from_val(&f), Some(Value::F64(2.25)));
    }
}
