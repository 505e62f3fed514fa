//! Display and Debug implementations for Value

use std::fmt;

use super::Value;

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Char(c) => write!(f, "'{}'", c),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{:?}", s.as_ref()),
            Value::Range(start, end) => write!(f, "{}..{}", start, end),

            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}", item)?;
                }
                write!(f, "]")
            }

            Value::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}", item)?;
                }
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }

            Value::Node(node) => write!(f, "node({})", node.to_html()),
            Value::Closure(c) => write!(f, "closure({})", c.params.join(", ")),
            Value::Native(n) => write!(f, "{:?}", n),
            Value::Intrinsic(i) => write!(f, "intrinsic({})", i.name()),
        }
    }
}

impl fmt::Display for Value {
    /// Same as Debug except strings print unquoted, so `text(name)` and
    /// stringified attribute values read naturally.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            other => write!(f, "{:?}", other),
        }
    }
}
