//! The scope table: the sandbox's sole isolation boundary
//!
//! User programs can resolve exactly the names bound here (plus the four
//! engine intrinsics the markup rewrite targets). There is no ambient
//! global lookup and no process-level sandboxing; keeping this table
//! small is what keeps evaluation contained.

use indexmap::IndexMap;

use crate::value::{NativeFn, Value};

/// An immutable name→value allow-list, built once per session.
#[derive(Debug, Clone, Default)]
pub struct ScopeTable {
    bindings: IndexMap<String, Value>,
}

impl ScopeTable {
    /// Start building a scope table.
    pub fn builder() -> ScopeTableBuilder {
        ScopeTableBuilder::default()
    }

    /// Build a table directly from (name, value) pairs.
    ///
    /// Later pairs win on duplicate names, matching the builder.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, Value)>) -> Self {
        let mut bindings = IndexMap::new();
        for (name, value) in pairs {
            bindings.insert(name, value);
        }
        Self { bindings }
    }

    /// Look up a bound value by exact name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Whether a name is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// All bound names, in binding order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// Iterate over (name, value) pairs in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.bindings.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Builder for [`ScopeTable`]. Duplicate names: last bind wins.
#[derive(Debug, Clone, Default)]
pub struct ScopeTableBuilder {
    bindings: IndexMap<String, Value>,
}

impl ScopeTableBuilder {
    /// Bind a value under a name.
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bindings.insert(name.into(), value.into());
        self
    }

    /// Bind a host function under a name.
    ///
    /// `arity` of -1 accepts any argument count. Errors returned by `f`
    /// surface as runtime faults; panics inside `f` are also contained
    /// at the sandbox boundary.
    pub fn bind_fn(
        self,
        name: impl Into<String>,
        arity: i32,
        f: impl Fn(&[Value]) -> Result<Value, String> + 'static,
    ) -> Self {
        let name = name.into();
        let native = NativeFn::new(name.clone(), arity, f);
        self.bind(name, Value::Native(native))
    }

    /// Finish building.
    pub fn build(self) -> ScopeTable {
        ScopeTable {
            bindings: self.bindings,
        }
    }
}
