use serde_json::{Map, Value};
use std::fmt;

/// A stored record: a JSON object
pub type Document = Map<String, Value>;

/// Single predicate over a dotted field path
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the given value
    Eq { path: Vec<String>, value: Value },
    /// Field is absent or null
    Missing { path: Vec<String> },
}

impl Condition {
    pub fn path(&self) -> &[String] {
        match self {
            Condition::Eq { path, .. } | Condition::Missing { path } => path,
        }
    }

    pub fn matches(&self, document: &Document) -> bool {
        let found = lookup(document, self.path());
        match self {
            Condition::Eq { value, .. } => found == Some(value),
            Condition::Missing { .. } => matches!(found, None | Some(Value::Null)),
        }
    }
}

/// Conjunction of field predicates, the store's query language
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub conditions: Vec<Condition>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` (dotted path, e.g. `folder.shortid`) to equal `value`
    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq {
            path: split_path(field),
            value: value.into(),
        });
        self
    }

    /// Require `field` to be absent or null
    pub fn missing(mut self, field: &str) -> Self {
        self.conditions.push(Condition::Missing {
            path: split_path(field),
        });
        self
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.conditions.iter().all(|c| c.matches(document))
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            let path = condition.path().join(".");
            match condition {
                Condition::Eq { value, .. } => write!(f, "{}: {}", path, value)?,
                Condition::Missing { .. } => write!(f, "{}: null", path)?,
            }
        }
        write!(f, "}}")
    }
}

/// Shallow `$set` update: listed top-level fields are replaced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    pub set: Document,
}

impl Update {
    pub fn set(fields: Document) -> Self {
        Self { set: fields }
    }

    pub fn apply(&self, document: &mut Document) {
        for (field, value) in &self.set {
            document.insert(field.clone(), value.clone());
        }
    }
}

fn split_path(field: &str) -> Vec<String> {
    field.split('.').map(str::to_string).collect()
}

fn lookup<'a>(document: &'a Document, path: &[String]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let mut current = document.get(first)?;
    for segment in rest {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}
