//! Variable scope shared by one validation run.

use indexmap::IndexMap;
use sigil_value::Value;

/// Prefix that marks a variable reference and every stored binding key.
pub const SIGIL: char = '$';

/// Canonical key for a variable name: `x` and `$x` both become `$x`.
pub fn variable_key(name: &str) -> String {
    let bare = name.strip_prefix(SIGIL).unwrap_or(name);
    format!("{SIGIL}{bare}")
}

/// `true` when `raw` has the shape of a reference: the sigil followed by at
/// least one character.
pub fn is_reference(raw: &str) -> bool {
    raw.len() > 1 && raw.starts_with(SIGIL)
}

/// Mapping from variable key to the most recently bound value.
///
/// Values are only ever written after a successful validation; the last write
/// wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    vars: IndexMap<String, Value>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` under `name`, returning the value it replaces.
    pub fn bind(&mut self, name: &str, value: Value) -> Option<Value> {
        self.vars.insert(variable_key(name), value)
    }

    /// Put `key` back to `previous`, removing it when it was unbound.
    pub(crate) fn restore(&mut self, key: &str, previous: Option<Value>) {
        match previous {
            Some(value) => {
                self.vars.insert(key.to_string(), value);
            }
            None => {
                self.vars.shift_remove(key);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        if name.starts_with(SIGIL) {
            self.vars.get(name)
        } else {
            self.vars.get(&variable_key(name))
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Bindings in first-bound order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: AsRef<str>> FromIterator<(K, Value)> for Scope {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        let mut scope = Scope::new();
        for (name, value) in iter {
            scope.bind(name.as_ref(), value);
        }
        scope
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_key_normalizes_sigil() {
        assert_eq!(variable_key("x"), "$x");
        assert_eq!(variable_key("$x"), "$x");
        assert_eq!(variable_key("$$x"), "$$x");
    }

    #[test]
    fn test_is_reference() {
        assert!(is_reference("$a"));
        assert!(!is_reference("$"));
        assert!(!is_reference("a$"));
        assert!(!is_reference(""));
    }

    #[test]
    fn test_bind_last_write_wins() {
        let mut scope = Scope::new();
        assert_eq!(scope.bind("x", Value::from(1)), None);
        assert_eq!(scope.bind("$x", Value::from(2)), Some(Value::from(1)));
        assert_eq!(scope.get("$x"), Some(&Value::from(2)));
        assert_eq!(scope.get("x"), Some(&Value::from(2)));
        assert_eq!(scope.len(), 1);
    }

    #[test]
    fn test_restore() {
        let mut scope = Scope::new();
        scope.bind("a", Value::from(1));
        let previous = scope.bind("a", Value::from(2));
        scope.bind("b", Value::from(3));

        scope.restore("$b", None);
        scope.restore("$a", previous);
        assert_eq!(scope.get("a"), Some(&Value::from(1)));
        assert!(!scope.contains("b"));
        assert_eq!(scope.len(), 1);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut scope: Scope = [("a", Value::from(true))].into_iter().collect();
        let mut copy = scope.clone();
        copy.bind("b", Value::Null);
        assert!(!scope.contains("b"));
        scope.bind("c", Value::Null);
        assert!(!copy.contains("c"));
    }
}
