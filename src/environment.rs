use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to a scope.  Blocks, calls and closures all hold these.
pub type EnvRef = Rc<RefCell<Environment>>;

/// One binding scope: a name → value table plus the enclosing scope.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wrap `self` in a shareable handle.
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    /// Bind `name` in this scope, replacing any previous binding here.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Dynamic lookup walking outward.  Only used for unresolved (global) names.
    pub fn get(&self, name: &Token) -> Result<Value> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    /// Dynamic assignment walking outward.  Only used for unresolved (global) names.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }

    /// Read `name` from exactly `distance` scopes out from `env`.
    pub fn get_at(env: &EnvRef, distance: usize, name: &Token) -> Result<Value> {
        let scope: EnvRef = Self::ancestor(env, distance);
        let value: Option<Value> = scope.borrow().values.get(&name.lexeme).cloned();

        value.ok_or_else(|| undefined(name))
    }

    /// Write `name` in exactly `distance` scopes out from `env`.
    pub fn assign_at(env: &EnvRef, distance: usize, name: &Token, value: Value) {
        Self::ancestor(env, distance)
            .borrow_mut()
            .define(&name.lexeme, value);
    }

    /// The scope `distance` hops out from `env`.  The resolver guarantees the
    /// chain is at least that deep; if it is not, the outermost scope is used.
    pub fn ancestor(env: &EnvRef, distance: usize) -> EnvRef {
        let mut current: EnvRef = Rc::clone(env);

        for _ in 0..distance {
            let next: Option<EnvRef> = current.borrow().enclosing.clone();
            match next {
                Some(parent) => current = parent,
                None => break,
            }
        }

        current
    }
}

fn undefined(name: &Token) -> LoxError {
    LoxError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType;

    fn ident(name: &str) -> Token {
        Token::new(TokenType::IDENTIFIER, name, 1)
    }

    #[test]
    fn get_at_reads_the_exact_ancestor() {
        let outer: EnvRef = Environment::new().into_ref();
        outer.borrow_mut().define("a", Value::Number(1.0));

        let inner: EnvRef = Environment::with_enclosing(Rc::clone(&outer)).into_ref();
        inner.borrow_mut().define("a", Value::Number(2.0));

        let a = ident("a");
        assert!(matches!(Environment::get_at(&inner, 0, &a), Ok(Value::Number(n)) if n == 2.0));
        assert!(matches!(Environment::get_at(&inner, 1, &a), Ok(Value::Number(n)) if n == 1.0));
    }

    #[test]
    fn assign_at_is_visible_through_every_handle() {
        let shared: EnvRef = Environment::new().into_ref();
        shared.borrow_mut().define("count", Value::Number(0.0));

        let left: EnvRef = Environment::with_enclosing(Rc::clone(&shared)).into_ref();
        let right: EnvRef = Environment::with_enclosing(Rc::clone(&shared)).into_ref();

        let count = ident("count");
        Environment::assign_at(&left, 1, &count, Value::Number(5.0));

        assert!(matches!(Environment::get_at(&right, 1, &count), Ok(Value::Number(n)) if n == 5.0));
    }

    #[test]
    fn dynamic_assign_to_missing_name_fails() {
        let mut env = Environment::new();
        let err = env.assign(&ident("ghost"), Value::Nil).unwrap_err();

        assert_eq!(err.to_string(), "Undefined variable 'ghost'.\n[line 1]");
    }
}
