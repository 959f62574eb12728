use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::error::{LoxError, Result};
use crate::function::{Callable, LoxFunction};
use crate::interpreter::Interpreter;
use crate::token::Token;
use crate::value::Value;

/// Name of the method run on construction.
pub const INITIALIZER: &str = "init";

/// A class value: its name, optional superclass and unbound methods.
pub struct LoxClass {
    pub name: String,
    pub superclass: Option<Rc<LoxClass>>,
    methods: HashMap<String, Rc<LoxFunction>>,
}

impl LoxClass {
    pub fn new(
        name: String,
        superclass: Option<Rc<LoxClass>>,
        methods: HashMap<String, Rc<LoxFunction>>,
    ) -> Self {
        Self {
            name,
            superclass,
            methods,
        }
    }

    /// Unbound lookup: this class first, then up the superclass chain.
    fn lookup(&self, name: &str) -> Option<&Rc<LoxFunction>> {
        self.methods.get(name).or_else(|| {
            self.superclass
                .as_ref()
                .and_then(|superclass| superclass.lookup(name))
        })
    }

    /// Find `name` on this class or an ancestor, bound to `instance`.
    pub fn find_method(
        &self,
        instance: &Rc<RefCell<LoxInstance>>,
        name: &str,
    ) -> Option<Rc<LoxFunction>> {
        self.lookup(name)
            .map(|method| Rc::new(method.bind(Rc::clone(instance))))
    }
}

impl Callable for LoxClass {
    fn arity(&self) -> usize {
        self.lookup(INITIALIZER).map_or(0, |init| init.arity())
    }

    fn call(self: Rc<Self>, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value> {
        debug!("Constructing instance of '{}'", self.name);

        let instance = Rc::new(RefCell::new(LoxInstance::new(Rc::clone(&self))));

        if let Some(initializer) = self.find_method(&instance, INITIALIZER) {
            initializer.call(interpreter, arguments)?;
        }

        Ok(Value::Instance(instance))
    }
}

impl fmt::Debug for LoxClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxClass")
            .field("name", &self.name)
            .field(
                "superclass",
                &self.superclass.as_ref().map(|c| c.name.clone()),
            )
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// An object created by calling a class.  Fields spring into existence on
/// first assignment.
pub struct LoxInstance {
    pub class: Rc<LoxClass>,
    fields: HashMap<String, Value>,
}

impl LoxInstance {
    pub fn new(class: Rc<LoxClass>) -> Self {
        Self {
            class,
            fields: HashMap::new(),
        }
    }

    /// Property read: a field wins over a method of the same name.
    pub fn get(instance: &Rc<RefCell<LoxInstance>>, name: &Token) -> Result<Value> {
        let field: Option<Value> = instance.borrow().fields.get(&name.lexeme).cloned();
        if let Some(value) = field {
            return Ok(value);
        }

        let class: Rc<LoxClass> = Rc::clone(&instance.borrow().class);
        class
            .find_method(instance, &name.lexeme)
            .map(Value::Function)
            .ok_or_else(|| {
                LoxError::runtime(name, format!("Undefined property '{}'.", name.lexeme))
            })
    }

    pub fn set(&mut self, name: &Token, value: Value) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}

impl fmt::Debug for LoxInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxInstance")
            .field("class", &self.class.name)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}
