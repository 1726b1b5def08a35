#![allow(dead_code)]

use std::collections::BTreeMap;
use std::rc::Rc;

use engine_callbacks::{CallbackRegistry, EngineTypes};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Callback(#[from] engine_callbacks::Error),

    #[error("memory not defined at {address:#x} with size {size}")]
    UndefinedMemory { address: u64, size: usize },

    #[error("register {0} not defined")]
    UndefinedRegister(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Engine value types handed to callbacks
pub struct Types;

impl EngineTypes for Types {
    type MemoryAccess = MemoryAccess;
    type Register = Register;
    type Node = Rc<Expr>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryAccess {
    pub address: u64,
    pub size: usize,
    pub value: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Register {
    pub name: String,
    pub value: Option<u64>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Expr {
    Constant(u64),
    Symbol(String),
    Add(Rc<Expr>, Rc<Expr>),
    Xor(Rc<Expr>, Rc<Expr>),
}

impl Expr {
    pub fn constant(value: u64) -> Rc<Self> {
        Rc::new(Self::Constant(value))
    }

    pub fn symbol(name: impl Into<String>) -> Rc<Self> {
        Rc::new(Self::Symbol(name.into()))
    }
}

/// Minimal engine that consults its callbacks the way a symbolic execution engine would. Memory
/// is little endian and byte addressed.
#[derive(Clone, Default)]
pub struct Engine {
    pub callbacks: CallbackRegistry<Types>,
    memory: BTreeMap<u64, u8>,
    registers: BTreeMap<String, u64>,
    expressions: Vec<Rc<Expr>>,
}

impl Engine {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn write_memory(&mut self, address: u64, bytes: &[u8]) {
        for (offset, byte) in bytes.iter().enumerate() {
            self.memory.insert(address.wrapping_add(offset as u64), *byte);
        }
    }

    pub fn write_register(&mut self, name: impl Into<String>, value: u64) {
        self.registers.insert(name.into(), value);
    }

    /// Read a concrete memory value. Callbacks are given the chance to provide the value before
    /// the engine falls back to its own memory. The engine itself only holds values of up to 8
    /// bytes and addresses wrap around.
    pub fn read_memory(&self, address: u64, size: usize) -> Result<u64> {
        let mut access = MemoryAccess {
            address,
            size,
            value: None,
        };

        if self.callbacks.is_defined() {
            self.callbacks.process_concrete_memory_value(&mut access)?;
        } else {
            log::trace!("no callbacks for read of {size} bytes at {address:#x}");
        }

        if let Some(value) = access.value {
            return Ok(value);
        }

        if size > std::mem::size_of::<u64>() {
            log::debug!("read of {size} bytes at {address:#x} exceeds engine value size");
            return Err(Error::UndefinedMemory { address, size });
        }

        (0..size)
            .try_fold(0u64, |value, i| {
                let offset = address.wrapping_add(i as u64);
                let byte = self.memory.get(&offset).copied()?;
                Some(value | (u64::from(byte) << (8 * i)))
            })
            .ok_or(Error::UndefinedMemory { address, size })
    }

    pub fn read_register(&self, name: &str) -> Result<u64> {
        let mut register = Register {
            name: name.to_owned(),
            value: self.registers.get(name).copied(),
        };

        if self.callbacks.is_defined() {
            self.callbacks.process_concrete_register_value(&mut register)?;
        }

        register
            .value
            .ok_or_else(|| Error::UndefinedRegister(name.to_owned()))
    }

    /// Commit an expression to the symbolic state after simplification.
    pub fn assign(&mut self, expression: Rc<Expr>) -> Result<Rc<Expr>> {
        let expression = if self.callbacks.is_defined() {
            self.callbacks.process_symbolic_simplification(expression)?
        } else {
            expression
        };

        self.expressions.push(Rc::clone(&expression));
        Ok(expression)
    }

    pub fn expressions(&self) -> &[Rc<Expr>] {
        &self.expressions
    }
}
