use crate::registry::Error;

/// The events a callback may be registered for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
pub enum CallbackKind {
    /// The engine needs the concrete value of a memory access.
    ConcreteMemoryValue = 0,

    /// The engine needs the concrete value of a register.
    ConcreteRegisterValue = 1,

    /// The engine is about to commit a symbolic expression and offers it for simplification.
    SymbolicSimplification = 2,
}

impl CallbackKind {
    /// All kinds in dispatch table order.
    pub const ALL: [CallbackKind; 3] = [
        CallbackKind::ConcreteMemoryValue,
        CallbackKind::ConcreteRegisterValue,
        CallbackKind::SymbolicSimplification,
    ];

    /// The number of arguments a callback of this kind is invoked with. Memory and register
    /// callbacks receive the descriptor, simplification callbacks receive the node.
    pub const fn arity(&self) -> usize {
        match self {
            Self::ConcreteMemoryValue => 1,
            Self::ConcreteRegisterValue => 1,
            Self::SymbolicSimplification => 1,
        }
    }

    #[cfg_attr(not(feature = "foreign"), allow(dead_code))]
    pub(crate) const fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for CallbackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConcreteMemoryValue => write!(f, "concrete memory value"),
            Self::ConcreteRegisterValue => write!(f, "concrete register value"),
            Self::SymbolicSimplification => write!(f, "symbolic simplification"),
        }
    }
}

impl TryFrom<u32> for CallbackKind {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::ConcreteMemoryValue),
            1 => Ok(Self::ConcreteRegisterValue),
            2 => Ok(Self::SymbolicSimplification),
            _ => Err(Error::UnknownCallbackKind(value)),
        }
    }
}

impl From<CallbackKind> for u32 {
    fn from(kind: CallbackKind) -> Self {
        kind as u32
    }
}
