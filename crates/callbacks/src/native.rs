use crate::kind::CallbackKind;
use crate::EngineTypes;

/// Callback invoked when the engine needs a concrete memory value. The callback writes the value
/// into the memory access in place.
pub type ConcreteMemoryValueCallback<E> = fn(&mut <E as EngineTypes>::MemoryAccess);

/// Callback invoked when the engine needs a concrete register value. The callback writes the
/// value into the register in place.
pub type ConcreteRegisterValueCallback<E> = fn(&mut <E as EngineTypes>::Register);

/// Callback invoked before a symbolic expression is committed. The callback takes ownership of
/// the node and returns the node the engine should use instead, which may be the same node.
pub type SymbolicSimplificationCallback<E> =
    fn(<E as EngineTypes>::Node) -> <E as EngineTypes>::Node;

/// A callback implemented as a plain function pointer. The variant determines the
/// [CallbackKind] the callback is registered for.
///
/// Two callbacks are equal if they have the same kind and the same function address. Rust does
/// not guarantee distinct functions have distinct addresses: the compiler may merge functions
/// with identical bodies, in which case callbacks built from either function compare equal.
pub enum NativeCallback<E: EngineTypes> {
    /// See [CallbackKind::ConcreteMemoryValue].
    ConcreteMemoryValue(ConcreteMemoryValueCallback<E>),

    /// See [CallbackKind::ConcreteRegisterValue].
    ConcreteRegisterValue(ConcreteRegisterValueCallback<E>),

    /// See [CallbackKind::SymbolicSimplification].
    SymbolicSimplification(SymbolicSimplificationCallback<E>),
}

impl<E: EngineTypes> NativeCallback<E> {
    /// The kind of event this callback handles.
    pub fn kind(&self) -> CallbackKind {
        match self {
            Self::ConcreteMemoryValue(_) => CallbackKind::ConcreteMemoryValue,
            Self::ConcreteRegisterValue(_) => CallbackKind::ConcreteRegisterValue,
            Self::SymbolicSimplification(_) => CallbackKind::SymbolicSimplification,
        }
    }

    /// Address of the underlying function. Used to identify a registration.
    fn address(&self) -> usize {
        match self {
            Self::ConcreteMemoryValue(callback) => *callback as usize,
            Self::ConcreteRegisterValue(callback) => *callback as usize,
            Self::SymbolicSimplification(callback) => *callback as usize,
        }
    }
}

// Derives would require the engine types themselves to implement these traits

impl<E: EngineTypes> Clone for NativeCallback<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: EngineTypes> Copy for NativeCallback<E> {}

// Function addresses are not guaranteed unique, see the type documentation
impl<E: EngineTypes> PartialEq for NativeCallback<E> {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.address() == other.address()
    }
}

impl<E: EngineTypes> Eq for NativeCallback<E> {}

impl<E: EngineTypes> std::fmt::Debug for NativeCallback<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "NativeCallback({kind}, {address:#x})",
            kind = self.kind(),
            address = self.address()
        )
    }
}
