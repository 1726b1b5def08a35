//! Callbacks backed by callable objects of an embedded scripting runtime.
//!
//! The registry treats these objects as opaque. A runtime integration implements
//! [ForeignCallable] for its callable handle type, converting between its own value
//! representations and the [EngineTypes] values inside each `call_*` method. Handles are shared
//! through [Rc]: registering a handle retains it, removing it or dropping the registry releases
//! it.

use std::rc::Rc;

use crate::kind::CallbackKind;
use crate::EngineTypes;

/// Error reported by a foreign callable. The registry returns it to the engine unchanged.
pub type ForeignError = Box<dyn std::error::Error + Send + Sync>;

/// A callable object owned by an embedded scripting runtime.
pub trait ForeignCallable<E: EngineTypes> {
    /// Whether the object can be invoked at all.
    fn is_callable(&self) -> bool;

    /// The number of positional arguments the callable accepts, or `None` if it accepts any
    /// number of arguments.
    fn arity(&self) -> Option<usize>;

    /// Provide or adjust the concrete value of the memory access in place.
    fn call_concrete_memory_value(&self, access: &mut E::MemoryAccess) -> Result<(), ForeignError>;

    /// Provide or adjust the concrete value of the register in place.
    fn call_concrete_register_value(&self, register: &mut E::Register) -> Result<(), ForeignError>;

    /// Simplify the given node. Returning `Ok(None)` means the callable produced no node, e.g.
    /// the runtime's equivalent of `None`. The registry rejects this.
    fn call_symbolic_simplification(&self, node: E::Node) -> Result<Option<E::Node>, ForeignError>;
}

/// A registered foreign callable together with the kind it was registered for.
pub struct ForeignCallback<E: EngineTypes> {
    handle: Rc<dyn ForeignCallable<E>>,
    kind: CallbackKind,
}

impl<E: EngineTypes> ForeignCallback<E> {
    pub(crate) fn new(handle: Rc<dyn ForeignCallable<E>>, kind: CallbackKind) -> Self {
        Self { handle, kind }
    }

    /// The registered handle.
    pub fn handle(&self) -> &Rc<dyn ForeignCallable<E>> {
        &self.handle
    }

    /// The kind the handle was registered for.
    pub fn kind(&self) -> CallbackKind {
        self.kind
    }

    /// Whether this registration refers to the given handle for the given kind. Handles are
    /// compared by identity, never by value.
    pub fn matches(&self, handle: &Rc<dyn ForeignCallable<E>>, kind: CallbackKind) -> bool {
        self.kind == kind && std::ptr::addr_eq(Rc::as_ptr(&self.handle), Rc::as_ptr(handle))
    }
}

impl<E: EngineTypes> Clone for ForeignCallback<E> {
    fn clone(&self) -> Self {
        Self {
            handle: Rc::clone(&self.handle),
            kind: self.kind,
        }
    }
}

impl<E: EngineTypes> std::fmt::Debug for ForeignCallback<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForeignCallback")
            .field("kind", &self.kind)
            .field("handle", &Rc::as_ptr(&self.handle).cast::<()>())
            .field("strong_count", &Rc::strong_count(&self.handle))
            .finish()
    }
}
