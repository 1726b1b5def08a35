//! This crate holds the callbacks a symbolic execution engine invokes when it needs information
//! from its host. The engine asks for a concrete memory value, a concrete register value, or for
//! a freshly built symbolic expression to be simplified before it is committed to the symbolic
//! state. Each of these requests is forwarded to the callbacks registered for it.
//!
//! ### Engine types
//!
//! The registry never inspects the values passed through it. The engine supplies the memory
//! access, register and expression node types by implementing [EngineTypes].
//!
//! ### Callbacks
//!
//! Callbacks are either plain function pointers ([NativeCallback]) or, with the `foreign`
//! feature, shared handles owned jointly with an embedded scripting runtime
//! ([foreign::ForeignCallable]). Native callbacks for a kind always run before foreign callbacks
//! for the same kind, each group in registration order.

/// Module for the closed set of events a callback can be registered for.
pub mod kind;

/// Module for callbacks implemented as plain function pointers.
pub mod native;

/// Module for callbacks implemented by an embedded scripting runtime.
#[cfg(feature = "foreign")]
pub mod foreign;

/// Module for storing callbacks and dispatching engine events to them.
pub mod registry;

pub use kind::CallbackKind;
pub use native::NativeCallback;
pub use registry::{CallbackRegistry, Error, Result};

/// The value types an engine passes to callbacks.
pub trait EngineTypes {
    /// Descriptor of a memory access whose concrete value is requested. Memory callbacks update
    /// the concrete value in place.
    type MemoryAccess;

    /// Descriptor of a register whose concrete value is requested. Register callbacks update the
    /// concrete value in place.
    type Register;

    /// Owning handle to a symbolic expression node.
    type Node;
}
