#[cfg(feature = "foreign")]
use std::rc::Rc;

use thiserror;

#[cfg(feature = "foreign")]
use crate::foreign::{ForeignCallable, ForeignCallback, ForeignError};
use crate::kind::CallbackKind;
use crate::native::{
    ConcreteMemoryValueCallback, ConcreteRegisterValueCallback, NativeCallback,
    SymbolicSimplificationCallback,
};
use crate::EngineTypes;

/// Callback registry result type
pub type Result<T> = std::result::Result<T, Error>;

/// Possible callback registry errors
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The object registered as a callback cannot be invoked.
    #[error("object registered as {kind} callback is not callable")]
    NotCallable { kind: CallbackKind },

    /// The callback does not accept the arguments callbacks of this kind are invoked with.
    #[error("{kind} callbacks take {expected} argument(s) but callback accepts {actual}")]
    InvalidCallbackKind {
        kind: CallbackKind,
        expected: usize,
        actual: usize,
    },

    /// The raw value does not name a [CallbackKind].
    #[error("unknown callback kind {0}")]
    UnknownCallbackKind(u32),

    /// A simplification callback did not produce a node. The position is the index of the
    /// callback among the foreign callbacks of this kind.
    #[cfg(feature = "foreign")]
    #[error("{kind} callback at position {position} did not return a node")]
    InvalidNode { kind: CallbackKind, position: usize },

    /// A foreign callback failed. The error is the one reported by the callback.
    #[cfg(feature = "foreign")]
    #[error(transparent)]
    Foreign(ForeignError),
}

/// Ordered collection of callbacks keyed on [CallbackKind].
///
/// Callbacks are invoked in registration order, native callbacks before foreign callbacks. The
/// same callback may be registered multiple times, in which case it is invoked once per
/// registration.
///
/// Cloning a registry produces an independent registry. Foreign handles are shared between the
/// clones rather than duplicated.
pub struct CallbackRegistry<E: EngineTypes> {
    memory_callbacks: Vec<ConcreteMemoryValueCallback<E>>,
    register_callbacks: Vec<ConcreteRegisterValueCallback<E>>,
    simplification_callbacks: Vec<SymbolicSimplificationCallback<E>>,

    /// Indexed by [CallbackKind::index]
    #[cfg(feature = "foreign")]
    foreign_callbacks: [Vec<ForeignCallback<E>>; 3],

    is_defined: bool,
}

impl<E: EngineTypes> Default for CallbackRegistry<E> {
    fn default() -> Self {
        Self {
            memory_callbacks: Default::default(),
            register_callbacks: Default::default(),
            simplification_callbacks: Default::default(),
            #[cfg(feature = "foreign")]
            foreign_callbacks: Default::default(),
            is_defined: false,
        }
    }
}

impl<E: EngineTypes> Clone for CallbackRegistry<E> {
    fn clone(&self) -> Self {
        Self {
            memory_callbacks: self.memory_callbacks.clone(),
            register_callbacks: self.register_callbacks.clone(),
            simplification_callbacks: self.simplification_callbacks.clone(),
            #[cfg(feature = "foreign")]
            foreign_callbacks: self.foreign_callbacks.clone(),
            is_defined: self.is_defined,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.memory_callbacks.clone_from(&source.memory_callbacks);
        self.register_callbacks.clone_from(&source.register_callbacks);
        self.simplification_callbacks
            .clone_from(&source.simplification_callbacks);
        #[cfg(feature = "foreign")]
        self.foreign_callbacks.clone_from(&source.foreign_callbacks);
        self.is_defined = source.is_defined;
    }
}

impl<E: EngineTypes> std::fmt::Debug for CallbackRegistry<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("CallbackRegistry");
        debug
            .field("memory_callbacks", &self.memory_callbacks.len())
            .field("register_callbacks", &self.register_callbacks.len())
            .field("simplification_callbacks", &self.simplification_callbacks.len());

        #[cfg(feature = "foreign")]
        debug.field("foreign_callbacks", &self.foreign_callbacks);

        debug.field("is_defined", &self.is_defined).finish()
    }
}

/// Remove the first entry satisfying the predicate. Returns whether an entry was removed.
fn remove_first<T>(callbacks: &mut Vec<T>, predicate: impl Fn(&T) -> bool) -> bool {
    match callbacks.iter().position(predicate) {
        Some(index) => {
            callbacks.remove(index);
            true
        }
        None => false,
    }
}

impl<E: EngineTypes> CallbackRegistry<E> {
    /// Create a registry with no callbacks.
    pub fn new() -> Self {
        Default::default()
    }

    /// True if there is at least one callback registered of any kind. The engine can check this
    /// to skip callback processing entirely.
    pub fn is_defined(&self) -> bool {
        self.is_defined
    }

    /// Total number of registrations across all kinds.
    pub fn count_callbacks(&self) -> usize {
        CallbackKind::ALL
            .into_iter()
            .map(|kind| self.count_callbacks_of(kind))
            .sum()
    }

    /// Number of registrations, native and foreign, for the given kind.
    pub fn count_callbacks_of(&self, kind: CallbackKind) -> usize {
        let count = match kind {
            CallbackKind::ConcreteMemoryValue => self.memory_callbacks.len(),
            CallbackKind::ConcreteRegisterValue => self.register_callbacks.len(),
            CallbackKind::SymbolicSimplification => self.simplification_callbacks.len(),
        };

        #[cfg(feature = "foreign")]
        let count = count + self.foreign_callbacks[kind.index()].len();

        count
    }

    fn update_is_defined(&mut self) {
        self.is_defined = self.count_callbacks() > 0;
    }

    /// Append a native callback to the callbacks of its kind.
    pub fn add_callback(&mut self, callback: NativeCallback<E>) {
        match callback {
            NativeCallback::ConcreteMemoryValue(f) => self.memory_callbacks.push(f),
            NativeCallback::ConcreteRegisterValue(f) => self.register_callbacks.push(f),
            NativeCallback::SymbolicSimplification(f) => self.simplification_callbacks.push(f),
        }

        log::debug!("added {callback:?}");
        self.update_is_defined();
    }

    /// Remove the first registration of the given native callback. Nothing happens if the
    /// callback is not registered.
    ///
    /// Registrations are matched by function address. If the compiler merged the callback with
    /// an identical function, a registration of that other function may be removed instead.
    pub fn remove_callback(&mut self, callback: NativeCallback<E>) {
        let removed = match callback {
            NativeCallback::ConcreteMemoryValue(_) => {
                remove_first(&mut self.memory_callbacks, |&f| {
                    NativeCallback::ConcreteMemoryValue(f) == callback
                })
            }
            NativeCallback::ConcreteRegisterValue(_) => {
                remove_first(&mut self.register_callbacks, |&f| {
                    NativeCallback::ConcreteRegisterValue(f) == callback
                })
            }
            NativeCallback::SymbolicSimplification(_) => {
                remove_first(&mut self.simplification_callbacks, |&f| {
                    NativeCallback::SymbolicSimplification(f) == callback
                })
            }
        };

        if removed {
            log::debug!("removed {callback:?}");
            self.update_is_defined();
        }
    }

    /// Register a foreign callable for the given kind. The registry retains a reference to the
    /// handle until the callback is removed or the registry is dropped.
    ///
    /// The registry is left unchanged if the handle cannot be invoked or does not accept the
    /// number of arguments callbacks of this kind are invoked with.
    #[cfg(feature = "foreign")]
    pub fn add_foreign_callback(
        &mut self,
        handle: Rc<dyn ForeignCallable<E>>,
        kind: CallbackKind,
    ) -> Result<()> {
        if !handle.is_callable() {
            log::warn!("rejected {kind} callback: object is not callable");
            return Err(Error::NotCallable { kind });
        }

        if let Some(actual) = handle.arity() {
            let expected = kind.arity();
            if actual != expected {
                log::warn!("rejected {kind} callback: expected arity {expected}, actual {actual}");
                return Err(Error::InvalidCallbackKind {
                    kind,
                    expected,
                    actual,
                });
            }
        }

        let callback = ForeignCallback::new(handle, kind);
        log::debug!("added {callback:?}");
        self.foreign_callbacks[kind.index()].push(callback);
        self.update_is_defined();

        Ok(())
    }

    /// Remove the first registration of the handle for the given kind, releasing the reference
    /// held by the registry. Nothing happens if the handle is not registered for this kind.
    #[cfg(feature = "foreign")]
    pub fn remove_foreign_callback(
        &mut self,
        handle: &Rc<dyn ForeignCallable<E>>,
        kind: CallbackKind,
    ) {
        let removed = remove_first(&mut self.foreign_callbacks[kind.index()], |callback| {
            callback.matches(handle, kind)
        });

        if removed {
            log::debug!("removed foreign {kind} callback");
            self.update_is_defined();
        }
    }

    /// Foreign callbacks registered for the given kind in registration order.
    #[cfg(feature = "foreign")]
    pub fn foreign_callbacks(&self, kind: CallbackKind) -> &[ForeignCallback<E>] {
        &self.foreign_callbacks[kind.index()]
    }

    /// Remove every callback of every kind, releasing all foreign handles.
    pub fn remove_all_callbacks(&mut self) {
        self.memory_callbacks.clear();
        self.register_callbacks.clear();
        self.simplification_callbacks.clear();

        #[cfg(feature = "foreign")]
        self.foreign_callbacks.iter_mut().for_each(Vec::clear);

        log::debug!("removed all callbacks");
        self.update_is_defined();
    }

    /// Run the [CallbackKind::ConcreteMemoryValue] callbacks on the memory access. Each callback
    /// observes the changes made by the callbacks before it.
    ///
    /// If a foreign callback fails its error is returned and the remaining callbacks are skipped.
    pub fn process_concrete_memory_value(&self, access: &mut E::MemoryAccess) -> Result<()> {
        log::trace!(
            "processing {count} concrete memory value callback(s)",
            count = self.count_callbacks_of(CallbackKind::ConcreteMemoryValue)
        );

        for callback in &self.memory_callbacks {
            callback(access);
        }

        #[cfg(feature = "foreign")]
        for callback in self.foreign_callbacks(CallbackKind::ConcreteMemoryValue) {
            callback
                .handle()
                .call_concrete_memory_value(access)
                .map_err(Error::Foreign)?;
        }

        Ok(())
    }

    /// Run the [CallbackKind::ConcreteRegisterValue] callbacks on the register. Each callback
    /// observes the changes made by the callbacks before it.
    ///
    /// If a foreign callback fails its error is returned and the remaining callbacks are skipped.
    pub fn process_concrete_register_value(&self, register: &mut E::Register) -> Result<()> {
        log::trace!(
            "processing {count} concrete register value callback(s)",
            count = self.count_callbacks_of(CallbackKind::ConcreteRegisterValue)
        );

        for callback in &self.register_callbacks {
            callback(register);
        }

        #[cfg(feature = "foreign")]
        for callback in self.foreign_callbacks(CallbackKind::ConcreteRegisterValue) {
            callback
                .handle()
                .call_concrete_register_value(register)
                .map_err(Error::Foreign)?;
        }

        Ok(())
    }

    /// Thread the node through the [CallbackKind::SymbolicSimplification] callbacks. The first
    /// callback receives the given node and every following callback receives the node returned
    /// by the one before it. The node returned by the last callback is the result. If no
    /// callbacks are registered the node is returned unchanged.
    ///
    /// A foreign callback that does not return a node fails with `Error::InvalidNode`.
    pub fn process_symbolic_simplification(&self, node: E::Node) -> Result<E::Node> {
        log::trace!(
            "processing {count} symbolic simplification callback(s)",
            count = self.count_callbacks_of(CallbackKind::SymbolicSimplification)
        );

        let node = self
            .simplification_callbacks
            .iter()
            .fold(node, |node, callback| callback(node));

        #[cfg(feature = "foreign")]
        let node = self
            .foreign_callbacks(CallbackKind::SymbolicSimplification)
            .iter()
            .enumerate()
            .try_fold(node, |node, (position, callback)| {
                callback
                    .handle()
                    .call_symbolic_simplification(node)
                    .map_err(Error::Foreign)?
                    .ok_or(Error::InvalidNode {
                        kind: CallbackKind::SymbolicSimplification,
                        position,
                    })
            })?;

        Ok(node)
    }
}
