//! The lazy dependency registry: registration, resolution and reverse-order
//! cleanup.
//!
//! Slots are stored type-erased (`Box<dyn Any>`) under a [`SlotKey`] and
//! recovered through a checked downcast at resolution time, which cannot
//! fail because the key embeds the value type's `TypeId`.

use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{CleanupReport, RegistryError};
use crate::key::SlotKey;
use crate::slot::{ReleaseFn, Slot, SlotOption};

/// A lazy dependency registry.
///
/// Entities are registered by a setup function and instantiated on first
/// resolution; the result is memoized unless the slot opts out with
/// [`with_no_reuse`](crate::with_no_reuse). Every successful resolution
/// pushes a release closure onto an internal stack, which [`cleanup`]
/// drains in reverse so the last-acquired value is released first.
///
/// # Thread safety
///
/// The registry is deliberately single-threaded: values are shared via
/// [`Rc`], so the container is neither `Send` nor `Sync` and no internal
/// locking exists. Setup and release functions run synchronously on the
/// calling thread; the registry imposes no timeout or cancellation over
/// them.
///
/// # Examples
///
/// ```
/// use lazy_registry::{with_cleanup, with_setup, Registry};
///
/// let mut registry = Registry::new();
/// registry.register([
///     with_setup(|| Ok(String::from("postgres://localhost"))),
///     with_cleanup(|url: &String| {
///         println!("closing {url}");
///         Ok(())
///     }),
/// ]);
///
/// let url = registry.resolve::<String>().unwrap();
/// assert_eq!(&*url, "postgres://localhost");
///
/// registry.cleanup().unwrap();
/// ```
///
/// [`cleanup`]: Registry::cleanup
#[derive(Default)]
pub struct Registry {
    slots: HashMap<SlotKey, Box<dyn Any>>,
    release_stack: Vec<ReleaseFn>,
    errors: Vec<String>,
}

impl Registry {
    /// Constructs an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or extends) the unnamed slot for type `T`.
    ///
    /// Equivalent to [`register_named`](Registry::register_named) with an
    /// empty name.
    pub fn register<T: 'static>(&mut self, options: impl IntoIterator<Item = SlotOption<T>>) {
        self.register_named("", options);
    }

    /// Registers (or extends) the slot for type `T` under `name`.
    ///
    /// No work happens at registration time. If the key already has a slot,
    /// the options mutate that slot instead of replacing it — registering
    /// [`with_middleware`](crate::with_middleware) under an existing key
    /// layers onto the prior setup. Options apply in the order given.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_registry::{with_setup, Registry};
    ///
    /// let mut registry = Registry::new();
    /// registry.register_named("primary", [with_setup(|| Ok(5432u16))]);
    /// registry.register_named("replica", [with_setup(|| Ok(5433u16))]);
    ///
    /// assert_eq!(*registry.resolve_named::<u16>("primary").unwrap(), 5432);
    /// assert_eq!(*registry.resolve_named::<u16>("replica").unwrap(), 5433);
    /// ```
    pub fn register_named<T: 'static>(
        &mut self,
        name: &str,
        options: impl IntoIterator<Item = SlotOption<T>>,
    ) {
        let key = SlotKey::of::<T>(name);
        tracing::trace!(key = %key, "register slot");

        let slot = self
            .slots
            .entry(key)
            .or_insert_with(|| Box::new(Slot::<T>::new()))
            .downcast_mut::<Slot<T>>()
            .expect("slot type is fixed by the key's TypeId");

        for option in options {
            option.apply(slot);
        }
    }

    /// Resolves the unnamed slot for type `T`.
    ///
    /// Equivalent to [`resolve_named`](Registry::resolve_named) with an
    /// empty name.
    ///
    /// # Errors
    ///
    /// See [`resolve_named`](Registry::resolve_named).
    pub fn resolve<T: 'static>(&mut self) -> Result<Rc<T>, RegistryError> {
        self.resolve_named("")
    }

    /// Resolves the slot for type `T` under `name`, running its setup if it
    /// has not been memoized yet.
    ///
    /// On success the slot's release closure is pushed onto the cleanup
    /// stack — once per resolution, so a no-reuse slot resolved N times
    /// contributes N entries.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] if no slot is registered under the key.
    /// - [`RegistryError::Setup`] if the setup function (or a middleware
    ///   layer) fails, or the slot has neither a setup function nor a
    ///   memoized value.
    ///
    /// Both are fatal to this call and are also appended to the registry's
    /// permanent error log, so the eventual [`cleanup`](Registry::cleanup)
    /// report is complete even if this error is only propagated upward.
    pub fn resolve_named<T: 'static>(&mut self, name: &str) -> Result<Rc<T>, RegistryError> {
        let key = SlotKey::of::<T>(name);

        if !self.slots.contains_key(&key) {
            return Err(self.record(RegistryError::NotFound(key)));
        }
        let slot = self
            .slots
            .get_mut(&key)
            .and_then(|slot| slot.downcast_mut::<Slot<T>>())
            .expect("slot type is fixed by the key's TypeId");

        match slot.setup() {
            Ok((value, release)) => {
                self.release_stack.push(release);
                tracing::debug!(key = %key, "resolved");
                Ok(value)
            }
            Err(source) => Err(self.record(RegistryError::Setup { key, source })),
        }
    }

    /// Returns whether the unnamed slot for type `T` is registered.
    pub fn contains<T: 'static>(&self) -> bool {
        self.contains_named::<T>("")
    }

    /// Returns whether a slot for type `T` is registered under `name`.
    ///
    /// Never triggers setup.
    pub fn contains_named<T: 'static>(&self, name: &str) -> bool {
        self.slots.contains_key(&SlotKey::of::<T>(name))
    }

    /// Releases every resolved value in reverse resolution order and reports
    /// every error the registry collected over its life.
    ///
    /// A failing release function does not stop the drain; its error is
    /// collected and the remaining stack keeps draining. The returned report
    /// joins all collected messages with newlines: fatal resolve failures
    /// first, in occurrence order, then release failures in drain order.
    ///
    /// The registry is single-shot for cleanup: calling this again drains an
    /// already-empty stack (a no-op) but returns the full accumulated report
    /// again.
    ///
    /// # Errors
    ///
    /// A [`CleanupReport`] when any error was collected; `Ok(())` when the
    /// log is empty.
    pub fn cleanup(&mut self) -> Result<(), CleanupReport> {
        let draining = self.release_stack.len();
        for release in self.release_stack.drain(..).rev() {
            if let Err(source) = release() {
                self.errors.push(RegistryError::Cleanup(source).to_string());
            }
        }
        tracing::debug!(drained = draining, errors = self.errors.len(), "cleanup");

        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(CleanupReport::new(self.errors.clone()))
        }
    }

    fn record(&mut self, err: RegistryError) -> RegistryError {
        tracing::debug!(error = %err, "resolve failed");
        self.errors.push(err.to_string());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{with_cleanup, with_no_reuse, with_setup};
    use std::cell::Cell;

    #[test]
    fn test_register_then_resolve() {
        let mut registry = Registry::new();
        registry.register([with_setup(|| Ok(42i32))]);

        let value = registry.resolve::<i32>().unwrap();
        assert_eq!(*value, 42);
    }

    #[test]
    fn test_registration_is_lazy() {
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);

        let mut registry = Registry::new();
        registry.register([with_setup(move || {
            flag.set(true);
            Ok(())
        })]);

        assert!(!ran.get());
        registry.resolve::<()>().unwrap();
        assert!(ran.get());
    }

    #[test]
    fn test_contains_does_not_trigger_setup() {
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);

        let mut registry = Registry::new();
        registry.register([with_setup(move || {
            flag.set(true);
            Ok(1u8)
        })]);

        assert!(registry.contains::<u8>());
        assert!(!registry.contains::<u16>());
        assert!(!registry.contains_named::<u8>("other"));
        assert!(!ran.get());
    }

    #[test]
    fn test_resolve_unregistered_is_not_found() {
        let mut registry = Registry::new();
        let err = registry.resolve::<String>().unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(_)));
    }

    #[test]
    fn test_repeated_registration_extends_the_slot() {
        let mut registry = Registry::new();
        registry.register([with_setup(|| Ok(1i32))]);
        // Second registration under the same key mutates the same slot.
        registry.register([with_no_reuse::<i32>()]);
        registry.register::<i32>([]);

        registry.resolve::<i32>().unwrap();
        registry.resolve::<i32>().unwrap();
    }

    #[test]
    fn test_reused_slot_pushes_noop_releases() {
        let released = Rc::new(Cell::new(0));
        let count = Rc::clone(&released);

        let mut registry = Registry::new();
        registry.register([
            with_setup(|| Ok("conn".to_string())),
            with_cleanup(move |_: &String| {
                count.set(count.get() + 1);
                Ok(())
            }),
        ]);

        registry.resolve::<String>().unwrap();
        registry.resolve::<String>().unwrap();
        registry.resolve::<String>().unwrap();
        registry.cleanup().unwrap();

        // One real release for the single instantiation; the re-resolutions
        // contributed no-ops.
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn test_default_is_empty() {
        let mut registry = Registry::default();
        assert!(!registry.contains::<i32>());
        assert!(registry.cleanup().is_ok());
    }
}
