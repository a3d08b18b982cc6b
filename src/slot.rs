//! Per-entity setup state machine and the registration options.
//!
//! A slot starts fresh with a pending setup function. The first successful
//! resolution memoizes the produced value and, unless [`with_no_reuse`] was
//! applied, clears the setup function so later resolutions short-circuit to
//! the cached value. Each successful resolution also yields one release
//! closure bound to that resolution's value, which the registry pushes onto
//! its cleanup stack.

use std::rc::Rc;

use crate::error::BoxError;

type SetupFn<T> = Box<dyn FnMut() -> Result<T, BoxError>>;
type ReleaseHook<T> = Rc<dyn Fn(&T) -> Result<(), BoxError>>;

/// A deferred release action bound to one resolved value.
pub(crate) type ReleaseFn = Box<dyn FnOnce() -> Result<(), BoxError>>;

/// One entity's setup state.
pub(crate) struct Slot<T> {
    setup: Option<SetupFn<T>>,
    release: Option<ReleaseHook<T>>,
    no_reuse: bool,
    value: Option<Rc<T>>,
}

impl<T: 'static> Slot<T> {
    pub(crate) fn new() -> Self {
        Self {
            setup: None,
            release: None,
            no_reuse: false,
            value: None,
        }
    }

    /// Run one resolution against this slot.
    ///
    /// With no setup function pending this is a no-op: the memoized value is
    /// handed out again together with a no-op release. Otherwise the setup
    /// function runs; on success the value is memoized (and the setup
    /// function cleared, unless the slot is no-reuse) and the release
    /// closure is bound to this resolution's value. On failure the slot is
    /// left untouched, so a later resolution may retry.
    pub(crate) fn setup(&mut self) -> Result<(Rc<T>, ReleaseFn), BoxError> {
        let Some(setup) = self.setup.as_mut() else {
            let value = self
                .value
                .clone()
                .ok_or("slot has no setup function and no cached value")?;
            return Ok((value, noop_release()));
        };

        let value = Rc::new(setup()?);
        self.value = Some(Rc::clone(&value));

        if !self.no_reuse {
            self.setup = None;
        }

        let release = match &self.release {
            Some(hook) => {
                // Bind this resolution's value, not the cached field: a
                // no-reuse slot resolved N times must release N distinct
                // instances even though only the last one stays cached.
                let hook = Rc::clone(hook);
                let bound = Rc::clone(&value);
                Box::new(move || hook(&bound)) as ReleaseFn
            }
            None => noop_release(),
        };

        Ok((value, release))
    }
}

fn noop_release() -> ReleaseFn {
    Box::new(|| Ok(()))
}

/// One registration option: a deferred mutation of a slot.
///
/// Options are applied in the order given, which matters for
/// [`with_middleware`]. Created by the `with_*` constructors in this module.
pub struct SlotOption<T> {
    apply: Box<dyn FnOnce(&mut Slot<T>)>,
}

impl<T> SlotOption<T> {
    fn new(apply: impl FnOnce(&mut Slot<T>) + 'static) -> Self {
        Self {
            apply: Box::new(apply),
        }
    }

    pub(crate) fn apply(self, slot: &mut Slot<T>) {
        (self.apply)(slot);
    }
}

/// Sets the slot's setup function, replacing any previous one.
///
/// The function runs on the first resolution (or on every resolution for a
/// [`with_no_reuse`] slot) and its result is memoized.
///
/// # Examples
///
/// ```
/// use lazy_registry::{with_setup, Registry};
///
/// let mut registry = Registry::new();
/// registry.register([with_setup(|| Ok(42i32))]);
///
/// assert_eq!(*registry.resolve::<i32>().unwrap(), 42);
/// ```
pub fn with_setup<T: 'static>(
    setup: impl FnMut() -> Result<T, BoxError> + 'static,
) -> SlotOption<T> {
    SlotOption::new(move |slot| slot.setup = Some(Box::new(setup)))
}

/// Sets the slot's release function, run during cleanup for every value this
/// slot produced.
///
/// The function receives the resolved value it was bound to. It does not run
/// for slots that were never resolved.
pub fn with_cleanup<T: 'static>(
    release: impl Fn(&T) -> Result<(), BoxError> + 'static,
) -> SlotOption<T> {
    SlotOption::new(move |slot| slot.release = Some(Rc::new(release)))
}

/// Disables memoization: every resolution re-runs the setup function and
/// produces a fresh value with its own release closure.
pub fn with_no_reuse<T: 'static>() -> SlotOption<T> {
    SlotOption::new(|slot| slot.no_reuse = true)
}

/// Wraps the slot's current setup function with a transformation.
///
/// Middleware chains in application order: the layer applied last runs last
/// and wins for the final observable value. The release function is not
/// affected; it receives whatever the fully composed setup produced.
/// Wrapping a slot that has no setup function yields a setup that fails when
/// resolved.
///
/// # Examples
///
/// ```
/// use lazy_registry::{with_middleware, with_setup, Registry};
///
/// let mut registry = Registry::new();
/// registry.register([
///     with_setup(|| Ok(10i32)),
///     with_middleware(|n: i32| Ok(n * 2)),
/// ]);
///
/// assert_eq!(*registry.resolve::<i32>().unwrap(), 20);
/// ```
pub fn with_middleware<T: 'static>(
    mut middleware: impl FnMut(T) -> Result<T, BoxError> + 'static,
) -> SlotOption<T> {
    SlotOption::new(move |slot| {
        let mut inner = slot.setup.take();
        slot.setup = Some(Box::new(move || {
            let inner = inner
                .as_mut()
                .ok_or("middleware wraps a slot with no setup function")?;
            middleware(inner()?)
        }));
    })
}
