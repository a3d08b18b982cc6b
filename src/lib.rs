//! # Lazy Registry
//!
//! A lazy dependency registry: register typed entities by a setup function,
//! resolve them on demand, and tear everything down in reverse order.
//!
//! Nothing runs at registration time. The first resolution invokes the
//! slot's setup function, memoizes the value and schedules the configured
//! release function on an internal cleanup stack; [`Registry::cleanup`]
//! drains that stack last-in first-out and aggregates every failure into a
//! single report.
//!
//! ## Quick Start
//!
//! ```rust
//! use lazy_registry::{with_cleanup, with_setup, Registry};
//!
//! struct Conn {
//!     url: String,
//! }
//!
//! let mut registry = Registry::new();
//! registry.register([
//!     with_setup(|| {
//!         Ok(Conn {
//!             url: "postgres://localhost".to_string(),
//!         })
//!     }),
//!     with_cleanup(|_conn: &Conn| Ok(())),
//! ]);
//!
//! // Setup runs here, once; later resolutions return the memoized value.
//! let conn = registry.resolve::<Conn>().unwrap();
//! assert_eq!(conn.url, "postgres://localhost");
//!
//! registry.cleanup().unwrap();
//! ```
//!
//! ## Features
//!
//! - **Lazy**: setup functions run on first resolution, not at registration
//! - **Memoized**: values are cached and shared as `Rc<T>`; opt out per slot
//!   with [`with_no_reuse`]
//! - **Named slots**: the same type can be registered under distinct names
//! - **Middleware**: [`with_middleware`] layers transformations over a
//!   previously registered setup
//! - **Reverse-order cleanup**: release functions run last-acquired-first,
//!   and every failure over the registry's life is joined into one report
//!
//! ## Usage constraints
//!
//! The registry is single-threaded by design: it holds values as `Rc<T>`
//! and is therefore neither `Send` nor `Sync`, and it takes no locks.
//! Cleanup is single-shot: a second [`Registry::cleanup`] call drains
//! nothing but reports the accumulated errors again.
//!
//! ## Main items
//!
//! - [`Registry`] - the container: register, resolve, cleanup
//! - [`with_setup`] / [`with_cleanup`] / [`with_no_reuse`] /
//!   [`with_middleware`] - registration options
//! - [`RegistryError`] - fatal resolution failures
//! - [`CleanupReport`] - the joined error accumulation

mod error;
mod key;
mod registry;
mod slot;

pub use error::{BoxError, CleanupReport, RegistryError};
pub use key::SlotKey;
pub use registry::Registry;
pub use slot::{with_cleanup, with_middleware, with_no_reuse, with_setup, SlotOption};
