//! wlsync binding store.
//!
//! The store is the authority on who owns which in-game identity:
//! - one binding per account
//! - one binding per identity key
//!
//! Design stance:
//! - MySQL is the durable source of truth in production.
//! - The in-memory adapter mirrors its constraints for tests and dry runs.
//! - No transaction spans an insert/delete pair; callers order their writes.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

mod error;
pub mod memory;
#[cfg(feature = "mysql")]
pub mod mysql;
mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryBindingStore;
#[cfg(feature = "mysql")]
pub use mysql::MySqlBindingStore;
pub use traits::BindingStore;
