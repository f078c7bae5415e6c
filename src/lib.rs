//! # Rootstrap
//!
//! Bootstrap and repair steps for a code hosting deployment's SQLite
//! database, usable both as the `rootstrap` binary and as a library.
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use rootstrap::config::RootAccount;
//! use rootstrap::repair::{fix_sequences, verify_namespace};
//! use rootstrap::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::new("./data/rootstrap.db")?;
//! store.initialize()?;
//!
//! let mut out = std::io::stdout().lock();
//! fix_sequences(&store, &mut out)?;
//! verify_namespace(&store, &RootAccount::default(), &mut out)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes the CLI module. Disable with `default-features = false`.

pub mod auth;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod repair;
pub mod store;
pub mod types;
