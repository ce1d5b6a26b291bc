//! MetaTerm localisation core library.
//!
//! Loads Qt Linguist `.ts` catalogues and resolves the user-visible strings
//! of the MetaTerm GUI against them. Lookup never fails: a missing, obsolete
//! or empty translation degrades to the source string with its `{N}`
//! placeholders filled in.

pub mod active;
pub mod audit;
pub mod catalog;
pub mod cli;
pub(crate) mod diagnostics;
pub mod config;
pub mod format;
pub mod loader;
pub mod locale_resolution;
pub mod markup;
pub mod plural;
pub mod resolve;
pub mod runner;
pub mod session;
pub mod store;
pub mod writer;
