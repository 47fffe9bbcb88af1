#![deny(missing_docs)]

//! # colschema-core — Foundational Types for the Collector Schema Registry
//!
//! This crate defines the identity types every other crate in the workspace
//! depends on. It has no internal crate dependencies, only `serde` and
//! `thiserror` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Closed category set.** [`ComponentCategory`] has exactly five
//!    variants. Any other string is rejected at parse time, before any
//!    asset lookup happens.
//!
//! 2. **Validated newtypes.** [`ComponentName`] and [`CollectorVersion`]
//!    check their format at construction. A [`ComponentIdentity`] can only
//!    be built from valid parts, so downstream code never re-validates.
//!
//! 3. **Numeric version ordering.** [`CollectorVersion`] compares field by
//!    field as integers, so `0.10.0` sorts after `0.9.0`.
//!
//! 4. **[`IdentityError`] hierarchy.** Structured errors with `thiserror`;
//!    no `.unwrap()` outside tests.

pub mod category;
pub mod error;
pub mod identity;

pub use category::ComponentCategory;
pub use error::IdentityError;
pub use identity::{CollectorVersion, ComponentIdentity, ComponentName};
