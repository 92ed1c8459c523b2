//! Core types, traits and the identity consolidation engine for idlink.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::UnitOfWork`] and
//! [`store::ContactStore`]; the engine only ever talks to those traits.
//!
//! The pipeline for one request is
//! [`matcher`] → [`cluster`] → [`mutator`] → [`projector`], wired together by
//! [`engine::reconcile`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod cluster;
pub mod contact;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod mutator;
pub mod projector;
pub mod store;
pub mod view;

pub use error::{Categorize, Error, ErrorCategory, Result};

#[cfg(test)]
mod testing;
