//! # ruleforge-core
//!
//! Evaluation-side primitives for the ruleforge engine.
//!
//! This crate holds the run-time vocabulary: the JSON [`Document`] with
//! path-based field access, the [`Event`] that owns one document as it
//! moves through the pipeline, and the immutable [`Expression`] trees that
//! compiled assets evaluate against each event.
//!
//! ## Architecture
//!
//! - **Document** ([`document`]): one JSON tree addressed by dotted,
//!   bracketed, or canonical JSON Pointer paths; total writes,
//!   `Option`-based reads.
//! - **Event** ([`event`]): the mutable unit of work; owns a document and
//!   delegates field access to it.
//! - **Expression** ([`expression`]): named trees of leaf terms and
//!   AND/OR/sequence combinators; reference-counted, `Send + Sync`, built
//!   once and evaluated many times.
//!
//! Nothing in this crate returns an error: lookups yield `Option` or
//! `bool`, writes always succeed, and evaluation can only say yes or no.
//! Configuration problems are the builder crate's concern, caught before
//! an expression ever exists.
//!
//! ## Quick Start
//!
//! ```rust
//! use ruleforge_core::{Document, Event, Expression};
//! use serde_json::json;
//!
//! // Documents address fields by dotted, bracketed, or pointer paths.
//! let mut doc = Document::new();
//! doc.set("agent.name", json!("web-01"));
//! assert!(doc.equals_value("/agent/name", &json!("web-01")));
//!
//! // Terms wrap one function of one event; combinators fold them.
//! let check = Expression::term("agent-present", |event: &mut Event| {
//!     event.exists("agent.name")
//! });
//! let mut event = Event::new(doc);
//! assert!(check.evaluate(&mut event));
//! ```

pub mod document;
pub mod event;
pub mod expression;

pub use document::{Document, format_path};
pub use event::Event;
pub use expression::{Expression, Term};
