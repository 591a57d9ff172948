//! # ruleforge-builder
//!
//! Compiles declarative JSON asset definitions into executable expression
//! trees.
//!
//! Definitions describe decoders, rules, and outputs as JSON objects whose
//! stages hold `field: value` operations. The builders turn those into the
//! immutable [`ruleforge_core::Expression`] trees the engine evaluates per
//! event, in two strictly separated phases:
//!
//! - **Build time**: definitions are parsed and validated eagerly; every
//!   configuration mistake is a [`BuildError`] naming the offending asset,
//!   field, or helper, and an asset compiles completely or not at all.
//! - **Eval time**: compiled trees are immutable and shared; a missing
//!   field or mismatched value is an ordinary `false`, never an error.
//!
//! ## Architecture
//!
//! - **Registry** ([`registry`]): name-to-builder map for `+helper`
//!   operations; filled single-threaded during bootstrap, then shared
//!   read-only.
//! - **Operation builder** ([`builders::operation`]): dispatches one
//!   `field: value` pair on its raw string form (literal, `$reference`,
//!   `+helper/args`) and builds the leaf term.
//! - **Stage builders** ([`builders::stage`]): fold `check`, `map`, and
//!   `normalize` sections into combinator nodes.
//! - **Asset builder** ([`builders::asset`]): compiles a whole definition
//!   into a [`CompiledAsset`].
//! - **Builtin helpers** ([`helpers`]): the standard helper set installed
//!   by [`register_builtins`].
//!
//! ## Quick Start
//!
//! ```rust
//! use ruleforge_builder::{Registry, build_asset, register_builtins};
//! use ruleforge_core::Event;
//! use serde_json::json;
//!
//! let mut registry = Registry::new();
//! register_builtins(&mut registry);
//!
//! let definition = json!({
//!     "name": "decoder/sshd/0",
//!     "check": {"event.module": "sshd"},
//!     "map": {"decoded.by": "sshd"}
//! });
//! let asset = build_asset(&definition, &registry).unwrap();
//!
//! let mut event = Event::from_value(json!({"event": {"module": "sshd"}}));
//! assert!(asset.expression.evaluate(&mut event));
//! assert_eq!(event.get("decoded.by"), Some(&json!("sshd")));
//! ```

pub mod builders;
pub mod error;
pub mod helpers;
pub mod registry;

pub use builders::{
    AssetKind, CompiledAsset, OperationMode, build_asset, build_check_stage, build_map_stage,
    build_normalize_stage, build_operation,
};
pub use error::{BuildError, Result};
pub use helpers::register_builtins;
pub use registry::{HelperBuilder, HelperCall, Registry};
