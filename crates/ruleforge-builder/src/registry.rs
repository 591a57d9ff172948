//! Helper-builder registration and lookup.
//!
//! A [`Registry`] maps helper names to the builders that compile
//! `+helper/...` values into terms. Its lifecycle has two phases: bootstrap
//! code populates it single-threaded through `&mut self`, then the filled
//! registry is shared read-only (typically behind an `Arc`) while assets
//! compile concurrently. The receiver types enforce the split; there is no
//! interior locking.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use ruleforge_core::Expression;

use crate::builders::operation::OperationMode;
use crate::error::Result;

/// One parsed `+helper/...` invocation, handed to the matching builder.
#[derive(Debug)]
pub struct HelperCall<'a> {
    /// The name the helper was resolved under, for diagnostics.
    pub name: &'a str,
    /// Canonical target field path.
    pub field: &'a str,
    /// Raw arguments, split on `/`, never path-normalized.
    pub args: &'a [String],
    /// The mode of the stage the operation appears in.
    pub mode: OperationMode,
}

/// Compiles one helper invocation into a term.
///
/// Implemented blanket-wise for any matching `Fn`, so plain functions and
/// closures register directly. Builders validate their arguments eagerly
/// and return a [`crate::BuildError`] for anything they cannot compile.
pub trait HelperBuilder: Send + Sync {
    fn build(&self, call: &HelperCall<'_>) -> Result<Expression>;
}

impl<F> HelperBuilder for F
where
    F: Fn(&HelperCall<'_>) -> Result<Expression> + Send + Sync,
{
    fn build(&self, call: &HelperCall<'_>) -> Result<Expression> {
        self(call)
    }
}

/// Name-to-builder map for helper operations.
#[derive(Default)]
pub struct Registry {
    helpers: HashMap<String, Arc<dyn HelperBuilder>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `builder` under `name`.
    ///
    /// A duplicate name replaces the previous builder (last write wins) and
    /// returns it; bootstrap code that prefers first-wins can re-register
    /// the returned builder.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        builder: impl HelperBuilder + 'static,
    ) -> Option<Arc<dyn HelperBuilder>> {
        let name = name.into();
        let previous = self.helpers.insert(name.clone(), Arc::new(builder));
        if previous.is_some() {
            tracing::warn!("helper builder '{}' overwritten", name);
        } else {
            tracing::debug!("helper builder '{}' registered", name);
        }
        previous
    }

    /// Looks up a builder. The registry performs no validation; a miss is
    /// turned into an unknown-helper error by the operation builder, which
    /// knows the target field for the diagnostic.
    pub fn resolve(&self, name: &str) -> Option<&Arc<dyn HelperBuilder>> {
        self.helpers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.helpers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.helpers.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.helpers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Registry").field("helpers", &names).finish()
    }
}
