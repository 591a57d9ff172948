//! Immutable, shareable expression trees.
//!
//! An [`Expression`] is a named tree built once and then evaluated against
//! any number of events. Leaves ([`Term`]) wrap a single function of one
//! event; internal nodes combine their children with short-circuit AND/OR
//! or run them as an unconditional sequence. Trees are reference-counted,
//! so cloning is cheap and a compiled tree can be shared across threads.

use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::event::Event;

type TermFn = Box<dyn Fn(&mut Event) -> bool + Send + Sync>;

// =============================================================================
// Term
// =============================================================================

/// A leaf expression: one named function of one event.
///
/// The trace strings are preformatted at build time so the traced
/// evaluation path does no formatting work.
pub struct Term {
    name: String,
    success_trace: String,
    failure_trace: String,
    func: TermFn,
}

impl Term {
    /// Creates a term with the default traces `"{name} -> Success"` and
    /// `"{name} -> Failure"`.
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(&mut Event) -> bool + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        let success_trace = format!("{name} -> Success");
        let failure_trace = format!("{name} -> Failure");
        Self {
            name,
            success_trace,
            failure_trace,
            func: Box::new(func),
        }
    }

    /// Replaces the failure trace, keeping name and success trace.
    pub fn with_failure_trace(mut self, trace: impl Into<String>) -> Self {
        self.failure_trace = trace.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn success_trace(&self) -> &str {
        &self.success_trace
    }

    pub fn failure_trace(&self) -> &str {
        &self.failure_trace
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Term").field("name", &self.name).finish_non_exhaustive()
    }
}

// =============================================================================
// Expression
// =============================================================================

enum Node {
    Term(Term),
    And { name: String, children: Vec<Expression> },
    Or { name: String, children: Vec<Expression> },
    Seq { name: String, children: Vec<Expression> },
}

/// An immutable expression tree, cheap to clone and `Send + Sync`.
#[derive(Clone)]
pub struct Expression {
    node: Arc<Node>,
}

impl Expression {
    /// Shorthand for wrapping a [`Term`] built with default traces.
    pub fn term(
        name: impl Into<String>,
        func: impl Fn(&mut Event) -> bool + Send + Sync + 'static,
    ) -> Self {
        Term::new(name, func).into()
    }

    /// Short-circuit conjunction. An empty child list is vacuously true.
    pub fn and(name: impl Into<String>, children: Vec<Expression>) -> Self {
        Self::wrap(Node::And {
            name: name.into(),
            children,
        })
    }

    /// Short-circuit disjunction. An empty child list is false.
    pub fn or(name: impl Into<String>, children: Vec<Expression>) -> Self {
        Self::wrap(Node::Or {
            name: name.into(),
            children,
        })
    }

    /// Unconditional sequence: every child runs, individual results are
    /// ignored, the node itself always succeeds.
    pub fn seq(name: impl Into<String>, children: Vec<Expression>) -> Self {
        Self::wrap(Node::Seq {
            name: name.into(),
            children,
        })
    }

    fn wrap(node: Node) -> Self {
        Self {
            node: Arc::new(node),
        }
    }

    pub fn name(&self) -> &str {
        match &*self.node {
            Node::Term(term) => term.name(),
            Node::And { name, .. } | Node::Or { name, .. } | Node::Seq { name, .. } => name,
        }
    }

    /// Evaluates the tree against one event. The hot path: no allocation,
    /// no trace emission.
    pub fn evaluate(&self, event: &mut Event) -> bool {
        match &*self.node {
            Node::Term(term) => (term.func)(event),
            Node::And { children, .. } => children.iter().all(|child| child.evaluate(event)),
            Node::Or { children, .. } => children.iter().any(|child| child.evaluate(event)),
            Node::Seq { children, .. } => {
                for child in children {
                    child.evaluate(event);
                }
                true
            }
        }
    }

    /// Evaluates like [`Expression::evaluate`], feeding every visited
    /// term's success or failure trace to `sink` in visit order.
    pub fn evaluate_traced(&self, event: &mut Event, sink: &mut dyn FnMut(&str)) -> bool {
        match &*self.node {
            Node::Term(term) => {
                let outcome = (term.func)(event);
                sink(if outcome {
                    &term.success_trace
                } else {
                    &term.failure_trace
                });
                outcome
            }
            Node::And { children, .. } => {
                for child in children {
                    if !child.evaluate_traced(event, sink) {
                        return false;
                    }
                }
                true
            }
            Node::Or { children, .. } => {
                for child in children {
                    if child.evaluate_traced(event, sink) {
                        return true;
                    }
                }
                false
            }
            Node::Seq { children, .. } => {
                for child in children {
                    child.evaluate_traced(event, sink);
                }
                true
            }
        }
    }

    /// Indented multi-line rendering of the tree, for diagnostics.
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        self.render_into(0, &mut out);
        out
    }

    fn render_into(&self, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        match &*self.node {
            Node::Term(term) => {
                let _ = writeln!(out, "{indent}{}", term.name());
            }
            Node::And { name, children } => {
                let _ = writeln!(out, "{indent}{name} (and)");
                for child in children {
                    child.render_into(depth + 1, out);
                }
            }
            Node::Or { name, children } => {
                let _ = writeln!(out, "{indent}{name} (or)");
                for child in children {
                    child.render_into(depth + 1, out);
                }
            }
            Node::Seq { name, children } => {
                let _ = writeln!(out, "{indent}{name} (seq)");
                for child in children {
                    child.render_into(depth + 1, out);
                }
            }
        }
    }
}

impl From<Term> for Expression {
    fn from(term: Term) -> Self {
        Self::wrap(Node::Term(term))
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression").field("name", &self.name()).finish()
    }
}
