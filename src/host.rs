//! Boundary with the host query library.
//!
//! The host exposes exactly three primitives - element lookup by selector,
//! event-handler binding, and event-handler unbinding - as plain function
//! references. Callers hand them over in a [`HostHooks`] table, which is
//! validated into a complete [`HostOps`] table at setup; a missing primitive
//! is a fatal initialization error (there is nothing to instrument).
//!
//! Everything here is single-threaded by design, so handlers and ops are
//! `Rc`-based closures rather than `Arc + Send`.

use crate::error::{Error, Result};
use std::rc::Rc;

/// Opaque identifier for a host document node.
pub type NodeId = u64;

/// Set of elements matched by a host lookup, tagged with the selector that
/// produced it (the host keeps the selector on the result, so a later bind
/// on the set knows what it was built from).
#[derive(Debug, Clone, Default)]
pub struct Matches {
    pub selector: String,
    pub nodes: Vec<NodeId>,
}

impl Matches {
    pub fn new(selector: impl Into<String>, nodes: Vec<NodeId>) -> Self {
        Self {
            selector: selector.into(),
            nodes,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Event delivered to a bound handler.
#[derive(Debug, Clone)]
pub struct HostEvent {
    pub event_type: String,
    pub target: NodeId,
}

/// An event handler closure.
///
/// Closures are not comparable by content, only by identity; `key()` exposes
/// the allocation address so the interceptor can map an original handler to
/// the wrapper that was actually attached.
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&HostEvent)>);

impl Handler {
    pub fn new(f: impl Fn(&HostEvent) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, event: &HostEvent) {
        (self.0)(event)
    }

    /// Identity key, stable for the handler's lifetime.
    pub(crate) fn key(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Handler({:#x})", self.key())
    }
}

/// Element lookup: selector plus optional scoped-root context.
pub type FindFn = Rc<dyn Fn(&str, Option<NodeId>) -> Matches>;
/// Bind a handler for an event type on a match set; returns the set for chaining.
pub type BindFn = Rc<dyn Fn(&Matches, &str, &Handler) -> Matches>;
/// Unbind a handler (or all handlers when `None`) for an event type.
pub type UnbindFn = Rc<dyn Fn(&Matches, &str, Option<&Handler>) -> Matches>;

/// Caller-supplied host primitives; any slot may be absent.
#[derive(Clone, Default)]
pub struct HostHooks {
    pub find: Option<FindFn>,
    pub bind: Option<BindFn>,
    pub unbind: Option<UnbindFn>,
}

impl HostHooks {
    /// Validate the table; fails with [`Error::MissingOperation`] on the
    /// first absent primitive.
    pub fn into_ops(self) -> Result<HostOps> {
        Ok(HostOps {
            find: self.find.ok_or(Error::MissingOperation { name: "find" })?,
            bind: self.bind.ok_or(Error::MissingOperation { name: "bind" })?,
            unbind: self
                .unbind
                .ok_or(Error::MissingOperation { name: "unbind" })?,
        })
    }
}

/// Complete, validated table of host primitives.
#[derive(Clone)]
pub struct HostOps {
    pub find: FindFn,
    pub bind: BindFn,
    pub unbind: UnbindFn,
}

impl std::fmt::Debug for HostOps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostOps").finish_non_exhaustive()
    }
}

impl HostOps {
    pub fn find(&self, selector: &str, context: Option<NodeId>) -> Matches {
        (self.find)(selector, context)
    }

    pub fn bind(&self, target: &Matches, event_type: &str, handler: &Handler) -> Matches {
        (self.bind)(target, event_type, handler)
    }

    pub fn unbind(&self, target: &Matches, event_type: &str, handler: Option<&Handler>) -> Matches {
        (self.unbind)(target, event_type, handler)
    }
}
