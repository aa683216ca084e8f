//! # Control-code routing
//!
//! A [`ControlRouter`] maps service codes to the handlers that serve them. Several
//! handlers may bind the same code; a request is offered to them in binding order until
//! one of them takes it.
//!
//! ```text
//! route(request, reply)
//!   ├─► handler #1.handle() ─► Declined(reply) ─┐
//!   ├─► handler #2.handle() ◄───────────────────┘ ─► Handled   (stop)
//!   └─► nobody took it ─► Declined(reply) back to the caller
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::dispatcher::{Dispatch, ReplyHandle};
use super::request::ControlRequest;

/// Serves control requests for the codes it is bound to.
pub trait ControlHandler: Send + Sync + 'static {
    /// Takes the request or hands `reply` back untouched.
    ///
    /// A handler that returns [`Dispatch::Handled`] owns the reply and must answer it
    /// exactly once.
    fn handle(self: Arc<Self>, request: &ControlRequest, reply: ReplyHandle) -> Dispatch;
}

/// Registry of control-code bindings.
pub trait ControlRouter {
    /// Binds `handler` to `code`. Returns false if that handler is already bound to it.
    fn register(&self, code: &'static str, handler: Arc<dyn ControlHandler>) -> bool;

    /// Removes the binding of `handler` to `code`. Returns false if there was none.
    fn unregister(&self, code: &str, handler: &Arc<dyn ControlHandler>) -> bool;
}

fn same_handler(a: &Arc<dyn ControlHandler>, b: &Arc<dyn ControlHandler>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// In-memory [`ControlRouter`].
#[derive(Default)]
pub struct ControlTable {
    entries: Mutex<HashMap<String, Vec<Arc<dyn ControlHandler>>>>,
}

impl ControlTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Arc<dyn ControlHandler>>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Codes with at least one binding, sorted.
    pub fn codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.lock().keys().cloned().collect();
        codes.sort();
        codes
    }

    /// Offers `request` to the handlers bound to its code.
    pub fn route(&self, request: &ControlRequest, mut reply: ReplyHandle) -> Dispatch {
        let handlers = self.lock().get(&request.code).cloned().unwrap_or_default();

        for handler in handlers {
            match handler.handle(request, reply) {
                Dispatch::Handled => return Dispatch::Handled,
                Dispatch::Declined(back) => reply = back,
            }
        }
        tracing::debug!(code = %request.code, "no handler took the control request");
        Dispatch::Declined(reply)
    }
}

impl ControlRouter for ControlTable {
    fn register(&self, code: &'static str, handler: Arc<dyn ControlHandler>) -> bool {
        let mut entries = self.lock();
        let bound = entries.entry(code.to_owned()).or_default();
        if bound.iter().any(|h| same_handler(h, &handler)) {
            return false;
        }
        bound.push(handler);
        true
    }

    fn unregister(&self, code: &str, handler: &Arc<dyn ControlHandler>) -> bool {
        let mut entries = self.lock();
        let Some(bound) = entries.get_mut(code) else {
            return false;
        };
        let before = bound.len();
        bound.retain(|h| !same_handler(h, handler));
        let removed = bound.len() != before;
        if bound.is_empty() {
            entries.remove(code);
        }
        removed
    }
}

impl std::fmt::Debug for ControlTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlTable")
            .field("codes", &self.codes())
            .finish()
    }
}
