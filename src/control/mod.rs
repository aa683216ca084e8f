//! Supplementary-service control codes.
//!
//! - [`ControlRequest`] - a parsed control string (`*#31#`, `#31#0123`, ...)
//! - [`ControlRouter`] / [`ControlTable`] - code bindings and request routing
//! - [`ServiceCode`], [`Dispatch`], [`ControlReply`] - how a line answers the codes it binds

mod dispatcher;
mod request;
mod router;

pub use dispatcher::{ControlReply, Dispatch, ReplyHandle, ServiceCode};
pub use request::{ControlParseError, ControlRequest, ControlType};
pub use router::{ControlHandler, ControlRouter, ControlTable};
