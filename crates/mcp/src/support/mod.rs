#![forbid(unsafe_code)]

mod args;
mod jsonrpc;
mod reply;
mod runtime;
mod session_log;

pub(crate) use args::*;
pub(crate) use jsonrpc::*;
pub(crate) use reply::*;
pub(crate) use runtime::*;
pub(crate) use session_log::*;
