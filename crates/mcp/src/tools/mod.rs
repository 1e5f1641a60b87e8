#![forbid(unsafe_code)]

mod definitions;
mod dispatch;
mod events;
mod issues;
mod npcs;
mod rules;

pub(crate) use definitions::tool_definitions;
pub(crate) use dispatch::dispatch_tool;

use crate::ArgError;
use growth_core::model::ParseEnumError;
use growth_storage::StoreError;

/// Anything that can stop a tool; rendered into the reply text, never raised.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ToolError {
    #[error(transparent)]
    Args(#[from] ArgError),
    #[error(transparent)]
    Enum(#[from] ParseEnumError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
