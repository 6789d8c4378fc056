//! Tool permission gating for Aigentic agents

mod handler;
mod policy;

pub use handler::{
    AlwaysAllowHandler, CallbackHandler, DenyAllHandler, ToolPermissionHandler, create_handler,
};
pub use policy::{PendingApproval, PermissionAction, PermissionPolicy, PolicyHandler};
