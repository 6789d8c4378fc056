//! Model implementations for Aigentic agents

mod mock;

pub use mock::{MockCall, MockModel, finished_call, stuck_call};
