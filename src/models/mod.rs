//! Model lifecycle: sourcing, staging, and running the three sessions.
//!
//! [`ModelSource`] abstracts where graph bytes and label tables come from;
//! [`ModelManager`] owns the live sessions, one slot per [`ModelRole`], and
//! is the only type that talks to the inference engine after load.

mod manager;
mod source;

pub use manager::ModelManager;
pub use source::{DirModelSource, ModelRole, ModelSource};
