//! Request-scoped values visible to everything a pipeline run logs
//!
//! Values live in a tokio task-local, so concurrent runs for different
//! users never see each other's context, and a scope is torn down on every
//! exit path (including the future being dropped).

mod pseudonym;
mod request;

pub use pseudonym::log_safe_user_id;
pub use request::RequestContext;
