//! Tenant context.
//!
//! Every request acts on behalf of one user inside one organization. The
//! context is built once from the session and handed to handlers explicitly;
//! data access takes the organization ID from it, never from ambient state.

mod context;
mod error;

pub use context::TenantContext;
pub use error::TenantError;
