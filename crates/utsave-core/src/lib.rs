//! Service plumbing shared by Utsave HTTP services.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
