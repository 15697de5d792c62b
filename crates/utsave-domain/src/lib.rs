//! Domain types shared across all Utsave services.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never in `infra/` or `handlers/`.

pub mod attendance;
pub mod email;
pub mod id;
