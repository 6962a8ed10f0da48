//! # vet-core
//!
//! Core types shared by the vetdesk crates.
//!
//! - [`entities`]: the API-owned `User` record and the client-held `Session`
//! - [`enums`]: `Role` (with capability checks) and `LoadingState`
//! - [`errors`]: cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;

pub use entities::{Session, User, UserPatch};
pub use enums::{Capability, LoadingState, Role};
pub use errors::CoreError;
