//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (identifiers, amounts, timestamps)
//! - `subscription` - Payment claims and the subscription access grant

pub mod foundation;
pub mod subscription;
