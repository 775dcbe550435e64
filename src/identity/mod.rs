//! Operator identity: who is deploying, as a short tag-safe name.

pub mod command;
pub mod normalize;
pub mod resolver;

pub use resolver::{ResolverConfig, UsernameResolver};
