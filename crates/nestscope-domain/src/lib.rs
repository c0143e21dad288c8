//! # Domain Layer
//!
//! Core types shared by every nestscope crate. Nothing in here touches a
//! runtime, a logger or a configuration source.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error enum and `Result` alias |
//! | [`value_objects`] | Service keys, type descriptors, lifetimes, identities |
//! | [`constants`] | Well-known contract names |

pub mod constants;
pub mod error;
pub mod value_objects;

pub use error::{Error, Result};
pub use value_objects::{
    Contract, GenericArg, KeyKind, Lifetime, RegistryId, ScopeId, ServiceKey, TypeInfo,
};
