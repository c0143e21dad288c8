//! Override engine
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`scope`] | Override layers, nearest-definition lookup, handles |
//! | [`context`] | Chain-local index of the active layer per registry |
//! | [`registry`] | Explicit handle to one registry's index |
//! | [`decorate`](mod@decorate) | One-time rewrite of a collection's bindings |
//! | [`api`] | `open_scope` / `current_resolver` |
//!
//! ```text
//! open_scope(r) ─▶ OverrideScope { parent: r's layer, previous: chain current }
//!                    │ push
//!                    ▼
//!       chain index[registry] ◀── redirecting factory reads it
//!                    ▲
//!                    │ restore previous
//!            ScopeHandle::dispose()
//! ```

pub mod api;
pub mod context;
pub mod decorate;
pub mod registry;
pub mod scope;

pub use api::{ResolverOverridesExt, ServiceCollectionOverridesExt, current_resolver, open_scope};
pub use decorate::{decorate, decorate_with_config};
pub use registry::OverrideRegistry;
pub use scope::{OverrideScope, ScopeHandle};
