//! Resource model: the fixed set of resource kinds, the parent/child
//! relation between kinds, and the discovered-resource value type.
//!
//! The model is pure lookup tables and accessors; it holds no mutable state.

mod kind;
mod resource;

pub use kind::ResourceKind;
pub use resource::Resource;
