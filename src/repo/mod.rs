//! Repository collaborators: the git capability surface and the registry.

pub mod git;
pub mod registry;

pub use git::Repository;
pub use registry::Registry;
