//! Mount module
//!
//! URL prefix to directory bindings and the package lookup that feeds them.

mod package;
mod table;

pub use package::PackageRegistry;
pub use table::{Mount, MountTable};
