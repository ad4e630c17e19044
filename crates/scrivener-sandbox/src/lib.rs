//! Directory allow-list enforcement for Scrivener file tools.
//!
//! Every path handed to an editing tool is checked against an [`AllowList`]
//! of root directories before any byte is read. Both the candidate path and
//! the roots are canonicalised first, so `..` segments and symbolic links are
//! resolved before the containment test runs. Containment is decided
//! component by component: `/tmp-evil` is not inside `/tmp`.
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use scrivener_sandbox::{AllowList, PathSandbox};
//!
//! let sandbox = PathSandbox::new(AllowList::new().allow_directory("/srv/notes"));
//! assert!(!sandbox.is_allowed(Path::new("/etc/passwd")));
//! ```
//!
//! A path that cannot be canonicalised (for example because it does not
//! exist) is never allowed.

mod allow_list;
mod error;
mod sandbox;

pub use allow_list::AllowList;
pub use error::SandboxError;
pub use sandbox::{PathSandbox, SANDBOX_TARGET};

#[cfg(test)]
mod tests;
