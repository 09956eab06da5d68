//! # decaf-cli — Command-Line Host for the Decaf Validator
//!
//! Provides the `decaf` command-line interface.
//!
//! ## Subcommands
//!
//! - `decaf compile`: compile a model definition file and print the
//!   compiled schemas as JSON.
//! - `decaf validate`: validate one JSON item, or an array of items,
//!   against a compiled model.
//!
//! ```bash
//! decaf compile models/for_angular.model.ts
//! decaf validate models/for_angular.model.ts --model ForAngularModel --data item.json
//! decaf validate --model ForAngularModel --exceptions website --continue-on-fail < items.json
//! ```
//!
//! ## Output
//!
//! Machine-readable JSON goes to stdout; logs go to stderr.
//!
//! ## Exit Codes
//!
//! | Code | Meaning                                            |
//! |------|----------------------------------------------------|
//! | 0    | success, every item valid                          |
//! | 1    | at least one item failed validation                |
//! | 2    | operational error (unreadable file, schema error)  |

pub mod compile;
pub mod config;
pub mod validate;

use std::path::{Path, PathBuf};

/// Every item was valid.
pub const EXIT_OK: u8 = 0;
/// At least one item failed validation.
pub const EXIT_INVALID: u8 = 1;
/// The command could not run.
pub const EXIT_ERROR: u8 = 2;

/// Resolve a path that may be relative to `base`.
///
/// Absolute paths are returned as-is; relative ones are joined onto
/// `base`.
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_path() {
        let base = Path::new("/srv/models");
        assert_eq!(
            resolve_path(Path::new("user.model.ts"), base),
            PathBuf::from("/srv/models/user.model.ts")
        );
        assert_eq!(
            resolve_path(Path::new("/etc/decaf/a.ts"), base),
            PathBuf::from("/etc/decaf/a.ts")
        );
    }
}
