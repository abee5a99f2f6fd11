//! Static resource resolution
//!
//! Turns the remainder of a request path into a file inside a mount root.
//! Normalization is purely lexical; the filesystem is consulted only after
//! the path is known to stay inside the root.

use crate::error::ResolveError;
use crate::logger;
use crate::mount::Mount;
use percent_encoding::percent_decode_str;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Resolution switches taken from the HTTP configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Allow symlinks that point outside the mount root. This lifts the
    /// containment check, so a resolved path may leave the root.
    pub follow_symlinks: bool,
}

/// An existing regular file inside a mount
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResource {
    pub path: PathBuf,
    pub size: u64,
}

impl ResolvedResource {
    /// File extension, used by the front-end to pick a content type
    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|e| e.to_str())
    }
}

/// Decode and lexically normalize a remainder path
///
/// Returns a relative path made of normal components only. Any `..` that
/// would climb above the root, and any segment that is not a plain file
/// name once decoded, is rejected rather than clamped.
pub fn normalize(remainder: &str) -> Result<PathBuf, ResolveError> {
    let decoded = percent_decode_str(remainder)
        .decode_utf8()
        .map_err(|_| ResolveError::Forbidden)?;
    if decoded.contains('\0') {
        return Err(ResolveError::Forbidden);
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop().ok_or(ResolveError::Forbidden)?;
            }
            name => {
                if !is_plain_name(name) {
                    return Err(ResolveError::Forbidden);
                }
                segments.push(name);
            }
        }
    }

    Ok(segments.iter().collect())
}

/// Resolve `remainder` against `mount`'s root
pub fn resolve(
    mount: &Mount,
    remainder: &str,
    options: ResolveOptions,
) -> Result<ResolvedResource, ResolveError> {
    let relative = normalize(remainder)?;
    let candidate = mount.root().join(&relative);

    let metadata = std::fs::metadata(&candidate).map_err(|e| classify_io_error(mount, &e))?;

    if !options.follow_symlinks {
        ensure_within_root(mount, &candidate)?;
    }

    if metadata.is_dir() {
        return Err(ResolveError::IsDirectory);
    }

    Ok(ResolvedResource {
        path: candidate,
        size: metadata.len(),
    })
}

fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    // NTFS alternate data streams (`file.js:stream`)
    single && !(cfg!(windows) && name.contains(':'))
}

/// Reject candidates whose real location escapes the root through a link
fn ensure_within_root(mount: &Mount, candidate: &Path) -> Result<(), ResolveError> {
    let real = candidate
        .canonicalize()
        .map_err(|e| classify_io_error(mount, &e))?;
    if real.starts_with(mount.root()) {
        Ok(())
    } else {
        logger::log_debug(&format!(
            "Mount '{}': symlink leaves the mount root",
            mount.name()
        ));
        Err(ResolveError::Forbidden)
    }
}

fn classify_io_error(mount: &Mount, err: &io::Error) -> ResolveError {
    match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => ResolveError::NotFound,
        io::ErrorKind::PermissionDenied => ResolveError::Forbidden,
        _ => {
            logger::log_warning(&format!("Mount '{}': stat failed: {err}", mount.name()));
            ResolveError::NotFound
        }
    }
}
