// Sandbox guard - confines every tool path to the working root

use crate::executor::{ExecutorError, Result};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// Holds the canonical working root and resolves agent-supplied paths
/// against it.
#[derive(Debug, Clone)]
pub struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    /// Create a sandbox rooted at an existing directory
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = canonical_root(root.as_ref())?;
        debug!(root = %root.display(), "sandbox created");
        Ok(Self { root })
    }

    /// The canonical working root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Replace the working root. The old root is kept if the new one is invalid.
    pub fn set_root(&mut self, root: impl AsRef<Path>) -> Result<()> {
        let root = canonical_root(root.as_ref())?;
        info!(root = %root.display(), "working root changed");
        self.root = root;
        Ok(())
    }

    /// Resolve `path` (relative to the root, or absolute) to a canonical
    /// path that is guaranteed to be the root or one of its descendants.
    ///
    /// The leaf does not need to exist, so CREATE can resolve new files.
    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        let requested = Path::new(path);
        let joined = if requested.is_absolute() {
            requested.to_path_buf()
        } else {
            self.root.join(requested)
        };

        let resolved = weakly_canonical(&joined);
        if !self.contains(&resolved) {
            warn!(path = %path, resolved = %resolved.display(), "sandbox violation");
            return Err(ExecutorError::SandboxViolation(path.to_string()));
        }
        Ok(resolved)
    }

    /// Component-wise containment: `/work/project2` is not inside `/work/project`.
    pub fn contains(&self, resolved: &Path) -> bool {
        resolved.starts_with(&self.root)
    }

    /// Display form of `path` relative to the root
    pub fn relative_display(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
            Ok(rel) => rel.display().to_string(),
            Err(_) => path.display().to_string(),
        }
    }
}

fn canonical_root(root: &Path) -> Result<PathBuf> {
    let canonical = root
        .canonicalize()
        .map_err(|e| ExecutorError::InvalidRoot(root.display().to_string(), e.to_string()))?;
    if !canonical.is_dir() {
        return Err(ExecutorError::InvalidRoot(
            root.display().to_string(),
            "not a directory".to_string(),
        ));
    }
    Ok(canonical)
}

/// Symlink hops followed for one path before giving up
const MAX_SYMLINK_HOPS: usize = 40;

/// Resolve `path` one component at a time.
///
/// Each prefix that exists is canonicalized before the next component is
/// applied, so symlinks are followed even when a missing component and `..`
/// appear earlier in the path. Dangling symlinks are followed to their
/// target. Components past the existing prefix are applied lexically.
pub fn weakly_canonical(path: &Path) -> PathBuf {
    resolve_components(PathBuf::new(), path, 0)
}

fn resolve_components(mut base: PathBuf, path: &Path, hops: usize) -> PathBuf {
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => base.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                base.pop();
            }
            Component::Normal(name) => {
                base.push(name);
                base = follow(base, hops);
            }
        }
    }
    base
}

fn follow(path: PathBuf, hops: usize) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    if hops >= MAX_SYMLINK_HOPS {
        return path;
    }
    let Ok(target) = std::fs::read_link(&path) else {
        return path;
    };

    let mut parent = path;
    parent.pop();
    resolve_components(parent, &target, hops + 1)
}
