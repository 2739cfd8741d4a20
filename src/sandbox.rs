//! Path allow-listing for the file tools.
//!
//! Containment is decided on absolute, lexically normalized paths. Symlinks
//! are not resolved, so this narrows what the model asks for; it is not a jail.

use std::path::{Component, Path, PathBuf};

/// Make `path` absolute against the process working directory and drop
/// `.`/`..` components without touching the filesystem.
pub fn absolutize(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            // Stays relative and therefore never matches an absolute root
            Err(_) => path.to_path_buf(),
        }
    };
    normalize_path(&joined)
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::CurDir => {}
            c => result.push(c),
        }
    }
    result
}

/// Return the first root in `roots` that contains `candidate`.
///
/// A root contains a candidate when the two are equal or the candidate is
/// nested under it at a component boundary, so `/a/b` never matches `/a/bc`.
pub fn is_allowed<P: AsRef<Path>>(candidate: &Path, roots: &[P]) -> Option<PathBuf> {
    let candidate = absolutize(candidate);
    roots
        .iter()
        .map(|root| absolutize(root.as_ref()))
        .find(|root| candidate.starts_with(root))
}

/// An ordered, immutable set of sandbox roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxRoots {
    roots: Vec<PathBuf>,
}

impl SandboxRoots {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self {
            roots: roots
                .into_iter()
                .map(|root| absolutize(root.as_ref()))
                .collect(),
        }
    }

    pub fn single(root: &Path) -> Self {
        Self::new([root])
    }

    pub fn matching_root(&self, candidate: &Path) -> Option<PathBuf> {
        is_allowed(candidate, &self.roots)
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl std::fmt::Display for SandboxRoots {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined: Vec<String> = self.roots.iter().map(|r| r.display().to_string()).collect();
        write!(f, "[{}]", joined.join(", "))
    }
}
