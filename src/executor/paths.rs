// Path resolution for tool arguments

use std::path::{Component, Path, PathBuf};

/// Resolve a path argument the way a shell user would read it: expand a
/// leading `~`, anchor relative paths at `base`, fold `.` and `..`, then
/// resolve symlinks along whatever prefix already exists.
pub fn resolve(raw: &str, base: &Path, home: Option<&Path>) -> PathBuf {
    let expanded = expand_tilde(raw, home);
    let anchored = if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    };
    canonicalize_lenient(&normalize(&anchored))
}

fn expand_tilde(raw: &str, home: Option<&Path>) -> PathBuf {
    match home {
        Some(home) if raw == "~" => home.to_path_buf(),
        Some(home) => match raw.strip_prefix("~/") {
            Some(rest) => home.join(rest),
            None => PathBuf::from(raw),
        },
        None => PathBuf::from(raw),
    }
}

/// Lexically fold `.` and `..` components. `..` at the root stays at the root.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Canonicalize the deepest existing ancestor and re-attach the rest, so paths
/// that do not exist yet still get their symlinked prefix resolved.
pub fn canonicalize_lenient(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut missing = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            let mut out = canonical;
            for part in missing.iter().rev() {
                out.push(part);
            }
            return out;
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}

/// Component-wise containment: `/home/alice2` is not inside `/home/alice`.
pub fn is_within(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}
