use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

/// Resolve the application home directory.
///
/// `explicit` may start with `~`, which expands to the user's home. `None`
/// means `<user home>/<default_subdir>`. Relative paths are made absolute
/// against the current directory.
pub fn resolve_home_dir(
    explicit: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let raw = match explicit {
        Some(p) => expand_tilde(&p)?,
        None => user_home()?.join(default_subdir),
    };

    let abs = if raw.is_absolute() {
        raw
    } else {
        std::env::current_dir()
            .context("current directory is unavailable")?
            .join(raw)
    };

    if create {
        std::fs::create_dir_all(&abs)
            .with_context(|| format!("failed to create home dir {}", abs.display()))?;
    }
    Ok(abs)
}

fn user_home() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| anyhow!("cannot determine the user's home directory"))
}

fn expand_tilde(p: &str) -> Result<PathBuf> {
    if p == "~" {
        return user_home();
    }
    match p.strip_prefix("~/").or_else(|| p.strip_prefix("~\\")) {
        Some(rest) => Ok(user_home()?.join(rest)),
        None => Ok(Path::new(p).to_path_buf()),
    }
}
