use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Resolve the application home directory to an absolute path.
///
/// - `None` (or empty) → `<user home>/<default_subdir>`
/// - `~` / `~/x` → expanded against the user home
/// - relative paths → joined with the current directory
///
/// With `create`, the directory is created if missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let resolved = match configured.as_deref().map(str::trim) {
        None | Some("") => user_home()?.join(default_subdir),
        Some("~") => user_home()?,
        Some(p) => match p.strip_prefix("~/").or_else(|| p.strip_prefix("~\\")) {
            Some(rest) => user_home()?.join(rest),
            None => absolutize(Path::new(p))?,
        },
    };

    if create {
        std::fs::create_dir_all(&resolved)
            .with_context(|| format!("failed to create home dir {}", resolved.display()))?;
    }
    Ok(resolved)
}

fn user_home() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    const VAR: &str = "APPDATA";
    #[cfg(not(target_os = "windows"))]
    const VAR: &str = "HOME";

    match std::env::var_os(VAR) {
        Some(v) if !v.is_empty() => absolutize(Path::new(&v)),
        _ => bail!("cannot resolve user home: ${VAR} is not set"),
    }
}

fn absolutize(p: &Path) -> Result<PathBuf> {
    if p.is_absolute() {
        return Ok(p.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    Ok(cwd.join(p))
}
