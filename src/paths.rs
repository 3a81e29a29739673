/// Bundle-aware path resolution for macOS .app bundles.
///
/// Inside an `.app` bundle the working directory is unpredictable (Finder
/// sets it to `/`), so configuration moves to the per-user config dir.
/// During development (`cargo run`) paths fall back to the working directory.

use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "ar_ruler";

/// Returns `true` when the running binary lives inside a macOS `.app` bundle
/// (i.e. the executable path contains `*.app/Contents/MacOS/`).
pub fn is_bundled() -> bool {
    bundle_contents_dir().is_some()
}

fn bundle_contents_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    contents_dir_of(&exe)
}

/// Walk ancestors of `exe` looking for `Contents/MacOS`.
fn contents_dir_of(exe: &Path) -> Option<PathBuf> {
    let mut path = exe;
    loop {
        let parent = path.parent()?;
        if path.file_name().map(|n| n == "MacOS").unwrap_or(false)
            && parent.file_name().map(|n| n == "Contents").unwrap_or(false)
        {
            return Some(parent.to_path_buf());
        }
        path = parent;
    }
}

/// Configuration directory.
///
/// - **Bundled**: `~/Library/Application Support/ar_ruler/`
/// - **Dev**: current working directory
pub fn config_dir() -> PathBuf {
    if is_bundled() {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(APP_DIR_NAME)
    } else {
        std::env::current_dir().unwrap_or_default()
    }
}

/// Ensure a directory exists, creating it and all parents if necessary.
/// Returns the path unchanged for chaining.
pub fn ensure_dir(path: &Path) -> &Path {
    let _ = std::fs::create_dir_all(path);
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_bundled_returns_false_in_dev() {
        assert!(!is_bundled());
    }

    #[test]
    fn test_config_dir_is_cwd_in_dev() {
        let config = config_dir();
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(config, cwd);
    }

    #[test]
    fn test_contents_dir_found_inside_bundle() {
        let exe = Path::new("/Applications/Ruler.app/Contents/MacOS/ar_ruler");
        assert_eq!(
            contents_dir_of(exe),
            Some(PathBuf::from("/Applications/Ruler.app/Contents"))
        );
    }

    #[test]
    fn test_contents_dir_absent_outside_bundle() {
        assert_eq!(contents_dir_of(Path::new("/usr/local/bin/ar_ruler")), None);
    }
}
