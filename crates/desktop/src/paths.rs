use std::path::{Path, PathBuf};

use vidconvert_core::shared::constants::VIDEO_EXTENSIONS;

/// Home sub-folders shown by name instead of by their full path.
const COMMON_FOLDERS: &[&str] = &["Desktop", "Documents", "Downloads", "Pictures", "Videos"];

/// Where file dialogs open before the user has picked anything.
pub fn default_browse_dir() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Short label for a folder that doesn't reveal the full path.
///
/// Anything under a common home folder collapses to `.../<folder>`;
/// everything else shows its own name.
pub fn display_path(path: &Path, home: Option<&Path>) -> String {
    if let Some(first) = home
        .and_then(|h| path.strip_prefix(h).ok())
        .and_then(|rel| rel.components().next())
    {
        let first = first.as_os_str().to_string_lossy();
        if COMMON_FOLDERS.contains(&first.as_ref()) {
            return format!(".../{first}");
        }
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    format!(".../{name}")
}

/// Extensions for the video picker in both cases, since some platforms
/// match filters case-sensitively.
pub fn dialog_extensions() -> Vec<String> {
    VIDEO_EXTENSIONS
        .iter()
        .flat_map(|ext| [ext.to_string(), ext.to_uppercase()])
        .collect()
}

/// Directory to reopen dialogs in after the user picked `path`.
pub fn remembered_dir(path: &Path) -> Option<PathBuf> {
    if path.is_dir() {
        Some(path.to_path_buf())
    } else {
        path.parent().map(Path::to_path_buf)
    }
}
