//! Markdown file discovery

use crate::repository::NOTEVC_DIR;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Whether `path` names a Markdown note (`.md`, any case)
pub fn is_markdown(path: &str) -> bool {
    Path::new(path)
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}

fn is_metadata_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_type().is_dir() && entry.file_name() == NOTEVC_DIR
}

/// Every Markdown file under `root` as sorted, `/`-separated relative paths.
/// The `.notevc` directory is never entered.
pub fn markdown_files(root: &Path) -> Vec<String> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).into_iter().filter_entry(|e| !is_metadata_dir(e)) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("Failed to read directory entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        if is_markdown(&relative) {
            files.push(relative);
        }
    }
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_markdown_files() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("daily/2024")).unwrap();
        fs::create_dir_all(root.join(".notevc/blocks")).unwrap();
        fs::write(root.join("b.md"), "").unwrap();
        fs::write(root.join("A.MD"), "").unwrap();
        fs::write(root.join("daily/2024/jan.md"), "").unwrap();
        fs::write(root.join("daily/notes.txt"), "").unwrap();
        fs::write(root.join(".notevc/blocks/stray.md"), "").unwrap();

        assert_eq!(markdown_files(root), vec!["A.MD", "b.md", "daily/2024/jan.md"]);
    }

    #[test]
    fn test_is_markdown() {
        assert!(is_markdown("note.md"));
        assert!(is_markdown("dir/Note.Md"));
        assert!(!is_markdown("note.markdown"));
        assert!(!is_markdown("md"));
    }
}
