//! Finds the documents to upload.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

/// Extensions accepted by `file_search` that make sense for a docs corpus.
pub const DEFAULT_EXTENSIONS: &[&str] = &["pdf", "md", "txt", "docx", "html", "json"];

/// Every regular file under `root` whose extension is in `extensions`
/// (case-insensitive), sorted by path.
pub fn collect_documents(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        bail!("scan: not a directory: {}", root.display());
    }

    let mut skipped = 0usize;
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(keep_entry);

    for entry in walker.filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if has_extension(path, extensions) {
            files.push(path.to_path_buf());
        } else {
            skipped += 1;
            debug!("scan: skip {}", path.display());
        }
    }

    files.sort();
    info!(
        root = %root.display(),
        documents = files.len(),
        skipped,
        "scan: done"
    );
    Ok(files)
}

fn keep_entry(entry: &DirEntry) -> bool {
    // Hidden files and directories (.git, .DS_Store, ...) are never documents.
    entry.depth() == 0
        || !entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn filters_by_extension_and_skips_hidden() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("policies/hr")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("handbook.PDF"), b"%PDF").unwrap();
        fs::write(root.join("policies/hr/leave.md"), b"# Leave").unwrap();
        fs::write(root.join("policies/notes.tmp"), b"x").unwrap();
        fs::write(root.join(".git/config.md"), b"x").unwrap();
        fs::write(root.join(".hidden.txt"), b"x").unwrap();

        let files = collect_documents(root, &exts(&["pdf", "md", "txt"])).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(names, ["handbook.PDF", "policies/hr/leave.md"]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_documents(&dir.path().join("nope"), &exts(&["pdf"])).is_err());
    }
}
