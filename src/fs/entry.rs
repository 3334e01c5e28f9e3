use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

use chrono::{Local, TimeZone};
use globset::{GlobBuilder, GlobMatcher};

use crate::error::Result;

/// One row of a directory listing.
///
/// Listings are rebuilt wholesale on every refresh, so the UI flags live
/// directly on the entry and start cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryEntry {
    pub name: String,
    pub size: u64,
    /// Seconds since the Unix epoch; 0 when the entry could not be stat-ed.
    pub modified: f64,
    pub is_dir: bool,
    pub hovered: bool,
    pub focused: bool,
    pub selected: bool,
}

impl DirectoryEntry {
    pub fn file(name: impl Into<String>, size: u64, modified: f64) -> Self {
        Self {
            name: name.into(),
            size,
            modified,
            is_dir: false,
            hovered: false,
            focused: false,
            selected: false,
        }
    }

    pub fn dir(name: impl Into<String>, modified: f64) -> Self {
        Self {
            is_dir: true,
            ..Self::file(name, 0, modified)
        }
    }

    /// Size used for ordering: directories count as empty.
    pub fn sort_size(&self) -> u64 {
        if self.is_dir {
            0
        } else {
            self.size
        }
    }
}

/// Which kinds of entries a listing includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryKinds {
    pub files: bool,
    pub dirs: bool,
}

impl Default for EntryKinds {
    fn default() -> Self {
        Self {
            files: true,
            dirs: false,
        }
    }
}

const SIZE_SCALING: [(u64, &str); 4] = [
    (1024 * 1024 * 1024 * 1024, "TiB"),
    (1024 * 1024 * 1024, "GiB"),
    (1024 * 1024, "MiB"),
    (1024, "KiB"),
];

/// Human-readable size with binary units and two decimals.
pub fn format_size(size: u64) -> String {
    for (scale, unit) in SIZE_SCALING {
        if size >= scale {
            return format!("{:.2} {}", size as f64 / scale as f64, unit);
        }
    }
    format!("{} B", size)
}

/// ISO-8601 local time truncated to whole seconds.
pub fn format_modified(timestamp: f64) -> String {
    let secs = timestamp.floor() as i64;
    let nanos = ((timestamp - timestamp.floor()) * 1e9) as u32;
    match Local.timestamp_opt(secs, nanos).single() {
        Some(time) => time.format("%Y-%m-%dT%H:%M:%S").to_string(),
        None => String::new(),
    }
}

/// Compile a filename filter. An empty filter matches everything.
pub fn compile_filter(filter: &str) -> Result<GlobMatcher> {
    let pattern = if filter.trim().is_empty() {
        "*"
    } else {
        filter.trim()
    };
    let glob = GlobBuilder::new(pattern).literal_separator(true).build()?;
    Ok(glob.compile_matcher())
}

/// List `dir`, keeping names that match `filter` and the requested kinds.
///
/// Dot-files only match patterns that themselves start with a dot. A
/// failed stat keeps the entry with zero size and timestamp; an unreadable
/// directory or an invalid filter yields an empty listing.
pub fn scan_directory(dir: &Path, filter: &str, kinds: EntryKinds) -> Vec<DirectoryEntry> {
    let matcher = match compile_filter(filter) {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!(filter, error = %e, "ignoring invalid filter");
            return Vec::new();
        }
    };
    let match_hidden = filter.trim_start().starts_with('.');

    let read_dir = match fs::read_dir(dir) {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "directory not listable");
            return Vec::new();
        }
    };

    let mut files = Vec::new();
    let mut dirs = Vec::new();

    for entry in read_dir {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') && !match_hidden {
            continue;
        }
        if !matcher.is_match(&name) {
            continue;
        }

        let metadata = fs::metadata(entry.path()).ok();
        let is_dir = match &metadata {
            Some(m) => m.is_dir(),
            None => entry.file_type().map(|t| t.is_dir()).unwrap_or(false),
        };
        let modified = metadata
            .as_ref()
            .and_then(|m| m.modified().ok())
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);

        if is_dir {
            if kinds.dirs {
                dirs.push(DirectoryEntry::dir(name, modified));
            }
        } else if kinds.files {
            let size = metadata.as_ref().map(|m| m.len()).unwrap_or(0);
            files.push(DirectoryEntry::file(name, size, modified));
        }
    }

    files.extend(dirs);
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn setup_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        fs::write(dir.path().join("readme.md"), "# title").unwrap();
        File::create(dir.path().join(".hidden.txt")).unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        fs::create_dir(dir.path().join("src.txt")).unwrap();
        dir
    }

    fn names(entries: &[DirectoryEntry]) -> Vec<&str> {
        let mut names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        names.sort();
        names
    }

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1024), "1.00 KiB");
        assert_eq!(format_size(1536), "1.50 KiB");
        assert_eq!(format_size(1024 * 1024), "1.00 MiB");
        assert_eq!(format_size(1024 * 1024 * 1024), "1.00 GiB");
        assert_eq!(format_size(1024u64.pow(4) * 3), "3.00 TiB");
    }

    #[test]
    fn format_modified_is_truncated_iso() {
        let text = format_modified(1_700_000_000.75);
        assert_eq!(text.len(), 19);
        assert_eq!(&text[10..11], "T");
        assert_eq!(text, format_modified(1_700_000_000.0));
    }

    #[test]
    fn scan_lists_only_files_by_default() {
        let dir = setup_test_dir();
        let entries = scan_directory(dir.path(), "*", EntryKinds::default());
        assert_eq!(names(&entries), vec!["notes.txt", "readme.md"]);
        assert!(entries.iter().all(|e| !e.is_dir));
    }

    #[test]
    fn scan_applies_glob() {
        let dir = setup_test_dir();
        let entries = scan_directory(dir.path(), "*.txt", EntryKinds::default());
        assert_eq!(names(&entries), vec!["notes.txt"]);
    }

    #[test]
    fn scan_directories_only() {
        let dir = setup_test_dir();
        let kinds = EntryKinds {
            files: false,
            dirs: true,
        };
        let entries = scan_directory(dir.path(), "*", kinds);
        assert_eq!(names(&entries), vec!["docs", "src.txt"]);
        assert!(entries.iter().all(|e| e.is_dir && e.size == 0));
    }

    #[test]
    fn scan_files_before_dirs() {
        let dir = setup_test_dir();
        let kinds = EntryKinds {
            files: true,
            dirs: true,
        };
        let entries = scan_directory(dir.path(), "*.txt", kinds);
        assert_eq!(entries.len(), 2);
        assert!(!entries[0].is_dir);
        assert!(entries[1].is_dir);
    }

    #[test]
    fn hidden_files_need_dot_pattern() {
        let dir = setup_test_dir();
        let entries = scan_directory(dir.path(), ".*", EntryKinds::default());
        assert_eq!(names(&entries), vec![".hidden.txt"]);
    }

    #[test]
    fn scan_records_size_and_mtime() {
        let dir = setup_test_dir();
        let entries = scan_directory(dir.path(), "notes.txt", EntryKinds::default());
        assert_eq!(entries[0].size, 5);
        assert!(entries[0].modified > 0.0);
    }

    #[test]
    fn invalid_filter_is_empty_listing() {
        let dir = setup_test_dir();
        assert!(scan_directory(dir.path(), "[oops", EntryKinds::default()).is_empty());
    }

    #[test]
    fn missing_directory_is_empty_listing() {
        let entries = scan_directory(Path::new("/nonexistent/dir"), "*", EntryKinds::default());
        assert!(entries.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn broken_symlink_is_kept_with_zero_metadata() {
        let dir = TempDir::new().unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("dangling")).unwrap();
        let entries = scan_directory(dir.path(), "*", EntryKinds::default());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].size, 0);
        assert_eq!(entries[0].modified, 0.0);
    }

    #[test]
    fn directory_sort_size_is_zero() {
        let mut d = DirectoryEntry::dir("x", 1.0);
        d.size = 4096;
        assert_eq!(d.sort_size(), 0);
    }
}
