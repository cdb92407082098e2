use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::LessonportError;

/// Navigation metadata file that lives next to the lesson directories.
pub const SIDEBAR_SENTINEL: &str = "_sidebar.md";

/// File name read from every lesson directory.
pub const README_FILE: &str = "README.md";

/// A numbered lesson directory and its README, if one exists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LessonDirectory {
    pub name: String,
    /// Position in the numerically sorted directory sequence.
    pub index: usize,
    #[serde(skip)]
    pub readme: Option<String>,
    /// The README contained bytes that are not UTF-8 and were replaced.
    #[serde(skip)]
    pub readme_lossy: bool,
}

impl LessonDirectory {
    pub fn readme_path(parent: &Path, name: &str) -> PathBuf {
        parent.join(name).join(README_FILE)
    }
}

/// Lists the immediate children of `parent` that look like lesson directories, ordered
/// by their numeric value ("2" before "10").
///
/// The sidebar sentinel and any name that does not parse as an integer are dropped.
pub fn list_lesson_directories(parent: &Path) -> Result<Vec<String>, LessonportError> {
    let entries = fs::read_dir(parent).map_err(|err| {
        LessonportError::Content(format!(
            "failed to read lesson root {}: {err}",
            parent.display()
        ))
    })?;

    let mut numbered = Vec::new();
    for entry in entries {
        let entry = entry?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if name == SIDEBAR_SENTINEL {
            continue;
        }
        match name.parse::<u64>() {
            Ok(number) => numbered.push((number, name)),
            Err(_) => {
                tracing::debug!(entry = %name, "skipping non-numeric entry");
            }
        }
    }

    // read_dir order is platform dependent; tie-break on the name so "1" and "01" stay stable.
    numbered.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    Ok(numbered.into_iter().map(|(_, name)| name).collect())
}

/// Reads a text file, replacing invalid UTF-8 with U+FFFD instead of failing.
///
/// The flag is true when any replacement happened.
pub fn read_text_lossy(path: &Path) -> Result<(String, bool), LessonportError> {
    let bytes = fs::read(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => (text, false),
        Err(err) => (String::from_utf8_lossy(err.as_bytes()).into_owned(), true),
    })
}

/// Reads `{parent}/{name}/README.md`, returning `None` for the README when it is absent.
pub fn load_lesson_directory(
    parent: &Path,
    name: &str,
    index: usize,
) -> Result<LessonDirectory, LessonportError> {
    let path = LessonDirectory::readme_path(parent, name);
    let (readme, readme_lossy) = if path.is_file() {
        let (text, lossy) = read_text_lossy(&path)?;
        (Some(text), lossy)
    } else {
        (None, false)
    };

    Ok(LessonDirectory {
        name: name.to_string(),
        index,
        readme,
        readme_lossy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_dirs(root: &Path, names: &[&str]) {
        for name in names {
            fs::create_dir_all(root.join(name)).unwrap();
        }
    }

    #[test]
    fn sorts_numerically_not_lexicographically() {
        let temp = tempdir().unwrap();
        make_dirs(temp.path(), &["2", "10", "1"]);

        let dirs = list_lesson_directories(temp.path()).unwrap();
        assert_eq!(dirs, vec!["1", "2", "10"]);
    }

    #[test]
    fn sidebar_and_non_numeric_entries_are_excluded() {
        let temp = tempdir().unwrap();
        make_dirs(temp.path(), &["3", "assets", "0"]);
        fs::write(temp.path().join(SIDEBAR_SENTINEL), "* [Intro](0/)").unwrap();

        let dirs = list_lesson_directories(temp.path()).unwrap();
        assert_eq!(dirs, vec!["0", "3"]);
    }

    #[test]
    fn missing_root_is_a_content_error() {
        let temp = tempdir().unwrap();
        let err = list_lesson_directories(&temp.path().join("nope")).unwrap_err();
        assert!(matches!(err, LessonportError::Content(_)), "{err}");
    }

    #[test]
    fn load_reports_absent_readme_as_none() {
        let temp = tempdir().unwrap();
        make_dirs(temp.path(), &["0", "1"]);
        fs::write(temp.path().join("1").join(README_FILE), "# One\n").unwrap();

        let missing = load_lesson_directory(temp.path(), "0", 0).unwrap();
        assert!(missing.readme.is_none());

        let present = load_lesson_directory(temp.path(), "1", 1).unwrap();
        assert_eq!(present.readme.as_deref(), Some("# One\n"));
        assert_eq!(present.index, 1);
        assert!(!present.readme_lossy);
    }

    #[test]
    fn invalid_utf8_readme_is_decoded_lossily() {
        let temp = tempdir().unwrap();
        make_dirs(temp.path(), &["0"]);
        fs::write(temp.path().join("0").join(README_FILE), b"# Caf\xe9\n").unwrap();

        let dir = load_lesson_directory(temp.path(), "0", 0).unwrap();
        assert_eq!(dir.readme.as_deref(), Some("# Caf\u{FFFD}\n"));
        assert!(dir.readme_lossy);
    }
}
