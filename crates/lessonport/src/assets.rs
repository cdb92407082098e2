use std::path::{Component, Path, PathBuf};

use serde::Serialize;

/// Bucket a lesson file is published under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Source,
    Template,
    Solution,
}

impl AssetKind {
    pub const ALL: [AssetKind; 3] = [AssetKind::Source, AssetKind::Template, AssetKind::Solution];

    /// Directory segment that selects this bucket; also the field name on the `files`
    /// entry.
    pub fn segment(self) -> &'static str {
        match self {
            AssetKind::Source => "source",
            AssetKind::Template => "template",
            AssetKind::Solution => "solution",
        }
    }

    /// Detects the bucket from the directories of a lesson-relative path. The file name
    /// itself never counts; checks run source, template, then solution.
    pub fn detect(relative: &Path) -> Option<AssetKind> {
        let mut dirs: Vec<_> = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(segment) => segment.to_str(),
                _ => None,
            })
            .collect();
        dirs.pop();

        AssetKind::ALL
            .into_iter()
            .find(|kind| dirs.contains(&kind.segment()))
    }
}

/// A lesson file assigned to a bucket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClassifiedAsset {
    pub path: PathBuf,
    /// Lesson-relative path without its first segment, joined with `/`.
    pub display_name: String,
    pub kind: AssetKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Missing,
    Unclassified,
}

/// A referenced file that did not land in any bucket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedAsset {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Lesson files split by bucket, each list in directive order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AssetBuckets {
    pub source: Vec<ClassifiedAsset>,
    pub template: Vec<ClassifiedAsset>,
    pub solution: Vec<ClassifiedAsset>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedAsset>,
}

impl AssetBuckets {
    pub fn bucket(&self, kind: AssetKind) -> &[ClassifiedAsset] {
        match kind {
            AssetKind::Source => &self.source,
            AssetKind::Template => &self.template,
            AssetKind::Solution => &self.solution,
        }
    }

    fn bucket_mut(&mut self, kind: AssetKind) -> &mut Vec<ClassifiedAsset> {
        match kind {
            AssetKind::Source => &mut self.source,
            AssetKind::Template => &mut self.template,
            AssetKind::Solution => &mut self.solution,
        }
    }

    /// Every classified asset, bucket by bucket.
    pub fn iter(&self) -> impl Iterator<Item = &ClassifiedAsset> {
        self.source
            .iter()
            .chain(self.template.iter())
            .chain(self.solution.iter())
    }

    pub fn len(&self) -> usize {
        self.source.len() + self.template.len() + self.solution.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn display_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy()),
            _ => None,
        })
        .skip(1)
        .collect::<Vec<_>>()
        .join("/")
}

/// Splits resolved lesson file paths into source, template, and solution buckets.
///
/// Paths missing on disk, or under none of the three bucket directories, are reported in
/// `skipped` and appear in no bucket.
pub fn classify(file_paths: &[PathBuf], lesson_root: &Path) -> AssetBuckets {
    let mut buckets = AssetBuckets::default();

    for path in file_paths {
        if !path.exists() {
            buckets.skipped.push(SkippedAsset {
                path: path.clone(),
                reason: SkipReason::Missing,
            });
            continue;
        }

        let relative = path.strip_prefix(lesson_root).unwrap_or(path);
        let Some(kind) = AssetKind::detect(relative) else {
            buckets.skipped.push(SkippedAsset {
                path: path.clone(),
                reason: SkipReason::Unclassified,
            });
            continue;
        };

        buckets.bucket_mut(kind).push(ClassifiedAsset {
            path: path.clone(),
            display_name: display_name(relative),
            kind,
        });
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(root: &Path, relative: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "fn main() {}\n").unwrap();
        path
    }

    #[test]
    fn buckets_by_directory_segment() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("1");
        let paths = vec![
            touch(&root, "code/source/src/main.rs"),
            touch(&root, "code/template/src/main.rs"),
            touch(&root, "code/solution/src/main.rs"),
            touch(&root, "code/source/Cargo.toml"),
        ];

        let buckets = classify(&paths, &root);
        assert_eq!(buckets.source.len(), 2);
        assert_eq!(buckets.template.len(), 1);
        assert_eq!(buckets.solution.len(), 1);
        assert_eq!(buckets.source[0].display_name, "source/src/main.rs");
        assert_eq!(buckets.source[1].display_name, "source/Cargo.toml");
        assert!(buckets.skipped.is_empty());
    }

    #[test]
    fn unmatched_and_missing_paths_land_in_no_bucket() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("2");
        let stray = touch(&root, "code/notes/readme.txt");
        let missing = root.join("code/source/gone.rs");

        let buckets = classify(&[stray.clone(), missing.clone()], &root);
        assert!(buckets.is_empty());
        assert_eq!(
            buckets.skipped,
            vec![
                SkippedAsset {
                    path: stray,
                    reason: SkipReason::Unclassified
                },
                SkippedAsset {
                    path: missing,
                    reason: SkipReason::Missing
                },
            ]
        );
    }

    #[test]
    fn a_path_is_placed_in_at_most_one_bucket() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("3");
        let path = touch(&root, "source/template/solution/lib.rs");

        let buckets = classify(&[path.clone()], &root);
        let hits = AssetKind::ALL
            .into_iter()
            .filter(|kind| buckets.bucket(*kind).iter().any(|a| a.path == path))
            .count();
        assert_eq!(hits, 1);
        assert_eq!(buckets.source.len(), 1);
    }

    #[test]
    fn file_named_like_a_bucket_is_not_classified() {
        assert_eq!(AssetKind::detect(Path::new("code/source")), None);
        assert_eq!(
            AssetKind::detect(Path::new("code/solution/x.rs")),
            Some(AssetKind::Solution)
        );
    }
}
