use std::fs;
use std::path::Path;

use std::sync::atomic::{AtomicUsize, Ordering};

use lessonport::{
    ContentStore, Fields, LessonportError, MigrationOptions, RecordingStore, Resource,
    StoreCall, migrate,
};
use serde_json::{Value, json};
use tempfile::{TempDir, tempdir};

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn section_dir(root: &Path, name: &str, text: &str) {
    write(
        root,
        &format!("{name}/README.md"),
        "[filename](./section/README.md ':include')\n",
    );
    write(root, &format!("{name}/section/README.md"), text);
}

fn lesson_dir(root: &Path, name: &str, heading: &str) {
    write(
        root,
        &format!("{name}/README.md"),
        concat!(
            "[filename](./lesson/README.md ':include')\n\n",
            "[./code/source/main.rs](./code/source/main.rs ':include :type=code rust')\n",
        ),
    );
    write(
        root,
        &format!("{name}/lesson/README.md"),
        &format!("# {heading}\n\nLesson body.\n"),
    );
    write(root, &format!("{name}/code/source/main.rs"), "fn main() {}\n");
}

fn course() -> TempDir {
    let temp = tempdir().unwrap();
    let root = temp.path();
    section_dir(root, "0", "# Intro\n\nWelcome\n");
    lesson_dir(root, "1", "Variables");
    lesson_dir(root, "2", "Functions");
    section_dir(root, "3", "# Ownership\n\nBorrowing rules.\n");
    write(root, "_sidebar.md", "* [Intro](0/)\n");
    temp
}

fn ops(calls: &[StoreCall]) -> Vec<String> {
    calls
        .iter()
        .map(|call| match call {
            StoreCall::CreateEntry { content_type, .. } => format!("create_entry:{content_type}"),
            StoreCall::PublishEntry { .. } => "publish_entry".to_string(),
            StoreCall::GetEntry { .. } => "get_entry".to_string(),
            StoreCall::CreateUpload { .. } => "create_upload".to_string(),
            StoreCall::CreateAsset { .. } => "create_asset".to_string(),
            StoreCall::ProcessAsset { .. } => "process_asset".to_string(),
            StoreCall::GetAsset { .. } => "get_asset".to_string(),
            StoreCall::PublishAsset { .. } => "publish_asset".to_string(),
        })
        .collect()
}

fn created_entries<'a>(calls: &'a [StoreCall], wanted: &str) -> Vec<(&'a str, &'a Value)> {
    calls
        .iter()
        .filter_map(|call| match call {
            StoreCall::CreateEntry {
                content_type,
                id,
                fields,
            } if content_type == wanted => Some((id.as_str(), fields)),
            _ => None,
        })
        .collect()
}

#[test]
fn end_to_end_writes_lessons_before_their_section() {
    let temp = course();
    let store = RecordingStore::new();
    let report = migrate(&store, &MigrationOptions::new(temp.path())).unwrap();

    let lesson_block = [
        "create_upload",
        "create_asset",
        "process_asset",
        "get_asset",
        "publish_asset",
        "create_entry:files",
        "publish_entry",
        "create_entry:lesson",
        "publish_entry",
    ];
    let mut expected: Vec<String> = Vec::new();
    expected.extend(lesson_block.iter().map(|s| s.to_string()));
    expected.extend(lesson_block.iter().map(|s| s.to_string()));
    expected.push("create_entry:section".to_string());
    expected.push("publish_entry".to_string());

    let calls = store.calls();
    assert_eq!(ops(&calls), expected);

    let lessons = created_entries(&calls, "lesson");
    assert_eq!(lessons.len(), 2);
    assert_eq!(lessons[0].1["lessonName"]["en-US"], json!("Variables"));
    assert_eq!(lessons[1].1["lessonName"]["en-US"], json!("Functions"));

    let sections = created_entries(&calls, "section");
    assert_eq!(sections.len(), 1);
    let section = sections[0].1;
    assert_eq!(section["title"]["en-US"], json!("Intro"));
    assert_eq!(section["description"]["en-US"], json!("Welcome"));
    let linked: Vec<&str> = section["lessons"]["en-US"]
        .as_array()
        .unwrap()
        .iter()
        .map(|link| link["sys"]["id"].as_str().unwrap())
        .collect();
    assert_eq!(linked, vec![lessons[0].0, lessons[1].0]);

    assert_eq!(report.sections.len(), 1);
    assert_eq!(report.sections[0].lessons.len(), 2);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
}

#[test]
fn files_entry_links_the_published_asset() {
    let temp = course();
    let store = RecordingStore::new();
    migrate(&store, &MigrationOptions::new(temp.path())).unwrap();

    let calls = store.calls();
    let files = created_entries(&calls, "files");
    let first = files[0].1;
    assert_eq!(
        first["title"]["en-US"],
        json!(format!("{}/1", temp.path().display()))
    );
    assert_eq!(first["source"]["en-US"].as_array().unwrap().len(), 1);
    assert_eq!(first["template"]["en-US"], json!([]));
    assert_eq!(first["solution"]["en-US"], json!([]));

    let asset_fields = calls
        .iter()
        .find_map(|call| match call {
            StoreCall::CreateAsset { fields, .. } => Some(fields),
            _ => None,
        })
        .unwrap();
    assert_eq!(asset_fields["title"]["en-US"], json!("source/main.rs"));
    assert_eq!(
        asset_fields["file"]["en-US"]["contentType"],
        json!("text/plain")
    );
}

#[test]
fn trailing_lessons_are_flushed_without_a_final_marker() {
    let temp = tempdir().unwrap();
    section_dir(temp.path(), "0", "# Intro\n\nWelcome\n");
    lesson_dir(temp.path(), "1", "Only lesson");

    let store = RecordingStore::new();
    let report = migrate(&store, &MigrationOptions::new(temp.path())).unwrap();

    assert_eq!(report.sections.len(), 1);
    assert_eq!(report.sections[0].title, "Intro");
    assert_eq!(report.sections[0].lessons, vec![report.lessons[0].id.clone()]);
}

#[test]
fn lessons_before_any_section_get_fallback_title() {
    let temp = tempdir().unwrap();
    lesson_dir(temp.path(), "0", "Orphan");

    let store = RecordingStore::new();
    let report = migrate(&store, &MigrationOptions::new(temp.path())).unwrap();

    assert_eq!(report.sections.len(), 1);
    assert_eq!(report.sections[0].title, lessonport::migrate::UNTITLED_SECTION);
    assert!(
        report
            .warnings
            .iter()
            .any(|w| w.message.contains("no section marker yet"))
    );
}

#[test]
fn heading_less_section_text_gets_fallback_title() {
    let temp = tempdir().unwrap();
    section_dir(temp.path(), "0", "Just some prose.\n");
    lesson_dir(temp.path(), "1", "Variables");

    let store = RecordingStore::new();
    let report = migrate(&store, &MigrationOptions::new(temp.path())).unwrap();

    assert_eq!(report.sections.len(), 1);
    assert_eq!(report.sections[0].title, lessonport::migrate::UNTITLED_SECTION);
    assert_eq!(report.sections[0].lessons, vec![report.lessons[0].id.clone()]);
    let messages: Vec<_> = report.warnings.iter().map(|w| w.message.as_str()).collect();
    assert!(
        messages.iter().any(|m| m.contains("section text has no heading")),
        "{messages:?}"
    );
}

#[test]
fn zero_byte_files_are_never_uploaded() {
    let temp = tempdir().unwrap();
    write(
        temp.path(),
        "0/README.md",
        concat!(
            "[filename](./lesson/README.md ':include')\n",
            "[./code/source/empty.rs](./code/source/empty.rs ':include :type=code rust')\n",
            "[./code/solution/main.rs](./code/solution/main.rs ':include :type=code rust')\n",
        ),
    );
    write(temp.path(), "0/lesson/README.md", "# Empty files\n");
    write(temp.path(), "0/code/source/empty.rs", "");
    write(temp.path(), "0/code/solution/main.rs", "fn main() {}\n");

    let store = RecordingStore::new();
    let report = migrate(&store, &MigrationOptions::new(temp.path())).unwrap();

    let uploads: Vec<usize> = store
        .calls()
        .iter()
        .filter_map(|call| match call {
            StoreCall::CreateUpload { bytes, .. } => Some(*bytes),
            _ => None,
        })
        .collect();
    assert_eq!(uploads, vec!["fn main() {}\n".len()]);
    assert_eq!(report.lessons[0].assets, 1);
    assert!(
        report
            .warnings
            .iter()
            .any(|w| w.message.contains("file is empty"))
    );

    let calls = store.calls();
    let files = created_entries(&calls, "files");
    assert_eq!(files[0].1["source"]["en-US"], json!([]));
    assert_eq!(files[0].1["solution"]["en-US"].as_array().unwrap().len(), 1);
}

#[test]
fn missing_readme_uses_fallbacks_unless_strict() {
    let temp = tempdir().unwrap();
    fs::create_dir_all(temp.path().join("0")).unwrap();

    let store = RecordingStore::new();
    let report = migrate(&store, &MigrationOptions::new(temp.path())).unwrap();
    assert_eq!(report.lessons[0].name, "Lesson 0");

    let calls = store.calls();
    let lessons = created_entries(&calls, "lesson");
    assert_eq!(
        lessons[0].1["lessonContent"]["en-US"],
        json!("No content available.")
    );

    let mut strict = MigrationOptions::new(temp.path());
    strict.strict = true;
    let strict_store = RecordingStore::new();
    let err = migrate(&strict_store, &strict).unwrap_err();
    assert!(matches!(err, LessonportError::Content(_)), "{err}");
    assert!(strict_store.calls().is_empty());
}

#[test]
fn locale_option_wraps_every_field() {
    let temp = course();
    let mut options = MigrationOptions::new(temp.path());
    options.locale = "de-DE".to_string();

    let store = RecordingStore::new();
    migrate(&store, &options).unwrap();

    let calls = store.calls();
    let sections = created_entries(&calls, "section");
    assert_eq!(sections[0].1["title"]["de-DE"], json!("Intro"));
    assert!(
        calls
            .iter()
            .any(|call| matches!(call, StoreCall::ProcessAsset { locale, .. } if locale == "de-DE"))
    );
}

/// Records like `RecordingStore` but rejects the n-th `create_entry`.
struct FailingStore {
    inner: RecordingStore,
    fail_on_entry: usize,
    entries: AtomicUsize,
}

impl FailingStore {
    fn new(fail_on_entry: usize) -> Self {
        Self {
            inner: RecordingStore::new(),
            fail_on_entry,
            entries: AtomicUsize::new(0),
        }
    }
}

impl ContentStore for FailingStore {
    fn create_entry(
        &self,
        content_type: &str,
        fields: &Fields,
    ) -> Result<Resource, LessonportError> {
        let count = self.entries.fetch_add(1, Ordering::SeqCst) + 1;
        if count == self.fail_on_entry {
            return Err(LessonportError::RemoteStatus {
                status: 500,
                message: format!("rejected {content_type} entry"),
            });
        }
        self.inner.create_entry(content_type, fields)
    }

    fn publish_entry(&self, entry: &Resource) -> Result<Resource, LessonportError> {
        self.inner.publish_entry(entry)
    }

    fn get_entry(&self, id: &str) -> Result<Resource, LessonportError> {
        self.inner.get_entry(id)
    }

    fn create_upload(&self, bytes: &[u8]) -> Result<Resource, LessonportError> {
        self.inner.create_upload(bytes)
    }

    fn create_asset(&self, fields: &Fields) -> Result<Resource, LessonportError> {
        self.inner.create_asset(fields)
    }

    fn process_asset(&self, asset: &Resource, locale: &str) -> Result<(), LessonportError> {
        self.inner.process_asset(asset, locale)
    }

    fn get_asset(&self, id: &str) -> Result<Resource, LessonportError> {
        self.inner.get_asset(id)
    }

    fn publish_asset(&self, asset: &Resource) -> Result<Resource, LessonportError> {
        self.inner.publish_asset(asset)
    }
}

#[test]
fn store_failure_stops_the_run_immediately() {
    let temp = course();
    // Entry 1 is lesson 1's files entry, entry 2 its lesson entry.
    let store = FailingStore::new(2);

    let err = migrate(&store, &MigrationOptions::new(temp.path())).unwrap_err();
    assert!(
        matches!(err, LessonportError::RemoteStatus { status: 500, .. }),
        "{err}"
    );

    let calls = store.inner.calls();
    assert_eq!(
        ops(&calls),
        vec![
            "create_upload",
            "create_asset",
            "process_asset",
            "get_asset",
            "publish_asset",
            "create_entry:files",
            "publish_entry",
        ]
    );
    assert!(created_entries(&calls, "lesson").is_empty());
    assert!(created_entries(&calls, "section").is_empty());
}
