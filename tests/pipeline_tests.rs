//! End-to-end runs of `sort_dir` over a temporary base directory.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use unnest::engine::{hash_bytes, hash_file};
use unnest::extraction::{ExtractorTable, SevenZipExtractor};
use unnest::{ContentHash, Opts, sort_dir, sort_dir_with};

struct Fixture {
    _tmp: tempfile::TempDir,
    base: PathBuf,
    work: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().canonicalize().unwrap();
        let work = base.join("worker");
        fs::create_dir_all(&work).unwrap();
        Fixture {
            _tmp: tmp,
            base,
            work,
        }
    }

    /// Single file task at a time, so duplicate detection order is deterministic.
    fn opts(&self) -> Opts {
        Opts {
            base_dir: self.base.clone(),
            jobs: Some(1),
            ..Default::default()
        }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.base.join(rel)
    }
}

fn write_file(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(bytes).unwrap();
}

fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::FileOptions::default();
    for (name, data) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn doc_path(f: &Fixture, hash: &ContentHash, ext: &str) -> PathBuf {
    f.path("doc").join(hash.shard()).join(hash.file_name(ext))
}

fn dir_is_empty(dir: &Path) -> bool {
    fs::read_dir(dir).unwrap().next().is_none()
}

#[test]
fn test_zip_is_extracted_archived_and_contents_routed() {
    let f = Fixture::new();
    let archive = f.work.join("a.zip");
    write_file(&archive, &zip_bytes(&[("b.txt", b"document body")]));
    let h1 = hash_file(&archive).unwrap();
    let h2 = hash_bytes(b"document body");

    let summary = sort_dir(&f.opts()).unwrap();

    assert!(f.path("rar").join(h1.file_name(".zip")).is_file());
    assert_eq!(
        fs::read(doc_path(&f, &h2, ".txt")).unwrap(),
        b"document body"
    );
    assert!(!f.path("unrar").join(h1.as_str()).exists());
    assert!(!archive.exists());
    assert!(dir_is_empty(&f.work));

    assert_eq!(summary.archives_extracted, 1);
    assert_eq!(summary.routed_documents, 1);
    assert_eq!(summary.files_seen, 2);
    assert_eq!(summary.deferred, 0);
}

#[test]
fn test_resubmitted_archive_is_deleted() {
    let f = Fixture::new();
    let bytes = zip_bytes(&[("b.txt", b"document body")]);
    write_file(&f.work.join("a.zip"), &bytes);
    sort_dir(&f.opts()).unwrap();

    let again = f.work.join("copy-of-a.zip");
    write_file(&again, &bytes);
    let summary = sort_dir(&f.opts()).unwrap();

    assert!(!again.exists());
    assert_eq!(summary.duplicates, 1);
    assert_eq!(summary.archives_extracted, 0);
    assert_eq!(summary.routed(), 0);
}

#[test]
fn test_corrupt_archive_goes_to_error_partition() {
    let f = Fixture::new();
    let archive = f.work.join("broken.zip");
    write_file(&archive, b"not really a zip");
    let h = hash_file(&archive).unwrap();

    let summary = sort_dir(&f.opts()).unwrap();

    assert!(f.path("rar_error").join(h.file_name(".zip")).is_file());
    assert!(!f.path("rar").join(h.file_name(".zip")).exists());
    assert!(!f.path("unrar").join(h.as_str()).exists());
    assert_eq!(summary.archives_failed, 1);

    // A failed archive is still recognised on resubmission.
    write_file(&archive, b"not really a zip");
    let summary = sort_dir(&f.opts()).unwrap();
    assert!(!archive.exists());
    assert_eq!(summary.duplicates, 1);
}

#[test]
fn test_nested_archives_are_unpacked_recursively() {
    let f = Fixture::new();
    let inner = zip_bytes(&[("c.xlsx", b"sheet data")]);
    let outer = zip_bytes(&[("inner.zip", &inner)]);
    write_file(&f.work.join("outer.zip"), &outer);

    let summary = sort_dir(&f.opts()).unwrap();

    let h_outer = hash_bytes(&outer);
    let h_inner = hash_bytes(&inner);
    let h_sheet = hash_bytes(b"sheet data");
    assert!(f.path("rar").join(h_outer.file_name(".zip")).is_file());
    assert!(f.path("rar").join(h_inner.file_name(".zip")).is_file());
    assert!(f.path("list").join(h_sheet.file_name(".xlsx")).is_file());
    assert!(dir_is_empty(&f.path("unrar")));
    assert_eq!(summary.archives_extracted, 2);
    assert_eq!(summary.routed_spreadsheets, 1);
}

#[test]
fn test_partial_downloads_are_left_alone() {
    let f = Fixture::new();
    let partial = f.work.join("movie.rar.downloading");
    let cfg = f.work.join("movie.rar.downloading.cfg");
    write_file(&partial, b"half");
    write_file(&cfg, b"cfg");
    write_file(&f.work.join("x.bin"), b"binary");

    let summary = sort_dir(&f.opts()).unwrap();

    assert!(partial.is_file());
    assert!(cfg.is_file());
    assert!(
        f.path("other")
            .join(hash_bytes(b"binary").file_name(".bin"))
            .is_file()
    );
    assert_eq!(summary.files_seen, 1);
    assert_eq!(summary.routed_other, 1);
}

#[test]
fn test_identical_leaves_are_stored_once() {
    let f = Fixture::new();
    write_file(&f.work.join("one.txt"), b"same text");
    write_file(&f.work.join("sub/two.TXT"), b"same text");

    let summary = sort_dir(&f.opts()).unwrap();

    let h = hash_bytes(b"same text");
    assert!(doc_path(&f, &h, ".txt").is_file());
    assert_eq!(summary.routed_documents, 1);
    assert_eq!(summary.duplicates, 1);
    assert!(dir_is_empty(&f.work));
}

#[test]
fn test_empty_dirs_removed_but_work_dir_kept() {
    let f = Fixture::new();
    write_file(&f.work.join("a/b/c/deep.pdf"), b"pdf bytes");
    fs::create_dir_all(f.work.join("empty/nested")).unwrap();

    let summary = sort_dir(&f.opts()).unwrap();

    assert!(f.work.is_dir());
    assert!(dir_is_empty(&f.work));
    assert!(summary.dirs_removed >= 5);
}

#[test]
fn test_leftovers_in_unpack_root_are_resumed() {
    let f = Fixture::new();
    write_file(&f.path("unrar/0123abcd/notes.html"), b"<p>left over</p>");
    write_file(&f.path("unrar/loose.xls"), b"loose sheet");

    let summary = sort_dir(&f.opts()).unwrap();

    assert!(doc_path(&f, &hash_bytes(b"<p>left over</p>"), ".html").is_file());
    assert!(
        f.path("list")
            .join(hash_bytes(b"loose sheet").file_name(".xls"))
            .is_file()
    );
    assert!(dir_is_empty(&f.path("unrar")));
    assert_eq!(summary.routed(), 2);
}

#[test]
fn test_extension_case_is_normalised() {
    let f = Fixture::new();
    write_file(&f.work.join("REPORT.PDF"), b"upper case pdf");

    sort_dir(&f.opts()).unwrap();

    assert!(doc_path(&f, &hash_bytes(b"upper case pdf"), ".pdf").is_file());
}

#[test]
fn test_without_extractors_archives_are_other_files() {
    let f = Fixture::new();
    let bytes = zip_bytes(&[("b.txt", b"stays packed")]);
    write_file(&f.work.join("a.zip"), &bytes);

    let summary = sort_dir_with(&f.opts(), ExtractorTable::empty()).unwrap();

    assert!(
        f.path("other")
            .join(hash_bytes(&bytes).file_name(".zip"))
            .is_file()
    );
    assert_eq!(summary.archives_extracted, 0);
    assert_eq!(summary.routed_other, 1);
}

#[test]
fn test_parallel_run_handles_many_files() {
    let f = Fixture::new();
    for i in 0..40 {
        let body = format!("document number {i}");
        write_file(&f.work.join(format!("d{}/f{i}.txt", i % 4)), body.as_bytes());
    }
    let opts = Opts {
        jobs: Some(4),
        ..f.opts()
    };

    let summary = sort_dir(&opts).unwrap();

    assert_eq!(summary.files_seen, 40);
    assert_eq!(summary.routed_documents, 40);
    assert!(dir_is_empty(&f.work));
}

#[test]
fn test_missing_work_dir_is_an_error() {
    let f = Fixture::new();
    let opts = Opts {
        work_dir: PathBuf::from("does-not-exist"),
        ..f.opts()
    };
    assert!(sort_dir(&opts).is_err());
    assert!(!f.path("rar").exists());
}

#[test]
fn test_custom_layout_names() {
    let f = Fixture::new();
    write_file(&f.work.join("a.zip"), &zip_bytes(&[("n.txt", b"named")]));
    let mut opts = f.opts();
    opts.layout.done = "archives".to_string();
    opts.layout.document = "docs".to_string();

    sort_dir(&opts).unwrap();

    assert!(dir_is_empty(&f.work));
    let h = hash_bytes(b"named");
    assert!(
        f.path("docs")
            .join(h.shard())
            .join(h.file_name(".txt"))
            .is_file()
    );
    assert_eq!(fs::read_dir(f.path("archives")).unwrap().count(), 1);
}

fn table_with_7z(extractor: SevenZipExtractor) -> ExtractorTable {
    let mut table = ExtractorTable::with_defaults();
    table.register(".7z", Arc::new(extractor));
    table
}

fn assert_left_in_place(f: &Fixture, archive: &Path) {
    assert!(archive.is_file());
    assert!(dir_is_empty(&f.path("rar")));
    assert!(dir_is_empty(&f.path("rar_error")));
    assert!(dir_is_empty(&f.path("unrar")));
}

#[test]
fn test_missing_tool_defers_archive() {
    let f = Fixture::new();
    let archive = f.work.join("a.7z");
    write_file(&archive, b"7z payload");

    let table = table_with_7z(SevenZipExtractor::with_candidates(["unnest-no-such-7z"]));
    let summary = sort_dir_with(&f.opts(), table).unwrap();

    assert_left_in_place(&f, &archive);
    assert_eq!(summary.deferred, 1);
    assert_eq!(summary.archives_failed, 0);
}

#[cfg(unix)]
#[test]
fn test_tool_that_cannot_start_defers_archive() {
    use std::os::unix::fs::PermissionsExt;

    let f = Fixture::new();
    let tool = f.path("bin/fake-7z");
    write_file(&tool, b"#!/nonexistent/interpreter\n");
    fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();
    let archive = f.work.join("a.7z");
    write_file(&archive, b"7z payload");

    let table = table_with_7z(SevenZipExtractor::with_candidates([tool
        .to_string_lossy()
        .into_owned()]));
    let summary = sort_dir_with(&f.opts(), table).unwrap();

    assert_left_in_place(&f, &archive);
    assert_eq!(summary.deferred, 1);
    assert_eq!(summary.archives_failed, 0);
}

#[test]
fn test_claimed_destination_defers_archive_until_next_run() {
    let f = Fixture::new();
    let bytes = zip_bytes(&[("b.txt", b"claimed body")]);
    let archive = f.work.join("a.zip");
    write_file(&archive, &bytes);
    let h = hash_bytes(&bytes);
    write_file(
        &f.path("unrar").join(h.as_str()).join("leftover.txt"),
        b"left by a crash",
    );

    let summary = sort_dir(&f.opts()).unwrap();

    assert_left_in_place(&f, &archive);
    assert_eq!(summary.deferred, 1);
    assert_eq!(summary.archives_failed, 0);
    assert_eq!(summary.routed_documents, 1);

    // The leftover was routed and swept, so the next run can claim the destination.
    let summary = sort_dir(&f.opts()).unwrap();
    assert!(!archive.exists());
    assert!(f.path("rar").join(h.file_name(".zip")).is_file());
    assert_eq!(summary.archives_extracted, 1);
}

#[test]
fn test_base_as_work_dir_keeps_config_and_layout() {
    let f = Fixture::new();
    let config = f.path(".unnest.toml");
    write_file(&config, b"[settings]\njobs = 1\n");
    write_file(&f.path("note.txt"), b"loose note");
    let opts = Opts {
        work_dir: PathBuf::from("."),
        ..f.opts()
    };

    let summary = sort_dir(&opts).unwrap();

    assert!(config.is_file());
    assert!(doc_path(&f, &hash_bytes(b"loose note"), ".txt").is_file());
    assert_eq!(summary.files_seen, 1);
    assert_eq!(summary.routed_other, 0);
    for root in ["unrar", "rar", "rar_error", "doc", "list", "other"] {
        assert!(f.path(root).is_dir(), "{root} removed");
    }
}
