//! Tests for the file tools.

use std::fs;

use rstest::{fixture, rstest};

use super::*;
use crate::error::ErrorClass;
use crate::store::DiskStore;
use crate::tests::support::{CLOCK, Workspace};

#[fixture]
fn workspace() -> Workspace {
    Workspace::new()
}

fn tools(workspace: &Workspace) -> FileTools<'_> {
    FileTools::new(workspace.sandbox(), &DiskStore, &CLOCK)
}

fn make_dir(workspace: &Workspace, name: &str) {
    fs::create_dir_all(workspace.path(name)).expect("create fixture dir");
}

#[rstest]
fn reads_a_numbered_window(workspace: Workspace) {
    let path = workspace.write("notes.txt", "a\nb\nc\nd");
    let request = ReadFileRequest {
        offset: 2,
        length: 2,
        show_line_numbers: true,
        ..ReadFileRequest::new(path)
    };

    let text = tools(&workspace).read_file(&request).expect("read succeeds");

    assert_eq!(text, "2: b\n3: c");
}

#[rstest]
fn reads_stop_at_the_line_limit(workspace: Workspace) {
    let path = workspace.write("long.txt", "1\n2\n3\n4");
    let request = ReadFileRequest {
        show_line_numbers: true,
        ..ReadFileRequest::new(path)
    };

    let text = tools(&workspace)
        .with_read_line_limit(2)
        .read_file(&request)
        .expect("read succeeds");

    assert_eq!(text, format!("1: 1\n2: 2\n{TRUNCATION_NOTICE}"));
}

#[rstest]
#[case::past_the_end(9, 0)]
#[case::huge_window(usize::MAX, usize::MAX)]
fn windows_beyond_the_file_are_empty(
    workspace: Workspace,
    #[case] offset: usize,
    #[case] length: usize,
) {
    let path = workspace.write("short.txt", "only");
    let request = ReadFileRequest {
        offset,
        length,
        ..ReadFileRequest::new(path)
    };

    let text = tools(&workspace).read_file(&request).expect("read succeeds");

    assert_eq!(text, "");
}

#[rstest]
fn reads_outside_the_sandbox_are_refused(workspace: Workspace) {
    let path = workspace.write_outside("secret.txt", "hidden");

    let error = tools(&workspace)
        .read_file(&ReadFileRequest::new(path))
        .expect_err("read should be refused");

    assert_eq!(error.class(), ErrorClass::Policy);
}

#[rstest]
fn writes_create_missing_parents(workspace: Workspace) {
    let path = workspace.path("drafts/2024/new.txt");

    let message = tools(&workspace)
        .write_file(&WriteFileRequest::new(&path, "fresh"))
        .expect("write succeeds");

    assert_eq!(message, format!("Content successfully written to {}", path.display()));
    assert_eq!(workspace.read("drafts/2024/new.txt"), "fresh");
}

#[rstest]
fn overwrites_keep_a_backup_when_asked(workspace: Workspace) {
    let path = workspace.write("notes.txt", "old");
    let request = WriteFileRequest {
        create_backup: true,
        ..WriteFileRequest::new(&path, "new")
    };

    tools(&workspace).write_file(&request).expect("write succeeds");

    assert_eq!(workspace.read("notes.txt"), "new");
    let backup = fs::read_to_string(workspace.backup_path("notes.txt")).expect("read backup");
    assert_eq!(backup, "old");
}

#[rstest]
fn appends_extend_the_file(workspace: Workspace) {
    let path = workspace.write("log.txt", "first\n");
    let request = WriteFileRequest {
        append: true,
        ..WriteFileRequest::new(&path, "second\n")
    };

    let message = tools(&workspace).write_file(&request).expect("append succeeds");

    assert!(message.starts_with("Content successfully appended to"), "{message}");
    assert_eq!(workspace.read("log.txt"), "first\nsecond\n");
    assert!(workspace.backups().is_empty());
}

#[rstest]
#[case::outside_root("outside")]
#[case::climbing_out("work/ghost/../../outside")]
fn writes_outside_the_sandbox_create_nothing(workspace: Workspace, #[case] directory: &str) {
    let target = workspace
        .path("..")
        .join(directory)
        .join("planted.txt");

    let error = tools(&workspace)
        .write_file(&WriteFileRequest::new(&target, "x"))
        .expect_err("write should be refused");

    assert!(matches!(error, EditError::PathNotAllowed { .. }), "{error}");
    assert!(!workspace.outside_path("planted.txt").exists());
}

#[rstest]
fn directories_are_created_with_parents(workspace: Workspace) {
    let path = workspace.path("a/b/c");

    let message = tools(&workspace)
        .create_directory(&CreateDirectoryRequest::new(&path))
        .expect("mkdir succeeds");

    assert_eq!(message, format!("Directory created: {}", path.display()));
    assert!(path.is_dir());
}

#[rstest]
fn directories_without_parents_need_their_parent(workspace: Workspace) {
    let request = CreateDirectoryRequest {
        create_parents: false,
        ..CreateDirectoryRequest::new(workspace.path("missing/child"))
    };

    let error = tools(&workspace)
        .create_directory(&request)
        .expect_err("parent is missing");

    assert!(matches!(error, EditError::FileOperationFailed { .. }), "{error}");
}

#[rstest]
#[case("rwx")]
#[case("0999")]
#[case("17777")]
fn permissions_must_be_octal(workspace: Workspace, #[case] permissions: &str) {
    let request = CreateDirectoryRequest {
        permissions: permissions.to_owned(),
        ..CreateDirectoryRequest::new(workspace.path("locked"))
    };

    let error = tools(&workspace)
        .create_directory(&request)
        .expect_err("permissions are invalid");

    assert!(matches!(error, EditError::InvalidPermissions { .. }), "{error}");
    assert!(!workspace.path("locked").exists());
}

#[cfg(unix)]
#[rstest]
fn directory_permissions_are_applied(workspace: Workspace) {
    use std::os::unix::fs::PermissionsExt;

    let request = CreateDirectoryRequest {
        permissions: String::from("0700"),
        ..CreateDirectoryRequest::new(workspace.path("private"))
    };
    tools(&workspace).create_directory(&request).expect("mkdir succeeds");

    let mode = fs::metadata(workspace.path("private"))
        .expect("metadata")
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o700);
}

#[rstest]
fn listings_hide_dot_files_and_sort_by_name(workspace: Workspace) {
    workspace.write("b.txt", "bb");
    workspace.write("a.txt", "a");
    workspace.write(".secret", "s");
    make_dir(&workspace, "docs");

    let listing = tools(&workspace)
        .list_directory(&ListDirectoryRequest::new(workspace.path("")))
        .expect("listing succeeds");

    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines.len(), 3, "{listing}");
    assert!(lines[0].ends_with(" a.txt") && lines[0].contains(" 1 B "), "{listing}");
    assert!(lines[1].ends_with(" b.txt") && lines[1].contains(" 2 B "), "{listing}");
    assert!(lines[2].ends_with(" docs") && lines[2].contains("<DIR>"), "{listing}");
}

#[rstest]
fn recursive_listings_use_relative_names(workspace: Workspace) {
    make_dir(&workspace, "docs/guide");
    make_dir(&workspace, ".cache");
    workspace.write("docs/guide/intro.md", "hi");
    workspace.write(".cache/blob", "x");

    let request = ListDirectoryRequest {
        recursive: true,
        ..ListDirectoryRequest::new(workspace.path("docs"))
    };
    let listing = tools(&workspace)
        .list_directory(&request)
        .expect("listing succeeds");

    let names: Vec<&str> = listing
        .lines()
        .filter_map(|line| line.rsplit(' ').next())
        .collect();
    assert_eq!(names, vec!["docs", "guide", "guide/intro.md"]);
}

#[rstest]
fn recursive_listings_skip_hidden_directories(workspace: Workspace) {
    make_dir(&workspace, ".cache");
    workspace.write(".cache/blob", "x");
    workspace.write("kept.txt", "k");

    let request = ListDirectoryRequest {
        recursive: true,
        ..ListDirectoryRequest::new(workspace.path(""))
    };
    let listing = tools(&workspace)
        .list_directory(&request)
        .expect("listing succeeds");

    assert!(!listing.contains("blob"), "{listing}");
    assert!(listing.contains("kept.txt"), "{listing}");
}

#[rstest]
fn listing_a_file_fails(workspace: Workspace) {
    let path = workspace.write("plain.txt", "x");

    let error = tools(&workspace)
        .list_directory(&ListDirectoryRequest::new(path))
        .expect_err("not a directory");

    assert_eq!(error.class(), ErrorClass::Io);
}

#[rstest]
fn searches_match_globs_and_substrings(workspace: Workspace) {
    make_dir(&workspace, "deep");
    workspace.write("README.md", "");
    workspace.write("notes.txt", "");
    workspace.write("deep/report.md", "");
    let directory = workspace.path("");

    let found = tools(&workspace)
        .search_files(&SearchFilesRequest::new(&directory, "*.md"))
        .expect("search succeeds");

    let expected = [directory.join("README.md"), directory.join("deep/report.md")]
        .map(|path| path.display().to_string())
        .join("\n");
    assert_eq!(found, expected);
}

#[rstest]
fn searches_respect_depth_and_directory_flags(workspace: Workspace) {
    make_dir(&workspace, "notes");
    workspace.write("notes/nested-notes.txt", "");
    workspace.write("notes.txt", "");
    let directory = workspace.path("");
    let request = SearchFilesRequest {
        include_directories: true,
        max_depth: 0,
        ..SearchFilesRequest::new(&directory, "NOTES")
    };

    let found = tools(&workspace).search_files(&request).expect("search succeeds");

    let expected = [directory.join("notes"), directory.join("notes.txt")]
        .map(|path| path.display().to_string())
        .join("\n");
    assert_eq!(found, expected);
}

#[rstest]
fn text_searches_show_context(workspace: Workspace) {
    make_dir(&workspace, "src");
    workspace.write("src/lib.rs", "fn one() {}\nfn two() {}\nfn three() {}");
    workspace.write("src/logo.png", "fn two");
    let directory = workspace.path("src");
    let request = FindInFilesRequest {
        context_lines: 1,
        ..FindInFilesRequest::new(&directory, "TWO")
    };

    let found = tools(&workspace).find_in_files(&request).expect("search succeeds");

    let header = format!("=== {} ===", directory.join("lib.rs").display());
    assert_eq!(
        found,
        format!("{header}\nContext for line 2:\nfn one() {{}}\nfn two() {{}}\nfn three() {{}}\n\n")
    );
}

#[rstest]
fn text_searches_filter_by_file_pattern(workspace: Workspace) {
    workspace.write("a.md", "needle");
    workspace.write("b.txt", "needle");
    let request = FindInFilesRequest {
        file_pattern: String::from("*.txt"),
        case_sensitive: true,
        ..FindInFilesRequest::new(workspace.path(""), "needle")
    };

    let found = tools(&workspace).find_in_files(&request).expect("search succeeds");

    assert!(found.contains("b.txt"), "{found}");
    assert!(!found.contains("a.md"), "{found}");
}

#[rstest]
fn text_searches_report_when_nothing_matches(workspace: Workspace) {
    workspace.write("a.txt", "hay");

    let found = tools(&workspace)
        .find_in_files(&FindInFilesRequest::new(workspace.path(""), "needle"))
        .expect("search succeeds");

    assert_eq!(found, NO_MATCHES);
}

#[rstest]
fn text_searches_reject_bad_input(workspace: Workspace) {
    let tools = tools(&workspace);
    let empty = FindInFilesRequest::new(workspace.path(""), "");
    let bad_glob = FindInFilesRequest {
        file_pattern: String::from("[unterminated"),
        ..FindInFilesRequest::new(workspace.path(""), "x")
    };

    assert!(matches!(tools.find_in_files(&empty), Err(EditError::EmptyPattern)));
    assert!(matches!(
        tools.find_in_files(&bad_glob),
        Err(EditError::InvalidGlob { .. })
    ));
}

#[rstest]
fn searches_outside_the_sandbox_are_refused(workspace: Workspace) {
    workspace.write_outside("secret.txt", "needle");

    let error = tools(&workspace)
        .find_in_files(&FindInFilesRequest::new(workspace.outside_path(""), "needle"))
        .expect_err("directory is outside");

    assert_eq!(error.class(), ErrorClass::Policy);
}

#[rstest]
fn file_info_describes_files(workspace: Workspace) {
    let path = workspace.write("abc.txt", "abc");

    let info = tools(&workspace)
        .get_file_info(&FileInfoRequest::new(path))
        .expect("info succeeds");

    let lines: Vec<&str> = info.lines().collect();
    assert_eq!(lines[0], "Name: abc.txt");
    assert_eq!(lines[1], "Size: 3 B (3 bytes)");
    assert!(lines[2].starts_with("Mode: -"), "{info}");
    assert!(lines[3].starts_with("Modified: "), "{info}");
    assert_eq!(lines[4], "Is Directory: false");
    assert_eq!(lines[5], "Is Text File: true");
    assert_eq!(lines.len(), 6);
}

#[rstest]
fn file_info_for_directories_stops_at_the_kind(workspace: Workspace) {
    make_dir(&workspace, "docs");

    let info = tools(&workspace)
        .get_file_info(&FileInfoRequest::new(workspace.path("docs")))
        .expect("info succeeds");

    assert!(info.ends_with("Is Directory: true"), "{info}");
}

#[rstest]
fn copies_refuse_to_overwrite_by_default(workspace: Workspace) {
    let source = workspace.write("from.txt", "new");
    let destination = workspace.write("to.txt", "old");
    let tools = tools(&workspace);

    let error = tools
        .copy_file(&TransferRequest::new(&source, &destination))
        .expect_err("destination exists");
    assert!(matches!(error, EditError::DestinationExists { .. }), "{error}");
    assert_eq!(workspace.read("to.txt"), "old");

    let request = TransferRequest {
        overwrite: true,
        ..TransferRequest::new(&source, &destination)
    };
    let message = tools.copy_file(&request).expect("overwrite succeeds");
    assert_eq!(
        message,
        format!("File copied from {} to {}", source.display(), destination.display())
    );
    assert_eq!(workspace.read("to.txt"), "new");
    assert_eq!(workspace.read("from.txt"), "new");
}

#[rstest]
fn copies_out_of_the_sandbox_are_refused(workspace: Workspace) {
    let source = workspace.write("from.txt", "data");

    let error = tools(&workspace)
        .copy_file(&TransferRequest::new(&source, workspace.outside_path("stolen.txt")))
        .expect_err("destination is outside");

    assert_eq!(error.class(), ErrorClass::Policy);
    assert!(!workspace.outside_path("stolen.txt").exists());
}

#[rstest]
fn moves_relocate_files_into_new_directories(workspace: Workspace) {
    let source = workspace.write("draft.txt", "body");
    let destination = workspace.path("archive/draft.txt");

    tools(&workspace)
        .move_file(&TransferRequest::new(&source, &destination))
        .expect("move succeeds");

    assert!(!source.exists());
    assert_eq!(workspace.read("archive/draft.txt"), "body");
}

#[rstest]
fn deletes_can_back_up_files(workspace: Workspace) {
    let path = workspace.write("old.txt", "keep me");
    let request = DeleteFileRequest {
        create_backup: true,
        ..DeleteFileRequest::new(&path)
    };

    let message = tools(&workspace).delete_file(&request).expect("delete succeeds");

    assert_eq!(message, format!("Deleted: {}", path.display()));
    assert!(!path.exists());
    let backup = fs::read_to_string(workspace.backup_path("old.txt")).expect("read backup");
    assert_eq!(backup, "keep me");
}

#[rstest]
fn non_empty_directories_need_recursive_deletes(workspace: Workspace) {
    make_dir(&workspace, "full");
    workspace.write("full/item.txt", "x");
    let tools = tools(&workspace);

    let error = tools
        .delete_file(&DeleteFileRequest::new(workspace.path("full")))
        .expect_err("directory is not empty");
    assert!(matches!(error, EditError::FileOperationFailed { .. }), "{error}");

    let request = DeleteFileRequest {
        recursive: true,
        ..DeleteFileRequest::new(workspace.path("full"))
    };
    tools.delete_file(&request).expect("recursive delete succeeds");
    assert!(!workspace.path("full").exists());
}

#[rstest]
fn allowed_roots_cannot_be_removed(workspace: Workspace) {
    let root = workspace.path("");
    let tools = tools(&workspace);
    let delete = DeleteFileRequest {
        recursive: true,
        ..DeleteFileRequest::new(&root)
    };

    let deleted = tools.delete_file(&delete).expect_err("root is protected");
    let moved = tools
        .move_file(&TransferRequest::new(&root, workspace.path("elsewhere")))
        .expect_err("root is protected");

    assert!(matches!(deleted, EditError::RootProtected { .. }), "{deleted}");
    assert!(matches!(moved, EditError::RootProtected { .. }), "{moved}");
    assert!(root.is_dir());
}
