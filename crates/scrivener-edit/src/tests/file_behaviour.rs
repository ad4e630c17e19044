//! Behavioural tests for the file tools.

use std::cell::RefCell;
use std::fs;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use super::support::{CLOCK, Workspace};
use crate::error::{EditError, ErrorClass};
use crate::files::{FileTools, FindInFilesRequest, WriteFileRequest};
use crate::store::DiskStore;

/// Test world for file tool scenarios.
pub struct FilesWorld {
    workspace: Workspace,
    result: Option<Result<String, EditError>>,
}

impl FilesWorld {
    fn tools(&self) -> FileTools<'_> {
        FileTools::new(self.workspace.sandbox(), &DiskStore, &CLOCK)
    }

    fn output(&self) -> &str {
        match self.result.as_ref().expect("a file tool should have run") {
            Ok(output) => output,
            Err(error) => panic!("expected output, got {error}"),
        }
    }
}

fn text(value: &str) -> String {
    value.trim_matches('"').replace("\\n", "\n")
}

#[fixture]
fn world() -> RefCell<FilesWorld> {
    RefCell::new(FilesWorld {
        workspace: Workspace::new(),
        result: None,
    })
}

#[given("a workspace file {name} holding {content}")]
fn given_workspace_file(world: &RefCell<FilesWorld>, name: String, content: String) {
    world.borrow().workspace.write(&text(&name), &text(&content));
}

#[when("{name} is overwritten with {content} keeping a backup")]
fn when_overwritten(world: &RefCell<FilesWorld>, name: String, content: String) {
    let mut world = world.borrow_mut();
    let request = WriteFileRequest {
        create_backup: true,
        ..WriteFileRequest::new(world.workspace.path(&text(&name)), text(&content))
    };
    let result = world.tools().write_file(&request);
    world.result = Some(result);
}

#[when("the workspace is searched for {pattern}")]
fn when_searched(world: &RefCell<FilesWorld>, pattern: String) {
    let mut world = world.borrow_mut();
    let request = FindInFilesRequest::new(world.workspace.path(""), text(&pattern));
    let result = world.tools().find_in_files(&request);
    world.result = Some(result);
}

#[then("the workspace file {name} holds {content}")]
fn then_file_holds(world: &RefCell<FilesWorld>, name: String, content: String) {
    assert_eq!(world.borrow().workspace.read(&text(&name)), text(&content));
}

#[then("the backup of {name} holds {content}")]
fn then_backup_holds(world: &RefCell<FilesWorld>, name: String, content: String) {
    let backup = world.borrow().workspace.backup_path(&text(&name));
    assert_eq!(fs::read_to_string(backup).expect("read backup"), text(&content));
}

#[then("the search output names {name}")]
fn then_output_names(world: &RefCell<FilesWorld>, name: String) {
    let world = world.borrow();
    let header = format!("{} ===", world.workspace.path(&text(&name)).display());
    assert!(world.output().contains(&header), "{}", world.output());
}

#[then("the search output does not name {name}")]
fn then_output_omits(world: &RefCell<FilesWorld>, name: String) {
    let world = world.borrow();
    let header = format!("{} ===", world.workspace.path(&text(&name)).display());
    assert!(!world.output().contains(&header), "{}", world.output());
}

#[then("the file tool is refused by policy")]
fn then_refused(world: &RefCell<FilesWorld>) {
    let world = world.borrow();
    match world.result.as_ref().expect("a file tool should have run") {
        Err(error) => assert_eq!(error.class(), ErrorClass::Policy, "{error}"),
        Ok(output) => panic!("expected a refusal, got {output}"),
    }
}

#[scenario(path = "tests/features/file_tools.feature", name = "Overwriting a file keeps a backup")]
fn overwrite_keeps_backup(world: RefCell<FilesWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/file_tools.feature",
    name = "Text search reports only matching files"
)]
fn search_reports_matches(world: RefCell<FilesWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/file_tools.feature",
    name = "Writes that leave the workspace are refused"
)]
fn writes_leaving_refused(world: RefCell<FilesWorld>) {
    drop(world);
}
