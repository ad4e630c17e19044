//! Translation of parsed commands into engine requests.

use std::io::Read;

use scrivener_edit::{
    BatchEditRequest, CreateDirectoryRequest, DeleteFileRequest, EditBlockRequest, EditEngine,
    EditFileRequest, EditOperation, FileInfoRequest, FileTools, FindInFilesRequest,
    InsertTextRequest, ListDirectoryRequest, ReadFileRequest, ReplaceTextRequest,
    SearchFilesRequest, TextInsertion, TransferRequest, WriteFileRequest,
};

use crate::cli::{
    BatchArgs, Command, CreateDirectoryArgs, DeleteFileArgs, EditArgs, EditBlockArgs,
    FileInfoArgs, FindInFilesArgs, InsertArgs, ListDirectoryArgs, ReadFileArgs, ReplaceArgs,
    SearchFilesArgs, TransferArgs, WriteFileArgs,
};
use crate::errors::AppError;
use crate::input::{read_json, read_stdin};

/// Text to print and whether the command fully succeeded.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct CommandOutcome {
    pub(crate) message: String,
    pub(crate) success: bool,
}

impl CommandOutcome {
    fn success(message: String) -> Self {
        Self {
            message,
            success: true,
        }
    }
}

/// Services a command may run against.
pub(crate) struct Toolkit<'a> {
    pub(crate) engine: EditEngine<'a>,
    pub(crate) files: FileTools<'a>,
}

pub(crate) fn execute<R: Read>(
    command: Command,
    toolkit: &Toolkit<'_>,
    stdin: &mut R,
) -> Result<CommandOutcome, AppError> {
    let engine = &toolkit.engine;
    let files = &toolkit.files;
    match command {
        Command::Edit(args) => edit(args, engine, stdin),
        Command::EditBlock(args) => edit_block(args, engine),
        Command::Batch(args) => batch(args, engine, stdin),
        Command::Insert(args) => insert(args, engine, stdin),
        Command::Replace(args) => replace(args, engine),
        Command::ReadFile(args) => read_file(args, files),
        Command::WriteFile(args) => write_file(args, files, stdin),
        Command::CreateDirectory(args) => create_directory(args, files),
        Command::ListDirectory(args) => list_directory(args, files),
        Command::SearchFiles(args) => search_files(args, files),
        Command::FileInfo(args) => file_info(args, files),
        Command::CopyFile(args) => Ok(CommandOutcome::success(files.copy_file(&transfer(args))?)),
        Command::MoveFile(args) => Ok(CommandOutcome::success(files.move_file(&transfer(args))?)),
        Command::DeleteFile(args) => delete_file(args, files),
        Command::FindInFiles(args) => find_in_files(args, files),
    }
}

fn edit<R: Read>(
    args: EditArgs,
    engine: &EditEngine<'_>,
    stdin: &mut R,
) -> Result<CommandOutcome, AppError> {
    let operations: Vec<EditOperation> = read_json(&args.operations, stdin)?;
    let request = EditFileRequest {
        create_backup: !args.backup.no_backup,
        validate_operations: !args.skip_validation,
        show_preview: args.preview,
        atomic: !args.non_atomic,
        ..EditFileRequest::new(args.path, operations)
    };
    Ok(CommandOutcome::success(engine.edit_file(&request)?))
}

fn edit_block(args: EditBlockArgs, engine: &EditEngine<'_>) -> Result<CommandOutcome, AppError> {
    let request = EditBlockRequest {
        show_diff: !args.no_diff,
        create_backup: !args.backup.no_backup,
        ..EditBlockRequest::new(args.path, args.start_line, args.end_line, args.replacement)
    };
    Ok(CommandOutcome::success(engine.edit_block(&request)?))
}

fn batch<R: Read>(
    args: BatchArgs,
    engine: &EditEngine<'_>,
    stdin: &mut R,
) -> Result<CommandOutcome, AppError> {
    let mut request: BatchEditRequest = read_json(&args.request, stdin)?;
    if args.non_atomic {
        request.atomic = false;
    }
    if args.dry_run {
        request.dry_run = true;
    }
    if args.continue_on_error {
        request.continue_on_error = true;
    }
    if args.skip_validation {
        request.validate_all = false;
    }
    let report = engine.edit_multiple_files(&request)?;
    Ok(CommandOutcome {
        message: report.to_string(),
        success: report.is_success(),
    })
}

fn insert<R: Read>(
    args: InsertArgs,
    engine: &EditEngine<'_>,
    stdin: &mut R,
) -> Result<CommandOutcome, AppError> {
    let insertions: Vec<TextInsertion> = read_json(&args.insertions, stdin)?;
    let request = InsertTextRequest {
        create_backup: !args.backup.no_backup,
        adjust_line_numbers: !args.sequential_lines,
        ..InsertTextRequest::new(args.path, insertions)
    };
    Ok(CommandOutcome::success(engine.insert_text(&request)?))
}

fn replace(args: ReplaceArgs, engine: &EditEngine<'_>) -> Result<CommandOutcome, AppError> {
    let request = ReplaceTextRequest {
        regex: args.regex,
        case_sensitive: !args.ignore_case,
        whole_word: args.whole_word,
        max_replacements: args.max_replacements,
        create_backup: !args.backup.no_backup,
        ..ReplaceTextRequest::new(args.path, args.find, args.replace)
    };
    Ok(CommandOutcome::success(engine.replace_text(&request)?))
}

fn read_file(args: ReadFileArgs, files: &FileTools<'_>) -> Result<CommandOutcome, AppError> {
    let request = ReadFileRequest {
        offset: args.offset,
        length: args.length,
        show_line_numbers: args.line_numbers,
        ..ReadFileRequest::new(args.path)
    };
    Ok(CommandOutcome::success(files.read_file(&request)?))
}

fn write_file<R: Read>(
    args: WriteFileArgs,
    files: &FileTools<'_>,
    stdin: &mut R,
) -> Result<CommandOutcome, AppError> {
    let content = match args.content {
        Some(content) => content,
        None => read_stdin(stdin)?,
    };
    let request = WriteFileRequest {
        append: args.append,
        create_backup: args.backup,
        ..WriteFileRequest::new(args.path, content)
    };
    Ok(CommandOutcome::success(files.write_file(&request)?))
}

fn create_directory(
    args: CreateDirectoryArgs,
    files: &FileTools<'_>,
) -> Result<CommandOutcome, AppError> {
    let request = CreateDirectoryRequest {
        create_parents: !args.no_parents,
        permissions: args.permissions,
        ..CreateDirectoryRequest::new(args.path)
    };
    Ok(CommandOutcome::success(files.create_directory(&request)?))
}

fn list_directory(
    args: ListDirectoryArgs,
    files: &FileTools<'_>,
) -> Result<CommandOutcome, AppError> {
    let request = ListDirectoryRequest {
        include_hidden: args.all,
        recursive: args.recursive,
        ..ListDirectoryRequest::new(args.path)
    };
    Ok(CommandOutcome::success(files.list_directory(&request)?))
}

fn search_files(args: SearchFilesArgs, files: &FileTools<'_>) -> Result<CommandOutcome, AppError> {
    let request = SearchFilesRequest {
        case_sensitive: args.case_sensitive,
        include_directories: args.include_directories,
        max_depth: args.max_depth,
        ..SearchFilesRequest::new(args.directory, args.pattern)
    };
    Ok(CommandOutcome::success(files.search_files(&request)?))
}

fn file_info(args: FileInfoArgs, files: &FileTools<'_>) -> Result<CommandOutcome, AppError> {
    let request = FileInfoRequest::new(args.path);
    Ok(CommandOutcome::success(files.get_file_info(&request)?))
}

fn transfer(args: TransferArgs) -> TransferRequest {
    TransferRequest {
        overwrite: args.overwrite,
        ..TransferRequest::new(args.source, args.destination)
    }
}

fn delete_file(args: DeleteFileArgs, files: &FileTools<'_>) -> Result<CommandOutcome, AppError> {
    let request = DeleteFileRequest {
        recursive: args.recursive,
        create_backup: args.backup,
        ..DeleteFileRequest::new(args.path)
    };
    Ok(CommandOutcome::success(files.delete_file(&request)?))
}

fn find_in_files(args: FindInFilesArgs, files: &FileTools<'_>) -> Result<CommandOutcome, AppError> {
    let request = FindInFilesRequest {
        file_pattern: args.files,
        case_sensitive: args.case_sensitive,
        context_lines: args.context,
        ..FindInFilesRequest::new(args.directory, args.pattern)
    };
    Ok(CommandOutcome::success(files.find_in_files(&request)?))
}
