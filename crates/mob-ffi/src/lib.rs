//! C FFI bindings for mob-core
//!
//! This crate provides a C-compatible API over the editor session so a native
//! grid UI can open, display, edit and save mob_proto tables.
//!
//! Functions returning `c_int` use 0 for success and -1 for failure; the
//! failure message is available from `mob_editor_last_error`.

use mob_core::{Editor, MassEditSpec, RowSelection};
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::path::PathBuf;
use std::ptr;
use std::slice;

/// Opaque handle to an editor session
pub struct MobEditor {
    inner: Editor,
    last_error: Option<CString>,
}

impl MobEditor {
    fn fail(&mut self, message: impl ToString) -> c_int {
        let message = message.to_string();
        tracing::debug!(error = %message, "ffi call failed");
        self.last_error = CString::new(message.replace('\0', " ")).ok();
        -1
    }
}

/// Borrow a C string as UTF-8, `None` for null or invalid text
unsafe fn str_arg<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        None
    } else {
        CStr::from_ptr(s).to_str().ok()
    }
}

fn into_c_string(s: &str) -> *mut c_char {
    CString::new(s)
        .map(|s| s.into_raw())
        .unwrap_or(ptr::null_mut())
}

/// Create an editor session
///
/// # Safety
/// - `names_path` must be a valid C string or null
/// - When null, `mob_names.txt` beside the first opened file is used
/// - Free the handle with `mob_editor_free`
#[no_mangle]
pub unsafe extern "C" fn mob_editor_new(names_path: *const c_char) -> *mut MobEditor {
    let inner = match str_arg(names_path) {
        Some(path) => Editor::with_names_file(PathBuf::from(path)),
        None => Editor::new(),
    };
    Box::into_raw(Box::new(MobEditor {
        inner,
        last_error: None,
    }))
}

/// Free an editor session
///
/// # Safety
/// - `editor` must be a valid pointer returned by `mob_editor_new` or null
#[no_mangle]
pub unsafe extern "C" fn mob_editor_free(editor: *mut MobEditor) {
    if !editor.is_null() {
        drop(Box::from_raw(editor));
    }
}

/// Open a mob_proto file, replacing the loaded table
///
/// # Safety
/// - `editor` must be a valid pointer returned by `mob_editor_new`
/// - `path` must be a valid C string
#[no_mangle]
pub unsafe extern "C" fn mob_editor_open(editor: *mut MobEditor, path: *const c_char) -> c_int {
    let Some(editor) = editor.as_mut() else {
        return -1;
    };
    let Some(path) = str_arg(path) else {
        return editor.fail("invalid path");
    };

    match editor.inner.open(path) {
        Ok(_) => 0,
        Err(e) => editor.fail(e),
    }
}

/// Save the table, backing up the existing file first
///
/// # Safety
/// - `editor` must be a valid pointer returned by `mob_editor_new`
/// - `path` must be a valid C string, or null to save to the opened file
#[no_mangle]
pub unsafe extern "C" fn mob_editor_save(editor: *mut MobEditor, path: *const c_char) -> c_int {
    let Some(editor) = editor.as_mut() else {
        return -1;
    };

    let result = if path.is_null() {
        editor.inner.save()
    } else {
        match str_arg(path) {
            Some(path) => editor.inner.save_as(path),
            None => return editor.fail("invalid path"),
        }
    };

    match result {
        Ok(_) => 0,
        Err(e) => editor.fail(e),
    }
}

/// Repair the names file and refresh display names
///
/// Returns the number of repaired lines, or -1 on error.
///
/// # Safety
/// - `editor` must be a valid pointer returned by `mob_editor_new`
#[no_mangle]
pub unsafe extern "C" fn mob_editor_fix_names(editor: *mut MobEditor) -> i64 {
    let Some(editor) = editor.as_mut() else {
        return -1;
    };

    match editor.inner.fix_names() {
        Ok(report) => report.lines_changed as i64,
        Err(e) => i64::from(editor.fail(e)),
    }
}

/// Get the row count of the loaded table
///
/// # Safety
/// - `editor` must be a valid pointer returned by `mob_editor_new`
#[no_mangle]
pub unsafe extern "C" fn mob_editor_row_count(editor: *const MobEditor) -> usize {
    editor
        .as_ref()
        .and_then(|e| e.inner.table())
        .map_or(0, |t| t.row_count())
}

/// Get the column count of the loaded table
///
/// # Safety
/// - `editor` must be a valid pointer returned by `mob_editor_new`
#[no_mangle]
pub unsafe extern "C" fn mob_editor_col_count(editor: *const MobEditor) -> usize {
    editor
        .as_ref()
        .and_then(|e| e.inner.table())
        .map_or(0, |t| t.column_count())
}

/// Get a column name by index
///
/// # Safety
/// - `editor` must be a valid pointer returned by `mob_editor_new`
/// - Returns null if index is out of bounds
/// - Caller must free the returned string with `mob_free_string`
#[no_mangle]
pub unsafe extern "C" fn mob_editor_col_name(editor: *const MobEditor, index: usize) -> *mut c_char {
    editor
        .as_ref()
        .and_then(|e| e.inner.table())
        .and_then(|t| t.columns.get(index))
        .map_or(ptr::null_mut(), |c| into_c_string(&c.name))
}

/// Get the displayed value of a cell
///
/// # Safety
/// - `editor` must be a valid pointer returned by `mob_editor_new`
/// - Returns null if row or col is out of bounds
/// - Caller must free the returned string with `mob_free_string`
#[no_mangle]
pub unsafe extern "C" fn mob_editor_cell(
    editor: *const MobEditor,
    row: usize,
    col: usize,
) -> *mut c_char {
    editor
        .as_ref()
        .and_then(|e| e.inner.display_cell(row, col))
        .map_or(ptr::null_mut(), into_c_string)
}

/// Overwrite a cell with text typed into the grid
///
/// # Safety
/// - `editor` must be a valid pointer returned by `mob_editor_new`
/// - `value` must be a valid C string
#[no_mangle]
pub unsafe extern "C" fn mob_editor_set_cell(
    editor: *mut MobEditor,
    row: usize,
    col: usize,
    value: *const c_char,
) -> c_int {
    let Some(editor) = editor.as_mut() else {
        return -1;
    };
    let Some(value) = str_arg(value) else {
        return editor.fail("invalid value");
    };

    match editor.inner.set_cell(row, col, value) {
        Ok(()) => 0,
        Err(e) => editor.fail(e),
    }
}

/// Apply one mass edit to the selected rows
///
/// Returns the number of cells changed (0 means nothing was applied), or -1
/// on error.
///
/// # Safety
/// - `editor` must be a valid pointer returned by `mob_editor_new`
/// - `column`, `operation` and `operand` must be valid C strings
/// - `rows` must point to `row_count` indices, or be null to edit every row
#[no_mangle]
pub unsafe extern "C" fn mob_editor_mass_edit(
    editor: *mut MobEditor,
    column: *const c_char,
    operation: *const c_char,
    operand: *const c_char,
    rows: *const usize,
    row_count: usize,
) -> i64 {
    let Some(editor) = editor.as_mut() else {
        return -1;
    };
    let (Some(column), Some(operation), Some(operand)) =
        (str_arg(column), str_arg(operation), str_arg(operand))
    else {
        return i64::from(editor.fail("invalid mass edit arguments"));
    };

    let selection = if rows.is_null() || row_count == 0 {
        RowSelection::All
    } else {
        RowSelection::from_rows(slice::from_raw_parts(rows, row_count).iter().copied())
    };

    let spec = MassEditSpec::new(column, operation, operand);
    match editor.inner.mass_edit(&[spec], &selection) {
        Ok(summary) => summary.applied() as i64,
        Err(e) => i64::from(editor.fail(e)),
    }
}

/// Get the message of the last failed call
///
/// # Safety
/// - `editor` must be a valid pointer returned by `mob_editor_new`
/// - Returns null if no call has failed
/// - Caller must free the returned string with `mob_free_string`
#[no_mangle]
pub unsafe extern "C" fn mob_editor_last_error(editor: *const MobEditor) -> *mut c_char {
    editor
        .as_ref()
        .and_then(|e| e.last_error.clone())
        .map_or(ptr::null_mut(), CString::into_raw)
}

/// Free a string returned by other FFI functions
///
/// # Safety
/// - `s` must be a valid pointer returned by a mob_* function or null
#[no_mangle]
pub unsafe extern "C" fn mob_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
