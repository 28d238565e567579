//! FFI bindings for Thermo Schedule
//!
//! C-compatible entry points for UI hosts. All functions take NUL-terminated
//! UTF-8 strings and return allocated memory that must be freed by the caller
//! using `thermo_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::codec::{parse_day, WeeklyTransport};
use crate::config::EditorConfig;
use crate::editor::ScheduleEditor;
use crate::gesture::InputEvent;
use crate::types::DayKey;
use crate::validator::Validator;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Caller must free the result
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

fn json_to_cstr<T: serde::Serialize>(value: &T) -> *mut c_char {
    match serde_json::to_string(value) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Parse a day transport string and return the canonical day as a JSON array
/// of `{id, time, temperature}` objects.
///
/// # Safety
/// - `text` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `thermo_free_string`.
/// - Returns NULL on error; call `thermo_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn thermo_parse_day(text: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(text) = cstr_to_string(text) else {
        set_last_error("Invalid schedule string pointer");
        return ptr::null_mut();
    };

    json_to_cstr(&parse_day(&text))
}

/// Validate a day transport string as parsed, returning a JSON report.
///
/// Violations cover both dropped tokens and the parsed day's rule breaks.
///
/// # Safety
/// - `text` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `thermo_free_string`.
/// - Returns NULL on error; call `thermo_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn thermo_validate_day(text: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(text) = cstr_to_string(text) else {
        set_last_error("Invalid schedule string pointer");
        return ptr::null_mut();
    };

    json_to_cstr(&Validator::validate_text(&text))
}

// ============================================================================
// Editing Session API
// ============================================================================

/// Opaque handle to a ScheduleEditor
pub struct ThermoEditorHandle {
    editor: ScheduleEditor,
}

/// Create an editing session.
///
/// `transport_json` is a JSON object of day key to transport string; missing
/// days get the default schedule. `config_toml` may be NULL for defaults.
///
/// # Safety
/// - `transport_json` must be a valid null-terminated C string.
/// - `config_toml` must be NULL or a valid null-terminated C string.
/// - Returns a pointer that must be freed with `thermo_editor_free`.
/// - Returns NULL on error; call `thermo_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn thermo_editor_new(
    transport_json: *const c_char,
    config_toml: *const c_char,
) -> *mut ThermoEditorHandle {
    clear_last_error();

    let Some(json_str) = cstr_to_string(transport_json) else {
        set_last_error("Invalid transport JSON pointer");
        return ptr::null_mut();
    };

    let transport: WeeklyTransport = match serde_json::from_str(&json_str) {
        Ok(t) => t,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let config = match cstr_to_string(config_toml) {
        None => EditorConfig::default(),
        Some(toml_str) => match EditorConfig::from_toml_str(&toml_str) {
            Ok(c) => c,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        },
    };

    let editor = ScheduleEditor::from_transport(&transport, config);
    Box::into_raw(Box::new(ThermoEditorHandle { editor }))
}

/// Free an editing session.
///
/// # Safety
/// - `editor` must be a valid pointer returned by `thermo_editor_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn thermo_editor_free(editor: *mut ThermoEditorHandle) {
    if !editor.is_null() {
        drop(Box::from_raw(editor));
    }
}

/// Feed one JSON input event; returns the emitted editor events as a JSON array.
///
/// # Safety
/// - `editor` must be a valid pointer returned by `thermo_editor_new`.
/// - `event_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `thermo_free_string`.
/// - Returns NULL on error; call `thermo_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn thermo_editor_handle_input(
    editor: *mut ThermoEditorHandle,
    event_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if editor.is_null() {
        set_last_error("Null editor pointer");
        return ptr::null_mut();
    }
    let handle = &mut *editor;

    let Some(json_str) = cstr_to_string(event_json) else {
        set_last_error("Invalid event JSON pointer");
        return ptr::null_mut();
    };

    match serde_json::from_str::<InputEvent>(&json_str) {
        Ok(event) => json_to_cstr(&handle.editor.handle_input(event)),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Switch the edited day; returns emitted events as a JSON array.
///
/// # Safety
/// - `editor` must be a valid pointer returned by `thermo_editor_new`.
/// - `day` must be a valid null-terminated C string (e.g. "monday" or "mon").
/// - Returns a newly allocated string that must be freed with `thermo_free_string`.
/// - Returns NULL on error; call `thermo_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn thermo_editor_select_day(
    editor: *mut ThermoEditorHandle,
    day: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if editor.is_null() {
        set_last_error("Null editor pointer");
        return ptr::null_mut();
    }
    let handle = &mut *editor;

    let Some(day_str) = cstr_to_string(day) else {
        set_last_error("Invalid day string pointer");
        return ptr::null_mut();
    };

    match day_str.parse::<DayKey>() {
        Ok(day) => json_to_cstr(&handle.editor.select_day(day)),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Current weekly schedule as a JSON object of day key to transport string.
///
/// # Safety
/// - `editor` must be a valid pointer returned by `thermo_editor_new`.
/// - Returns a newly allocated string that must be freed with `thermo_free_string`.
/// - Returns NULL on error; call `thermo_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn thermo_editor_transport(editor: *const ThermoEditorHandle) -> *mut c_char {
    clear_last_error();

    if editor.is_null() {
        set_last_error("Null editor pointer");
        return ptr::null_mut();
    }
    let handle = &*editor;

    json_to_cstr(&handle.editor.to_transport())
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by a `thermo_*` function.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a `thermo_*` function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn thermo_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next `thermo_*` call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn thermo_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn thermo_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let s = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        thermo_free_string(ptr);
        s
    }

    #[test]
    fn test_ffi_parse_day() {
        let text = CString::new("06:00/20 06:00/22 08:00/18").unwrap();
        unsafe {
            let json = take_string(thermo_parse_day(text.as_ptr()));
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            let times: Vec<&str> = value
                .as_array()
                .unwrap()
                .iter()
                .map(|t| t["time"].as_str().unwrap())
                .collect();
            assert_eq!(times, vec!["00:00", "06:00", "08:00"]);
        }
    }

    #[test]
    fn test_ffi_validate_day() {
        let text = CString::new("00:00/20 bogus 07:00/50").unwrap();
        unsafe {
            let json = take_string(thermo_validate_day(text.as_ptr()));
            assert!(json.contains("\"valid\":false"));
            assert!(json.contains("malformed_token"));
            assert!(json.contains("temperature_out_of_range"));
        }
    }

    #[test]
    fn test_ffi_editor_lifecycle() {
        let transport = CString::new(r#"{"monday":"00:00/20 06:00/21"}"#).unwrap();
        unsafe {
            let editor = thermo_editor_new(transport.as_ptr(), ptr::null());
            assert!(!editor.is_null());

            // press on empty space: nothing happens
            let event =
                CString::new(r#"{"type":"pointer_down","position":{"x":700.0,"y":380.0}}"#).unwrap();
            assert_eq!(take_string(thermo_editor_handle_input(editor, event.as_ptr())), "[]");

            let day = CString::new("tue").unwrap();
            assert_eq!(take_string(thermo_editor_select_day(editor, day.as_ptr())), "[]");

            let out = take_string(thermo_editor_transport(editor));
            let map: serde_json::Value = serde_json::from_str(&out).unwrap();
            assert_eq!(map["monday"], "00:00/20 06:00/21");
            assert_eq!(map["sunday"], "00:00/20");

            thermo_editor_free(editor);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        let bad = CString::new("not json").unwrap();
        unsafe {
            let editor = thermo_editor_new(bad.as_ptr(), ptr::null());
            assert!(editor.is_null());

            let error = thermo_last_error();
            assert!(!error.is_null());
            assert!(!CStr::from_ptr(error).to_str().unwrap().is_empty());

            assert!(thermo_editor_transport(ptr::null()).is_null());
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = CStr::from_ptr(thermo_version()).to_str().unwrap();
            assert!(!version.is_empty());
        }
    }
}
