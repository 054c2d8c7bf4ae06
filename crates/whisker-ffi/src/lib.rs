//! C FFI bindings for the Whisker template engine.
//!
//! Exposes `whisker_render_request`, `whisker_string_free` and
//! `whisker_clear_cache` for FFI consumers. Requests are JSON documents of
//! the form `{"template": "...", "view": {...}, "partials": {...}}`.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use whisker::{RenderRequest, WhiskerError};

/// Render a JSON render request with the default engine.
///
/// # Safety
///
/// - `request_json_utf8` must be a valid null-terminated UTF-8 JSON string.
/// - `out_error_json_utf8` must be a valid pointer to a `*mut c_char` (initially null).
///
/// On success, returns a pointer to a null-terminated UTF-8 HTML string.
/// The caller must free it with `whisker_string_free`.
///
/// On error, returns null and writes an error JSON string to `*out_error_json_utf8`.
/// The caller must free the error string with `whisker_string_free`.
#[no_mangle]
pub unsafe extern "C" fn whisker_render_request(
    request_json_utf8: *const c_char,
    out_error_json_utf8: *mut *mut c_char,
) -> *mut c_char {
    if request_json_utf8.is_null() {
        write_error(out_error_json_utf8, "InvalidArgument", "request is null", None);
        return ptr::null_mut();
    }

    // Safety: caller guarantees a valid pointer
    let request_json = match CStr::from_ptr(request_json_utf8).to_str() {
        Ok(s) => s,
        Err(e) => {
            write_error(out_error_json_utf8, "EncodingError", &e.to_string(), None);
            return ptr::null_mut();
        }
    };

    let result = RenderRequest::from_json(request_json)
        .and_then(|request| whisker::default_engine().render_request(&request));

    match result {
        Ok(html) => match CString::new(html) {
            Ok(cs) => cs.into_raw(),
            Err(e) => {
                write_error(out_error_json_utf8, "EncodingError", &e.to_string(), None);
                ptr::null_mut()
            }
        },
        Err(err) => {
            write_whisker_error(out_error_json_utf8, &err);
            ptr::null_mut()
        }
    }
}

/// Free a string previously returned by `whisker_render_request` or written to
/// `out_error_json_utf8`.
///
/// # Safety
///
/// `p` must be a pointer previously returned by this crate via `CString::into_raw`,
/// or null (in which case this is a no-op).
#[no_mangle]
pub unsafe extern "C" fn whisker_string_free(p: *mut c_char) {
    if !p.is_null() {
        drop(CString::from_raw(p));
    }
}

/// Drop every parsed template cached by the default engine.
#[no_mangle]
pub extern "C" fn whisker_clear_cache() {
    whisker::clear_cache();
}

/// Convert a `WhiskerError` to error JSON and write it to the output pointer.
unsafe fn write_whisker_error(out: *mut *mut c_char, err: &WhiskerError) {
    write_error(out, err.kind(), &err.to_string(), err.location());
}

/// Write an error JSON string to the output pointer.
unsafe fn write_error(
    out: *mut *mut c_char,
    error_type: &str,
    message: &str,
    location: Option<whisker::Location>,
) {
    if out.is_null() {
        return;
    }

    let json = serde_json::json!({
        "type": error_type,
        "message": message,
        "offset": location.map(|l| l.byte_offset),
        "line": location.map(|l| l.line),
        "column": location.map(|l| l.column),
    });

    if let Ok(cs) = CString::new(json.to_string()) {
        *out = cs.into_raw();
    }
}
