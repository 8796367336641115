//! C ABI exported to host processes.
//!
//! Handles are opaque, never-reused tokens. The contexts they name are
//! owned by a process-wide table, so a handle that was never issued or has
//! already been destroyed is recognised and rejected instead of being
//! dereferenced. Strings returned to the host are `CString`s that
//! must come back through [`calbridge_free_string`].

use std::collections::HashMap;
use std::ffi::{c_char, c_void, CStr, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use crate::config::PluginConfig;
use crate::context::{CalendarPlugin, PluginContext};
use crate::logging;

/// Bumped whenever an exported signature or [`PluginApi`] changes.
pub const ABI_VERSION: u32 = 1;

const INTERNAL_ERROR: &str = r#"{"error":"Internal error"}"#;
const INVALID_ARGUMENTS: &str = r#"{"error":"Invalid arguments"}"#;

/// Function table for hosts that resolve a single symbol.
#[repr(C)]
pub struct PluginApi {
    pub abi_version: u32,
    pub init: extern "C" fn() -> *mut c_void,
    pub destroy: extern "C" fn(*mut c_void),
    pub get_manifest: extern "C" fn(*mut c_void) -> *mut c_char,
    pub invoke: unsafe extern "C" fn(
        *mut c_void,
        *const c_char,
        *const c_char,
        *const c_char,
    ) -> *mut c_char,
    pub free_string: unsafe extern "C" fn(*mut c_char),
}

static PLUGIN_API: PluginApi = PluginApi {
    abi_version: ABI_VERSION,
    init: calbridge_init,
    destroy: calbridge_destroy,
    get_manifest: calbridge_get_manifest,
    invoke: calbridge_invoke,
    free_string: calbridge_free_string,
};

type HandleTable = HashMap<usize, Arc<PluginContext>>;

/// Next handle token. Starts at 1 so no handle is ever null.
static NEXT_HANDLE: AtomicUsize = AtomicUsize::new(1);

fn handles() -> MutexGuard<'static, HandleTable> {
    static HANDLES: OnceLock<Mutex<HandleTable>> = OnceLock::new();
    HANDLES
        .get_or_init(Mutex::default)
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn lookup(handle: *mut c_void) -> Option<Arc<PluginContext>> {
    if handle.is_null() {
        return None;
    }
    handles().get(&(handle as usize)).cloned()
}

fn into_c_string(body: String) -> *mut c_char {
    match CString::new(body) {
        Ok(s) => s.into_raw(),
        Err(e) => {
            tracing::error!(error = %e, "Response contained an interior NUL");
            CString::new(INTERNAL_ERROR)
                .map(CString::into_raw)
                .unwrap_or(std::ptr::null_mut())
        }
    }
}

/// ABI version of this library.
#[no_mangle]
pub extern "C" fn calbridge_abi_version() -> u32 {
    ABI_VERSION
}

/// Static function table; never null, never freed.
#[no_mangle]
pub extern "C" fn calbridge_plugin_api() -> *const PluginApi {
    &PLUGIN_API
}

/// Create a plugin context. Returns null if the context cannot be built.
#[no_mangle]
pub extern "C" fn calbridge_init() -> *mut c_void {
    let created = catch_unwind(|| {
        logging::init();
        PluginContext::new(PluginConfig::from_env())
    });

    match created {
        Ok(Ok(context)) => {
            let handle = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);
            handles().insert(handle, Arc::new(context));
            tracing::debug!(handle, "Plugin handle issued");
            handle as *mut c_void
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Failed to create plugin context");
            std::ptr::null_mut()
        }
        Err(_) => {
            tracing::error!("Panic while creating plugin context");
            std::ptr::null_mut()
        }
    }
}

/// Release a context. Unknown, null or already-destroyed handles are ignored.
#[no_mangle]
pub extern "C" fn calbridge_destroy(handle: *mut c_void) {
    if handle.is_null() {
        return;
    }

    let removed = handles().remove(&(handle as usize));
    match removed {
        Some(context) => {
            if catch_unwind(AssertUnwindSafe(move || drop(context))).is_err() {
                tracing::error!("Panic while releasing plugin context");
            }
            tracing::debug!(handle = handle as usize, "Plugin handle destroyed");
        }
        None => tracing::warn!(handle = handle as usize, "Destroy on unknown plugin handle"),
    }
}

/// Manifest JSON for a live handle, or null.
#[no_mangle]
pub extern "C" fn calbridge_get_manifest(handle: *mut c_void) -> *mut c_char {
    let Some(context) = lookup(handle) else {
        tracing::warn!(handle = handle as usize, "get_manifest on unknown plugin handle");
        return std::ptr::null_mut();
    };

    let body = catch_unwind(AssertUnwindSafe(|| context.manifest()))
        .unwrap_or_else(|_| INTERNAL_ERROR.to_string());
    into_c_string(body)
}

/// Invoke a tool.
///
/// Returns null for an unknown handle or a null `kind`/`tool_id`; every
/// other outcome is a JSON body.
///
/// # Safety
///
/// `kind`, `tool_id` and `payload` must each be null or point to a
/// NUL-terminated string that stays valid for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn calbridge_invoke(
    handle: *mut c_void,
    kind: *const c_char,
    tool_id: *const c_char,
    payload: *const c_char,
) -> *mut c_char {
    let Some(context) = lookup(handle) else {
        tracing::warn!(handle = handle as usize, "invoke on unknown plugin handle");
        return std::ptr::null_mut();
    };
    if kind.is_null() || tool_id.is_null() {
        return std::ptr::null_mut();
    }

    // SAFETY: non-null and NUL-terminated per the contract above.
    let kind = unsafe { CStr::from_ptr(kind) }.to_string_lossy();
    let tool_id = unsafe { CStr::from_ptr(tool_id) }.to_string_lossy();
    let payload = if payload.is_null() {
        Ok("{}")
    } else {
        // SAFETY: as above.
        unsafe { CStr::from_ptr(payload) }.to_str()
    };

    let body = match payload {
        Ok(payload) => catch_unwind(AssertUnwindSafe(|| {
            context.invoke(&kind, &tool_id, payload)
        }))
        .unwrap_or_else(|_| {
            tracing::error!(tool = %tool_id, "Panic during tool invocation");
            INTERNAL_ERROR.to_string()
        }),
        Err(_) => INVALID_ARGUMENTS.to_string(),
    };
    into_c_string(body)
}

/// Free a string returned by this library. Null is a no-op.
///
/// # Safety
///
/// `ptr` must be null or a pointer returned by [`calbridge_get_manifest`]
/// or [`calbridge_invoke`] that has not been freed yet.
#[no_mangle]
pub unsafe extern "C" fn calbridge_free_string(ptr: *mut c_char) {
    if ptr.is_null() {
        return;
    }
    // SAFETY: allocated by `CString::into_raw` and handed back exactly once.
    drop(unsafe { CString::from_raw(ptr) });
}
