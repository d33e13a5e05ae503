use libloading::{Library, Symbol};
use std::ffi::{CStr, c_char};
use std::path::Path;

use crate::error::{LspError, LspResult};

/// Symbol a native plugin must export.
///
/// Signature: `extern "C" fn() -> *const c_char`, returning a NUL-terminated
/// JSON rule table that stays valid while the library is loaded.
pub const RULES_SYMBOL: &str = "infinite_plugin_rules";

/// File extensions treated as native plugins
pub const NATIVE_EXTENSIONS: &[&str] = &["so", "dylib", "dll"];

pub fn is_native_plugin(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| NATIVE_EXTENSIONS.contains(&ext))
}

/// Read the rule table exported by the native plugin at `path`.
///
/// The string is copied out and the library is dropped before returning, so
/// the next call for the same path maps the file afresh instead of reusing a
/// stale handle.
pub fn read_rule_table(path: &Path) -> LspResult<String> {
    let library = unsafe { Library::new(path) }
        .map_err(|err| LspError::module_load(path, format!("failed to open library: {err}")))?;

    let rules = {
        let rules_fn: Symbol<unsafe extern "C" fn() -> *const c_char> =
            unsafe { library.get(RULES_SYMBOL.as_bytes()) }.map_err(|_| {
                LspError::module_load(path, format!("symbol not found: {RULES_SYMBOL}"))
            })?;

        let raw = unsafe { rules_fn() };
        if raw.is_null() {
            return Err(LspError::module_load(
                path,
                format!("{RULES_SYMBOL} returned a null pointer"),
            ));
        }
        unsafe { CStr::from_ptr(raw) }
            .to_str()
            .map(str::to_owned)
            .map_err(|err| LspError::module_load(path, format!("rule table is not UTF-8: {err}")))?
    };

    drop(library);
    Ok(rules)
}
