//! C ABI for embedding a string-valued cache.

use crate::{LruOptions, SharedArrayLru};
use std::ffi::{c_void, CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;

type FfiCache = SharedArrayLru<String>;

/// Creates a cache with `collisions` slots per bucket; returns null if the
/// configuration is rejected, including a `collisions` of 0.
#[no_mangle]
pub extern "C" fn arraylru_create(capacity: usize, collisions: usize) -> *mut c_void {
    create(capacity, LruOptions::new().collisions(collisions))
}

/// Creates a cache with the default collision degree.
#[no_mangle]
pub extern "C" fn arraylru_create_default(capacity: usize) -> *mut c_void {
    create(capacity, LruOptions::new())
}

fn create(capacity: usize, options: LruOptions<String>) -> *mut c_void {
    let collisions = options.collision_degree();
    match FfiCache::new(capacity, options) {
        Ok(cache) => Box::into_raw(Box::new(cache)) as *mut c_void,
        Err(err) => {
            tracing::warn!(%err, capacity, collisions, "arraylru_create rejected configuration");
            ptr::null_mut()
        }
    }
}

#[no_mangle]
pub extern "C" fn arraylru_destroy(ptr: *mut c_void) {
    if !ptr.is_null() {
        unsafe {
            let _ = Box::from_raw(ptr as *mut FfiCache);
        }
    }
}

#[no_mangle]
pub extern "C" fn arraylru_set(ptr: *mut c_void, key: u64, value: *const c_char) -> c_int {
    if ptr.is_null() || value.is_null() {
        return 0;
    }

    unsafe {
        let cache = &*(ptr as *const FfiCache);
        let value_str = match CStr::from_ptr(value).to_str() {
            Ok(s) => s,
            Err(_) => return 0,
        };

        cache.set(key, value_str.to_string());
        1
    }
}

/// Returns an owned copy of the value, to be released with `arraylru_free_string`.
#[no_mangle]
pub extern "C" fn arraylru_get(ptr: *mut c_void, key: u64) -> *mut c_char {
    if ptr.is_null() {
        return ptr::null_mut();
    }

    let cache = unsafe { &*(ptr as *const FfiCache) };
    match cache.get(key) {
        Some(value) => match CString::new(value) {
            Ok(c_str) => c_str.into_raw(),
            Err(_) => ptr::null_mut(),
        },
        None => ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "C" fn arraylru_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}

#[no_mangle]
pub extern "C" fn arraylru_len(ptr: *mut c_void) -> usize {
    if ptr.is_null() {
        return 0;
    }
    unsafe {
        let cache = &*(ptr as *const FfiCache);
        cache.len()
    }
}
