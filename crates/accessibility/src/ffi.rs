//! Low-level AXUIElement bindings and the handful of typed getters the
//! collector needs. Mirrors the calling convention macOS's Accessibility
//! API uses throughout: a CFTypeRef out-parameter and an `i32` AXError.

use std::{cell::RefCell, collections::HashMap, ffi::c_void, ptr, thread_local};

use core_foundation::{
    array::{CFArray, CFArrayGetCount, CFArrayGetValueAtIndex},
    base::{CFRelease, CFTypeRef, TCFType},
    string::{CFString, CFStringRef},
};

use crate::error::{Error, Result};

#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    fn AXUIElementCreateApplication(pid: i32) -> *mut c_void;
    fn AXUIElementCopyAttributeValue(
        element: *mut c_void,
        attr: CFStringRef,
        value: *mut CFTypeRef,
    ) -> i32;
    fn AXValueGetValue(the_value: CFTypeRef, the_type: i32, value_ptr: *mut c_void) -> bool;
}

const K_AX_VALUE_CGPOINT_TYPE: i32 = 1;
const K_AX_VALUE_CGSIZE_TYPE: i32 = 2;
const K_AX_ERROR_INVALID_UI_ELEMENT: i32 = -25202;

/// Maps an `AXError` code to its symbolic name, for log messages.
pub(crate) fn ax_error_name(code: i32) -> &'static str {
    match code {
        0 => "Success",
        -25200 => "Failure",
        -25201 => "IllegalArgument",
        -25202 => "InvalidUIElement",
        -25203 => "InvalidObserver",
        -25204 => "CannotComplete",
        -25205 => "AttributeUnsupported",
        -25206 => "ActionUnsupported",
        -25207 => "NotificationUnsupported",
        -25208 => "NotImplemented",
        _ => "Unknown",
    }
}

thread_local! {
    static ATTR_STRINGS: RefCell<HashMap<&'static str, CFString>> = RefCell::new(HashMap::new());
}

/// Returns a stable `CFStringRef` for a known attribute name, caching the
/// `CFString` per thread so repeated lookups don't reallocate.
pub(crate) fn cfstr(name: &'static str) -> CFStringRef {
    ATTR_STRINGS.with(|cell| {
        let mut m = cell.borrow_mut();
        let s = m.entry(name).or_insert_with(|| CFString::new(name));
        s.as_concrete_TypeRef()
    })
}

/// Fails fast if the Accessibility permission has not been granted.
pub(crate) fn ax_check() -> Result<()> {
    if permissions::accessibility_ok() {
        Ok(())
    } else {
        Err(Error::Permission)
    }
}

/// Creates the top-level AX element for an application process.
pub(crate) fn ax_application(pid: i32) -> *mut c_void {
    unsafe { AXUIElementCreateApplication(pid) }
}

fn copy_attr(element: *mut c_void, attr: CFStringRef) -> Result<CFTypeRef> {
    let mut v: CFTypeRef = ptr::null_mut();
    // SAFETY: `element` is a live AXUIElement pointer obtained from
    // `ax_application` or a child enumeration; `attr` is one of our cached
    // CFStrings; `v` is a valid out-param.
    let err = unsafe { AXUIElementCopyAttributeValue(element, attr, &mut v) };
    if err != 0 {
        if err == K_AX_ERROR_INVALID_UI_ELEMENT {
            return Err(Error::ElementGone);
        }
        return Err(Error::AxCode(ax_error_name(err), err));
    }
    Ok(v)
}

/// Reads a string-valued attribute, or `None` if absent or not a string.
pub(crate) fn ax_get_string(element: *mut c_void, attr: CFStringRef) -> Option<String> {
    let v = copy_attr(element, attr).ok()?;
    if v.is_null() {
        return None;
    }
    // SAFETY: the AX docs guarantee string attributes return a CFStringRef;
    // callers only pass attribute names known to be string-typed.
    let s = unsafe { CFString::wrap_under_create_rule(v as CFStringRef) };
    Some(s.to_string())
}

/// Reads a `CGPoint`-valued attribute (e.g. `AXPosition`).
pub(crate) fn ax_get_point(element: *mut c_void, attr: CFStringRef) -> Result<(f64, f64)> {
    let v = copy_attr(element, attr)?;
    if v.is_null() {
        return Err(Error::AxCode("NoValue", -25212));
    }
    let mut point = core_graphics::geometry::CGPoint { x: 0.0, y: 0.0 };
    let ok = unsafe {
        let got = AXValueGetValue(
            v,
            K_AX_VALUE_CGPOINT_TYPE,
            &mut point as *mut _ as *mut c_void,
        );
        CFRelease(v);
        got
    };
    if !ok {
        return Err(Error::AxCode("NotAnAXValue", -25201));
    }
    Ok((point.x, point.y))
}

/// Reads a `CGSize`-valued attribute (e.g. `AXSize`).
pub(crate) fn ax_get_size(element: *mut c_void, attr: CFStringRef) -> Result<(f64, f64)> {
    let v = copy_attr(element, attr)?;
    if v.is_null() {
        return Err(Error::AxCode("NoValue", -25212));
    }
    let mut size = core_graphics::geometry::CGSize {
        width: 0.0,
        height: 0.0,
    };
    let ok = unsafe {
        let got = AXValueGetValue(
            v,
            K_AX_VALUE_CGSIZE_TYPE,
            &mut size as *mut _ as *mut c_void,
        );
        CFRelease(v);
        got
    };
    if !ok {
        return Err(Error::AxCode("NotAnAXValue", -25201));
    }
    Ok((size.width, size.height))
}

/// Reads a child-array-valued attribute (e.g. `AXChildren`, `AXWindows`).
pub(crate) fn ax_get_children(element: *mut c_void, attr: CFStringRef) -> Vec<*mut c_void> {
    let Ok(v) = copy_attr(element, attr) else {
        return Vec::new();
    };
    if v.is_null() {
        return Vec::new();
    }
    // SAFETY: `v` is a freshly-retained CFArrayRef of AXUIElement pointers,
    // wrapped and released by `CFArray`'s drop.
    let arr = unsafe { CFArray::<*const c_void>::wrap_under_create_rule(v as _) };
    let mut out = Vec::new();
    unsafe {
        let count = CFArrayGetCount(arr.as_concrete_TypeRef());
        for i in 0..count {
            let p = CFArrayGetValueAtIndex(arr.as_concrete_TypeRef(), i);
            if !p.is_null() {
                out.push(p as *mut c_void);
            }
        }
    }
    out
}
