//! Diagnostic logging to the browser console.
//!
//! Native builds (tests included) have no JS console to call into, so the
//! calls compile to nothing there.

#[cfg(target_arch = "wasm32")]
pub fn log(message: &str) {
    web_sys::console::log_1(&format!("372 Pages: {message}").into());
}

#[cfg(target_arch = "wasm32")]
pub fn warn(message: &str) {
    web_sys::console::warn_1(&format!("372 Pages: {message}").into());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn log(_message: &str) {}

#[cfg(not(target_arch = "wasm32"))]
pub fn warn(_message: &str) {}
