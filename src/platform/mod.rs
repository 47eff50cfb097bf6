//! Platform abstraction layer
//!
//! The browser binding lives in `web`; native builds drive `Session`
//! directly (see the headless runner in `main.rs`).

#[cfg(target_arch = "wasm32")]
pub mod web;
