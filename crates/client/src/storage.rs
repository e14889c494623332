//! Cross-platform persistent storage for session data.
//!
//! - Web: `localStorage`
//! - Desktop: JSON files under the platform config directory
//!   (`~/.config/botornot/` on Linux)
//!
//! Only the auth session lives here; everything else is in-memory for the
//! lifetime of the page/process.

use serde::{de::DeserializeOwned, Serialize};

/// Save a value under a key. Returns `true` on success.
pub fn save<T: Serialize>(key: &str, value: &T) -> bool {
    match serde_json::to_string(value) {
        Ok(json) => save_raw(key, &json),
        Err(_) => false,
    }
}

/// Load a value by key. `None` if missing or undecodable.
pub fn load<T: DeserializeOwned>(key: &str) -> Option<T> {
    let json = load_raw(key)?;
    serde_json::from_str(&json).ok()
}

/// Remove a key.
pub fn remove(key: &str) {
    remove_raw(key);
}

// =========================================
// Web (WASM) implementation
// =========================================

#[cfg(target_arch = "wasm32")]
fn save_raw(key: &str, value: &str) -> bool {
    if let Some(window) = web_sys::window() {
        if let Ok(Some(storage)) = window.local_storage() {
            return storage.set_item(key, value).is_ok();
        }
    }
    false
}

#[cfg(target_arch = "wasm32")]
fn load_raw(key: &str) -> Option<String> {
    let window = web_sys::window()?;
    let storage = window.local_storage().ok()??;
    storage.get_item(key).ok()?
}

#[cfg(target_arch = "wasm32")]
fn remove_raw(key: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(Some(storage)) = window.local_storage() {
            let _ = storage.remove_item(key);
        }
    }
}

// =========================================
// Desktop (native) implementation
// =========================================

#[cfg(not(target_arch = "wasm32"))]
fn app_config_dir() -> Option<std::path::PathBuf> {
    let dir = dirs::config_dir()?.join("botornot");
    if !dir.exists() {
        std::fs::create_dir_all(&dir).ok()?;
    }
    Some(dir)
}

#[cfg(not(target_arch = "wasm32"))]
fn file_for_key(key: &str) -> Option<std::path::PathBuf> {
    let dir = app_config_dir()?;
    let safe_key = key.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_");
    Some(dir.join(format!("{}.json", safe_key)))
}

#[cfg(not(target_arch = "wasm32"))]
fn save_raw(key: &str, value: &str) -> bool {
    let Some(path) = file_for_key(key) else {
        return false;
    };
    std::fs::write(path, value).is_ok()
}

#[cfg(not(target_arch = "wasm32"))]
fn load_raw(key: &str) -> Option<String> {
    let path = file_for_key(key)?;
    std::fs::read_to_string(path).ok()
}

#[cfg(not(target_arch = "wasm32"))]
fn remove_raw(key: &str) {
    if let Some(path) = file_for_key(key) {
        let _ = std::fs::remove_file(path);
    }
}
