//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`StoragePort`] for the gateway.
//!
//! # Security
//!
//! - Only the issued credential is stored; the factory secret and WiFi
//!   password are compiled in and never written to flash.
//! - Atomic writes: ESP-IDF NVS commits are atomic per `nvs_commit()`.
//! - The simulation backend is an in-memory map (dev/test only).

use log::info;

use crate::app::ports::{StorageError, StoragePort};

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::warn;

/// NVS namespace and key names are limited to 15 bytes plus NUL.
const NVS_NAME_MAX: usize = 15;

#[cfg(target_os = "espidf")]
const NOT_FOUND: esp_err_t = ESP_ERR_NVS_NOT_FOUND as esp_err_t;
#[cfg(target_os = "espidf")]
const INVALID_LENGTH: esp_err_t = ESP_ERR_NVS_INVALID_LENGTH as esp_err_t;
#[cfg(target_os = "espidf")]
const INVALID_NAME: esp_err_t = ESP_ERR_NVS_INVALID_NAME as esp_err_t;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, String>>,
}

impl NvsAdapter {
    /// Create a new NvsAdapter and initialise NVS flash.
    ///
    /// On first boot or after a version mismatch the NVS partition is
    /// erased and re-initialised automatically.
    pub fn new() -> Result<Self, StorageError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as esp_err_t
                || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as esp_err_t
            {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(StorageError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(StorageError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(StorageError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    /// Open an NVS namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let ns_buf = c_name(namespace).ok_or(INVALID_NAME)?;

        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }
}

/// NUL-terminated copy of an NVS name, or `None` if it is too long.
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
fn c_name(name: &str) -> Option<[u8; NVS_NAME_MAX + 1]> {
    let bytes = name.as_bytes();
    if bytes.is_empty() || bytes.len() > NVS_NAME_MAX || bytes.contains(&0) {
        return None;
    }
    let mut buf = [0u8; NVS_NAME_MAX + 1];
    buf[..bytes.len()].copy_from_slice(bytes);
    Some(buf)
}

impl StoragePort for NvsAdapter {
    fn read_str(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let store = self.store.borrow();
            let value = store
                .get(&Self::composite_key(namespace, key))
                .ok_or(StorageError::NotFound)?;
            if value.len() > buf.len() {
                return Err(StorageError::TooLarge);
            }
            buf[..value.len()].copy_from_slice(value.as_bytes());
            Ok(value.len())
        }

        #[cfg(target_os = "espidf")]
        {
            let key_buf = c_name(key).ok_or(StorageError::IoError)?;
            let result = Self::with_nvs_handle(namespace, false, |handle| {
                // First call: get size including the NUL terminator.
                let mut size: usize = 0;
                let ret = unsafe {
                    nvs_get_str(handle, key_buf.as_ptr() as *const _, core::ptr::null_mut(), &mut size)
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                if size == 0 || size - 1 > buf.len() {
                    return Err(INVALID_LENGTH);
                }

                let mut raw = vec![0u8; size];
                let ret = unsafe {
                    nvs_get_str(handle, key_buf.as_ptr() as *const _, raw.as_mut_ptr() as *mut _, &mut size)
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let len = size.saturating_sub(1);
                buf[..len].copy_from_slice(&raw[..len]);
                Ok(len)
            });

            match result {
                Ok(len) => Ok(len),
                Err(NOT_FOUND) => Err(StorageError::NotFound),
                Err(INVALID_LENGTH) => Err(StorageError::TooLarge),
                Err(code) => {
                    warn!("NVS: read {}/{} failed ({})", namespace, key, code);
                    Err(StorageError::IoError)
                }
            }
        }
    }

    fn write_str(&mut self, namespace: &str, key: &str, value: &str) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            self.store
                .borrow_mut()
                .insert(Self::composite_key(namespace, key), value.to_string());
            info!("NvsAdapter(sim): wrote {}/{} ({} bytes)", namespace, key, value.len());
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let key_buf = c_name(key).ok_or(StorageError::IoError)?;
            if value.as_bytes().contains(&0) {
                return Err(StorageError::IoError);
            }
            let mut c_value = Vec::with_capacity(value.len() + 1);
            c_value.extend_from_slice(value.as_bytes());
            c_value.push(0);

            Self::with_nvs_handle(namespace, true, |handle| {
                let ret = unsafe {
                    nvs_set_str(handle, key_buf.as_ptr() as *const _, c_value.as_ptr() as *const _)
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            })
            .map_err(|code| {
                warn!("NVS: write {}/{} failed ({})", namespace, key, code);
                StorageError::IoError
            })?;
            info!("NvsAdapter: wrote {}/{} ({} bytes)", namespace, key, value.len());
            Ok(())
        }
    }
}
