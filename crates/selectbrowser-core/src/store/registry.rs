//! Windows registry backed store rooted at `HKEY_LOCAL_MACHINE`.

use super::ConfigStore;
use crate::error::Result;

/// [`ConfigStore`] over the `HKEY_LOCAL_MACHINE` registry hive.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistryStore;

impl RegistryStore {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "windows")]
mod imp {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;

    use windows::Win32::Foundation::{
        ERROR_ACCESS_DENIED, ERROR_FILE_NOT_FOUND, ERROR_PATH_NOT_FOUND, ERROR_SUCCESS,
        WIN32_ERROR,
    };
    use windows::Win32::System::Registry::{
        HKEY, HKEY_LOCAL_MACHINE, KEY_READ, KEY_WRITE, REG_OPTION_NON_VOLATILE, REG_SAM_FLAGS,
        REG_SZ, RRF_RT_REG_SZ, RegCloseKey, RegCreateKeyExW, RegDeleteKeyW, RegDeleteValueW,
        RegGetValueW, RegOpenKeyExW, RegSetValueExW,
    };
    use windows::core::HSTRING;

    use crate::error::{Error, Result};
    use crate::store::describe_value;

    /// Open registry key, closed on drop.
    struct OwnedKey(HKEY);

    impl Drop for OwnedKey {
        fn drop(&mut self) {
            // SAFETY: the handle was returned by RegOpenKeyExW/RegCreateKeyExW
            // and is closed exactly once.
            unsafe {
                let _ = RegCloseKey(self.0);
            }
        }
    }

    fn check(status: WIN32_ERROR, path: &str) -> Result<()> {
        if status == ERROR_SUCCESS {
            Ok(())
        } else if status == ERROR_FILE_NOT_FOUND || status == ERROR_PATH_NOT_FOUND {
            Err(Error::NotFound(path.to_string()))
        } else if status == ERROR_ACCESS_DENIED {
            Err(Error::AccessDenied(path.to_string()))
        } else {
            Err(Error::Registry {
                path: path.to_string(),
                message: format!("Win32 error code {}", status.0),
            })
        }
    }

    fn open_key(key: &str, access: REG_SAM_FLAGS) -> Result<OwnedKey> {
        let subkey = HSTRING::from(key);
        let mut handle = HKEY::default();
        // SAFETY: RegOpenKeyExW writes an open handle into `handle` on success.
        let status =
            unsafe { RegOpenKeyExW(HKEY_LOCAL_MACHINE, &subkey, 0, access, &mut handle) };
        check(status, key)?;
        Ok(OwnedKey(handle))
    }

    fn create_key(key: &str) -> Result<OwnedKey> {
        let subkey = HSTRING::from(key);
        let mut handle = HKEY::default();
        // SAFETY: RegCreateKeyExW creates or opens a registry key.
        let status = unsafe {
            RegCreateKeyExW(
                HKEY_LOCAL_MACHINE,
                &subkey,
                0,
                None,
                REG_OPTION_NON_VOLATILE,
                KEY_WRITE,
                None,
                &mut handle,
                None,
            )
        };
        check(status, key)?;
        Ok(OwnedKey(handle))
    }

    pub(super) fn get_string(key: &str, name: &str) -> Result<String> {
        let subkey = HSTRING::from(key);
        let value_name = HSTRING::from(name);
        let target = describe_value(key, name);

        // RRF_RT_REG_SZ also matches REG_EXPAND_SZ values, which are expanded
        // unless RRF_NOEXPAND is set. RRF_RT_REG_EXPAND_SZ without
        // RRF_NOEXPAND is rejected with ERROR_INVALID_PARAMETER.
        // First call to get the required buffer size
        let mut size: u32 = 0;
        // SAFETY: RegGetValueW with null buffer queries the required size.
        let status = unsafe {
            RegGetValueW(
                HKEY_LOCAL_MACHINE,
                &subkey,
                &value_name,
                RRF_RT_REG_SZ,
                None,
                None,
                Some(&mut size),
            )
        };
        check(status, &target)?;

        let mut buffer = vec![0u16; (size as usize).div_ceil(2)];
        // SAFETY: RegGetValueW reads the registry value into the provided buffer.
        let status = unsafe {
            RegGetValueW(
                HKEY_LOCAL_MACHINE,
                &subkey,
                &value_name,
                RRF_RT_REG_SZ,
                None,
                Some(buffer.as_mut_ptr().cast()),
                Some(&mut size),
            )
        };
        check(status, &target)?;

        buffer.truncate((size as usize) / 2);
        while buffer.last() == Some(&0) {
            buffer.pop();
        }

        String::from_utf16(&buffer).map_err(|e| Error::Registry {
            path: target,
            message: format!("Invalid UTF-16 in registry value: {e}"),
        })
    }

    pub(super) fn key_exists(key: &str) -> Result<bool> {
        match open_key(key, KEY_READ) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub(super) fn ensure_key(key: &str) -> Result<()> {
        create_key(key).map(|_| ())
    }

    pub(super) fn set_string(key: &str, name: &str, value: &str) -> Result<()> {
        let handle = create_key(key)?;
        let value_name = HSTRING::from(name);
        let wide: Vec<u16> = OsStr::new(value)
            .encode_wide()
            .chain(std::iter::once(0))
            .collect();
        // SAFETY: `wide` outlives the call and the byte slice covers exactly its contents.
        let status = unsafe {
            RegSetValueExW(
                handle.0,
                &value_name,
                0,
                REG_SZ,
                Some(std::slice::from_raw_parts(
                    wide.as_ptr().cast::<u8>(),
                    wide.len() * 2,
                )),
            )
        };
        check(status, &describe_value(key, name))
    }

    pub(super) fn delete_value(key: &str, name: &str) -> Result<()> {
        let handle = open_key(key, KEY_WRITE)?;
        let value_name = HSTRING::from(name);
        // SAFETY: the handle is open with KEY_SET_VALUE access.
        let status = unsafe { RegDeleteValueW(handle.0, &value_name) };
        check(status, &describe_value(key, name))
    }

    pub(super) fn delete_key(key: &str) -> Result<()> {
        let subkey = HSTRING::from(key);
        // SAFETY: RegDeleteKeyW removes a subkey without children.
        let status = unsafe { RegDeleteKeyW(HKEY_LOCAL_MACHINE, &subkey) };
        check(status, key)
    }
}

#[cfg(target_os = "windows")]
impl ConfigStore for RegistryStore {
    fn get_string(&self, key: &str, name: &str) -> Result<String> {
        imp::get_string(key, name)
    }

    fn key_exists(&self, key: &str) -> Result<bool> {
        imp::key_exists(key)
    }

    fn create_key(&mut self, key: &str) -> Result<()> {
        imp::ensure_key(key)
    }

    fn set_string(&mut self, key: &str, name: &str, value: &str) -> Result<()> {
        imp::set_string(key, name, value)
    }

    fn delete_value(&mut self, key: &str, name: &str) -> Result<()> {
        imp::delete_value(key, name)
    }

    fn delete_key(&mut self, key: &str) -> Result<()> {
        imp::delete_key(key)
    }
}

#[cfg(not(target_os = "windows"))]
fn unsupported<T>() -> Result<T> {
    Err(crate::error::Error::Unsupported(
        "The registry store is only supported on Windows".to_string(),
    ))
}

#[cfg(not(target_os = "windows"))]
impl ConfigStore for RegistryStore {
    fn get_string(&self, _key: &str, _name: &str) -> Result<String> {
        unsupported()
    }

    fn key_exists(&self, _key: &str) -> Result<bool> {
        unsupported()
    }

    fn create_key(&mut self, _key: &str) -> Result<()> {
        unsupported()
    }

    fn set_string(&mut self, _key: &str, _name: &str, _value: &str) -> Result<()> {
        unsupported()
    }

    fn delete_value(&mut self, _key: &str, _name: &str) -> Result<()> {
        unsupported()
    }

    fn delete_key(&mut self, _key: &str) -> Result<()> {
        unsupported()
    }
}
