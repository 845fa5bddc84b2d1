//! services/reader/src/adapters/device.rs
//!
//! Persistent device identity.
//!
//! The id is a random component followed by a base-36 millisecond timestamp. It
//! deters account sharing; it is not a secret and not a security boundary.

use chrono::Utc;
use manhua_core::domain::DeviceId;
use manhua_core::ports::DeviceIdentityProvider;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Keeps the device id in a small text file inside the state directory.
pub struct FileDeviceIdentity {
    path: PathBuf,
    cached: Mutex<Option<DeviceId>>,
}

impl FileDeviceIdentity {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Option<DeviceId> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        let id = raw.trim();
        if id.is_empty() {
            warn!(path = %self.path.display(), "Device id file is empty, regenerating");
            return None;
        }
        debug!(path = %self.path.display(), "Loaded device id");
        Some(DeviceId::new(id))
    }

    fn store(&self, id: &DeviceId) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, id.as_str())
    }
}

impl DeviceIdentityProvider for FileDeviceIdentity {
    fn get_or_create_device_id(&self) -> DeviceId {
        let mut cached = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(id) = cached.as_ref() {
            return id.clone();
        }

        let id = match self.load() {
            Some(id) => id,
            None => {
                let id = generate_device_id();
                match self.store(&id) {
                    Ok(()) => info!(
                        device = id.short(),
                        path = %self.path.display(),
                        "Generated new device id"
                    ),
                    // Degraded mode: the id lives only as long as this process.
                    Err(e) => warn!(
                        error = %e,
                        path = %self.path.display(),
                        "Could not persist device id; binding will not survive a restart"
                    ),
                }
                id
            }
        };

        *cached = Some(id.clone());
        id
    }
}

pub fn generate_device_id() -> DeviceId {
    let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
    DeviceId::new(format!("{}{}", Uuid::new_v4().simple(), to_base36(millis)))
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn id_is_created_once_and_reused_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("device_id");

        let first = FileDeviceIdentity::new(&path).get_or_create_device_id();
        assert!(path.exists());

        for _ in 0..3 {
            let again = FileDeviceIdentity::new(&path).get_or_create_device_id();
            assert_eq!(again, first);
        }
    }

    #[test]
    fn different_files_give_different_ids() {
        let dir = TempDir::new().unwrap();
        let a = FileDeviceIdentity::new(dir.path().join("a")).get_or_create_device_id();
        let b = FileDeviceIdentity::new(dir.path().join("b")).get_or_create_device_id();
        assert_ne!(a, b);
    }

    #[test]
    fn unwritable_location_still_yields_a_stable_id() {
        let dir = TempDir::new().unwrap();
        // A regular file where a directory is expected makes the write fail.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let provider = FileDeviceIdentity::new(blocker.join("device_id"));

        let first = provider.get_or_create_device_id();
        let second = provider.get_or_create_device_id();
        assert_eq!(first, second);
        assert!(!blocker.join("device_id").exists());
    }

    #[test]
    fn base36_matches_known_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_700_000_000_000), "loyw3v28");
    }
}
