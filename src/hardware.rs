//! Mapping an XInput device name to the kernel's input device name
//!
//! xorg.conf.d and HAL match on the kernel product name. The XInput name is
//! usually the same string; we only trust it when the kernel confirms it.

use std::fs;
use std::path::Path;

use evdev::Device;
use tracing::{debug, info};

use crate::constants::paths;

/// Return `device_name` if a kernel input device carries exactly that name
///
/// `sysfs_input_dir` is checked first; the evdev nodes under `dev_input_dir`
/// are only opened when sysfs has no match.
pub fn hardware_name(sysfs_input_dir: &Path, dev_input_dir: &Path, device_name: &str) -> Option<String> {
    if is_sysfs_name(sysfs_input_dir, device_name) || is_evdev_name(dev_input_dir, device_name) {
        info!(name = %device_name, "matched kernel input device name");
        Some(device_name.to_string())
    } else {
        None
    }
}

/// Scan `<dir>/event*/device/name`
fn is_sysfs_name(dir: &Path, name: &str) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        debug!(path = %dir.display(), "cannot read sysfs input directory");
        return false;
    };

    entries.flatten().any(|entry| {
        let is_event = entry
            .file_name()
            .to_str()
            .is_some_and(|s| s.starts_with("event"));
        is_event
            && fs::read_to_string(entry.path().join(paths::SYSFS_DEVNAME))
                .map(|devname| devname.lines().next() == Some(name))
                .unwrap_or(false)
    })
}

/// Fallback: open the evdev nodes themselves (needs the `input` group)
fn is_evdev_name(dir: &Path, name: &str) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };

    entries.flatten().any(|entry| {
        Device::open(entry.path())
            .map(|device| device.name() == Some(name))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fake_sysfs(devices: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (node, name) in devices {
            let device_dir = dir.path().join(node).join("device");
            fs::create_dir_all(&device_dir).unwrap();
            fs::write(device_dir.join("name"), format!("{name}\n")).unwrap();
        }
        dir
    }

    #[test]
    fn test_sysfs_name_match() {
        let dir = fake_sysfs(&[("event3", "AT Translated Set 2 keyboard"), ("event7", "eGalax Inc. USB TouchController")]);
        assert!(is_sysfs_name(dir.path(), "eGalax Inc. USB TouchController"));
        assert!(!is_sysfs_name(dir.path(), "eGalax Inc."));
    }

    #[test]
    fn test_sysfs_ignores_non_event_nodes() {
        let dir = fake_sysfs(&[("input12", "Wacom Touch"), ("mouse0", "Wacom Touch")]);
        assert!(!is_sysfs_name(dir.path(), "Wacom Touch"));
    }

    #[test]
    fn test_hardware_name_from_sysfs() {
        let sysfs = fake_sysfs(&[("event3", "AT Translated Set 2 keyboard"), ("event7", "eGalax Inc. USB TouchController")]);
        let dev_input = TempDir::new().unwrap();

        assert_eq!(
            hardware_name(sysfs.path(), dev_input.path(), "eGalax Inc. USB TouchController"),
            Some("eGalax Inc. USB TouchController".to_string())
        );
    }

    #[test]
    fn test_hardware_name_no_match() {
        let sysfs = fake_sysfs(&[("event3", "AT Translated Set 2 keyboard")]);
        let dev_input = TempDir::new().unwrap();

        assert_eq!(hardware_name(sysfs.path(), dev_input.path(), "Wacom Touch"), None);
    }

    #[test]
    fn test_hardware_name_prefix_is_not_a_match() {
        let sysfs = fake_sysfs(&[("event7", "eGalax Inc. USB TouchController")]);
        let dev_input = TempDir::new().unwrap();

        assert_eq!(hardware_name(sysfs.path(), dev_input.path(), "eGalax Inc."), None);
        assert_eq!(hardware_name(sysfs.path(), dev_input.path(), "eGalax Inc. USB TouchController 2"), None);
    }

    #[test]
    fn test_evdev_fallback_skips_non_devices() {
        let sysfs = TempDir::new().unwrap();
        let dev_input = TempDir::new().unwrap();
        fs::write(dev_input.path().join("event0"), "not a device").unwrap();
        fs::create_dir(dev_input.path().join("by-id")).unwrap();

        assert!(!is_evdev_name(dev_input.path(), "not a device"));
        assert_eq!(hardware_name(sysfs.path(), dev_input.path(), "not a device"), None);
        assert!(!is_evdev_name(&dev_input.path().join("missing"), "anything"));
    }

    #[test]
    fn test_sysfs_missing_dir() {
        assert!(!is_sysfs_name(Path::new("/nonexistent/sys/class/input"), "anything"));
    }
}
