//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// evdev driver device properties (XInput 1.5 properties)
pub mod props {
    use crate::codec::PropertyWidth;
    use crate::types::PropertyDescriptor;

    pub const AXIS_CALIBRATION: &str = "Evdev Axis Calibration";
    pub const AXES_SWAP: &str = "Evdev Axes Swap";
    pub const AXIS_INVERSION: &str = "Evdev Axis Inversion";

    /// min_x, max_x, min_y, max_y
    pub const CALIBRATION: PropertyDescriptor = PropertyDescriptor::new(AXIS_CALIBRATION, PropertyWidth::Bits32, 4);

    /// Single swap flag
    pub const SWAP: PropertyDescriptor = PropertyDescriptor::new(AXES_SWAP, PropertyWidth::Bits8, 1);

    /// invert_x, invert_y
    pub const INVERSION: PropertyDescriptor = PropertyDescriptor::new(AXIS_INVERSION, PropertyWidth::Bits8, 2);

    /// Upper bound on items requested when reading a property
    pub const MAX_ITEMS: u32 = 1000;
}

/// Persistence output constants
pub mod output {
    /// Substituted when the kernel device name cannot be determined
    pub const PLACEHOLDER_NAME: &str = "!!Name_Of_TouchScreen!!";

    /// Identifier used for the generated xorg.conf.d InputClass section
    pub const SNIPPET_IDENTIFIER: &str = "calibration";
}

/// Filesystem locations
pub mod paths {
    /// Kernel input class directory
    pub const SYSFS_INPUT: &str = "/sys/class/input";

    /// Device name file relative to a sysfs event node
    pub const SYSFS_DEVNAME: &str = "device/name";

    /// evdev device nodes
    pub const DEV_INPUT: &str = "/dev/input";

    /// Default xorg.conf.d locations probed for snippet support
    pub const XORG_CONF_DIRS: [&str; 2] = ["/etc/X11/xorg.conf.d", "/usr/share/X11/xorg.conf.d"];

    /// Suggested file for the xorg.conf.d snippet
    pub const SNIPPET_FILE: &str = "/etc/X11/xorg.conf.d/99-calibration.conf";

    /// Suggested file for the HAL policy snippet
    pub const POLICY_FILE: &str = "/etc/hal/fdi/policy/touchscreen.fdi";
}

/// Configuration file constants
pub mod config {
    /// Directory under the XDG config dir
    pub const APP_DIR: &str = "evdev-calibrate";

    /// Config file name
    pub const FILENAME: &str = "config.toml";

    /// Environment variable overriding the configured output type
    pub const OUTPUT_TYPE_ENV: &str = "CALIBRATE_OUTPUT_TYPE";
}
