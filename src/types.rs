//! Core data types shared across the calibration pipeline

use serde::Serialize;
use std::fmt;

use crate::codec::PropertyWidth;

/// Raw calibration bounds for one axis
/// min > max is legal and means the axis is inverted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AxisRange {
    pub min: i32,
    pub max: i32,
}

impl AxisRange {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Exchange min and max (axis inversion folded into the range)
    pub fn invert(&mut self) {
        std::mem::swap(&mut self.min, &mut self.max);
    }
}

/// One complete calibration snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CalibrationValue {
    pub x: AxisRange,
    pub y: AxisRange,
    pub swap_xy: bool,
}

impl CalibrationValue {
    pub fn new(x: AxisRange, y: AxisRange, swap_xy: bool) -> Self {
        Self { x, y, swap_xy }
    }

    /// Items in `Evdev Axis Calibration` order
    pub fn axis_items(&self) -> [i32; 4] {
        [self.x.min, self.x.max, self.y.min, self.y.max]
    }
}

impl fmt::Display for CalibrationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "min_x={}, max_x={} and min_y={}, max_y={} (swap_xy={})",
            self.x.min,
            self.x.max,
            self.y.min,
            self.y.max,
            u8::from(self.swap_xy)
        )
    }
}

/// Expected name, format and item count of a device property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDescriptor {
    pub name: &'static str,
    pub width: PropertyWidth,
    pub count: usize,
}

impl PropertyDescriptor {
    pub const fn new(name: &'static str, width: PropertyWidth, count: usize) -> Self {
        Self { name, width, count }
    }
}

/// True for a non-empty string made only of ASCII digits
pub fn is_numeric_id(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// How the user named the device to calibrate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceIdentity {
    Id(u32),
    Name(String),
}

impl DeviceIdentity {
    pub fn parse(s: &str) -> Self {
        if is_numeric_id(s) {
            // Out-of-range ids can never match a device, but must not fall back to name matching
            Self::Id(s.parse().unwrap_or(u32::MAX))
        } else {
            Self::Name(s.to_string())
        }
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id={id}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_id_detection() {
        assert!(is_numeric_id("12"));
        assert!(is_numeric_id("0"));
        assert!(!is_numeric_id(""));
        assert!(!is_numeric_id("12a"));
        assert!(!is_numeric_id("Evdev Axis Calibration"));
        assert!(!is_numeric_id("-3"));
    }

    #[test]
    fn test_device_identity_parse() {
        assert_eq!(DeviceIdentity::parse("11"), DeviceIdentity::Id(11));
        assert_eq!(
            DeviceIdentity::parse("eGalax Inc. USB TouchController"),
            DeviceIdentity::Name("eGalax Inc. USB TouchController".to_string())
        );
        // Digits only, but too large for any id: still an id, never a name
        assert_eq!(
            DeviceIdentity::parse("99999999999999999999"),
            DeviceIdentity::Id(u32::MAX)
        );
    }

    #[test]
    fn test_invert_swaps_bounds() {
        let mut range = AxisRange::new(10, 4000);
        range.invert();
        assert_eq!(range, AxisRange::new(4000, 10));
    }

    #[test]
    fn test_calibration_serializes_for_show() {
        let value = CalibrationValue::new(AxisRange::new(4095, 0), AxisRange::new(0, 4095), true);
        assert_eq!(
            serde_json::to_value(value).unwrap(),
            serde_json::json!({"x": {"min": 4095, "max": 0}, "y": {"min": 0, "max": 4095}, "swap_xy": true})
        );
    }

    #[test]
    fn test_axis_items_order() {
        let value = CalibrationValue::new(AxisRange::new(1, 2), AxisRange::new(3, 4), false);
        assert_eq!(value.axis_items(), [1, 2, 3, 4]);
    }
}
