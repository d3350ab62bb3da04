//! Reading the calibration currently active on a device

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::apply::set_calibration;
use crate::bridge::PropertyBridge;
use crate::constants::props;
use crate::transport::PropertyTransport;
use crate::types::CalibrationValue;

/// Calibration as found at startup plus the value being applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalibrationState {
    original: CalibrationValue,
    pub current: CalibrationValue,
}

impl CalibrationState {
    /// Read axis calibration, swap and inversion from the device, in that order
    ///
    /// `defaults` is the value held before any property is read (normally the
    /// device's valuator ranges). Properties that are absent or have an
    /// unexpected shape leave the corresponding part of `defaults` in place.
    #[tracing::instrument(skip(bridge))]
    pub fn detect<T: PropertyTransport + ?Sized>(
        bridge: &PropertyBridge<'_, T>,
        defaults: CalibrationValue,
    ) -> Self {
        let mut value = defaults;

        match bridge.get(props::CALIBRATION.name, props::MAX_ITEMS) {
            Ok(prop) if prop.is_integer(props::CALIBRATION.width) => {
                if prop.items.is_empty() {
                    // QUIRK: after resume from suspend the property can come back
                    // empty while the old calibration is still active in the driver.
                    // Re-assert the held value so the next pass computes against it.
                    debug!("Evdev Axis Calibration not set, setting to axis valuators to be sure");
                    if let Err(e) = set_calibration(bridge, &value) {
                        warn!(error = %e, "failed to restore axis calibration");
                    }
                } else if let &[min_x, max_x, min_y, max_y, ..] = prop.items.as_slice() {
                    value.x.min = min_x;
                    value.x.max = max_x;
                    value.y.min = min_y;
                    value.y.max = max_y;
                } else {
                    warn!(items = ?prop.items, "axis calibration has fewer than 4 items, ignoring");
                }
            }
            Ok(prop) => {
                warn!(format = prop.width.bits(), type_ = prop.type_, "axis calibration is not 32-bit INTEGER, ignoring")
            }
            Err(e) => warn!(error = %e, "could not read axis calibration"),
        }

        match bridge.get(props::SWAP.name, props::MAX_ITEMS) {
            Ok(prop) if prop.has_shape(&props::SWAP) => {
                value.swap_xy = prop.items[0] != 0;
                debug!(swap_xy = prop.items[0], "Read axes swap value");
            }
            Ok(prop) => debug!(items = ?prop.items, "ignoring unexpected axes swap property"),
            Err(e) => debug!(error = %e, "no axes swap property"),
        }

        match bridge.get(props::INVERSION.name, props::MAX_ITEMS) {
            Ok(prop) if prop.has_shape(&props::INVERSION) => {
                let invert_x = prop.items[0] != 0;
                let invert_y = prop.items[1] != 0;
                debug!(invert_x = invert_x, invert_y = invert_y, "Read axis inversion");

                if invert_x {
                    value.x.invert();
                }
                if invert_y {
                    value.y.invert();
                }
            }
            Ok(prop) => debug!(items = ?prop.items, "ignoring unexpected axis inversion property"),
            Err(e) => debug!(error = %e, "no axis inversion property"),
        }

        info!(current = %value, "current calibration values (from XInput)");

        Self {
            original: value,
            current: value,
        }
    }

    /// Baseline captured by `detect`; never changes afterwards
    pub fn original(&self) -> &CalibrationValue {
        &self.original
    }
}
