//! Live application of a calibration to the device
//!
//! Every step is attempted even if an earlier one failed; the outcome of each
//! is collected into an `ApplyReport` and reduced to a single success flag.

use tracing::{debug, error, info};

use crate::bridge::PropertyBridge;
use crate::constants::props;
use crate::error::{PropertyError, TransportError};
use crate::transport::PropertyTransport;
use crate::types::CalibrationValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyStep {
    SwapAxes,
    ResetInversion,
    AxisCalibration,
    Sync,
}

#[derive(thiserror::Error, Debug)]
pub enum StepError {
    #[error(transparent)]
    Property(#[from] PropertyError),

    #[error("failed to synchronize with the X server: {0}")]
    Sync(#[from] TransportError),
}

/// Per-step results of one `apply` pass, in execution order
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub outcomes: Vec<(ApplyStep, Result<(), StepError>)>,
}

impl ApplyReport {
    pub fn succeeded(&self) -> bool {
        self.outcomes.iter().all(|(_, result)| result.is_ok())
    }

    pub fn failed_steps(&self) -> Vec<ApplyStep> {
        self.outcomes
            .iter()
            .filter(|(_, result)| result.is_err())
            .map(|(step, _)| *step)
            .collect()
    }

    pub fn steps(&self) -> Vec<ApplyStep> {
        self.outcomes.iter().map(|(step, _)| *step).collect()
    }

    fn record<E: Into<StepError>>(&mut self, step: ApplyStep, result: Result<(), E>) {
        let result = result.map_err(Into::into);
        match &result {
            Ok(()) => debug!(step = ?step, "calibration step succeeded"),
            Err(e) => error!(step = ?step, error = %e, "calibration step failed"),
        }
        self.outcomes.push((step, result));
    }
}

/// `xinput set-int-prop <dev> "Evdev Axes Swap" 8 <swap>`
pub fn set_swap<T: PropertyTransport + ?Sized>(
    bridge: &PropertyBridge<'_, T>,
    swap_xy: bool,
) -> Result<(), PropertyError> {
    info!(swap_xy = swap_xy, "Swapping X and Y axis");
    bridge.set(props::SWAP.name, Some(props::SWAP.width.bits()), &[i32::from(swap_xy)])
}

/// `xinput set-int-prop <dev> "Evdev Axis Inversion" 8 <x> <y>`
pub fn set_inversion<T: PropertyTransport + ?Sized>(
    bridge: &PropertyBridge<'_, T>,
    invert_x: bool,
    invert_y: bool,
) -> Result<(), PropertyError> {
    info!(invert_x = invert_x, invert_y = invert_y, "Setting axis inversion");
    bridge.set(
        props::INVERSION.name,
        Some(props::INVERSION.width.bits()),
        &[i32::from(invert_x), i32::from(invert_y)],
    )
}

/// `xinput set-int-prop <dev> "Evdev Axis Calibration" 32 <min_x> <max_x> <min_y> <max_y>`
pub fn set_calibration<T: PropertyTransport + ?Sized>(
    bridge: &PropertyBridge<'_, T>,
    value: &CalibrationValue,
) -> Result<(), PropertyError> {
    let items = value.axis_items();
    info!(
        min_x = items[0],
        max_x = items[1],
        min_y = items[2],
        max_y = items[3],
        "Setting calibration data"
    );
    bridge.set(props::CALIBRATION.name, Some(props::CALIBRATION.width.bits()), &items)
}

/// Write `target` to the device, touching swap only if it changed
///
/// Inversion is always cleared: detection folds any device-level inversion
/// into the ranges, so leaving the flag set would invert twice.
pub fn apply<T: PropertyTransport + ?Sized>(
    bridge: &PropertyBridge<'_, T>,
    original: &CalibrationValue,
    target: &CalibrationValue,
) -> ApplyReport {
    info!("Doing dynamic recalibration");
    let mut report = ApplyReport::default();

    if original.swap_xy != target.swap_xy {
        report.record(ApplyStep::SwapAxes, set_swap(bridge, target.swap_xy));
    }

    report.record(ApplyStep::ResetInversion, set_inversion(bridge, false, false));

    report.record(ApplyStep::AxisCalibration, set_calibration(bridge, target));

    report.record(ApplyStep::Sync, bridge.transport().sync());

    report
}
