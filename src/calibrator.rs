//! One calibration pass against an open device

use std::io::Write;

use tracing::{info, warn};

use crate::apply::{self, ApplyReport};
use crate::bridge::PropertyBridge;
use crate::calibration::CalibrationState;
use crate::persist::{self, PersistTarget, Strategy};
use crate::transport::PropertyTransport;
use crate::types::CalibrationValue;

/// Holds the detected baseline; the only way to build one is through detection
pub struct Calibrator<'t, T: PropertyTransport + ?Sized> {
    bridge: PropertyBridge<'t, T>,
    state: CalibrationState,
}

impl<'t, T: PropertyTransport + ?Sized> Calibrator<'t, T> {
    pub fn new(transport: &'t T, defaults: CalibrationValue) -> Self {
        let bridge = PropertyBridge::new(transport);
        let state = CalibrationState::detect(&bridge, defaults);
        Self { bridge, state }
    }

    pub fn state(&self) -> &CalibrationState {
        &self.state
    }

    /// Write `new_axys` to the device
    pub fn apply(&mut self, new_axys: &CalibrationValue) -> ApplyReport {
        let report = apply::apply(&self.bridge, self.state.original(), new_axys);
        self.state.current = *new_axys;
        report
    }

    /// Apply `new_axys`, then emit it with `strategy` even if applying failed
    pub fn finish<W: Write>(
        &mut self,
        new_axys: &CalibrationValue,
        strategy: Strategy,
        target: &PersistTarget<'_>,
        out: &mut W,
    ) -> bool {
        let report = self.apply(new_axys);
        let applied = report.succeeded();
        if !applied {
            warn!(failed = ?report.failed_steps(), "calibration only partially applied, still writing persistence output");
        }

        let persisted = persist::persist(out, new_axys, strategy, target);

        info!(applied = applied, persisted = persisted, steps = ?report.steps(), "calibration finished");
        applied && persisted
    }
}
