//! Output formats that make a calibration outlive the current X session

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use nix::unistd::{self, AccessFlags};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::constants::{output, props};
use crate::types::CalibrationValue;

/// Requested output type (`auto` picks one based on the host)
#[derive(ValueEnum, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputType {
    #[default]
    #[serde(rename = "auto")]
    Auto,
    #[value(name = "xorg.conf.d")]
    #[serde(rename = "xorg.conf.d")]
    XorgConfD,
    #[serde(rename = "hal")]
    Hal,
    #[serde(rename = "xinput")]
    Xinput,
}

impl OutputType {
    pub fn parse(s: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(s.trim(), true).ok()
    }

    /// Pick the concrete strategy; `Auto` never yields the policy snippet
    pub fn resolve(self, host: &HostCapabilities) -> Strategy {
        match self {
            Self::Auto if host.xorg_conf_d => Strategy::ConfigSnippet,
            Self::Auto => Strategy::RuntimeCommands,
            Self::XorgConfD => Strategy::ConfigSnippet,
            Self::Hal => Strategy::PolicySnippet,
            Self::Xinput => Strategy::RuntimeCommands,
        }
    }
}

/// A concrete persistence format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// xorg.conf.d InputClass section
    ConfigSnippet,
    /// HAL fdi policy match block
    PolicySnippet,
    /// `xinput set-int-prop` lines for a session start script
    RuntimeCommands,
}

/// What the host supports, probed once per run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HostCapabilities {
    pub xorg_conf_d: bool,
}

impl HostCapabilities {
    /// The X server reads snippets if any of `dirs` is a directory the
    /// current user can create files in
    pub fn probe(dirs: &[PathBuf]) -> Self {
        let xorg_conf_d = dirs.iter().any(|dir| is_writable_dir(dir));
        debug!(xorg_conf_d = xorg_conf_d, "probed host capabilities");
        Self { xorg_conf_d }
    }
}

fn is_writable_dir(path: &Path) -> bool {
    path.is_dir() && unistd::access(path, AccessFlags::W_OK | AccessFlags::X_OK).is_ok()
}

/// Everything a persistence artifact is keyed on besides the values
#[derive(Debug, Clone)]
pub struct PersistTarget<'a> {
    /// XInput device name, used by the runtime commands
    pub device_name: &'a str,
    /// Kernel product name, used by the snippets; `None` means placeholder
    pub hardware_name: Option<&'a str>,
    pub snippet_path: &'a Path,
    pub policy_path: &'a Path,
}

/// Emit `value` in the format of `strategy`
pub fn persist<W: Write>(
    out: &mut W,
    value: &CalibrationValue,
    strategy: Strategy,
    target: &PersistTarget<'_>,
) -> bool {
    info!(strategy = ?strategy, "Making the calibration permanent");
    let result = match strategy {
        Strategy::ConfigSnippet => write_config_snippet(out, value, target),
        Strategy::PolicySnippet => write_policy_snippet(out, value, target),
        Strategy::RuntimeCommands => write_runtime_commands(out, value, target),
    };

    match result.and_then(|()| out.flush()) {
        Ok(()) => true,
        Err(e) => {
            error!(strategy = ?strategy, error = %e, "failed to write persistence output");
            false
        }
    }
}

fn calibration_field(value: &CalibrationValue) -> String {
    let [min_x, max_x, min_y, max_y] = value.axis_items();
    format!("{min_x} {max_x} {min_y} {max_y}")
}

fn write_placeholder_hint<W: Write>(out: &mut W, target: &PersistTarget<'_>, what: &str) -> io::Result<()> {
    if target.hardware_name.is_none() {
        writeln!(out)?;
        writeln!(
            out,
            "Change '{}' to your device's name in the {what} above.",
            output::PLACEHOLDER_NAME
        )?;
    }
    Ok(())
}

fn write_config_snippet<W: Write>(out: &mut W, value: &CalibrationValue, target: &PersistTarget<'_>) -> io::Result<()> {
    let name = target.hardware_name.unwrap_or(output::PLACEHOLDER_NAME);

    writeln!(out, "  copy the snippet below into '{}'", target.snippet_path.display())?;
    writeln!(out, "Section \"InputClass\"")?;
    writeln!(out, "\tIdentifier\t\"{}\"", output::SNIPPET_IDENTIFIER)?;
    writeln!(out, "\tMatchProduct\t\"{name}\"")?;
    writeln!(out, "\tOption\t\"Calibration\"\t\"{}\"", calibration_field(value))?;
    writeln!(out, "\tOption\t\"SwapAxes\"\t\"{}\"", u8::from(value.swap_xy))?;
    writeln!(out, "EndSection")?;

    write_placeholder_hint(out, target, "snippet")
}

fn write_policy_snippet<W: Write>(out: &mut W, value: &CalibrationValue, target: &PersistTarget<'_>) -> io::Result<()> {
    let name = target.hardware_name.unwrap_or(output::PLACEHOLDER_NAME);

    writeln!(out, "  copy the policy below into '{}'", target.policy_path.display())?;
    writeln!(out, "<match key=\"info.product\" contains=\"{name}\">")?;
    writeln!(
        out,
        "  <merge key=\"input.x11_options.calibration\" type=\"string\">{}</merge>",
        calibration_field(value)
    )?;
    writeln!(
        out,
        "  <merge key=\"input.x11_options.swapaxes\" type=\"string\">{}</merge>",
        u8::from(value.swap_xy)
    )?;
    writeln!(out, "</match>")?;

    write_placeholder_hint(out, target, "config")
}

fn write_runtime_commands<W: Write>(out: &mut W, value: &CalibrationValue, target: &PersistTarget<'_>) -> io::Result<()> {
    writeln!(
        out,
        "  Install the 'xinput' tool and copy the command(s) below in a script that starts with your X session"
    )?;
    writeln!(
        out,
        "    xinput set-int-prop \"{}\" \"{}\" {} {}",
        target.device_name,
        props::CALIBRATION.name,
        props::CALIBRATION.width.bits(),
        calibration_field(value)
    )?;
    writeln!(
        out,
        "    xinput set-int-prop \"{}\" \"{}\" {} {}",
        target.device_name,
        props::SWAP.name,
        props::SWAP.width.bits(),
        u8::from(value.swap_xy)
    )
}
