#![forbid(unsafe_code)]

mod apply;
mod bridge;
mod calibration;
mod calibrator;
mod cli;
mod codec;
mod config;
mod constants;
mod device;
mod error;
mod hardware;
mod persist;
mod transport;
mod types;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use bridge::PropertyBridge;
use calibrator::Calibrator;
use cli::{Cli, Command};
use config::Settings;
use constants::props;
use device::Session;
use persist::{HostCapabilities, OutputType, PersistTarget, Strategy};
use transport::PropertyTransport;
use types::{AxisRange, CalibrationValue, DeviceIdentity};

fn init_logging() -> Result<()> {
    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    // stdout is reserved for snippets and reports
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn list() -> Result<()> {
    let devices = device::list_input_devices().context("Failed to list input devices")?;
    for d in devices {
        match d.axes {
            Some((x, y)) => println!(
                "{:>3}  {:<28} {}  (x: {}..{}, y: {}..{})",
                d.id, d.use_, d.name, x.min, x.max, y.min, y.max
            ),
            None => println!("{:>3}  {:<28} {}", d.id, d.use_, d.name),
        }
    }
    Ok(())
}

fn show(device: &str, json: bool) -> Result<()> {
    let session = Session::open(&DeviceIdentity::parse(device))?;
    let calibrator = Calibrator::new(&session, session.device().default_calibration());

    if json {
        println!("{}", serde_json::to_string_pretty(calibrator.state())?);
    } else {
        println!("{}", calibrator.state().current);
    }
    Ok(())
}

fn calibrate(device: &str, new_axys: CalibrationValue, output_type: Option<OutputType>) -> Result<()> {
    let settings = Settings::load()?;
    let session = Session::open(&DeviceIdentity::parse(device))?;
    let entry = session.device().clone();

    let mut calibrator = Calibrator::new(&session, entry.default_calibration());

    let host = HostCapabilities::probe(&settings.xorg_conf_dirs);
    let strategy = output_type.unwrap_or(settings.output_type).resolve(&host);
    let hardware_name = match strategy {
        Strategy::RuntimeCommands => None,
        Strategy::ConfigSnippet | Strategy::PolicySnippet => {
            hardware::hardware_name(&settings.sysfs_input_dir, &settings.dev_input_dir, &entry.name)
        }
    };
    let target = PersistTarget {
        device_name: &entry.name,
        hardware_name: hardware_name.as_deref(),
        snippet_path: &settings.snippet_path,
        policy_path: &settings.policy_path,
    };

    let mut stdout = std::io::stdout().lock();
    if !calibrator.finish(&new_axys, strategy, &target, &mut stdout) {
        anyhow::bail!("calibration of \"{}\" was only partially applied", entry.name);
    }
    Ok(())
}

fn get_prop(device: &str, name: &str) -> Result<()> {
    let session = Session::open_any(&DeviceIdentity::parse(device))?;
    let bridge = PropertyBridge::new(&session);

    let value = bridge.get(name, props::MAX_ITEMS)?;
    let items: Vec<String> = value.items.iter().map(i32::to_string).collect();
    println!("{name} ({}): {}", value.width.bits(), items.join(", "));
    Ok(())
}

fn set_prop(device: &str, name: &str, width: Option<u8>, values: &[i32]) -> Result<()> {
    let session = Session::open_any(&DeviceIdentity::parse(device))?;
    let bridge = PropertyBridge::new(&session);

    bridge.set(name, width, values)?;
    session.sync().context("Failed to synchronize with the X server")?;
    info!(property = %name, values = ?values, "property updated");
    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    match cli.command {
        Command::List => list(),
        Command::Show { device, json } => show(&device, json),
        Command::Apply {
            device,
            min_x,
            max_x,
            min_y,
            max_y,
            swap,
            output_type,
        } => calibrate(
            &device,
            CalibrationValue::new(AxisRange::new(min_x, max_x), AxisRange::new(min_y, max_y), swap),
            output_type,
        ),
        Command::GetProp { device, name } => get_prop(&device, &name),
        Command::SetProp {
            device,
            name,
            width,
            values,
        } => set_prop(&device, &name, width, &values),
    }
}
