//! Command line interface
use clap::{Parser, Subcommand};

use crate::persist::OutputType;

#[derive(Parser, Debug)]
#[command(author, version, about = "Dynamic axis calibration for evdev touchscreens under X11")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the input devices known to the X server
    List,

    /// Print the calibration currently active on a device
    Show {
        /// Device name or numeric XInput id
        #[arg(short, long)]
        device: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply a calibration and print how to make it permanent
    Apply {
        /// Device name or numeric XInput id
        #[arg(short, long)]
        device: String,

        #[arg(long, allow_negative_numbers = true)]
        min_x: i32,

        #[arg(long, allow_negative_numbers = true)]
        max_x: i32,

        #[arg(long, allow_negative_numbers = true)]
        min_y: i32,

        #[arg(long, allow_negative_numbers = true)]
        max_y: i32,

        /// Swap the X and Y axes
        #[arg(long)]
        swap: bool,

        /// Persistence format (defaults to the configured one)
        #[arg(long, value_enum)]
        output_type: Option<OutputType>,
    },

    /// Read an integer device property
    GetProp {
        #[arg(short, long)]
        device: String,

        /// Property name, or its atom number
        name: String,
    },

    /// Write an integer device property
    SetProp {
        #[arg(short, long)]
        device: String,

        /// Property name, or its atom number
        name: String,

        /// Format width (8, 16 or 32); probed from the device when omitted
        #[arg(long)]
        width: Option<u8>,

        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<i32>,
    },
}
