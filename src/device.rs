//! Opening an XInput device and talking to its properties
//!
//! A `Session` owns both the X connection and the opened device. Dropping it
//! closes the device and then the connection, so every early return (including
//! a failed validation inside `Session::open`) releases both.

use anyhow::Context;
use tracing::{debug, info, warn};
use x11rb::connection::RequestConnection;
use x11rb::protocol::xinput::{self, ChangeDevicePropertyAux, ConnectionExt as _, GetDevicePropertyItems};
use x11rb::protocol::xproto::{Atom, AtomEnum, ConnectionExt as _, PropMode};
use x11rb::rust_connection::RustConnection;

use crate::bridge::PropertyBridge;
use crate::codec::PropertyWidth;
use crate::constants::props;
use crate::error::{DeviceError, TransportError};
use crate::transport::{PropertyTransport, RawProperty};
use crate::types::{AxisRange, CalibrationValue, DeviceIdentity};

/// One entry of `XListInputDevices`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEntry {
    pub id: u8,
    pub name: String,
    pub use_: String,
    /// First two valuator axes, if the device reports any
    pub axes: Option<(AxisRange, AxisRange)>,
}

impl DeviceEntry {
    /// Calibration held before the device's properties are read
    pub fn default_calibration(&self) -> CalibrationValue {
        let (x, y) = self.axes.unwrap_or_default();
        CalibrationValue::new(x, y, false)
    }
}

/// Pick the single device matching `identity`
///
/// Numeric identities only match ids and names only match names exactly.
pub fn resolve_device<'d>(devices: &'d [DeviceEntry], identity: &DeviceIdentity) -> Result<&'d DeviceEntry, DeviceError> {
    let matches: Vec<&DeviceEntry> = devices
        .iter()
        .filter(|d| match identity {
            DeviceIdentity::Id(id) => u32::from(d.id) == *id,
            DeviceIdentity::Name(name) => d.name == *name,
        })
        .collect();

    match matches.as_slice() {
        [device] => Ok(*device),
        [] => Err(DeviceError::NotFound(identity.to_string())),
        many => Err(DeviceError::Ambiguous {
            name: identity.to_string(),
            count: many.len(),
        }),
    }
}

/// Fail with `Unsupported` unless the device carries an axis calibration property
pub fn ensure_calibratable<T: PropertyTransport + ?Sized>(transport: &T) -> Result<(), DeviceError> {
    let bridge = PropertyBridge::new(transport);

    bridge
        .get(props::AXIS_CALIBRATION, props::MAX_ITEMS)
        .map_err(|source| DeviceError::Unsupported {
            property: props::AXIS_CALIBRATION,
            source,
        })?;

    for optional in [props::AXES_SWAP, props::AXIS_INVERSION] {
        if let Err(e) = bridge.get(optional, 0) {
            warn!(property = %optional, error = %e, "optional calibration property missing");
        }
    }
    Ok(())
}

fn connect() -> Result<RustConnection, DeviceError> {
    let (conn, screen_num) = x11rb::connect(None)?;
    debug!(screen = screen_num, "successfully connected to x11");

    if conn.extension_information(xinput::X11_EXTENSION_NAME)?.is_none() {
        return Err(DeviceError::MissingExtension);
    }
    Ok(conn)
}

#[tracing::instrument(skip(conn))]
fn query_devices(conn: &RustConnection) -> Result<Vec<DeviceEntry>, DeviceError> {
    let reply = conn.xinput_list_input_devices()?.reply()?;

    // Class infos are concatenated across devices in device order
    let mut infos = reply.infos.iter();
    let devices = reply
        .devices
        .iter()
        .zip(reply.names.iter())
        .map(|(info, name)| {
            let mut axes = None;
            for class in infos.by_ref().take(usize::from(info.num_class_info)) {
                if let xinput::InputInfoInfo::Valuator(valuator) = &class.info {
                    if let [x, y, ..] = valuator.axes.as_slice() {
                        axes.get_or_insert((
                            AxisRange::new(x.minimum, x.maximum),
                            AxisRange::new(y.minimum, y.maximum),
                        ));
                    }
                }
            }
            DeviceEntry {
                id: info.device_id,
                name: String::from_utf8_lossy(&name.name).into_owned(),
                use_: format!("{:?}", info.device_use),
                axes,
            }
        })
        .collect();
    Ok(devices)
}

/// All input devices known to the X server
pub fn list_input_devices() -> Result<Vec<DeviceEntry>, DeviceError> {
    let conn = connect()?;
    query_devices(&conn)
}

/// Exclusive ownership of an X connection and one opened XInput device
pub struct Session {
    conn: Option<RustConnection>,
    device: Option<u8>,
    entry: DeviceEntry,
}

impl Session {
    /// Open a device that can be calibrated
    pub fn open(identity: &DeviceIdentity) -> Result<Self, DeviceError> {
        let session = Self::open_any(identity)?;
        // On failure `session` is dropped here, releasing device and connection
        ensure_calibratable(&session)?;

        info!(device = %session.entry.name, id = session.entry.id, "Calibrating EVDEV driver");
        Ok(session)
    }

    /// Open any input device, without checking its properties
    pub fn open_any(identity: &DeviceIdentity) -> Result<Self, DeviceError> {
        let conn = connect()?;
        let devices = query_devices(&conn)?;
        let entry = resolve_device(&devices, identity)?.clone();

        conn.xinput_open_device(entry.id)?.reply()?;

        debug!(device = %entry.name, id = entry.id, "opened input device");

        // From here on Drop releases the device and the connection
        Ok(Self {
            conn: Some(conn),
            device: Some(entry.id),
            entry,
        })
    }

    pub fn device(&self) -> &DeviceEntry {
        &self.entry
    }

    /// Close the device, then the connection; further calls do nothing
    ///
    /// The X round trip itself needs a live server; the idempotence and the
    /// closed state are covered by tests on a session without a connection.
    pub fn close(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };
        if let Some(id) = self.device.take() {
            let closed = conn
                .xinput_close_device(id)
                .context("Failed to send CloseDevice")
                .and_then(|cookie| cookie.check().context("CloseDevice failed"));
            match closed {
                Ok(()) => debug!(id = id, "closed input device"),
                Err(e) => warn!(id = id, error = ?e, "failed to close input device"),
            }
        }
        drop(conn);
    }

    fn parts(&self) -> Result<(&RustConnection, u8), TransportError> {
        match (&self.conn, self.device) {
            (Some(conn), Some(id)) => Ok((conn, id)),
            _ => Err(TransportError::Closed),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

impl PropertyTransport for Session {
    fn intern(&self, name: &str) -> Result<Atom, TransportError> {
        let (conn, _) = self.parts()?;
        let atom = conn.intern_atom(false, name.as_bytes())?.reply()?.atom;
        if atom == x11rb::NONE {
            return Err(TransportError::Rejected(format!("invalid property {name}")));
        }
        Ok(atom)
    }

    fn get_property(&self, property: Atom, max_items: u32) -> Result<RawProperty, TransportError> {
        let (conn, id) = self.parts()?;
        let reply = conn
            .xinput_get_device_property(property, Atom::from(AtomEnum::ANY), 0, max_items, id, false)?
            .reply()?;

        if reply.type_ == x11rb::NONE {
            return Err(TransportError::NoSuchProperty);
        }

        let (width, data) = match reply.items {
            GetDevicePropertyItems::Data8(v) => (PropertyWidth::Bits8, v),
            GetDevicePropertyItems::Data16(v) => (PropertyWidth::Bits16, v.iter().flat_map(|x| x.to_ne_bytes()).collect()),
            GetDevicePropertyItems::Data32(v) => (PropertyWidth::Bits32, v.iter().flat_map(|x| x.to_ne_bytes()).collect()),
            GetDevicePropertyItems::InvalidValue(format) => {
                return Err(TransportError::Rejected(format!("unexpected property format {format}")));
            }
        };

        Ok(RawProperty {
            type_: reply.type_,
            width,
            count: data.len() / width.bytes(),
            data,
        })
    }

    fn change_property(
        &self,
        property: Atom,
        width: PropertyWidth,
        count: usize,
        data: &[u8],
    ) -> Result<(), TransportError> {
        let (conn, id) = self.parts()?;
        let items = match width {
            PropertyWidth::Bits8 => ChangeDevicePropertyAux::Data8(data.to_vec()),
            PropertyWidth::Bits16 => ChangeDevicePropertyAux::Data16(
                data.chunks_exact(2).map(|c| u16::from_ne_bytes([c[0], c[1]])).collect(),
            ),
            PropertyWidth::Bits32 => ChangeDevicePropertyAux::Data32(
                data.chunks_exact(4).map(|c| u32::from_ne_bytes([c[0], c[1], c[2], c[3]])).collect(),
            ),
        };
        let num_items = u32::try_from(count)
            .map_err(|_| TransportError::Rejected(format!("too many items ({count})")))?;

        conn.xinput_change_device_property(
            property,
            Atom::from(AtomEnum::INTEGER),
            id,
            PropMode::REPLACE,
            num_items,
            &items,
        )?
        .check()?;
        Ok(())
    }

    fn sync(&self) -> Result<(), TransportError> {
        let (conn, _) = self.parts()?;
        // Same round trip XSync uses
        conn.get_input_focus()?.reply()?;
        Ok(())
    }
}
