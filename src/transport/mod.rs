//! The seam between property logic and the X server
//!
//! `Session` speaks XInput over a real connection; tests swap in
//! `mock::MockTransport`, which keeps properties in memory and records every
//! write so assertions can check exactly what reached the device.

#[cfg(test)]
pub mod mock;

use x11rb::protocol::xproto::Atom;

use crate::codec::PropertyWidth;
use crate::error::TransportError;

/// A device property as returned by the server, payload still packed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProperty {
    /// Type atom (INTEGER for every property this tool touches)
    pub type_: Atom,
    pub width: PropertyWidth,
    pub count: usize,
    pub data: Vec<u8>,
}

/// Blocking property round trips against one open device
pub trait PropertyTransport {
    /// Look up (or create) the atom for a property name
    fn intern(&self, name: &str) -> Result<Atom, TransportError>;

    /// Read up to `max_items` items; `max_items == 0` only probes type and format
    fn get_property(&self, property: Atom, max_items: u32) -> Result<RawProperty, TransportError>;

    /// Replace the property with `count` packed items of `width`
    fn change_property(
        &self,
        property: Atom,
        width: PropertyWidth,
        count: usize,
        data: &[u8],
    ) -> Result<(), TransportError>;

    /// Wait until the server has processed everything sent so far
    fn sync(&self) -> Result<(), TransportError>;
}
