//! Named, typed property access on an open device
//!
//! Mirrors `xinput list-props` / `xinput set-int-prop`: callers deal in
//! property names and plain integers, the bridge resolves atoms and packs
//! payloads.

use tracing::debug;
use x11rb::protocol::xproto::Atom;

use crate::codec::{self, PropertyWidth};
use crate::error::{PropertyError, TransportError};
use crate::transport::PropertyTransport;
use crate::types::{is_numeric_id, PropertyDescriptor};

/// A decoded property read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyValue {
    pub type_: Atom,
    pub width: PropertyWidth,
    pub items: Vec<i32>,
}

impl PropertyValue {
    /// True when the property holds integers of `width`
    pub fn is_integer(&self, width: PropertyWidth) -> bool {
        self.width == width && self.type_ == Atom::from(x11rb::protocol::xproto::AtomEnum::INTEGER)
    }

    /// True when the property has exactly the format and item count of `desc`
    pub fn has_shape(&self, desc: &PropertyDescriptor) -> bool {
        self.is_integer(desc.width) && self.items.len() == desc.count
    }
}

pub struct PropertyBridge<'t, T: PropertyTransport + ?Sized> {
    transport: &'t T,
}

impl<'t, T: PropertyTransport + ?Sized> PropertyBridge<'t, T> {
    pub fn new(transport: &'t T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &'t T {
        self.transport
    }

    /// Resolve a property name; all-digit names are already atoms
    pub fn resolve(&self, name: &str) -> Result<Atom, TransportError> {
        if is_numeric_id(name) {
            name.parse::<Atom>()
                .map_err(|e| TransportError::Rejected(format!("invalid atom number {name}: {e}")))
        } else {
            self.transport.intern(name)
        }
    }

    /// Read up to `max_items` items of `name`
    ///
    /// An existing but empty property is `Ok` with no items; a missing one is an error.
    pub fn get(&self, name: &str, max_items: u32) -> Result<PropertyValue, PropertyError> {
        let read_err = |source| PropertyError::Read {
            name: name.to_string(),
            source,
        };

        let atom = self.resolve(name).map_err(read_err)?;
        let raw = self.transport.get_property(atom, max_items).map_err(read_err)?;
        let mut items = codec::decode(&raw.data, raw.width.bits(), raw.count)?;
        // The request length is in 32-bit units, so narrow formats can overshoot
        items.truncate(max_items as usize);

        debug!(property = %name, atom = atom, format = raw.width.bits(), items = ?items, "read property");
        Ok(PropertyValue {
            type_: raw.type_,
            width: raw.width,
            items,
        })
    }

    /// Replace `name` with `items`
    ///
    /// With `width == None` the current format of the property is probed
    /// first and reused.
    pub fn set(&self, name: &str, width: Option<u8>, items: &[i32]) -> Result<(), PropertyError> {
        if items.is_empty() {
            return Err(PropertyError::Empty(name.to_string()));
        }

        let bits = match width {
            Some(bits) => bits,
            None => self
                .get(name, 0)
                .map_err(|_| PropertyError::Missing(name.to_string()))?
                .width
                .bits(),
        };
        let data = codec::encode(items, bits)?;
        let width = PropertyWidth::try_from(bits)?;

        let write_err = |source| PropertyError::Write {
            name: name.to_string(),
            source,
        };
        let atom = self.resolve(name).map_err(write_err)?;

        self.transport
            .change_property(atom, width, items.len(), &data)
            .map_err(write_err)?;

        debug!(property = %name, atom = atom, format = width.bits(), items = ?items, "wrote property");
        Ok(())
    }
}
