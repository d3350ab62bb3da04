//! In-memory property transport for unit tests.
//!
//! Properties live in a map keyed by name. Every `change_property` call is
//! recorded (including rejected ones) so tests can assert the exact order and
//! content of writes. Writes to names registered with `fail_writes_to` are
//! rejected without touching the stored value.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use x11rb::protocol::xproto::{Atom, AtomEnum};

use super::{PropertyTransport, RawProperty};
use crate::codec::{self, PropertyWidth};
use crate::error::TransportError;

/// Atoms handed out by the mock start here, well clear of predefined atoms
pub const FIRST_ATOM: Atom = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedWrite {
    pub name: String,
    pub width: PropertyWidth,
    pub items: Vec<i32>,
    pub accepted: bool,
}

#[derive(Default)]
pub struct MockTransport {
    atoms: RefCell<Vec<String>>,
    properties: RefCell<HashMap<String, RawProperty>>,
    failing_writes: HashSet<String>,
    pub writes: RefCell<Vec<RecordedWrite>>,
    pub syncs: Cell<usize>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Device exposing all three evdev properties with the given contents
    pub fn evdev(calibration: &[i32], swap: i32, invert: (i32, i32)) -> Self {
        Self::new()
            .with_property(crate::constants::props::AXIS_CALIBRATION, PropertyWidth::Bits32, calibration)
            .with_property(crate::constants::props::AXES_SWAP, PropertyWidth::Bits8, &[swap])
            .with_property(crate::constants::props::AXIS_INVERSION, PropertyWidth::Bits8, &[invert.0, invert.1])
    }

    pub fn with_property(self, name: &str, width: PropertyWidth, items: &[i32]) -> Self {
        self.store(name, width, items);
        self
    }

    pub fn fail_writes_to(mut self, name: &str) -> Self {
        self.failing_writes.insert(name.to_string());
        self
    }

    pub fn atom_for(&self, name: &str) -> Atom {
        let mut atoms = self.atoms.borrow_mut();
        let index = match atoms.iter().position(|n| n == name) {
            Some(index) => index,
            None => {
                atoms.push(name.to_string());
                atoms.len() - 1
            }
        };
        FIRST_ATOM + index as Atom
    }

    /// Current decoded contents of a property
    pub fn items(&self, name: &str) -> Option<Vec<i32>> {
        self.properties
            .borrow()
            .get(name)
            .map(|p| codec::decode_with(&p.data, p.width, p.count).unwrap())
    }

    /// Items of every write attempted against `name`, in order
    pub fn writes_to(&self, name: &str) -> Vec<Vec<i32>> {
        self.writes
            .borrow()
            .iter()
            .filter(|w| w.name == name)
            .map(|w| w.items.clone())
            .collect()
    }

    fn store(&self, name: &str, width: PropertyWidth, items: &[i32]) {
        self.properties.borrow_mut().insert(
            name.to_string(),
            RawProperty {
                type_: AtomEnum::INTEGER.into(),
                width,
                count: items.len(),
                data: codec::encode_with(items, width),
            },
        );
    }

    fn name_of(&self, atom: Atom) -> Option<String> {
        let index = atom.checked_sub(FIRST_ATOM)? as usize;
        self.atoms.borrow().get(index).cloned()
    }
}

impl PropertyTransport for MockTransport {
    fn intern(&self, name: &str) -> Result<Atom, TransportError> {
        Ok(self.atom_for(name))
    }

    fn get_property(&self, property: Atom, max_items: u32) -> Result<RawProperty, TransportError> {
        let name = self.name_of(property).ok_or(TransportError::NoSuchProperty)?;
        let properties = self.properties.borrow();
        let stored = properties.get(&name).ok_or(TransportError::NoSuchProperty)?;

        // The request length counts 32-bit units, like the X server does
        let count = stored.count.min(max_items as usize * 4 / stored.width.bytes());
        Ok(RawProperty {
            type_: stored.type_,
            width: stored.width,
            count,
            data: stored.data[..count * stored.width.bytes()].to_vec(),
        })
    }

    fn change_property(
        &self,
        property: Atom,
        width: PropertyWidth,
        count: usize,
        data: &[u8],
    ) -> Result<(), TransportError> {
        let name = self
            .name_of(property)
            .ok_or_else(|| TransportError::Rejected(format!("BadAtom {property}")))?;
        let items = codec::decode_with(data, width, count)
            .map_err(|e| TransportError::Rejected(e.to_string()))?;
        let accepted = !self.failing_writes.contains(&name);

        self.writes.borrow_mut().push(RecordedWrite {
            name: name.clone(),
            width,
            items: items.clone(),
            accepted,
        });

        if !accepted {
            return Err(TransportError::Rejected(format!("BadMatch writing {name}")));
        }
        self.store(&name, width, &items);
        Ok(())
    }

    fn sync(&self) -> Result<(), TransportError> {
        self.syncs.set(self.syncs.get() + 1);
        Ok(())
    }
}
