//! Id-addressed item tables for instruments and waveforms.

use alloc::vec::Vec;

use crate::instrument::Instrument;
use crate::waveform::Waveform;

/// Maximum number of items a table can hold (ids 0-63).
pub const MAX_TABLE_ITEMS: usize = 64;

/// A table of items addressed by a small id, as referenced from track rows.
#[derive(Clone, Debug)]
pub struct Table<T> {
    items: Vec<Option<T>>,
}

pub type InstrumentTable = Table<Instrument>;
pub type WaveformTable = Table<Waveform>;

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Table<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an item. Unknown ids return `None`.
    pub fn get(&self, id: u8) -> Option<&T> {
        self.items.get(id as usize).and_then(Option::as_ref)
    }

    /// Store an item under `id`, returning the previous one.
    /// Ids at or past `MAX_TABLE_ITEMS` are rejected and handed back.
    pub fn insert(&mut self, id: u8, item: T) -> Result<Option<T>, T> {
        let index = id as usize;
        if index >= MAX_TABLE_ITEMS {
            return Err(item);
        }
        if self.items.len() <= index {
            self.items.resize_with(index + 1, || None);
        }
        Ok(self.items[index].replace(item))
    }

    pub fn remove(&mut self, id: u8) -> Option<T> {
        self.items.get_mut(id as usize).and_then(Option::take)
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.items.iter().filter(|i| i.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over `(id, item)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &T)> {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| item.as_ref().map(|item| (i as u8, item)))
    }
}
