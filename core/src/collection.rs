//! Keyed collections whose items all belong to one shipper.
//!
//! # Design
//! Items are stored under explicit integer keys so callers can address a
//! position that matches the request batch, insert at arbitrary keys and
//! remove entries without renumbering the rest. Iteration follows key order.
//! The shipper is either fixed up front or adopted from the first item; every
//! later insertion is checked against it.

use std::collections::BTreeMap;

use crate::error::{BalikobotError, Result};

/// Something shipped by a particular carrier.
pub trait Shipped {
    fn shipper(&self) -> &str;
}

/// Ordered, keyed set of items sharing one shipper.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipperCollection<T> {
    shipper: Option<String>,
    items: BTreeMap<usize, T>,
}

impl<T> Default for ShipperCollection<T> {
    fn default() -> Self {
        Self {
            shipper: None,
            items: BTreeMap::new(),
        }
    }
}

impl<T: Shipped> ShipperCollection<T> {
    /// Collection that takes its shipper from the first inserted item.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_shipper(shipper: &str) -> Self {
        Self {
            shipper: Some(shipper.to_string()),
            items: BTreeMap::new(),
        }
    }

    /// Shipper of the collection; fails while it is still unknown.
    pub fn shipper(&self) -> Result<&str> {
        self.shipper.as_deref().ok_or(BalikobotError::EmptyCollection)
    }

    /// Append after the highest key in use.
    pub fn add(&mut self, item: T) -> Result<()> {
        let index = match self.items.keys().next_back() {
            Some(&last) => last.checked_add(1).ok_or(BalikobotError::KeyOverflow(last))?,
            None => 0,
        };
        self.insert(index, item).map(|_| ())
    }

    /// Put `item` at `index`, returning the item it replaced.
    pub fn insert(&mut self, index: usize, item: T) -> Result<Option<T>> {
        self.validate_shipper(item.shipper())?;
        Ok(self.items.insert(index, item))
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(&index)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.items.contains_key(&index)
    }

    pub fn remove(&mut self, index: usize) -> Option<T> {
        self.items.remove(&index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::collections::btree_map::Values<'_, usize, T> {
        self.items.values()
    }

    /// Items in key order, paired with their keys.
    pub fn entries(&self) -> std::collections::btree_map::Iter<'_, usize, T> {
        self.items.iter()
    }

    fn validate_shipper(&mut self, shipper: &str) -> Result<()> {
        match &self.shipper {
            None => {
                self.shipper = Some(shipper.to_string());
                Ok(())
            }
            Some(expected) if expected == shipper => Ok(()),
            Some(expected) => Err(BalikobotError::ShipperMismatch {
                expected: expected.clone(),
                actual: shipper.to_string(),
            }),
        }
    }
}

impl<'a, T> IntoIterator for &'a ShipperCollection<T> {
    type Item = &'a T;
    type IntoIter = std::collections::btree_map::Values<'a, usize, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.values()
    }
}

impl<T> IntoIterator for ShipperCollection<T> {
    type Item = T;
    type IntoIter = std::collections::btree_map::IntoValues<usize, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_values()
    }
}
