//! Packages registered with a carrier and the shipments they are ordered in.

use std::ops::{Deref, DerefMut};

use serde_json::Value;

use crate::collection::{ShipperCollection, Shipped};
use crate::response::{string_field, string_list, string_or_empty};

/// A package accepted by the carrier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedPackage {
    pub package_id: String,
    pub shipper: String,
    pub batch_id: String,
    pub carrier_id: String,
    pub track_url: Option<String>,
    pub label_url: Option<String>,
    pub carrier_id_swap: Option<String>,
    pub pieces: Vec<String>,
    pub final_carrier_id: Option<String>,
    pub final_track_url: Option<String>,
}

impl OrderedPackage {
    pub fn new(package_id: &str, shipper: &str, batch_id: &str, carrier_id: &str) -> Self {
        Self {
            package_id: package_id.to_string(),
            shipper: shipper.to_string(),
            batch_id: batch_id.to_string(),
            carrier_id: carrier_id.to_string(),
            track_url: None,
            label_url: None,
            carrier_id_swap: None,
            pieces: Vec::new(),
            final_carrier_id: None,
            final_track_url: None,
        }
    }

    /// Build from one entry of an `add` response. Absent fields are left empty.
    pub fn from_data(shipper: &str, batch_id: &str, data: &Value) -> Self {
        Self {
            package_id: string_or_empty(data, "package_id"),
            shipper: shipper.to_string(),
            batch_id: batch_id.to_string(),
            carrier_id: string_or_empty(data, "carrier_id"),
            track_url: string_field(data, "track_url"),
            label_url: string_field(data, "label_url"),
            carrier_id_swap: string_field(data, "carrier_id_swap"),
            pieces: string_list(data, "pieces"),
            final_carrier_id: string_field(data, "carrier_id_final"),
            final_track_url: string_field(data, "track_url_final"),
        }
    }
}

impl Shipped for OrderedPackage {
    fn shipper(&self) -> &str {
        &self.shipper
    }
}

/// Ordered packages of one shipper, plus the URL of their merged labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderedPackageCollection {
    packages: ShipperCollection<OrderedPackage>,
    labels_url: Option<String>,
}

impl OrderedPackageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_shipper(shipper: &str) -> Self {
        Self {
            packages: ShipperCollection::for_shipper(shipper),
            labels_url: None,
        }
    }

    pub fn labels_url(&self) -> Option<&str> {
        self.labels_url.as_deref()
    }

    pub fn set_labels_url(&mut self, url: Option<String>) {
        self.labels_url = url;
    }

    pub fn package_ids(&self) -> Vec<String> {
        self.packages.iter().map(|p| p.package_id.clone()).collect()
    }

    pub fn carrier_ids(&self) -> Vec<String> {
        self.packages.iter().map(|p| p.carrier_id.clone()).collect()
    }

    pub fn batch_ids(&self) -> Vec<String> {
        self.packages.iter().map(|p| p.batch_id.clone()).collect()
    }
}

impl Deref for OrderedPackageCollection {
    type Target = ShipperCollection<OrderedPackage>;

    fn deref(&self) -> &Self::Target {
        &self.packages
    }
}

impl DerefMut for OrderedPackageCollection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.packages
    }
}

impl<'a> IntoIterator for &'a OrderedPackageCollection {
    type Item = &'a OrderedPackage;
    type IntoIter = std::collections::btree_map::Values<'a, usize, OrderedPackage>;

    fn into_iter(self) -> Self::IntoIter {
        self.packages.iter()
    }
}

/// Result of ordering a pickup for previously added packages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedShipment {
    pub order_id: String,
    pub shipper: String,
    pub package_ids: Vec<String>,
    pub handover_url: Option<String>,
    pub labels_url: Option<String>,
    pub file_url: Option<String>,
}

impl OrderedShipment {
    pub fn from_data(shipper: &str, package_ids: Vec<String>, data: &Value) -> Self {
        Self {
            order_id: string_or_empty(data, "order_id"),
            shipper: shipper.to_string(),
            package_ids,
            handover_url: string_field(data, "handover_url"),
            labels_url: string_field(data, "labels_url"),
            file_url: string_field(data, "file_url"),
        }
    }
}
