//! Request-side packages and the per-shipper batch they are sent in.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Balikobot option names used as package keys.
pub mod option {
    pub const EID: &str = "eid";
    pub const VS: &str = "vs";
    pub const SERVICE_TYPE: &str = "service_type";
    pub const SERVICES: &str = "services";
    pub const BRANCH_ID: &str = "branch_id";
    pub const PRICE: &str = "price";
    pub const INS_CURRENCY: &str = "ins_currency";
    pub const COD_PRICE: &str = "cod_price";
    pub const COD_CURRENCY: &str = "cod_currency";
    pub const WEIGHT: &str = "weight";
    pub const ORDER_NUMBER: &str = "order_number";
    pub const REAL_ORDER_ID: &str = "real_order_id";
    pub const NOTE: &str = "note";
    pub const REC_NAME: &str = "rec_name";
    pub const REC_FIRM: &str = "rec_firm";
    pub const REC_STREET: &str = "rec_street";
    pub const REC_CITY: &str = "rec_city";
    pub const REC_ZIP: &str = "rec_zip";
    pub const REC_COUNTRY: &str = "rec_country";
    pub const REC_EMAIL: &str = "rec_email";
    pub const REC_PHONE: &str = "rec_phone";
}

/// Length of generated batch ids; Balikobot accepts at most 40 characters.
const GENERATED_EID_LEN: usize = 20;

/// One shipment to send to Balikobot.
///
/// Packages are open maps of option name to value so that carrier specific
/// options pass through untouched. The typed accessors cover the options
/// most callers need.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Package {
    fields: Map<String, Value>,
}

impl Package {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Builder-style setter for any option.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Batch id (`eid`); numbers are rendered as strings.
    pub fn eid(&self) -> Option<String> {
        self.string(option::EID)
    }

    pub fn set_eid(&mut self, eid: &str) -> &mut Self {
        self.set(option::EID, eid)
    }

    /// Variable symbol.
    pub fn vs(&self) -> Option<String> {
        self.string(option::VS)
    }

    pub fn set_vs(&mut self, vs: &str) -> &mut Self {
        self.set(option::VS, vs)
    }

    pub fn rec_name(&self) -> Option<String> {
        self.string(option::REC_NAME)
    }

    pub fn set_rec_name(&mut self, name: &str) -> &mut Self {
        self.set(option::REC_NAME, name)
    }

    pub fn service_type(&self) -> Option<String> {
        self.string(option::SERVICE_TYPE)
    }

    pub fn set_service_type(&mut self, service_type: &str) -> &mut Self {
        self.set(option::SERVICE_TYPE, service_type)
    }

    pub fn price(&self) -> Option<f64> {
        self.fields.get(option::PRICE).and_then(Value::as_f64)
    }

    pub fn set_price(&mut self, price: f64) -> &mut Self {
        self.set(option::PRICE, price)
    }

    pub fn set_cod_price(&mut self, price: f64, currency: &str) -> &mut Self {
        self.set(option::COD_PRICE, price);
        self.set(option::COD_CURRENCY, currency)
    }

    pub fn set_weight(&mut self, weight: f64) -> &mut Self {
        self.set(option::WEIGHT, weight)
    }

    pub fn set_branch_id(&mut self, branch_id: &str) -> &mut Self {
        self.set(option::BRANCH_ID, branch_id)
    }

    /// Additional services are sent as codes joined with `+`.
    pub fn set_services(&mut self, codes: &[&str]) -> &mut Self {
        self.set(option::SERVICES, codes.join("+"))
    }

    pub fn set_recipient(
        &mut self,
        street: &str,
        city: &str,
        zip: &str,
        country: &str,
    ) -> &mut Self {
        self.set(option::REC_STREET, street);
        self.set(option::REC_CITY, city);
        self.set(option::REC_ZIP, zip);
        self.set(option::REC_COUNTRY, country)
    }

    pub fn set_rec_email(&mut self, email: &str) -> &mut Self {
        self.set(option::REC_EMAIL, email)
    }

    pub fn set_rec_phone(&mut self, phone: &str) -> &mut Self {
        self.set(option::REC_PHONE, phone)
    }

    fn string(&self, key: &str) -> Option<String> {
        self.fields.get(key).and_then(crate::response::value_to_string)
    }
}

impl From<Map<String, Value>> for Package {
    fn from(fields: Map<String, Value>) -> Self {
        Self::from_fields(fields)
    }
}

/// Ordered batch of packages sent to a single shipper.
///
/// Packages carry no shipper of their own, so the shipper is fixed when the
/// collection is created. Every added package gets a batch id if it has none.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageCollection {
    shipper: String,
    packages: Vec<Package>,
}

impl PackageCollection {
    pub fn new(shipper: &str) -> Self {
        Self {
            shipper: shipper.to_string(),
            packages: Vec::new(),
        }
    }

    pub fn shipper(&self) -> &str {
        &self.shipper
    }

    pub fn add(&mut self, mut package: Package) -> &mut Self {
        if package.eid().is_none() {
            package.set_eid(&new_eid());
        }
        self.packages.push(package);
        self
    }

    pub fn get(&self, index: usize) -> Option<&Package> {
        self.packages.get(index)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Package> {
        self.packages.iter()
    }

    /// Batch ids in insertion order.
    pub fn batch_ids(&self) -> Vec<String> {
        self.packages.iter().filter_map(Package::eid).collect()
    }

    /// Packages as sent in the `packages` request field.
    pub fn to_payload(&self) -> Vec<Value> {
        self.packages
            .iter()
            .map(|package| Value::Object(package.fields.clone()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a PackageCollection {
    type Item = &'a Package;
    type IntoIter = std::slice::Iter<'a, Package>;

    fn into_iter(self) -> Self::IntoIter {
        self.packages.iter()
    }
}

fn new_eid() -> String {
    let mut eid = Uuid::new_v4().simple().to_string();
    eid.truncate(GENERATED_EID_LEN);
    eid
}
