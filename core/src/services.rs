//! Flattening of carrier service listings into code-keyed maps.
//!
//! Balikobot nests services as `service_types[] -> services[] -> {code, name}`.
//! Callers mostly want `code -> name`; with `full_data` the whole record is
//! kept instead of just the name.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::response::{object_field, string_field, value_to_string};

/// Services of one service type, keyed by service code.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceOptions {
    Names(BTreeMap<String, String>),
    Records(BTreeMap<String, Map<String, Value>>),
}

impl ServiceOptions {
    pub fn len(&self) -> usize {
        match self {
            ServiceOptions::Names(names) => names.len(),
            ServiceOptions::Records(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn codes(&self) -> Vec<&str> {
        match self {
            ServiceOptions::Names(names) => names.keys().map(String::as_str).collect(),
            ServiceOptions::Records(records) => records.keys().map(String::as_str).collect(),
        }
    }

    /// Name of the service with `code`.
    pub fn name(&self, code: &str) -> Option<&str> {
        match self {
            ServiceOptions::Names(names) => names.get(code).map(String::as_str),
            ServiceOptions::Records(records) => records.get(code)?.get("name")?.as_str(),
        }
    }
}

/// Additional service options, either for one service type or for all of them.
#[derive(Debug, Clone, PartialEq)]
pub enum AddServiceOptions {
    Single(ServiceOptions),
    ByServiceType(BTreeMap<String, ServiceOptions>),
}

impl AddServiceOptions {
    pub fn is_empty(&self) -> bool {
        match self {
            AddServiceOptions::Single(options) => options.is_empty(),
            AddServiceOptions::ByServiceType(types) => types.is_empty(),
        }
    }
}

/// Flatten an `addserviceoptions` response body.
///
/// A body with `service_type` + `services` describes a single type; a body
/// with `service_types` lists every type. Anything else yields an empty map.
pub(crate) fn flatten_add_service_options(body: &Value, full_data: bool) -> AddServiceOptions {
    if body.get("service_type").is_some() {
        if let Some(services) = body.get("services") {
            return AddServiceOptions::Single(flatten_services(services, full_data));
        }
    }

    let by_type = body
        .get("service_types")
        .and_then(Value::as_array)
        .map(|types| {
            types
                .iter()
                .filter_map(|service_type| {
                    let code = string_field(service_type, "service_type")?;
                    let services = service_type.get("services").unwrap_or(&Value::Null);
                    Some((code, flatten_services(services, full_data)))
                })
                .collect()
        })
        .unwrap_or_default();

    AddServiceOptions::ByServiceType(by_type)
}

/// Flatten a `services` listing of `{code, name}` records.
fn flatten_services(services: &Value, full_data: bool) -> ServiceOptions {
    let records = services.as_array().map(Vec::as_slice).unwrap_or_default();

    if full_data {
        let records = records
            .iter()
            .filter_map(|record| {
                let code = string_field(record, "code")?;
                Some((code, record.as_object()?.clone()))
            })
            .collect();
        return ServiceOptions::Records(records);
    }

    let names = records
        .iter()
        .filter_map(|record| Some((string_field(record, "code")?, string_field(record, "name")?)))
        .collect();
    ServiceOptions::Names(names)
}

/// Flatten a `services` response body into `service type -> name`.
///
/// Newer responses list `{service_type, name}` records, older ones send a
/// plain `{code: name}` object.
pub(crate) fn flatten_service_types(body: &Value) -> BTreeMap<String, String> {
    if let Some(types) = object_field(body, "service_types") {
        return types
            .iter()
            .filter_map(|(code, name)| Some((code.clone(), value_to_string(name)?)))
            .collect();
    }

    body.get("service_types")
        .and_then(Value::as_array)
        .map(|types| {
            types
                .iter()
                .filter_map(|record| {
                    let code = string_field(record, "service_type")?;
                    let name = string_field(record, "name")
                        .or_else(|| string_field(record, "service_type_name"))
                        .unwrap_or_default();
                    Some((code, name))
                })
                .collect()
        })
        .unwrap_or_default()
}
