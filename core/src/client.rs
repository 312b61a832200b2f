//! Stateless HTTP request builder and response parser for the Balikobot API.
//!
//! # Design
//! `Client` holds only base URLs and the authorization header, and carries no
//! mutable state between calls. Each operation is split into a `build_*`
//! method that produces an `HttpRequest` and a `parse_*` method that consumes
//! the `HttpResponse`. Parsers that turn per-package results back into
//! collections take the request-side collection too, so the response can be
//! re-associated with it by position.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::config::Config;
use crate::cost::{PackageTransportCost, PackageTransportCostCollection};
use crate::error::{BalikobotError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::ordered::{OrderedPackage, OrderedPackageCollection, OrderedShipment};
use crate::package::PackageCollection;
use crate::response::{check_item_status, decode, packages_by_position, string_field};
use crate::services::{flatten_add_service_options, flatten_service_types, AddServiceOptions};
use crate::tracking::TrackingStatus;

/// Generation of the API an endpoint lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    /// `https://api.balikobot.cz`
    V1,
    /// `https://apiv2.balikobot.cz`
    V2V1,
    /// `https://apiv2.balikobot.cz/v2`
    V2V2,
}

/// Endpoint names, appended to `{base}/{shipper}/`.
mod action {
    pub const ADD: &str = "add";
    pub const DROP: &str = "drop";
    pub const CHECK: &str = "check";
    pub const ORDER: &str = "order";
    pub const LABELS: &str = "labels";
    pub const TRACK: &str = "track";
    pub const TRACK_STATUS: &str = "trackstatus";
    pub const SERVICES: &str = "services";
    pub const ADD_SERVICE_OPTIONS: &str = "addserviceoptions";
    pub const TRANSPORT_COSTS: &str = "transportcosts";
}

/// Synchronous, stateless client for the Balikobot API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone)]
pub struct Client {
    api_url: String,
    api_v2_url: String,
    authorization: Option<String>,
}

impl Default for Client {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Client {
    pub fn new(config: &Config) -> Self {
        Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_v2_url: config.api_v2_url.trim_end_matches('/').to_string(),
            authorization: config.credentials.as_ref().map(|c| c.authorization()),
        }
    }

    /// Full URL of `action` for `shipper`, with an optional trailing segment.
    pub fn url(&self, version: ApiVersion, shipper: &str, action: &str, segment: Option<&str>) -> String {
        let base = match version {
            ApiVersion::V1 => self.api_url.clone(),
            ApiVersion::V2V1 => self.api_v2_url.clone(),
            ApiVersion::V2V2 => format!("{}/v2", self.api_v2_url),
        };
        match segment {
            Some(segment) => format!("{base}/{shipper}/{action}/{segment}"),
            None => format!("{base}/{shipper}/{action}"),
        }
    }

    // -----------------------------------------------------------------------
    // Packages
    // -----------------------------------------------------------------------

    pub fn build_add_packages(&self, packages: &PackageCollection) -> Result<HttpRequest> {
        let url = self.url(ApiVersion::V2V1, packages.shipper(), action::ADD, None);
        self.post(url, &json!({ "packages": packages.to_payload() }))
    }

    /// Registered packages, in the order they were sent.
    pub fn parse_add_packages(
        &self,
        packages: &PackageCollection,
        response: HttpResponse,
    ) -> Result<OrderedPackageCollection> {
        let body = decode(&response, true)?;
        let items = packages_by_position(&body, packages.len())?;

        let mut ordered = OrderedPackageCollection::for_shipper(packages.shipper());
        for (package, item) in packages.iter().zip(items) {
            check_item_status(item)?;
            let batch_id = string_field(item, "eid")
                .or_else(|| package.eid())
                .unwrap_or_default();
            ordered.add(OrderedPackage::from_data(packages.shipper(), &batch_id, item))?;
        }
        ordered.set_labels_url(string_field(&body, "labels_url"));
        Ok(ordered)
    }

    pub fn build_check_packages(&self, packages: &PackageCollection) -> Result<HttpRequest> {
        let url = self.url(ApiVersion::V2V1, packages.shipper(), action::CHECK, None);
        self.post(url, &json!({ "packages": packages.to_payload() }))
    }

    pub fn parse_check_packages(&self, response: HttpResponse) -> Result<()> {
        let body = decode(&response, true)?;
        check_all_items(&body)
    }

    pub fn build_drop_packages(&self, packages: &OrderedPackageCollection) -> Result<HttpRequest> {
        let url = self.url(ApiVersion::V2V1, packages.shipper()?, action::DROP, None);
        self.post(url, &json!({ "package_ids": packages.package_ids() }))
    }

    pub fn parse_drop_packages(&self, response: HttpResponse) -> Result<()> {
        let body = decode(&response, true)?;
        check_all_items(&body)
    }

    // -----------------------------------------------------------------------
    // Orders and labels
    // -----------------------------------------------------------------------

    pub fn build_order_shipment(&self, packages: &OrderedPackageCollection) -> Result<HttpRequest> {
        let url = self.url(ApiVersion::V2V1, packages.shipper()?, action::ORDER, None);
        self.post(url, &json!({ "package_ids": packages.package_ids() }))
    }

    pub fn parse_order_shipment(
        &self,
        packages: &OrderedPackageCollection,
        response: HttpResponse,
    ) -> Result<OrderedShipment> {
        let body = decode(&response, true)?;
        Ok(OrderedShipment::from_data(packages.shipper()?, packages.package_ids(), &body))
    }

    pub fn build_get_labels(&self, packages: &OrderedPackageCollection) -> Result<HttpRequest> {
        let url = self.url(ApiVersion::V2V1, packages.shipper()?, action::LABELS, None);
        self.post(url, &json!({ "package_ids": packages.package_ids() }))
    }

    /// URL of the merged label PDF.
    pub fn parse_get_labels(&self, response: HttpResponse) -> Result<String> {
        let body = decode(&response, true)?;
        string_field(&body, "labels_url").ok_or_else(|| BalikobotError::bad_request(500))
    }

    // -----------------------------------------------------------------------
    // Tracking
    // -----------------------------------------------------------------------

    pub fn build_track_packages(&self, packages: &OrderedPackageCollection) -> Result<HttpRequest> {
        let url = self.url(ApiVersion::V2V2, packages.shipper()?, action::TRACK, None);
        self.post(url, &json!({ "carrier_ids": packages.carrier_ids() }))
    }

    /// Status history of every package, in the order the packages were sent.
    ///
    /// The body needs no top-level status; each package reports its own.
    pub fn parse_track_packages(
        &self,
        packages: &OrderedPackageCollection,
        response: HttpResponse,
    ) -> Result<Vec<Vec<TrackingStatus>>> {
        let body = decode(&response, false)?;
        packages_by_position(&body, packages.len())?
            .into_iter()
            .map(|item| {
                check_item_status(item)?;
                let states: Vec<TrackingStatus> = item
                    .get("states")
                    .and_then(Value::as_array)
                    .map(|states| states.iter().map(TrackingStatus::from_data).collect())
                    .unwrap_or_default();
                Ok(states)
            })
            .collect()
    }

    pub fn build_track_packages_last_status(
        &self,
        packages: &OrderedPackageCollection,
    ) -> Result<HttpRequest> {
        let url = self.url(ApiVersion::V2V2, packages.shipper()?, action::TRACK_STATUS, None);
        self.post(url, &json!({ "carrier_ids": packages.carrier_ids() }))
    }

    /// Latest status of every package, in the order the packages were sent.
    pub fn parse_track_packages_last_status(
        &self,
        packages: &OrderedPackageCollection,
        response: HttpResponse,
    ) -> Result<Vec<TrackingStatus>> {
        let body = decode(&response, false)?;
        packages_by_position(&body, packages.len())?
            .into_iter()
            .map(|item| {
                check_item_status(item)?;
                Ok(TrackingStatus::from_last_status_data(item))
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Services and costs
    // -----------------------------------------------------------------------

    pub fn build_get_services(&self, shipper: &str) -> HttpRequest {
        self.get(self.url(ApiVersion::V2V1, shipper, action::SERVICES, None))
    }

    /// Service types offered by the shipper, `code -> name`.
    pub fn parse_get_services(&self, response: HttpResponse) -> Result<BTreeMap<String, String>> {
        let body = decode(&response, true)?;
        Ok(flatten_service_types(&body))
    }

    pub fn build_get_add_service_options(&self, shipper: &str, service: Option<&str>) -> HttpRequest {
        self.get(self.url(ApiVersion::V1, shipper, action::ADD_SERVICE_OPTIONS, service))
    }

    pub fn parse_get_add_service_options(
        &self,
        response: HttpResponse,
        full_data: bool,
    ) -> Result<AddServiceOptions> {
        let body = decode(&response, true)?;
        Ok(flatten_add_service_options(&body, full_data))
    }

    pub fn build_get_transport_costs(&self, packages: &PackageCollection) -> Result<HttpRequest> {
        let url = self.url(ApiVersion::V2V1, packages.shipper(), action::TRANSPORT_COSTS, None);
        self.post(url, &json!({ "packages": packages.to_payload() }))
    }

    pub fn parse_get_transport_costs(
        &self,
        packages: &PackageCollection,
        response: HttpResponse,
    ) -> Result<PackageTransportCostCollection> {
        let body = decode(&response, true)?;
        let items = packages_by_position(&body, packages.len())?;

        let mut costs = PackageTransportCostCollection::for_shipper(packages.shipper());
        for (package, item) in packages.iter().zip(items) {
            check_item_status(item)?;
            let batch_id = package.eid().unwrap_or_default();
            costs.add(PackageTransportCost::from_data(packages.shipper(), &batch_id, item))?;
        }
        Ok(costs)
    }

    // -----------------------------------------------------------------------
    // Request helpers
    // -----------------------------------------------------------------------

    fn get(&self, url: String) -> HttpRequest {
        let request = HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: self.auth_headers(),
            body: None,
        };
        tracing::debug!(url = %request.url, "built GET request");
        request
    }

    fn post(&self, url: String, payload: &Value) -> Result<HttpRequest> {
        let body = serde_json::to_string(payload).map_err(|e| BalikobotError::Serialization(e.to_string()))?;
        let mut headers = vec![("content-type".to_string(), "application/json".to_string())];
        headers.extend(self.auth_headers());
        tracing::debug!(url = %url, bytes = body.len(), "built POST request");
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url,
            headers,
            body: Some(body),
        })
    }

    fn auth_headers(&self) -> Vec<(String, String)> {
        self.authorization
            .iter()
            .map(|value| ("authorization".to_string(), value.clone()))
            .collect()
    }
}

/// Fail on the first per-package error, if the body lists packages at all.
fn check_all_items(body: &Value) -> Result<()> {
    match body.get("packages") {
        Some(Value::Array(items)) => items.iter().try_for_each(check_item_status),
        Some(Value::Object(items)) => items.values().try_for_each(check_item_status),
        _ => Ok(()),
    }
}
