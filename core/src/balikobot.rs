//! One-call operations over an injected `Requester`.
//!
//! `Balikobot` pairs each `Client::build_*` with its `parse_*` and runs the
//! round-trip through the requester in between.

use std::collections::BTreeMap;

use crate::client::Client;
use crate::config::Config;
use crate::cost::PackageTransportCostCollection;
use crate::error::Result;
use crate::ordered::{OrderedPackage, OrderedPackageCollection, OrderedShipment};
use crate::package::PackageCollection;
use crate::requester::Requester;
use crate::services::AddServiceOptions;
use crate::tracking::TrackingStatus;

pub struct Balikobot<R> {
    client: Client,
    requester: R,
}

impl<R: Requester> Balikobot<R> {
    /// Facade against the production API.
    pub fn new(requester: R) -> Self {
        Self::with_config(&Config::default(), requester)
    }

    pub fn with_config(config: &Config, requester: R) -> Self {
        Self {
            client: Client::new(config),
            requester,
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn add_packages(&self, packages: &PackageCollection) -> Result<OrderedPackageCollection> {
        let response = self.requester.request(self.client.build_add_packages(packages)?)?;
        self.client.parse_add_packages(packages, response)
    }

    pub fn check_packages(&self, packages: &PackageCollection) -> Result<()> {
        let response = self.requester.request(self.client.build_check_packages(packages)?)?;
        self.client.parse_check_packages(response)
    }

    pub fn drop_packages(&self, packages: &OrderedPackageCollection) -> Result<()> {
        let response = self.requester.request(self.client.build_drop_packages(packages)?)?;
        self.client.parse_drop_packages(response)
    }

    pub fn drop_package(&self, package: &OrderedPackage) -> Result<()> {
        self.drop_packages(&single(package)?)
    }

    pub fn order_shipment(&self, packages: &OrderedPackageCollection) -> Result<OrderedShipment> {
        let response = self.requester.request(self.client.build_order_shipment(packages)?)?;
        self.client.parse_order_shipment(packages, response)
    }

    pub fn get_labels(&self, packages: &OrderedPackageCollection) -> Result<String> {
        let response = self.requester.request(self.client.build_get_labels(packages)?)?;
        self.client.parse_get_labels(response)
    }

    pub fn track_packages(&self, packages: &OrderedPackageCollection) -> Result<Vec<Vec<TrackingStatus>>> {
        let response = self.requester.request(self.client.build_track_packages(packages)?)?;
        self.client.parse_track_packages(packages, response)
    }

    pub fn track_package(&self, package: &OrderedPackage) -> Result<Vec<TrackingStatus>> {
        let statuses = self.track_packages(&single(package)?)?;
        Ok(statuses.into_iter().next().unwrap_or_default())
    }

    pub fn track_packages_last_status(&self, packages: &OrderedPackageCollection) -> Result<Vec<TrackingStatus>> {
        let request = self.client.build_track_packages_last_status(packages)?;
        let response = self.requester.request(request)?;
        self.client.parse_track_packages_last_status(packages, response)
    }

    pub fn track_package_last_status(&self, package: &OrderedPackage) -> Result<Option<TrackingStatus>> {
        let statuses = self.track_packages_last_status(&single(package)?)?;
        Ok(statuses.into_iter().next())
    }

    pub fn get_services(&self, shipper: &str) -> Result<BTreeMap<String, String>> {
        let response = self.requester.request(self.client.build_get_services(shipper))?;
        self.client.parse_get_services(response)
    }

    /// Additional service options of `shipper`, for one service type or all.
    pub fn get_add_service_options(
        &self,
        shipper: &str,
        service: Option<&str>,
        full_data: bool,
    ) -> Result<AddServiceOptions> {
        let request = self.client.build_get_add_service_options(shipper, service);
        let response = self.requester.request(request)?;
        self.client.parse_get_add_service_options(response, full_data)
    }

    pub fn get_transport_costs(&self, packages: &PackageCollection) -> Result<PackageTransportCostCollection> {
        let response = self.requester.request(self.client.build_get_transport_costs(packages)?)?;
        self.client.parse_get_transport_costs(packages, response)
    }
}

fn single(package: &OrderedPackage) -> Result<OrderedPackageCollection> {
    let mut packages = OrderedPackageCollection::new();
    packages.add(package.clone())?;
    Ok(packages)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::{json, Value};

    use super::*;
    use crate::error::BalikobotError;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};
    use crate::package::{option, Package};
    use crate::services::ServiceOptions;

    type Sent = Rc<RefCell<Vec<HttpRequest>>>;

    /// Facade whose requester records every request and answers with `body`.
    fn mocked(status: u16, body: Value) -> (Balikobot<impl Requester>, Sent) {
        let sent: Sent = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&sent);
        let requester = move |request: HttpRequest| -> crate::error::Result<HttpResponse> {
            log.borrow_mut().push(request);
            Ok(HttpResponse::json(status, &body))
        };
        (Balikobot::new(requester), sent)
    }

    fn last_request(sent: &Sent) -> HttpRequest {
        sent.borrow().last().cloned().unwrap()
    }

    #[test]
    fn check_packages_sends_batch() {
        let (service, sent) = mocked(200, json!({"status": 200}));

        let mut packages = PackageCollection::new("ppl");
        packages
            .add(Package::new().with(option::VS, "0001").with(option::EID, "0001").with(option::REC_NAME, "Name"))
            .add(Package::new().with(option::VS, "0002").with(option::EID, "0001").with(option::PRICE, 2000));

        service.check_packages(&packages).unwrap();

        let request = last_request(&sent);
        assert_eq!(request.url, "https://apiv2.balikobot.cz/ppl/check");
        assert_eq!(
            request.json_body().unwrap(),
            json!({"packages": [
                {"eid": "0001", "vs": "0001", "rec_name": "Name"},
                {"eid": "0001", "vs": "0002", "price": 2000},
            ]})
        );
    }

    #[test]
    fn track_package_sends_carrier_id() {
        let (service, sent) = mocked(200, json!({
            "status": 200,
            "packages": [{
                "carrier_id": "1234",
                "status": 200,
                "states": [{
                    "date": "2018-11-07 14:15:01",
                    "name": "Doručování zásilky",
                    "status_id": 2,
                    "status_id_v2": 2.2,
                    "type": "event",
                    "name_balikobot": "Zásilka je v přepravě.",
                }],
            }],
        }));

        let statuses = service
            .track_package(&OrderedPackage::new("1", "ppl", "0001", "1234"))
            .unwrap();

        let request = last_request(&sent);
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "https://apiv2.balikobot.cz/v2/ppl/track");
        assert_eq!(request.json_body().unwrap(), json!({"carrier_ids": ["1234"]}));
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].group_id, 2);
    }

    #[test]
    fn track_packages_sends_all_carrier_ids() {
        let (service, sent) = mocked(200, json!({
            "status": 200,
            "packages": [
                {"carrier_id": "1236", "status": 200, "states": []},
                {"carrier_id": "1234", "status": 200, "states": []},
            ],
        }));

        let mut packages = OrderedPackageCollection::new();
        packages.add(OrderedPackage::new("1", "ppl", "0001", "1236")).unwrap();
        packages.add(OrderedPackage::new("2", "ppl", "0001", "1234")).unwrap();

        let statuses = service.track_packages(&packages).unwrap();

        assert_eq!(
            last_request(&sent).json_body().unwrap(),
            json!({"carrier_ids": ["1236", "1234"]})
        );
        assert_eq!(statuses, vec![Vec::new(), Vec::new()]);
    }

    #[test]
    fn track_package_without_status_fails_with_package_error() {
        let (service, _) = mocked(200, json!({
            "packages": [{
                "carrier_id": "1234",
                "status": 503,
                "status_message": "Technologie dopravce je momentálně nedostupná. Zopakujte dotaz později.",
            }],
        }));

        let err = service
            .track_package(&OrderedPackage::new("1", "gls", "0001", "1234"))
            .unwrap_err();
        assert!(matches!(err, BalikobotError::BadRequest { status: 503, .. }));
        assert!(err.to_string().contains("Technologie dopravce není dostupná"));
    }

    #[test]
    fn add_service_options_request() {
        let (service, sent) = mocked(200, json!({"status": 200}));

        let options = service.get_add_service_options("cp", None, false).unwrap();
        assert!(options.is_empty());
        assert_eq!(last_request(&sent).url, "https://api.balikobot.cz/cp/addserviceoptions");

        service.get_add_service_options("cp", Some("DR"), false).unwrap();
        assert_eq!(last_request(&sent).url, "https://api.balikobot.cz/cp/addserviceoptions/DR");
        assert!(last_request(&sent).body.is_none());
    }

    #[test]
    fn add_service_options_http_error() {
        let (service, _) = mocked(400, json!({"status": 200}));
        let err = service.get_add_service_options("cp", None, false).unwrap_err();
        assert!(matches!(err, BalikobotError::BadRequest { status: 400, .. }));
    }

    #[test]
    fn add_service_options_single_type() {
        let (service, _) = mocked(200, json!({
            "status": 200,
            "service_type": "CE",
            "services": [{"name": "Neskladně", "code": "10"}],
        }));
        let options = service.get_add_service_options("cp", Some("CE"), false).unwrap();
        let AddServiceOptions::Single(ServiceOptions::Names(names)) = options else {
            panic!("expected flat names");
        };
        assert_eq!(names["10"], "Neskladně");
    }

    #[test]
    fn drop_package_sends_package_id() {
        let (service, sent) = mocked(200, json!({"status": 200}));
        service
            .drop_package(&OrderedPackage::new("42", "cp", "0001", "DR1"))
            .unwrap();
        let request = last_request(&sent);
        assert_eq!(request.url, "https://apiv2.balikobot.cz/cp/drop");
        assert_eq!(request.json_body().unwrap(), json!({"package_ids": ["42"]}));
    }

    #[test]
    fn transport_errors_propagate() {
        let requester = |_: HttpRequest| -> crate::error::Result<HttpResponse> {
            Err(BalikobotError::Transport("connection refused".to_string()))
        };
        let service = Balikobot::new(requester);
        let err = service.get_services("cp").unwrap_err();
        assert!(matches!(err, BalikobotError::Transport(_)));
    }
}
