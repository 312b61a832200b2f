use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Shippers the mock accepts; anything else answers 403 like an inactive carrier.
pub const SHIPPERS: &[&str] = &["cp", "ppl", "toptrans", "gls"];

#[derive(Clone, Debug)]
pub struct StoredPackage {
    pub package_id: u64,
    pub shipper: String,
    pub eid: String,
    pub carrier_id: String,
    pub ordered: bool,
}

#[derive(Debug, Default)]
pub struct Store {
    next_package_id: u64,
    next_order_id: u64,
    packages: HashMap<u64, StoredPackage>,
}

impl Store {
    fn by_carrier_id(&self, shipper: &str, carrier_id: &str) -> Option<&StoredPackage> {
        self.packages
            .values()
            .find(|p| p.shipper == shipper && p.carrier_id == carrier_id)
    }

    /// All ids must name stored packages of `shipper`.
    fn known(&self, shipper: &str, package_ids: &[String]) -> bool {
        !package_ids.is_empty()
            && package_ids.iter().all(|id| {
                id.parse::<u64>()
                    .ok()
                    .and_then(|id| self.packages.get(&id))
                    .is_some_and(|p| p.shipper == shipper)
            })
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Deserialize)]
pub struct PackagesBody {
    #[serde(default)]
    pub packages: Vec<Map<String, Value>>,
}

#[derive(Deserialize)]
pub struct PackageIdsBody {
    #[serde(default)]
    pub package_ids: Vec<String>,
}

#[derive(Deserialize)]
pub struct CarrierIdsBody {
    #[serde(default)]
    pub carrier_ids: Vec<String>,
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/{shipper}/add", post(add_packages))
        .route("/{shipper}/check", post(check_packages))
        .route("/{shipper}/drop", post(drop_packages))
        .route("/{shipper}/order", post(order_shipment))
        .route("/{shipper}/labels", post(get_labels))
        .route("/{shipper}/transportcosts", post(transport_costs))
        .route("/{shipper}/services", get(services))
        .route("/{shipper}/addserviceoptions", get(all_add_service_options))
        .route("/{shipper}/addserviceoptions/{service}", get(add_service_options))
        .route("/v2/{shipper}/track", post(track))
        .route("/v2/{shipper}/trackstatus", post(track_status))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn status(code: u16) -> Json<Value> {
    Json(json!({ "status": code }))
}

fn supported(shipper: &str) -> bool {
    SHIPPERS.contains(&shipper)
}

/// Per-package validation result; a package needs at least a recipient name.
fn validate(packages: &[Map<String, Value>]) -> (bool, Vec<Value>) {
    let results: Vec<Value> = packages
        .iter()
        .map(|package| match package.get("rec_name") {
            Some(Value::String(name)) if !name.is_empty() => json!({ "status": 200 }),
            _ => json!({ "status": 406, "errors": { "rec_name": 406 } }),
        })
        .collect();
    let valid = !packages.is_empty() && results.iter().all(|r| r["status"] == 200);
    (valid, results)
}

async fn add_packages(
    State(db): State<Db>,
    Path(shipper): Path<String>,
    Json(input): Json<PackagesBody>,
) -> Json<Value> {
    if !supported(&shipper) {
        return status(403);
    }
    let (valid, results) = validate(&input.packages);
    if !valid {
        return Json(json!({ "status": 400, "packages": results }));
    }

    let mut store = db.write().await;
    let mut added = Vec::new();
    for package in &input.packages {
        store.next_package_id += 1;
        let package_id = store.next_package_id;
        let carrier_id = format!("{}{package_id:08}", shipper.to_uppercase());
        let eid = package
            .get("eid")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        store.packages.insert(
            package_id,
            StoredPackage {
                package_id,
                shipper: shipper.clone(),
                eid: eid.clone(),
                carrier_id: carrier_id.clone(),
                ordered: false,
            },
        );
        added.push(json!({
            "eid": eid,
            "package_id": package_id,
            "carrier_id": carrier_id,
            "track_url": format!("https://mock.balikobot.cz/track/{carrier_id}"),
            "label_url": format!("https://pdf.balikobot.cz/{shipper}/{}", Uuid::new_v4().simple()),
            "status": 200,
        }));
    }

    Json(json!({
        "status": 200,
        "packages": added,
        "labels_url": format!("https://pdf.balikobot.cz/{shipper}/{}", Uuid::new_v4().simple()),
    }))
}

async fn check_packages(Path(shipper): Path<String>, Json(input): Json<PackagesBody>) -> Json<Value> {
    if !supported(&shipper) {
        return status(403);
    }
    match validate(&input.packages) {
        (true, _) => status(200),
        (false, results) => Json(json!({ "status": 400, "packages": results })),
    }
}

async fn drop_packages(
    State(db): State<Db>,
    Path(shipper): Path<String>,
    Json(input): Json<PackageIdsBody>,
) -> Json<Value> {
    let mut store = db.write().await;
    if !store.known(&shipper, &input.package_ids) {
        return status(404);
    }
    let ordered = input
        .package_ids
        .iter()
        .filter_map(|id| id.parse::<u64>().ok())
        .any(|id| store.packages.get(&id).is_some_and(|p| p.ordered));
    if ordered {
        return status(404);
    }
    for id in input.package_ids.iter().filter_map(|id| id.parse::<u64>().ok()) {
        store.packages.remove(&id);
    }
    status(200)
}

async fn order_shipment(
    State(db): State<Db>,
    Path(shipper): Path<String>,
    Json(input): Json<PackageIdsBody>,
) -> Json<Value> {
    let mut store = db.write().await;
    if !store.known(&shipper, &input.package_ids) {
        return status(404);
    }
    for id in input.package_ids.iter().filter_map(|id| id.parse::<u64>().ok()) {
        if let Some(package) = store.packages.get_mut(&id) {
            package.ordered = true;
        }
    }
    store.next_order_id += 1;
    let order_id = store.next_order_id;
    Json(json!({
        "status": 200,
        "order_id": order_id,
        "file_url": format!("https://pdf.balikobot.cz/{shipper}/order/{order_id}"),
        "handover_url": format!("https://pdf.balikobot.cz/{shipper}/handover/{order_id}"),
        "labels_url": format!("https://pdf.balikobot.cz/{shipper}/labels/{order_id}"),
        "package_ids": input.package_ids,
    }))
}

async fn get_labels(
    State(db): State<Db>,
    Path(shipper): Path<String>,
    Json(input): Json<PackageIdsBody>,
) -> Json<Value> {
    let store = db.read().await;
    if !store.known(&shipper, &input.package_ids) {
        return status(404);
    }
    Json(json!({
        "status": 200,
        "labels_url": format!("https://pdf.balikobot.cz/{shipper}/{}", Uuid::new_v4().simple()),
    }))
}

/// History of a stored package: received, then in transit once ordered.
fn states(package: &StoredPackage) -> Vec<Value> {
    let mut states = vec![json!({
        "date": "2018-11-07 14:15:01",
        "name": "Obdrženy údaje k zásilce.",
        "status_id": -1,
        "status_id_v2": -1,
        "type": "event",
        "name_balikobot": "Zásilka zatím nebyla předána dopravci.",
    })];
    if package.ordered {
        states.push(json!({
            "date": "2018-11-08 18:00:00",
            "name": "Doručování zásilky",
            "status_id": 2,
            "status_id_v2": 2.2,
            "type": "event",
            "name_balikobot": "Zásilka je v přepravě.",
        }));
    }
    states
}

async fn track(
    State(db): State<Db>,
    Path(shipper): Path<String>,
    Json(input): Json<CarrierIdsBody>,
) -> Json<Value> {
    let store = db.read().await;
    let packages: Vec<Value> = input
        .carrier_ids
        .iter()
        .map(|carrier_id| match store.by_carrier_id(&shipper, carrier_id) {
            Some(package) => json!({
                "carrier_id": carrier_id,
                "status": 200,
                "states": states(package),
            }),
            None => json!({ "carrier_id": carrier_id, "status": 404 }),
        })
        .collect();
    Json(json!({ "status": 200, "packages": packages }))
}

async fn track_status(
    State(db): State<Db>,
    Path(shipper): Path<String>,
    Json(input): Json<CarrierIdsBody>,
) -> Json<Value> {
    let store = db.read().await;
    let packages: Vec<Value> = input
        .carrier_ids
        .iter()
        .map(|carrier_id| {
            let last = store
                .by_carrier_id(&shipper, carrier_id)
                .and_then(|package| states(package).pop());
            match last {
                Some(state) => json!({
                    "carrier_id": carrier_id,
                    "status": 200,
                    "status_id": state["status_id"],
                    "status_id_v2": state["status_id_v2"],
                    "status_text": state["name_balikobot"],
                }),
                None => json!({ "carrier_id": carrier_id, "status": 404 }),
            }
        })
        .collect();
    Json(json!({ "status": 200, "packages": packages }))
}

async fn services(Path(shipper): Path<String>) -> Json<Value> {
    if !supported(&shipper) {
        return status(403);
    }
    Json(json!({
        "status": 200,
        "service_types": [
            { "service_type": "NP", "name": "NP - Balík Na poštu" },
            { "service_type": "DR", "name": "DR - Balík Do ruky" },
        ],
    }))
}

fn service_catalog() -> Vec<Value> {
    vec![
        json!({
            "service_type": "CE",
            "service_type_name": "CE - Obchodní balík do zahraničí",
            "services": [
                { "name": "Neskladně", "code": "10" },
                { "name": "Zboží s VDD (pouze pro zásilky do ciziny s celní zónou)", "code": "44" },
            ],
        }),
        json!({
            "service_type": "CV",
            "service_type_name": "",
            "services": [
                { "name": "Dodejka", "code": "3" },
                { "name": "Dobírka Pk A/MZ dobírka", "code": "4" },
            ],
        }),
    ]
}

async fn all_add_service_options(Path(shipper): Path<String>) -> Json<Value> {
    if !supported(&shipper) {
        return status(403);
    }
    Json(json!({ "status": 200, "service_types": service_catalog() }))
}

async fn add_service_options(Path((shipper, service)): Path<(String, String)>) -> Json<Value> {
    if !supported(&shipper) {
        return status(403);
    }
    let found = service_catalog()
        .into_iter()
        .find(|entry| entry["service_type"] == service.as_str());
    match found {
        Some(entry) => Json(json!({
            "status": 200,
            "service_type": service,
            "services": entry["services"],
        })),
        None => status(200),
    }
}

/// Flat 89 CZK plus 10 CZK per kilogram (1 kg when unspecified).
async fn transport_costs(Path(shipper): Path<String>, Json(input): Json<PackagesBody>) -> Json<Value> {
    if !supported(&shipper) {
        return status(403);
    }
    let packages: Vec<Value> = input
        .packages
        .iter()
        .map(|package| {
            let weight = package.get("weight").and_then(Value::as_f64).unwrap_or(1.0);
            json!({
                "eid": package.get("eid").cloned().unwrap_or(Value::Null),
                "status": 200,
                "costs_total": 89.0 + 10.0 * weight,
                "currency": "CZK",
                "costs_breakdown": [
                    { "name": "BASE", "value": 89.0 },
                    { "name": "WEIGHT", "value": 10.0 * weight },
                ],
            })
        })
        .collect();
    Json(json!({ "status": 200, "packages": packages }))
}
