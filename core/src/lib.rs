//! Synchronous client core for the Balikobot shipping API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). Responses are shaped into
//! typed values: ordered packages, tracking histories, transport costs and
//! flattened service listings.
//!
//! # Design
//! - `Client` is stateless; each endpoint is a `build_*` / `parse_*` pair.
//! - `Balikobot` runs both halves through an injected `Requester`.
//! - Batches are per shipper. `PackageCollection` fixes the shipper up
//!   front, the response-side collections adopt it from their first item and
//!   reject anything else.
//! - Partial API data never fails a parse; absent fields become `None` or empty.

pub mod balikobot;
pub mod client;
pub mod collection;
pub mod config;
pub mod cost;
pub mod error;
pub mod http;
pub mod ordered;
pub mod package;
pub mod requester;
mod response;
pub mod services;
pub mod tracking;

pub use balikobot::Balikobot;
pub use client::{ApiVersion, Client};
pub use collection::{ShipperCollection, Shipped};
pub use config::{Config, Credentials};
pub use cost::{PackageTransportCost, PackageTransportCostCollection, PackageTransportCostPart};
pub use error::{BalikobotError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use ordered::{OrderedPackage, OrderedPackageCollection, OrderedShipment};
pub use package::{Package, PackageCollection};
pub use requester::Requester;
pub use services::{AddServiceOptions, ServiceOptions};
pub use tracking::TrackingStatus;
