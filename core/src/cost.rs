//! Transport cost estimates and their per-shipper aggregate.

use serde_json::Value;

use crate::collection::{ShipperCollection, Shipped};
use crate::error::{BalikobotError, Result};
use crate::response::{f64_field, string_field, string_or_empty};

/// One item of a cost breakdown (base price, fuel surcharge, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct PackageTransportCostPart {
    pub name: String,
    pub cost: f64,
    pub currency_code: String,
}

/// Estimated transport cost of one package.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageTransportCost {
    pub batch_id: String,
    pub shipper: String,
    pub total_cost: f64,
    pub currency_code: String,
    pub parts: Vec<PackageTransportCostPart>,
}

impl PackageTransportCost {
    pub fn new(batch_id: &str, shipper: &str, total_cost: f64, currency_code: &str) -> Self {
        Self {
            batch_id: batch_id.to_string(),
            shipper: shipper.to_string(),
            total_cost,
            currency_code: currency_code.to_string(),
            parts: Vec::new(),
        }
    }

    /// Build from one entry of a `transportcosts` response.
    ///
    /// The entry's own `eid` wins over `batch_id`. Breakdown items without a
    /// currency inherit the package currency.
    pub fn from_data(shipper: &str, batch_id: &str, data: &Value) -> Self {
        let currency_code = string_or_empty(data, "currency");
        let parts = data
            .get("costs_breakdown")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|item| PackageTransportCostPart {
                        name: string_or_empty(item, "name"),
                        cost: f64_field(item, "value").unwrap_or_default(),
                        currency_code: string_field(item, "currency")
                            .unwrap_or_else(|| currency_code.clone()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            batch_id: string_field(data, "eid").unwrap_or_else(|| batch_id.to_string()),
            shipper: shipper.to_string(),
            total_cost: f64_field(data, "costs_total").unwrap_or_default(),
            currency_code,
            parts,
        }
    }
}

impl Shipped for PackageTransportCost {
    fn shipper(&self) -> &str {
        &self.shipper
    }
}

/// Transport costs of one shipper's batch.
pub type PackageTransportCostCollection = ShipperCollection<PackageTransportCost>;

impl ShipperCollection<PackageTransportCost> {
    pub fn batch_ids(&self) -> Vec<String> {
        self.iter().map(|cost| cost.batch_id.clone()).collect()
    }

    /// Sum of all costs. Only defined when every entry uses the same currency.
    pub fn total_cost(&self) -> Result<f64> {
        let mut costs = self.iter();
        let Some(first) = costs.next() else {
            return Ok(0.0);
        };

        let mut total = first.total_cost;
        for cost in costs {
            if cost.currency_code != first.currency_code {
                return Err(BalikobotError::CurrencyMismatch {
                    expected: first.currency_code.clone(),
                    actual: cost.currency_code.clone(),
                });
            }
            total += cost.total_cost;
        }
        Ok(total)
    }

    /// Currency of the first entry.
    pub fn currency_code(&self) -> Result<&str> {
        self.iter()
            .next()
            .map(|cost| cost.currency_code.as_str())
            .ok_or(BalikobotError::EmptyCollection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn getters() {
        let mut costs = PackageTransportCostCollection::for_shipper("toptrans");
        costs.add(PackageTransportCost::new("34567", "toptrans", 500.0, "CZK")).unwrap();
        costs.add(PackageTransportCost::new("78923", "toptrans", 20.0, "CZK")).unwrap();

        assert_eq!(costs.shipper().unwrap(), "toptrans");
        assert_eq!(costs.len(), 2);
        assert_eq!(costs.batch_ids(), vec!["34567", "78923"]);
        assert_eq!(costs.total_cost().unwrap(), 520.0);
        assert_eq!(costs.currency_code().unwrap(), "CZK");
    }

    #[test]
    fn empty_collection_has_no_shipper_or_currency() {
        let costs = PackageTransportCostCollection::new();
        assert!(matches!(costs.shipper(), Err(BalikobotError::EmptyCollection)));
        assert!(matches!(costs.currency_code(), Err(BalikobotError::EmptyCollection)));
        assert_eq!(costs.total_cost().unwrap(), 0.0);
    }

    #[test]
    fn different_currencies_cannot_be_summed() {
        let mut costs = PackageTransportCostCollection::for_shipper("toptrans");
        costs.add(PackageTransportCost::new("34567", "toptrans", 500.0, "CZK")).unwrap();
        costs.add(PackageTransportCost::new("78923", "toptrans", 2.1, "EUR")).unwrap();

        let err = costs.total_cost().unwrap_err();
        assert!(matches!(err, BalikobotError::CurrencyMismatch { .. }));
    }

    #[test]
    fn shipper_from_first_package() {
        let mut costs = PackageTransportCostCollection::new();
        costs.add(PackageTransportCost::new("34567", "toptrans", 500.0, "CZK")).unwrap();
        assert_eq!(costs.shipper().unwrap(), "toptrans");
    }

    #[test]
    fn different_shipper_is_rejected() {
        let mut costs = PackageTransportCostCollection::for_shipper("toptrans");
        costs.add(PackageTransportCost::new("34567", "toptrans", 500.0, "CZK")).unwrap();
        let err = costs
            .add(PackageTransportCost::new("78923", "ppl", 20.0, "CZK"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Package is from different shipper (\"ppl\" instead of \"toptrans\")"
        );
    }

    #[test]
    fn keyed_access() {
        let mut costs = PackageTransportCostCollection::for_shipper("toptrans");
        costs.insert(1, PackageTransportCost::new("34567", "toptrans", 500.0, "CZK")).unwrap();
        costs.insert(4, PackageTransportCost::new("78923", "toptrans", 20.0, "CZK")).unwrap();

        assert_eq!(costs.get(4).map(|c| c.batch_id.as_str()), Some("78923"));
        assert_eq!(costs.len(), 2);
        assert!(costs.contains(1));

        costs.remove(1);
        assert!(!costs.contains(1));
        assert_eq!(costs.iter().next().map(|c| c.batch_id.as_str()), Some("78923"));
    }

    #[test]
    fn from_data_reads_breakdown() {
        let cost = PackageTransportCost::from_data(
            "toptrans",
            "fallback",
            &json!({
                "eid": "8316699909",
                "costs_total": "1500.5",
                "currency": "CZK",
                "costs_breakdown": [
                    {"name": "MANIPULATION", "value": 500},
                    {"name": "FUEL", "value": 1000.5, "currency": "CZK"},
                ],
            }),
        );

        assert_eq!(cost.batch_id, "8316699909");
        assert_eq!(cost.total_cost, 1500.5);
        assert_eq!(cost.parts.len(), 2);
        assert_eq!(cost.parts[0].name, "MANIPULATION");
        assert_eq!(cost.parts[0].cost, 500.0);
        assert_eq!(cost.parts[0].currency_code, "CZK");
    }

    #[test]
    fn from_data_falls_back_to_batch_id() {
        let cost = PackageTransportCost::from_data("ppl", "0001", &json!({"costs_total": 20}));
        assert_eq!(cost.batch_id, "0001");
        assert_eq!(cost.total_cost, 20.0);
        assert!(cost.parts.is_empty());
    }
}
