//! Error types for the Balikobot client core.
//!
//! # Design
//! Everything the API rejects lands in `BadRequest`, carrying the Balikobot
//! status code and the matching message from the vendor's status table.
//! Misuse of the collections (mixing shippers, reading totals of an empty or
//! multi-currency batch) gets dedicated variants so callers can tell a broken
//! batch apart from a broken request.

/// Errors returned by the client, the collections and `Requester` implementations.
#[derive(Debug, thiserror::Error)]
pub enum BalikobotError {
    /// The API answered with a non-200 HTTP status, a missing or invalid
    /// `status` field, or a non-200 status for the request or one of its packages.
    #[error("bad request ({status}): {message}")]
    BadRequest { status: u16, message: String },

    /// A package was added to a collection that belongs to another shipper.
    #[error("Package is from different shipper (\"{actual}\" instead of \"{expected}\")")]
    ShipperMismatch { expected: String, actual: String },

    /// The collection has no entries, so it has no shipper or currency yet.
    #[error("collection is empty")]
    EmptyCollection,

    /// The highest key is already `usize::MAX`, so `add` has no key to append at.
    #[error("collection has no key left after {0}")]
    KeyOverflow(usize),

    /// Transport costs in one collection use different currencies.
    #[error("package costs have different currencies (\"{actual}\" instead of \"{expected}\")")]
    CurrencyMismatch { expected: String, actual: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be parsed as JSON.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The injected transport failed before a response was received.
    #[error("transport failed: {0}")]
    Transport(String),

    /// Required configuration is missing or empty.
    #[error("configuration error: {0}")]
    Config(String),
}

impl BalikobotError {
    /// Request error for a Balikobot status code, using the vendor's message table.
    pub fn bad_request(status: u16) -> Self {
        BalikobotError::BadRequest {
            status,
            message: status_message(status).to_string(),
        }
    }
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, BalikobotError>;

/// Human readable message for a Balikobot status code.
pub fn status_message(status: u16) -> &'static str {
    match status {
        200 => "OK, operace proběhla v pořádku.",
        208 => "Položka s doručeným ID již existuje. Data, která jsou navrácena, patří k původnímu záznamu.",
        400 => "Operace neproběhla v pořádku, zkontrolujte konkrétní data.",
        401 => "Unauthorized - nejspíš chyba na straně Balikobotu",
        403 => "Přepravce není pro použité klíče aktivovaný.",
        404 => "Zásilka neexistuje, nebo již byla zpracována.",
        406 => "Nedorazila žádná data ke zpracování nebo nebyl předán povinný atribut.",
        409 => "Konfigurace přepravce není kompletní.",
        413 => "Špatný formát dat.",
        423 => "Tato funkce je dostupná jen pro \"živé klíče\".",
        500 => "Nepodařilo se zpracovat odpověď serveru Balikobot.",
        501 => "Technologie toho dopravce ještě není implementována, pro bližší informace sledujte web balikobot.cz.",
        503 => "Technologie dopravce není dostupná, požadavek bude vyřízen později.",
        _ => "Operace neproběhla v pořádku.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipper_mismatch_display() {
        let err = BalikobotError::ShipperMismatch {
            expected: "toptrans".to_string(),
            actual: "ppl".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Package is from different shipper (\"ppl\" instead of \"toptrans\")"
        );
    }

    #[test]
    fn bad_request_uses_status_table() {
        let err = BalikobotError::bad_request(503);
        assert!(matches!(err, BalikobotError::BadRequest { status: 503, .. }));
        assert!(err.to_string().contains("Technologie dopravce není dostupná"));
    }

    #[test]
    fn unknown_status_has_generic_message() {
        assert_eq!(status_message(599), "Operace neproběhla v pořádku.");
    }
}
