//! Shipment tracking events.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::response::{f64_field, string_field, string_or_empty};

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// One event in a shipment's history.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingStatus {
    /// `None` when the carrier sent no date or one that could not be read.
    pub date: Option<NaiveDateTime>,
    /// Fine grained Balikobot status id, e.g. `2.2`.
    pub id: f64,
    /// Status group, the integer part shared by related ids.
    pub group_id: i64,
    /// Balikobot's normalized description.
    pub name: String,
    /// The carrier's own description.
    pub description: String,
    /// `event` or `notification`.
    pub status_type: String,
}

impl TrackingStatus {
    /// Build from one `states` entry of a track response.
    pub fn from_data(data: &Value) -> Self {
        let group_id = f64_field(data, "status_id").unwrap_or_default();
        let description = string_or_empty(data, "name");

        Self {
            date: string_field(data, "date").and_then(|raw| parse_date(&raw)),
            id: f64_field(data, "status_id_v2").unwrap_or(group_id),
            group_id: group_id.trunc() as i64,
            name: string_field(data, "name_balikobot").unwrap_or_else(|| description.clone()),
            description,
            status_type: string_field(data, "type").unwrap_or_else(|| "event".to_string()),
        }
    }

    /// Build from one package entry of a `trackstatus` response, which holds
    /// only the latest state and no date.
    pub fn from_last_status_data(data: &Value) -> Self {
        let group_id = f64_field(data, "status_id").unwrap_or_default();
        let text = string_or_empty(data, "status_text");

        Self {
            date: None,
            id: f64_field(data, "status_id_v2").unwrap_or(group_id),
            group_id: group_id.trunc() as i64,
            name: text.clone(),
            description: text,
            status_type: "event".to_string(),
        }
    }
}

fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    let parsed = NaiveDateTime::parse_from_str(raw, DATE_TIME_FORMAT).ok().or_else(|| {
        NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    });
    if parsed.is_none() {
        tracing::debug!(date = raw, "unreadable tracking date");
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, DATE_TIME_FORMAT).unwrap()
    }

    #[test]
    fn from_data_reads_all_fields() {
        let status = TrackingStatus::from_data(&json!({
            "date": "2018-11-07 14:15:01",
            "name": "Doručování zásilky",
            "status_id": 2,
            "status_id_v2": 2.2,
            "type": "notification",
            "name_balikobot": "Zásilka je v přepravě.",
        }));

        assert_eq!(status.date, Some(datetime("2018-11-07 14:15:01")));
        assert_eq!(status.id, 2.2);
        assert_eq!(status.group_id, 2);
        assert_eq!(status.name, "Zásilka je v přepravě.");
        assert_eq!(status.description, "Doručování zásilky");
        assert_eq!(status.status_type, "notification");
    }

    #[test]
    fn id_falls_back_to_status_id() {
        let status = TrackingStatus::from_data(&json!({"status_id": -1, "name": "Obdrženy údaje k zásilce."}));
        assert_eq!(status.id, -1.0);
        assert_eq!(status.group_id, -1);
        assert_eq!(status.name, "Obdrženy údaje k zásilce.");
        assert_eq!(status.status_type, "event");
        assert_eq!(status.date, None);
    }

    #[test]
    fn unreadable_date_becomes_none() {
        let status = TrackingStatus::from_data(&json!({"date": "2020-11-06 21=>00=>00", "status_id": 1}));
        assert_eq!(status.date, None);
    }

    #[test]
    fn date_only_is_midnight() {
        let status = TrackingStatus::from_data(&json!({"date": "2018-11-08", "status_id": 1}));
        assert_eq!(status.date, Some(datetime("2018-11-08 00:00:00")));
    }

    #[test]
    fn last_status_uses_status_text() {
        let status = TrackingStatus::from_last_status_data(&json!({
            "carrier_id": "1234",
            "status": 200,
            "status_id": 1,
            "status_id_v2": 1.2,
            "status_text": "Zásilka byla doručena příjemci.",
        }));
        assert_eq!(status.id, 1.2);
        assert_eq!(status.group_id, 1);
        assert_eq!(status.name, "Zásilka byla doručena příjemci.");
        assert_eq!(status.date, None);
    }
}
