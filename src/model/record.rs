use crate::model::{Amount, ForecastType, Month};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single forecast line item.
///
/// `etc` and `eac` are derived fields. `eac` is always `actuals + etc`; `etc`
/// is `max(0, budget - actuals)` until a user edits it directly, at which
/// point `etc_override` becomes true and stays true for the life of the
/// record. The engine in [`crate::engine`] is the only code that should
/// mutate the derived fields.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ForecastRecord {
    /// Opaque identifier, assigned at creation and immutable thereafter. The
    /// sole join key between local state and the row-store.
    pub id: String,
    pub sheet_name: String,
    pub forecast_type: ForecastType,
    pub month: Month,
    pub budget: Amount,
    pub actuals: Amount,
    pub etc: Amount,
    /// Sticky flag set when `etc` was edited directly rather than derived.
    #[serde(default)]
    pub etc_override: bool,
    pub eac: Amount,
    /// Serialized state of an attached spreadsheet-widget view, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_json: Option<SheetJson>,
}

impl ForecastRecord {
    /// Generates a fresh record id, unique within the process.
    pub fn new_id() -> String {
        Uuid::new_v4().to_string()
    }
}

/// An opaque blob holding the serialized state of a spreadsheet-widget view.
///
/// Round-tripped verbatim between the widget and the row-store; never parsed
/// or interpreted by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SheetJson(String);

impl SheetJson {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id_is_unique() {
        assert_ne!(ForecastRecord::new_id(), ForecastRecord::new_id());
    }

    #[test]
    fn test_record_json_round_trip() {
        let record = ForecastRecord {
            id: ForecastRecord::new_id(),
            sheet_name: "Software Licenses".to_string(),
            forecast_type: ForecastType::TimeBased,
            month: Month::Feb2026,
            budget: Amount::from(50000),
            actuals: Amount::from(12500),
            etc: Amount::from(37500),
            etc_override: false,
            eac: Amount::from(50000),
            sheet_json: Some(SheetJson::new(r#"{"cells":{}}"#)),
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: ForecastRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_sheet_json_is_verbatim() {
        let blob = SheetJson::new("{\"not\": \"interpreted\"}");
        let json = serde_json::to_string(&blob).unwrap();
        let back: SheetJson = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_str(), blob.as_str());
    }

    #[test]
    fn test_missing_optional_fields_default() {
        // Rows persisted before the override flag existed deserialize cleanly.
        let json = r#"{
            "id": "row-1",
            "sheet_name": "Legacy",
            "forecast_type": "Commitment based",
            "month": "Jan 2026",
            "budget": "100",
            "actuals": "25",
            "etc": "75",
            "eac": "100"
        }"#;
        let record: ForecastRecord = serde_json::from_str(json).unwrap();
        assert!(!record.etc_override);
        assert!(record.sheet_json.is_none());
    }
}
