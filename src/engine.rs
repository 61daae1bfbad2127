//! The recompute/override engine for forecast records.
//!
//! Given a record and a field-level edit, produce a new, internally
//! consistent record. Two invariants hold after every mutation that passes
//! through here:
//!
//! - `eac == actuals + etc`, always.
//! - `etc == max(0, budget - actuals)` while `etc_override` is false.
//!
//! Editing `etc` directly sets the sticky `etc_override` flag, after which
//! budget/actuals edits leave `etc` alone and only `eac` is recomputed. There
//! is no reset path for the flag.
//!
//! Nothing in this module returns an error: every input is coerced to a safe
//! default so that spreadsheet-style editing never blocks the user.
//! Advisory validation (e.g. rejecting an empty import file) belongs to the
//! import adapter, not here.

use crate::model::{Amount, Field, ForecastRecord, ForecastType, Month, Totals};
use std::cmp;

/// Default sheet name for records created through "add row".
pub const DEFAULT_SHEET_NAME: &str = "New Sheet";

/// Calculates ETC (Estimate to Complete): `budget - actuals`, floored at 0.
pub fn calculate_etc(budget: Amount, actuals: Amount) -> Amount {
    cmp::max(Amount::default(), budget - actuals)
}

/// Calculates EAC (Estimate at Completion): `actuals + etc`.
pub fn calculate_eac(actuals: Amount, etc: Amount) -> Amount {
    actuals + etc
}

/// Re-derives the computed fields of a record.
///
/// `etc` is recomputed from budget/actuals unless the override flag is set,
/// in which case the manual value is kept (it may legitimately be negative;
/// the zero floor applies only to the derived path). `eac` is always
/// recomputed.
pub fn recalculate(record: &ForecastRecord) -> ForecastRecord {
    let etc = if record.etc_override {
        record.etc
    } else {
        calculate_etc(record.budget, record.actuals)
    };
    let eac = calculate_eac(record.actuals, etc);
    ForecastRecord {
        etc,
        eac,
        ..record.clone()
    }
}

/// Applies a single field-level edit and returns the updated record.
///
/// `value` is the raw cell text from the edit surface; it is coerced per the
/// field's type. Descriptive fields pass through untouched, numeric fields
/// trigger a recompute, and an `etc` edit additionally sets the sticky
/// override flag. EAC is not an edit target.
pub fn apply_edit(record: &ForecastRecord, field: Field, value: &str) -> ForecastRecord {
    let mut next = record.clone();
    match field {
        Field::SheetName => next.sheet_name = value.to_string(),
        Field::ForecastType => next.forecast_type = ForecastType::coerce(value),
        Field::Month => next.month = Month::coerce(value),
        Field::Budget => next.budget = Amount::parse(value),
        Field::Actuals => next.actuals = Amount::parse(value),
        Field::Etc => {
            next.etc = Amount::parse(value);
            next.etc_override = true;
        }
    }
    match field {
        Field::Budget | Field::Actuals | Field::Etc => recalculate(&next),
        _ => next,
    }
}

/// Creates a new empty row with a fresh id and all derived fields computed
/// from `budget = actuals = 0`.
pub fn new_record() -> ForecastRecord {
    let budget = Amount::default();
    let actuals = Amount::default();
    let etc = calculate_etc(budget, actuals);
    let eac = calculate_eac(actuals, etc);
    ForecastRecord {
        id: ForecastRecord::new_id(),
        sheet_name: DEFAULT_SHEET_NAME.to_string(),
        forecast_type: ForecastType::default(),
        month: Month::default(),
        budget,
        actuals,
        etc,
        etc_override: false,
        eac,
        sheet_json: None,
    }
}

/// One not-yet-validated row from an import source, all fields as raw text.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub sheet_name: Option<String>,
    pub forecast_type: Option<String>,
    pub month: Option<String>,
    pub budget: Option<String>,
    pub actuals: Option<String>,
}

/// Builds a record from an import row, defaulting every absent or invalid
/// field.
///
/// `etc` and `eac` are always computed fresh from budget/actuals; the
/// override flag is never honored from an import source.
pub fn import_record(raw: &RawRow) -> ForecastRecord {
    let sheet_name = match &raw.sheet_name {
        Some(text) => text.trim().to_string(),
        None => DEFAULT_SHEET_NAME.to_string(),
    };
    let budget = Amount::parse(raw.budget.as_deref().unwrap_or(""));
    let actuals = Amount::parse(raw.actuals.as_deref().unwrap_or(""));
    let etc = calculate_etc(budget, actuals);
    let eac = calculate_eac(actuals, etc);
    ForecastRecord {
        id: ForecastRecord::new_id(),
        sheet_name,
        forecast_type: ForecastType::coerce(raw.forecast_type.as_deref().unwrap_or("")),
        month: Month::coerce(raw.month.as_deref().unwrap_or("")),
        budget,
        actuals,
        etc,
        etc_override: false,
        eac,
        sheet_json: None,
    }
}

/// Sums the numeric columns across all records for the summary row.
///
/// Direct summation of stored values, not re-derivation; empty input yields
/// all zeros.
pub fn aggregate(records: &[ForecastRecord]) -> Totals {
    let mut totals = Totals::default();
    for record in records {
        totals.budget += record.budget;
        totals.actuals += record.actuals;
        totals.etc += record.etc;
        totals.eac += record.eac;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    /// budget=50000, actuals=12500, no override.
    fn scenario_a() -> ForecastRecord {
        let record = ForecastRecord {
            id: ForecastRecord::new_id(),
            sheet_name: "Software Licenses".to_string(),
            budget: Amount::from(50000),
            actuals: Amount::from(12500),
            ..ForecastRecord::default()
        };
        recalculate(&record)
    }

    #[test]
    fn test_scenario_a_derived_fields() {
        let record = scenario_a();
        assert_eq!(record.etc, Amount::from(37500));
        assert_eq!(record.eac, Amount::from(50000));
        assert!(!record.etc_override);
    }

    #[test]
    fn test_scenario_b_actuals_edit_recomputes() {
        let record = apply_edit(&scenario_a(), Field::Actuals, "20000");
        assert_eq!(record.actuals, Amount::from(20000));
        assert_eq!(record.etc, Amount::from(30000));
        assert_eq!(record.eac, Amount::from(50000));
        assert!(!record.etc_override);
    }

    #[test]
    fn test_scenario_c_override_is_sticky() {
        let record = apply_edit(&scenario_a(), Field::Etc, "10000");
        assert!(record.etc_override);
        assert_eq!(record.etc, Amount::from(10000));
        assert_eq!(record.eac, Amount::from(22500));

        // Subsequent actuals edit leaves the manual etc alone.
        let record = apply_edit(&record, Field::Actuals, "15000");
        assert!(record.etc_override);
        assert_eq!(record.etc, Amount::from(10000));
        assert_eq!(record.eac, Amount::from(25000));
    }

    #[test]
    fn test_etc_edit_sets_override_regardless_of_prior_value() {
        let already_overridden = apply_edit(&scenario_a(), Field::Etc, "10000");
        let record = apply_edit(&already_overridden, Field::Etc, "5000");
        assert!(record.etc_override);
        assert_eq!(record.etc, Amount::from(5000));
    }

    #[test]
    fn test_derived_etc_floors_at_zero() {
        let mut record = scenario_a();
        record.budget = Amount::from(1000);
        record.actuals = Amount::from(2500);
        let record = recalculate(&record);
        assert_eq!(record.etc, Amount::default());
        assert_eq!(record.eac, Amount::from(2500));
    }

    #[test]
    fn test_manual_etc_may_be_negative() {
        let record = apply_edit(&scenario_a(), Field::Etc, "-500");
        assert_eq!(record.etc, Amount::from(-500));
        assert_eq!(record.eac, Amount::from(12000));
    }

    #[test]
    fn test_negative_budget_accepted_without_clamping() {
        let record = apply_edit(&scenario_a(), Field::Budget, "-1000");
        assert_eq!(record.budget, Amount::from(-1000));
        // Derived etc floors at zero even when the difference is negative.
        assert_eq!(record.etc, Amount::default());
        assert_eq!(record.eac, Amount::from(12500));
    }

    #[test]
    fn test_descriptive_edits_leave_derived_fields_alone() {
        let record = apply_edit(&scenario_a(), Field::SheetName, "Cloud Infrastructure");
        assert_eq!(record.sheet_name, "Cloud Infrastructure");
        assert_eq!(record.etc, Amount::from(37500));
        assert_eq!(record.eac, Amount::from(50000));

        let record = apply_edit(&record, Field::Month, "Mar 2026");
        assert_eq!(record.month, Month::Mar2026);
        assert_eq!(record.etc, Amount::from(37500));

        let record = apply_edit(&record, Field::ForecastType, "Time based");
        assert_eq!(record.forecast_type, ForecastType::TimeBased);
        assert_eq!(record.eac, Amount::from(50000));
    }

    #[test]
    fn test_unparsable_numeric_edit_coerces_to_zero() {
        let record = apply_edit(&scenario_a(), Field::Budget, "oops");
        assert_eq!(record.budget, Amount::default());
        assert_eq!(record.etc, Amount::default());
        assert_eq!(record.eac, Amount::from(12500));
    }

    #[test]
    fn test_new_record_defaults() {
        let record = new_record();
        assert_eq!(record.sheet_name, DEFAULT_SHEET_NAME);
        assert_eq!(record.forecast_type, ForecastType::CommitmentBased);
        assert_eq!(record.month, Month::Jan2026);
        assert!(record.budget.is_zero());
        assert!(record.actuals.is_zero());
        assert!(record.etc.is_zero());
        assert!(record.eac.is_zero());
        assert!(!record.etc_override);
        assert!(!record.id.is_empty());
    }

    #[test]
    fn test_scenario_d_import_coerces_bogus_enums() {
        let raw = RawRow {
            sheet_name: Some("Imported".to_string()),
            forecast_type: Some("bogus".to_string()),
            month: Some("Dec 1999".to_string()),
            budget: Some("100".to_string()),
            actuals: Some("40".to_string()),
        };
        let record = import_record(&raw);
        assert_eq!(record.forecast_type, ForecastType::CommitmentBased);
        assert_eq!(record.month, Month::Jan2026);
        assert_eq!(record.etc, Amount::from(60));
        assert_eq!(record.eac, Amount::from(100));
        assert!(!record.etc_override);
    }

    #[test]
    fn test_import_defaults_absent_fields() {
        let record = import_record(&RawRow::default());
        assert_eq!(record.sheet_name, DEFAULT_SHEET_NAME);
        assert_eq!(record.forecast_type, ForecastType::CommitmentBased);
        assert_eq!(record.month, Month::Jan2026);
        assert!(record.budget.is_zero());
        assert!(record.eac.is_zero());
    }

    #[test]
    fn test_import_parses_currency_text() {
        let raw = RawRow {
            sheet_name: Some("  Padded  ".to_string()),
            budget: Some("$50,000.00".to_string()),
            actuals: Some("12500".to_string()),
            ..RawRow::default()
        };
        let record = import_record(&raw);
        assert_eq!(record.sheet_name, "Padded");
        assert_eq!(record.budget, Amount::from(50000));
        assert_eq!(record.etc, Amount::from(37500));
    }

    #[test]
    fn test_aggregate_empty_is_zero() {
        let totals = aggregate(&[]);
        assert!(totals.budget.is_zero());
        assert!(totals.actuals.is_zero());
        assert!(totals.etc.is_zero());
        assert!(totals.eac.is_zero());
    }

    #[test]
    fn test_scenario_e_aggregate_sums_directly() {
        let a = scenario_a();
        let c = {
            let c = apply_edit(&scenario_a(), Field::Etc, "10000");
            apply_edit(&c, Field::Actuals, "15000")
        };
        let totals = aggregate(&[a.clone(), c.clone()]);
        assert_eq!(totals.budget, Amount::from(100000));
        assert_eq!(totals.actuals, Amount::from(27500));
        assert_eq!(totals.etc, Amount::from(47500));
        // Summed from stored eac values (50000 + 25000), not re-derived.
        assert_eq!(totals.eac, Amount::from(75000));

        // Sum-based, so record order is irrelevant.
        assert_eq!(aggregate(&[c, a]), totals);
    }
}
