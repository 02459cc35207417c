//! The vehicle record and the payload used to create or overwrite one.

use crate::services::vin_codec;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::borrow::Cow;
use validator::{Validate, ValidationError};

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_FUEL_TYPE_LEN: usize = 50;
/// Year of the first production automobile.
pub const MIN_MODEL_YEAR: i32 = 1886;

/// A persisted vehicle, keyed by its VIN.
///
/// Every column of the `vehicles` table appears here; the API returns this
/// struct as-is.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq)]
pub struct Vehicle {
    /// 17-character VIN. Never changes after creation.
    pub vin: String,

    pub manufacturer_name: String,

    pub description: String,

    pub horse_power: i32,

    pub model_name: String,

    pub model_year: i32,

    pub purchase_price: f64,

    /// Fuel kind, e.g. "gasoline" or "diesel".
    pub fuel_type: String,

    pub color: String,

    /// Body category, e.g. "sedan" or "truck".
    pub category: String,
}

/// Request body for `POST /vehicle` and `PUT /vehicle/{vin}`.
///
/// Missing fields and wrong JSON types are caught by deserialization; range
/// and length rules are checked by [`Validate::validate`], which reports
/// every violation at once.
#[derive(Deserialize, Serialize, Clone, Debug, Validate)]
pub struct VehicleCreate {
    /// Caller-chosen VIN. Generated when absent; ignored on update.
    #[serde(default)]
    #[validate(custom = "validate_vin")]
    pub vin: Option<String>,

    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub manufacturer_name: String,

    pub description: String,

    #[validate(range(min = 1, message = "must be greater than 0"))]
    pub horse_power: i32,

    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub model_name: String,

    #[validate(range(min = 1886, message = "must be 1886 or later"))]
    pub model_year: i32,

    #[validate(custom = "validate_purchase_price")]
    pub purchase_price: f64,

    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub fuel_type: String,

    pub color: String,

    pub category: String,
}

fn validate_vin(vin: &str) -> Result<(), ValidationError> {
    if vin_codec::is_valid(vin) {
        return Ok(());
    }
    let mut err = ValidationError::new("vin_format");
    err.message = Some(Cow::from(
        "must be 17 characters of 0-9 or A-Z excluding I, O and Q",
    ));
    Err(err)
}

/// Strictly positive and finite; NaN fails the comparison as well.
fn validate_purchase_price(price: f64) -> Result<(), ValidationError> {
    if price.is_finite() && price > 0.0 {
        return Ok(());
    }
    let mut err = ValidationError::new("range");
    err.message = Some(Cow::from("must be a finite number greater than 0"));
    err.add_param(Cow::from("value"), &price);
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camry() -> VehicleCreate {
        VehicleCreate {
            vin: None,
            manufacturer_name: "Toyota".into(),
            description: "Sedan".into(),
            horse_power: 150,
            model_name: "Camry".into(),
            model_year: 2020,
            purchase_price: 25_000.0,
            fuel_type: "gasoline".into(),
            color: "blue".into(),
            category: "sedan".into(),
        }
    }

    fn failing_fields(draft: &VehicleCreate) -> Vec<&'static str> {
        let errors = draft.validate().expect_err("expected violations");
        let mut fields: Vec<_> = errors.field_errors().into_keys().collect();
        fields.sort_unstable();
        fields
    }

    #[test]
    fn accepts_a_complete_payload() {
        assert!(camry().validate().is_ok());
    }

    #[test]
    fn accepts_a_well_formed_vin() {
        let draft = VehicleCreate {
            vin: Some("1HGCM82633A004352".into()),
            ..camry()
        };
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn rejects_malformed_vin() {
        for vin in ["1hgcm82633a004352", "1HGCM82633A00435", "1HGCM82633A00435O"] {
            let draft = VehicleCreate {
                vin: Some(vin.into()),
                ..camry()
            };
            assert_eq!(failing_fields(&draft), vec!["vin"], "vin {vin}");
        }
    }

    #[test]
    fn numeric_boundaries() {
        let ok = VehicleCreate {
            horse_power: 1,
            model_year: MIN_MODEL_YEAR,
            purchase_price: 0.01,
            ..camry()
        };
        assert!(ok.validate().is_ok());

        let bad = VehicleCreate {
            horse_power: 0,
            model_year: MIN_MODEL_YEAR - 1,
            purchase_price: 0.0,
            ..camry()
        };
        assert_eq!(
            failing_fields(&bad),
            vec!["horse_power", "model_year", "purchase_price"]
        );
    }

    #[test]
    fn rejects_negative_and_non_finite_prices() {
        for price in [-1.0, f64::NAN, f64::INFINITY] {
            let draft = VehicleCreate {
                purchase_price: price,
                ..camry()
            };
            assert_eq!(failing_fields(&draft), vec!["purchase_price"]);
        }
    }

    #[test]
    fn length_limits_count_characters() {
        let at_limit = VehicleCreate {
            manufacturer_name: "é".repeat(MAX_NAME_LEN),
            model_name: "m".repeat(MAX_NAME_LEN),
            fuel_type: "f".repeat(MAX_FUEL_TYPE_LEN),
            ..camry()
        };
        assert!(at_limit.validate().is_ok());

        let over = VehicleCreate {
            manufacturer_name: "x".repeat(MAX_NAME_LEN + 1),
            model_name: "m".repeat(MAX_NAME_LEN + 1),
            fuel_type: "f".repeat(MAX_FUEL_TYPE_LEN + 1),
            ..camry()
        };
        assert_eq!(
            failing_fields(&over),
            vec!["fuel_type", "manufacturer_name", "model_name"]
        );
    }

    #[test]
    fn reports_codes_and_messages() {
        let draft = VehicleCreate {
            horse_power: -5,
            ..camry()
        };
        let errors = draft.validate().unwrap_err();
        let field_errors = errors.field_errors();
        let hp = &field_errors["horse_power"][0];
        assert_eq!(hp.code, "range");
        assert_eq!(hp.message.as_deref(), Some("must be greater than 0"));
    }

    #[test]
    fn custom_rules_report_their_own_codes() {
        let draft = VehicleCreate {
            vin: Some("1HGCM82633A00435I".into()),
            purchase_price: f64::NAN,
            fuel_type: "f".repeat(MAX_FUEL_TYPE_LEN + 1),
            ..camry()
        };
        let errors = draft.validate().unwrap_err();
        let field_errors = errors.field_errors();

        assert_eq!(field_errors["vin"][0].code, "vin_format");
        assert_eq!(field_errors["purchase_price"][0].code, "range");
        assert_eq!(
            field_errors["purchase_price"][0].message.as_deref(),
            Some("must be a finite number greater than 0")
        );
        assert_eq!(field_errors["fuel_type"][0].code, "length");
        assert_eq!(
            field_errors["fuel_type"][0].message.as_deref(),
            Some("must be at most 50 characters")
        );
    }

    #[test]
    fn payload_vin_is_optional_in_json() {
        let draft: VehicleCreate = serde_json::from_value(serde_json::json!({
            "manufacturer_name": "Toyota",
            "description": "Sedan",
            "horse_power": 150,
            "model_name": "Camry",
            "model_year": 2020,
            "purchase_price": 25000.0,
            "fuel_type": "gasoline",
            "color": "blue",
            "category": "sedan"
        }))
        .unwrap();
        assert!(draft.vin.is_none());
    }
}
