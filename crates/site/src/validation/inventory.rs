//! Classification and inventory forms.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::Deserialize;

use cse_motors_core::ClassificationId;

use super::ValidationErrors;
use crate::models::{Vehicle, VehicleDraft};

/// Earliest model year accepted (the first production automobile).
pub const FIRST_MODEL_YEAR: i32 = 1886;

static CLASSIFICATION_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("Invalid regex"));

static VEHICLE_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/images/vehicles/[^/]+\.(jpg|jpeg|png)$").expect("Invalid regex")
});

/// New classification submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClassificationForm {
    pub classification_name: String,
}

impl ClassificationForm {
    /// Text-only rules. Returns the trimmed name.
    pub(crate) fn check(&self) -> Result<String, ValidationErrors> {
        let name = self.classification_name.trim();
        let mut errors = ValidationErrors::new();
        errors.check(
            "classification_name",
            !name.is_empty(),
            "Please provide a classification name.",
        );
        errors.check(
            "classification_name",
            CLASSIFICATION_NAME_RE.is_match(name),
            "Classification name must not contain spaces or special characters.",
        );
        errors.finish(|| name.to_string())
    }
}

/// Add or edit vehicle submission.
///
/// `inv_id` is only present on the edit form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InventoryForm {
    pub inv_id: String,
    pub classification_id: String,
    pub inv_make: String,
    pub inv_model: String,
    pub inv_description: String,
    pub inv_image: String,
    pub inv_thumbnail: String,
    pub inv_price: String,
    pub inv_year: String,
    pub inv_miles: String,
    pub inv_color: String,
}

impl From<&Vehicle> for InventoryForm {
    fn from(v: &Vehicle) -> Self {
        Self {
            inv_id: v.inv_id.to_string(),
            classification_id: v.classification_id.to_string(),
            inv_make: v.inv_make.clone(),
            inv_model: v.inv_model.clone(),
            inv_description: v.inv_description.clone(),
            inv_image: v.inv_image.clone(),
            inv_thumbnail: v.inv_thumbnail.clone(),
            inv_price: v.inv_price.normalize().to_string(),
            inv_year: v.inv_year.to_string(),
            inv_miles: v.inv_miles.to_string(),
            inv_color: v.inv_color.clone(),
        }
    }
}

impl InventoryForm {
    /// Validate against the given calendar year (next year's models are allowed).
    ///
    /// # Errors
    ///
    /// Returns every violated rule.
    pub fn validate(&self, current_year: i32) -> Result<VehicleDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let classification_id = self
            .classification_id
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|id| *id >= 1);
        errors.check(
            "classification_id",
            classification_id.is_some(),
            "Please select a classification.",
        );

        check_min_len(
            &mut errors,
            "inv_make",
            &self.inv_make,
            3,
            "Please provide a vehicle make (min 3 characters).",
        );
        check_min_len(
            &mut errors,
            "inv_model",
            &self.inv_model,
            3,
            "Please provide a vehicle model (min 3 characters).",
        );
        check_min_len(
            &mut errors,
            "inv_description",
            &self.inv_description,
            5,
            "Please provide a description (min 5 characters).",
        );
        errors.check(
            "inv_image",
            VEHICLE_IMAGE_RE.is_match(self.inv_image.trim()),
            "Image path must be a valid path (e.g., /images/vehicles/file.png).",
        );
        errors.check(
            "inv_thumbnail",
            VEHICLE_IMAGE_RE.is_match(self.inv_thumbnail.trim()),
            "Thumbnail path must be a valid path (e.g., /images/vehicles/file-tn.png).",
        );

        let price = Decimal::from_str(self.inv_price.trim()).ok();
        if errors.check("inv_price", price.is_some(), "Price must be a number.") {
            errors.check(
                "inv_price",
                price.is_some_and(|p| p > Decimal::ZERO),
                "Price must be greater than zero.",
            );
        }

        let max_year = current_year + 1;
        let year = self
            .inv_year
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|y| (FIRST_MODEL_YEAR..=max_year).contains(y));
        errors.check(
            "inv_year",
            year.is_some(),
            "Please provide a valid year.",
        );

        let miles = self
            .inv_miles
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|m| *m >= 0);
        errors.check(
            "inv_miles",
            miles.is_some(),
            "Miles must be a positive integer.",
        );

        check_min_len(
            &mut errors,
            "inv_color",
            &self.inv_color,
            3,
            "Please provide a vehicle color (min 3 characters).",
        );

        match (classification_id, price, year, miles) {
            (Some(classification_id), Some(inv_price), Some(inv_year), Some(inv_miles))
                if errors.is_empty() =>
            {
                Ok(VehicleDraft {
                    classification_id: ClassificationId::new(classification_id),
                    inv_make: self.inv_make.trim().to_string(),
                    inv_model: self.inv_model.trim().to_string(),
                    inv_year,
                    inv_description: self.inv_description.trim().to_string(),
                    inv_image: self.inv_image.trim().to_string(),
                    inv_thumbnail: self.inv_thumbnail.trim().to_string(),
                    inv_price,
                    inv_miles,
                    inv_color: self.inv_color.trim().to_string(),
                })
            }
            _ => Err(errors),
        }
    }
}

/// Delete confirmation submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InventoryDeleteForm {
    pub inv_id: String,
}

fn check_min_len(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    min: usize,
    message: &str,
) {
    errors.check(field, value.trim().chars().count() >= min, message);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> InventoryForm {
        InventoryForm {
            inv_id: String::new(),
            classification_id: "5".to_string(),
            inv_make: "Chevy".to_string(),
            inv_model: "Camaro".to_string(),
            inv_description: "If you want to look cool this is the car you need.".to_string(),
            inv_image: "/images/vehicles/camaro.jpg".to_string(),
            inv_thumbnail: "/images/vehicles/camaro-tn.jpg".to_string(),
            inv_price: "25000".to_string(),
            inv_year: "2018".to_string(),
            inv_miles: "101222".to_string(),
            inv_color: "Silver".to_string(),
        }
    }

    #[test]
    fn test_classification_name_rules() {
        let ok = ClassificationForm {
            classification_name: " Electric ".to_string(),
        };
        assert_eq!(ok.check().unwrap(), "Electric");

        let spaced = ClassificationForm {
            classification_name: "Sport Cars".to_string(),
        };
        assert_eq!(
            spaced.check().unwrap_err().messages(),
            vec!["Classification name must not contain spaces or special characters."]
        );

        let symbols = ClassificationForm {
            classification_name: "4x4!".to_string(),
        };
        assert!(symbols.check().is_err());
    }

    #[test]
    fn test_empty_classification_name_reports_both_rules() {
        let empty = ClassificationForm::default();
        assert_eq!(empty.check().unwrap_err().len(), 2);
    }

    #[test]
    fn test_valid_inventory_form() {
        let draft = form().validate(2025).unwrap();
        assert_eq!(draft.classification_id, ClassificationId::new(5));
        assert_eq!(draft.inv_price, Decimal::new(25_000, 0));
        assert_eq!(draft.inv_year, 2018);
        assert_eq!(draft.make_model(), "Chevy Camaro");
    }

    #[test]
    fn test_inventory_form_trims_stored_values() {
        let mut f = form();
        f.inv_make = "  Chevy ".to_string();
        assert_eq!(f.validate(2025).unwrap().inv_make, "Chevy");
    }

    #[test]
    fn test_inventory_form_collects_errors_in_field_order() {
        let mut f = form();
        f.classification_id = String::new();
        f.inv_make = "VW".to_string();
        f.inv_image = "camaro.gif".to_string();
        f.inv_price = "abc".to_string();
        f.inv_year = "1885".to_string();
        f.inv_miles = "-4".to_string();

        let errors = f.validate(2025).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "classification_id",
                "inv_make",
                "inv_image",
                "inv_price",
                "inv_year",
                "inv_miles"
            ]
        );
        assert!(errors.messages().contains(&"Price must be a number."));
    }

    #[test]
    fn test_price_must_be_positive() {
        let mut f = form();
        f.inv_price = "0".to_string();
        assert_eq!(
            f.validate(2025).unwrap_err().messages(),
            vec!["Price must be greater than zero."]
        );
    }

    #[test]
    fn test_next_model_year_is_allowed() {
        let mut f = form();
        f.inv_year = "2026".to_string();
        assert!(f.validate(2025).is_ok());
        f.inv_year = "2027".to_string();
        assert!(f.validate(2025).is_err());
    }

    #[test]
    fn test_form_from_vehicle_round_trips_through_validation() {
        let draft = form().validate(2025).unwrap();
        let vehicle = Vehicle {
            inv_id: cse_motors_core::InventoryId::new(9),
            inv_make: draft.inv_make.clone(),
            inv_model: draft.inv_model.clone(),
            inv_year: draft.inv_year,
            inv_description: draft.inv_description.clone(),
            inv_image: draft.inv_image.clone(),
            inv_thumbnail: draft.inv_thumbnail.clone(),
            inv_price: Decimal::new(2_500_000, 2),
            inv_miles: draft.inv_miles,
            inv_color: draft.inv_color.clone(),
            classification_id: draft.classification_id,
            classification_name: "Sport".to_string(),
        };
        let edit = InventoryForm::from(&vehicle);
        assert_eq!(edit.inv_id, "9");
        assert_eq!(edit.inv_price, "25000");
        assert_eq!(edit.validate(2025).unwrap(), draft);
    }
}
