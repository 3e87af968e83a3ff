//! Classification and vehicle rows.

use rust_decimal::Decimal;
use serde::Serialize;

use cse_motors_core::{ClassificationId, InventoryId, Price, format_number};

/// A vehicle category such as "SUV" or "Truck".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Classification {
    pub classification_id: ClassificationId,
    pub classification_name: String,
}

/// An inventory item joined with its classification name.
///
/// Serialized as-is for the management table's JSON endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Vehicle {
    pub inv_id: InventoryId,
    pub inv_make: String,
    pub inv_model: String,
    pub inv_year: i32,
    pub inv_description: String,
    pub inv_image: String,
    pub inv_thumbnail: String,
    pub inv_price: Decimal,
    pub inv_miles: i32,
    pub inv_color: String,
    pub classification_id: ClassificationId,
    pub classification_name: String,
}

impl Vehicle {
    /// "2019 Ford Edge"
    #[must_use]
    pub fn title(&self) -> String {
        format!("{} {} {}", self.inv_year, self.inv_make, self.inv_model)
    }

    /// "Ford Edge"
    #[must_use]
    pub fn make_model(&self) -> String {
        format!("{} {}", self.inv_make, self.inv_model)
    }

    #[must_use]
    pub fn price_display(&self) -> String {
        Price::new(self.inv_price).display_usd()
    }

    #[must_use]
    pub fn miles_display(&self) -> String {
        format_number(i64::from(self.inv_miles))
    }
}

/// Validated values for inserting or updating an inventory item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleDraft {
    pub classification_id: ClassificationId,
    pub inv_make: String,
    pub inv_model: String,
    pub inv_year: i32,
    pub inv_description: String,
    pub inv_image: String,
    pub inv_thumbnail: String,
    pub inv_price: Decimal,
    pub inv_miles: i32,
    pub inv_color: String,
}

impl VehicleDraft {
    #[must_use]
    pub fn make_model(&self) -> String {
        format!("{} {}", self.inv_make, self.inv_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle() -> Vehicle {
        Vehicle {
            inv_id: InventoryId::new(1),
            inv_make: "Jeep".to_string(),
            inv_model: "Wrangler".to_string(),
            inv_year: 2019,
            inv_description: "The Jeep Wrangler is small and compact.".to_string(),
            inv_image: "/images/vehicles/wrangler.jpg".to_string(),
            inv_thumbnail: "/images/vehicles/wrangler-tn.jpg".to_string(),
            inv_price: Decimal::new(28_045, 0),
            inv_miles: 41_205,
            inv_color: "Yellow".to_string(),
            classification_id: ClassificationId::new(2),
            classification_name: "SUV".to_string(),
        }
    }

    #[test]
    fn test_vehicle_display_helpers() {
        let v = vehicle();
        assert_eq!(v.title(), "2019 Jeep Wrangler");
        assert_eq!(v.make_model(), "Jeep Wrangler");
        assert_eq!(v.price_display(), "$28,045.00");
        assert_eq!(v.miles_display(), "41,205");
    }

    #[test]
    fn test_vehicle_serializes_for_management_table() {
        let json = serde_json::to_value(vehicle()).unwrap_or_default();
        assert_eq!(json["inv_id"], 1);
        assert_eq!(json["inv_make"], "Jeep");
        assert_eq!(json["classification_name"], "SUV");
    }
}
