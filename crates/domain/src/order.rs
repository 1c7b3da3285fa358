use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Order as published on the stream and stored by the durable store.
///
/// Every field falls back to its empty value when absent from the payload, so
/// an incompletely populated message still decodes and is then rejected by
/// validation instead of by the decoder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Order {
    #[validate(custom(function = "non_blank"))]
    pub order_uid: String,

    #[validate(length(min = 1, message = "Track number cannot be empty"))]
    pub track_number: String,

    #[validate(length(min = 1, message = "Entry cannot be empty"))]
    pub entry: String,

    #[validate(nested)]
    pub delivery: Delivery,

    #[validate(nested)]
    pub payment: Payment,

    #[validate(length(min = 1, message = "Order must have at least one item"), nested)]
    pub items: Vec<Item>,

    #[validate(length(min = 1, message = "Locale cannot be empty"))]
    pub locale: String,

    pub internal_signature: String,

    #[validate(length(min = 1, message = "Customer ID cannot be empty"))]
    pub customer_id: String,

    #[validate(length(min = 1, message = "Delivery service cannot be empty"))]
    pub delivery_service: String,

    #[serde(rename = "shardkey")]
    #[validate(length(min = 1, message = "Shard key cannot be empty"))]
    pub shard_key: String,

    #[validate(range(min = 0, message = "SM ID cannot be negative"))]
    pub sm_id: i64,

    pub date_created: DateTime<Utc>,

    #[validate(length(min = 1, message = "OOF shard cannot be empty"))]
    pub oof_shard: String,
}

/// Rejects empty and whitespace-only keys; lookups refuse those too
fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Order UID cannot be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Recipient of the shipment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Delivery {
    #[validate(length(min = 1, message = "Recipient name cannot be empty"))]
    pub name: String,

    #[validate(length(min = 1, message = "Phone cannot be empty"))]
    pub phone: String,

    #[validate(length(min = 1, message = "ZIP code cannot be empty"))]
    pub zip: String,

    #[validate(length(min = 1, message = "City cannot be empty"))]
    pub city: String,

    #[validate(length(min = 1, message = "Address cannot be empty"))]
    pub address: String,

    #[validate(length(min = 1, message = "Region cannot be empty"))]
    pub region: String,

    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Payment {
    #[validate(length(min = 1, message = "Transaction cannot be empty"))]
    pub transaction: String,

    pub request_id: String,

    #[validate(length(min = 3, max = 3, message = "Currency must be a 3-letter code"))]
    pub currency: String,

    #[validate(length(min = 1, message = "Provider cannot be empty"))]
    pub provider: String,

    #[validate(range(min = 0, message = "Amount cannot be negative"))]
    pub amount: i64,

    /// Unix timestamp, seconds
    #[validate(range(min = 1, message = "Payment time must be set"))]
    pub payment_dt: i64,

    #[validate(length(min = 1, message = "Bank cannot be empty"))]
    pub bank: String,

    #[validate(range(min = 0, message = "Delivery cost cannot be negative"))]
    pub delivery_cost: i64,

    #[validate(range(min = 0, message = "Goods total cannot be negative"))]
    pub goods_total: i64,

    #[validate(range(min = 0, message = "Custom fee cannot be negative"))]
    pub custom_fee: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Item {
    #[validate(range(min = 1, message = "Catalog ID must be set"))]
    pub chrt_id: i64,

    #[validate(length(min = 1, message = "Track number cannot be empty"))]
    pub track_number: String,

    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price: i64,

    #[validate(length(min = 1, message = "Row ID cannot be empty"))]
    pub rid: String,

    #[validate(length(min = 1, message = "Item name cannot be empty"))]
    pub name: String,

    /// Discount, percent
    #[validate(range(min = 0, max = 100, message = "Sale must be between 0 and 100"))]
    pub sale: i64,

    #[validate(length(min = 1, message = "Size cannot be empty"))]
    pub size: String,

    #[validate(range(min = 0, message = "Total price cannot be negative"))]
    pub total_price: i64,

    #[validate(range(min = 1, message = "NM ID must be set"))]
    pub nm_id: i64,

    #[validate(length(min = 1, message = "Brand cannot be empty"))]
    pub brand: String,

    #[validate(range(min = 0, message = "Status cannot be negative"))]
    pub status: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "order_uid": "b563feb7b2b84b6test",
        "track_number": "WBILMTESTTRACK",
        "entry": "WBIL",
        "delivery": {
            "name": "Test Testov",
            "phone": "+9720000000",
            "zip": "2639809",
            "city": "Kiryat Mozkin",
            "address": "Ploshad Mira 15",
            "region": "Kraiot",
            "email": "test@gmail.com"
        },
        "payment": {
            "transaction": "b563feb7b2b84b6test",
            "request_id": "",
            "currency": "USD",
            "provider": "wbpay",
            "amount": 1817,
            "payment_dt": 1637907727,
            "bank": "alpha",
            "delivery_cost": 1500,
            "goods_total": 317,
            "custom_fee": 0
        },
        "items": [
            {
                "chrt_id": 9934930,
                "track_number": "WBILMTESTTRACK",
                "price": 453,
                "rid": "ab4219087a764ae0btest",
                "name": "Mascaras",
                "sale": 30,
                "size": "0",
                "total_price": 317,
                "nm_id": 2389212,
                "brand": "Vivienne Sabo",
                "status": 202
            }
        ],
        "locale": "en",
        "internal_signature": "",
        "customer_id": "test",
        "delivery_service": "meest",
        "shardkey": "9",
        "sm_id": 99,
        "date_created": "2021-11-26T06:22:19Z",
        "oof_shard": "1"
    }"#;

    #[test]
    fn test_deserialize_stream_payload() {
        let order: Order = serde_json::from_str(SAMPLE).unwrap();

        assert_eq!(order.order_uid, "b563feb7b2b84b6test");
        assert_eq!(order.shard_key, "9");
        assert_eq!(order.payment.amount, 1817);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].brand, "Vivienne Sabo");
        assert!(order.validate().is_ok());
    }

    #[test]
    fn test_serialize_uses_wire_field_names() {
        let order: Order = serde_json::from_str(SAMPLE).unwrap();
        let json = serde_json::to_value(&order).unwrap();

        assert_eq!(json["shardkey"], "9");
        assert!(json.get("shard_key").is_none());
        assert_eq!(json["items"][0]["chrt_id"], 9934930);
    }

    #[test]
    fn test_missing_fields_decode_as_empty() {
        let order: Order = serde_json::from_str(r#"{"order_uid": "partial"}"#).unwrap();

        assert_eq!(order.order_uid, "partial");
        assert!(order.items.is_empty());
        assert!(order.delivery.name.is_empty());
    }

    #[test]
    fn test_non_object_payload_is_rejected() {
        assert!(serde_json::from_str::<Order>("\"not an order\"").is_err());
        assert!(serde_json::from_str::<Order>(r#"{"sm_id": "ninety"}"#).is_err());
        assert!(serde_json::from_slice::<Order>(b"{ truncated").is_err());
    }
}
