//! Random orders that satisfy the validation rules.

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::{Delivery, Item, Order, Payment};

const NAMES: &[&str] = &["Alice Carter", "Boris Ivanov", "Chen Wei", "Dana Levi", "Emil Novak"];
const CITIES: &[&str] = &["Haifa", "Kazan", "Lisbon", "Tallinn", "Osaka"];
const REGIONS: &[&str] = &["North", "South", "Central", "Coastal"];
const WORDS: &[&str] = &["mascara", "kettle", "notebook", "sneakers", "lamp", "scarf"];
const BRANDS: &[&str] = &["Vivienne Sabo", "Acme", "Northwind", "Globex", "Initech"];

fn pick<R: Rng>(rng: &mut R, values: &[&str]) -> String {
    values[rng.random_range(0..values.len())].to_string()
}

/// Generate an order with a fresh UID
pub fn fake_order() -> Order {
    fake_order_with_uid(Uuid::new_v4().simple().to_string())
}

/// Generate an order with the given UID
pub fn fake_order_with_uid(order_uid: impl Into<String>) -> Order {
    let mut rng = rand::rng();
    let order_uid = order_uid.into();
    let track_number = format!("WBIL{}", Uuid::new_v4().simple()).to_uppercase();

    let items: Vec<Item> = (0..rng.random_range(1..=5))
        .map(|_| {
            let price = rng.random_range(100..=5000);
            let sale = rng.random_range(10..=80);
            Item {
                chrt_id: rng.random_range(1_000_000..=9_999_999),
                track_number: track_number.clone(),
                price,
                rid: Uuid::new_v4().simple().to_string(),
                name: pick(&mut rng, WORDS),
                sale,
                size: "0".to_string(),
                total_price: price * (100 - sale) / 100,
                nm_id: rng.random_range(1_000_000..=9_999_999),
                brand: pick(&mut rng, BRANDS),
                status: 202,
            }
        })
        .collect();

    let goods_total: i64 = items.iter().map(|item| item.total_price).sum();
    let delivery_cost = rng.random_range(100..=1000);
    let name = pick(&mut rng, NAMES);
    let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));

    Order {
        order_uid: order_uid.clone(),
        track_number,
        entry: "WBIL".to_string(),
        delivery: Delivery {
            name,
            phone: format!("+972{:07}", rng.random_range(0..10_000_000)),
            zip: format!("{:07}", rng.random_range(0..10_000_000)),
            city: pick(&mut rng, CITIES),
            address: format!("Main St {}", rng.random_range(1..=200)),
            region: pick(&mut rng, REGIONS),
            email,
        },
        payment: Payment {
            transaction: order_uid,
            request_id: String::new(),
            currency: "USD".to_string(),
            provider: "wbpay".to_string(),
            amount: goods_total + delivery_cost,
            payment_dt: Utc::now().timestamp(),
            bank: "alpha".to_string(),
            delivery_cost,
            goods_total,
            custom_fee: 0,
        },
        items,
        locale: "en".to_string(),
        internal_signature: String::new(),
        customer_id: format!("customer{}", rng.random_range(1..=9999)),
        delivery_service: "meest".to_string(),
        shard_key: "9".to_string(),
        sm_id: 99,
        date_created: Utc::now(),
        oof_shard: "1".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OrderValidator, SchemaValidator};

    #[test]
    fn test_fake_orders_are_valid() {
        for _ in 0..50 {
            let order = fake_order();
            assert!(SchemaValidator.validate(&order).is_ok(), "{:?}", order);
        }
    }

    #[test]
    fn test_fake_order_keeps_uid() {
        let order = fake_order_with_uid("fixed-uid");
        assert_eq!(order.order_uid, "fixed-uid");
        assert_eq!(order.payment.transaction, "fixed-uid");
    }
}
