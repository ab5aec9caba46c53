//! Freight value vs. product weight, rolled up per delivered order.
//!
//! Freight cost and weight are recorded per line item, but the correlation
//! downstream is drawn per order, so both are summed over an order's items.

use std::collections::{BTreeMap, HashMap};

use serde_json::json;
use tracing::{debug, warn};

use crate::error::EtlResult;
use crate::model::{Order, OrderItem, OrderStatus, Product};
use crate::table::Table;

#[derive(Debug, Clone, PartialEq)]
pub struct FreightWeight {
    pub order_id: String,
    pub freight_value: f64,
    pub product_weight_g: f64,
}

/// Join items to their order and product, keep delivered orders and sum
/// freight and weight per order.
///
/// Items whose order or product is unknown are dropped (inner join). Null
/// freight values and weights count as zero. Output is sorted by order id.
pub fn freight_value_weight(
    orders: &[Order],
    items: &[OrderItem],
    products: &[Product],
) -> Vec<FreightWeight> {
    let orders_by_id: HashMap<&str, &Order> =
        orders.iter().map(|o| (o.order_id.as_str(), o)).collect();
    let products_by_id: HashMap<&str, &Product> =
        products.iter().map(|p| (p.product_id.as_str(), p)).collect();

    let mut totals: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    let mut unmatched = 0usize;

    for item in items {
        let (Some(order), Some(product)) = (
            orders_by_id.get(item.order_id.as_str()),
            products_by_id.get(item.product_id.as_str()),
        ) else {
            unmatched += 1;
            continue;
        };
        if order.status != OrderStatus::Delivered {
            continue;
        }
        let entry = totals.entry(order.order_id.as_str()).or_insert((0.0, 0.0));
        entry.0 += item.freight_value.unwrap_or(0.0);
        entry.1 += product.weight_g.unwrap_or(0.0);
    }

    if unmatched > 0 {
        warn!(
            dropped = unmatched,
            "order items without a matching order or product were left out of the freight totals"
        );
    }
    debug!(orders = totals.len(), "freight totals computed");

    totals
        .into_iter()
        .map(|(order_id, (freight_value, product_weight_g))| FreightWeight {
            order_id: order_id.to_string(),
            freight_value,
            product_weight_g,
        })
        .collect()
}

pub(crate) fn to_table(rows: &[FreightWeight]) -> EtlResult<Table> {
    let mut table = Table::new(["order_id", "freight_value", "product_weight_g"]);
    for row in rows {
        table.push_row(vec![
            json!(row.order_id),
            json!(row.freight_value),
            json!(row.product_weight_g),
        ])?;
    }
    Ok(table)
}
