use std::path::PathBuf;

use order_insights::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;

/// Tables shaped the way a dataframe loader writes them into SQLite:
/// datetime columns declared `TIMESTAMP`, measures declared `REAL`.
const SEED: &[&str] = &[
    "CREATE TABLE olist_orders (order_id TEXT, customer_id TEXT, order_status TEXT, \
     order_purchase_timestamp TIMESTAMP, order_delivered_customer_date TIMESTAMP)",
    "INSERT INTO olist_orders VALUES ('o1', 'c1', 'delivered', '2017-03-05 09:12:44', '2017-03-10 12:00:00')",
    "INSERT INTO olist_orders VALUES ('o2', 'c2', 'shipped', '2017-03-05 21:03:10', NULL)",
    "INSERT INTO olist_orders VALUES ('o3', 'c3', 'delivered', '2017-03-06 11:30:00', '2017-03-12 08:00:00')",
    "CREATE TABLE olist_order_items (order_id TEXT, order_item_id INTEGER, product_id TEXT, \
     price REAL, freight_value REAL)",
    "INSERT INTO olist_order_items VALUES ('o1', 1, 'p1', 50.0, 10.0)",
    "INSERT INTO olist_order_items VALUES ('o1', 2, 'p2', 20.0, 5.0)",
    "INSERT INTO olist_order_items VALUES ('o3', 1, 'p2', 20.0, 2.5)",
    "CREATE TABLE olist_products (product_id TEXT, product_category_name TEXT, \
     product_weight_g REAL)",
    "INSERT INTO olist_products VALUES ('p1', 'moveis_decoracao', 100.0)",
    "INSERT INTO olist_products VALUES ('p2', 'utilidades_domesticas', NULL)",
    "CREATE TABLE public_holidays (date TIMESTAMP, localName TEXT, countryCode TEXT)",
    "INSERT INTO public_holidays VALUES ('2017-03-05 00:00:00', 'Feriado', 'BR')",
];

async fn seeded() -> SqlConnection {
    let mut conn = SqlConnection::connect("sqlite::memory:").await.unwrap();
    for sql in SEED {
        conn.query(sql).await.unwrap();
    }
    conn
}

fn pipeline() -> Pipeline {
    let config = PipelineConfig::builder()
        .queries_root(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("queries"))
        .target_year(2017)
        .holiday_country("BR")
        .build();
    Pipeline::from_config(&config)
}

#[tokio::test]
async fn test_transforms_over_sqlite_timestamp_columns() {
    let mut conn = seeded().await;
    let ids = [
        QueryId::FreightValueWeightRelationship,
        QueryId::OrdersPerDayAndHolidays2017,
    ];
    let results = pipeline().run_only(&mut conn, &ids).await.unwrap();

    let freight = results.get("get_freight_value_weight_relationship").unwrap();
    assert_eq!(
        freight.rows(),
        [
            vec![json!("o1"), json!(15.0), json!(100.0)],
            vec![json!("o3"), json!(2.5), json!(0.0)],
        ]
    );

    let daily = results.get("orders_per_day_and_holidays_2017").unwrap();
    assert_eq!(
        daily.rows(),
        [
            vec![json!("2017-03-05"), json!(2), json!(true)],
            vec![json!("2017-03-06"), json!(1), json!(false)],
        ]
    );
    conn.close().await;
}

#[tokio::test]
async fn test_read_table_keeps_timestamps_as_text() {
    let mut conn = seeded().await;
    let orders = conn.read_table("olist_orders").await.unwrap();

    let column = orders.column_index("order_delivered_customer_date").unwrap();
    assert_eq!(orders.rows()[0][column], json!("2017-03-10 12:00:00"));
    assert_eq!(orders.rows()[1][column], serde_json::Value::Null);
}
