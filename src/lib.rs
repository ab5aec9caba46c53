//! # order-insights
//!
//! Transform layer of a batch ETL pipeline over an e-commerce order dataset.
//!
//! A fixed [`catalog`] of named analytical queries is run against a store
//! that already holds the orders, order items, products and public holidays.
//! Most entries are plain SQL resources; two are computed in memory:
//!
//! | Query                                   | Kind      | Result columns                            |
//! |-----------------------------------------|-----------|-------------------------------------------|
//! | `get_freight_value_weight_relationship` | transform | `order_id`, `freight_value`, `product_weight_g` |
//! | `orders_per_day_and_holidays_2017`      | transform | `date`, `order_count`, `holiday`          |
//! | everything else                         | SQL       | whatever the statement selects            |
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use order_insights::prelude::*;
//!
//! let config = PipelineConfig::load(None)?;
//! let mut conn = SqlConnection::connect("sqlite://olist.db").await?;
//! let results = Pipeline::from_config(&config).run(&mut conn).await?;
//!
//! let daily = results.get("orders_per_day_and_holidays_2017").unwrap();
//! ```

pub mod catalog;
pub mod config;
pub mod connection;
pub mod error;
pub mod executor;
pub mod model;
pub mod pipeline;
pub mod resources;
pub mod table;
pub mod transform;

pub mod prelude {
    pub use crate::catalog::{CatalogEntry, EntryKind, QueryCatalog, QueryId};
    pub use crate::config::{PipelineConfig, TableNames};
    pub use crate::connection::{DataConnection, SqlConnection};
    pub use crate::error::*;
    pub use crate::executor::{QueryExecutor, QueryResult};
    pub use crate::pipeline::{Pipeline, ResultMap};
    pub use crate::resources::QueryResources;
    pub use crate::table::Table;
    pub use crate::transform::{HolidayScope, Transform};
}
