//! Custom transforms: result sets built in memory from full-table reads.

mod freight_weight;
mod order_holidays;

pub use freight_weight::{FreightWeight, freight_value_weight};
pub use order_holidays::{DailyOrders, HolidayScope, orders_per_day_and_holidays, parse_timestamp};

use std::collections::HashMap;

use crate::error::{EtlError, EtlResult};
use crate::model::{FromTable, Order, OrderItem, Product, PublicHoliday};
use crate::table::Table;

/// Source tables a transform can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceTable {
    Orders,
    OrderItems,
    Products,
    PublicHolidays,
}

/// A named custom transformation.
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// Per-order freight and weight totals over delivered items.
    FreightValueWeight,
    /// Per-day order counts flagged with the holiday calendar.
    OrdersPerDayAndHolidays(HolidayScope),
}

impl Transform {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FreightValueWeight => "freight_value_weight",
            Self::OrdersPerDayAndHolidays(_) => "orders_per_day_and_holidays",
        }
    }

    /// Tables that must be read in full before [`Transform::apply`].
    pub fn prerequisites(&self) -> &'static [SourceTable] {
        match self {
            Self::FreightValueWeight => &[
                SourceTable::Orders,
                SourceTable::OrderItems,
                SourceTable::Products,
            ],
            Self::OrdersPerDayAndHolidays(_) => {
                &[SourceTable::Orders, SourceTable::PublicHolidays]
            }
        }
    }

    pub fn apply(&self, inputs: &Inputs) -> EtlResult<Table> {
        match self {
            Self::FreightValueWeight => {
                let orders: Vec<Order> = inputs.decode(SourceTable::Orders)?;
                let items: Vec<OrderItem> = inputs.decode(SourceTable::OrderItems)?;
                let products: Vec<Product> = inputs.decode(SourceTable::Products)?;
                let rows = freight_value_weight(&orders, &items, &products);
                freight_weight::to_table(&rows)
            }
            Self::OrdersPerDayAndHolidays(scope) => {
                let orders: Vec<Order> = inputs.decode(SourceTable::Orders)?;
                let holidays: Vec<PublicHoliday> = inputs.decode(SourceTable::PublicHolidays)?;
                let rows = orders_per_day_and_holidays(&orders, &holidays, scope)?;
                order_holidays::to_table(&rows)
            }
        }
    }
}

/// Prerequisite tables fetched for one transform invocation.
#[derive(Debug, Default)]
pub struct Inputs {
    tables: HashMap<SourceTable, (String, Table)>,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fetched table under its source role and physical name.
    pub fn insert(&mut self, source: SourceTable, name: impl Into<String>, table: Table) {
        self.tables.insert(source, (name.into(), table));
    }

    fn decode<T: FromTable>(&self, source: SourceTable) -> EtlResult<Vec<T>> {
        let (name, table) = self.tables.get(&source).ok_or_else(|| {
            EtlError::execution(format!("prerequisite {:?} was not fetched", source))
        })?;
        T::from_table(table, name)
    }
}
