//! Typed rows decoded from source tables.

use std::fmt;

use serde_json::Value;

use crate::error::{EtlError, EtlResult};
use crate::table::Table;

/// Lifecycle status of an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Delivered,
    Shipped,
    Canceled,
    Unavailable,
    Invoiced,
    Processing,
    Created,
    Approved,
    /// Any status outside the known set, kept verbatim.
    Other(String),
}

impl OrderStatus {
    /// Canonical text of the status. Matching is exact and case-sensitive.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Delivered => "delivered",
            Self::Shipped => "shipped",
            Self::Canceled => "canceled",
            Self::Unavailable => "unavailable",
            Self::Invoiced => "invoiced",
            Self::Processing => "processing",
            Self::Created => "created",
            Self::Approved => "approved",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(s: &str) -> Self {
        match s {
            "delivered" => Self::Delivered,
            "shipped" => Self::Shipped,
            "canceled" => Self::Canceled,
            "unavailable" => Self::Unavailable,
            "invoiced" => Self::Invoiced,
            "processing" => Self::Processing,
            "created" => Self::Created,
            "approved" => Self::Approved,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub order_id: String,
    pub status: OrderStatus,
    /// Raw purchase timestamp; parsed only by transforms that need it.
    pub purchase_timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub order_id: String,
    pub product_id: String,
    pub freight_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub product_id: String,
    pub weight_g: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublicHoliday {
    /// Raw date text as stored by the loader.
    pub date: String,
    pub country_code: Option<String>,
}

/// Decoding of typed rows from a [`Table`].
pub trait FromTable: Sized {
    /// Columns read by the decoder, in the order passed to [`FromTable::from_cells`].
    const COLUMNS: &'static [&'static str];

    /// Columns that may be absent; passed after [`FromTable::COLUMNS`], as
    /// null cells when the table lacks them.
    const OPTIONAL_COLUMNS: &'static [&'static str] = &[];

    fn from_cells(source: &str, cells: &[&Value]) -> EtlResult<Self>;

    /// Decode every row. An empty table decodes to no rows even when the
    /// driver reported no columns for it.
    fn from_table(table: &Table, source: &str) -> EtlResult<Vec<Self>> {
        if table.is_empty() {
            return Ok(Vec::new());
        }
        let required = Self::COLUMNS
            .iter()
            .map(|column| table.require_column(source, column).map(Some))
            .collect::<EtlResult<Vec<_>>>()?;
        let indices: Vec<Option<usize>> = required
            .into_iter()
            .chain(Self::OPTIONAL_COLUMNS.iter().map(|c| table.column_index(c)))
            .collect();

        table
            .rows()
            .iter()
            .map(|row| {
                let cells: Vec<&Value> = indices
                    .iter()
                    .map(|&i| i.map_or(&MISSING_CELL, |i| &row[i]))
                    .collect();
                Self::from_cells(source, &cells)
            })
            .collect()
    }
}

static MISSING_CELL: Value = Value::Null;

impl FromTable for Order {
    const COLUMNS: &'static [&'static str] =
        &["order_id", "order_status", "order_purchase_timestamp"];

    fn from_cells(source: &str, cells: &[&Value]) -> EtlResult<Self> {
        let status = text_cell(source, "order_status", cells[1])?;
        Ok(Self {
            order_id: text_cell(source, "order_id", cells[0])?,
            status: OrderStatus::from(status.as_str()),
            purchase_timestamp: optional_text_cell(source, "order_purchase_timestamp", cells[2])?,
        })
    }
}

impl FromTable for OrderItem {
    const COLUMNS: &'static [&'static str] = &["order_id", "product_id", "freight_value"];

    fn from_cells(source: &str, cells: &[&Value]) -> EtlResult<Self> {
        Ok(Self {
            order_id: text_cell(source, "order_id", cells[0])?,
            product_id: text_cell(source, "product_id", cells[1])?,
            freight_value: number_cell(source, "freight_value", cells[2])?,
        })
    }
}

impl FromTable for Product {
    const COLUMNS: &'static [&'static str] = &["product_id", "product_weight_g"];

    fn from_cells(source: &str, cells: &[&Value]) -> EtlResult<Self> {
        Ok(Self {
            product_id: text_cell(source, "product_id", cells[0])?,
            weight_g: number_cell(source, "product_weight_g", cells[1])?,
        })
    }
}

impl FromTable for PublicHoliday {
    const COLUMNS: &'static [&'static str] = &["date"];
    // Single-country loads often drop the country column.
    const OPTIONAL_COLUMNS: &'static [&'static str] = &["countryCode"];

    fn from_cells(source: &str, cells: &[&Value]) -> EtlResult<Self> {
        Ok(Self {
            date: text_cell(source, "date", cells[0])?,
            country_code: optional_text_cell(source, "countryCode", cells[1])?,
        })
    }
}

fn optional_text_cell(source: &str, column: &str, value: &Value) -> EtlResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(bad_cell(source, column, other)),
    }
}

fn text_cell(source: &str, column: &str, value: &Value) -> EtlResult<String> {
    optional_text_cell(source, column, value)?.ok_or_else(|| {
        EtlError::execution(format!("null '{}' in table '{}'", column, source))
    })
}

fn number_cell(source: &str, column: &str, value: &Value) -> EtlResult<Option<f64>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| bad_cell(source, column, value)),
        other => Err(bad_cell(source, column, other)),
    }
}

fn bad_cell(source: &str, column: &str, value: &Value) -> EtlError {
    EtlError::execution(format!(
        "unexpected value {} in column '{}' of table '{}'",
        value, column, source
    ))
}
