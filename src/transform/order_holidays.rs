//! Orders per calendar day of a target year, flagged with public holidays.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde_json::json;
use tracing::debug;

use crate::error::{EtlError, EtlResult};
use crate::model::{Order, PublicHoliday};
use crate::table::Table;

/// Which slice of the holiday calendar applies: the calendar year whose
/// orders are counted and, optionally, the country whose holidays count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayScope {
    pub year: i32,
    pub country: Option<String>,
}

impl HolidayScope {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            country: None,
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    fn covers(&self, holiday: &PublicHoliday) -> bool {
        match (&self.country, &holiday.country_code) {
            (Some(wanted), Some(code)) => wanted == code,
            _ => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyOrders {
    pub date: NaiveDate,
    pub order_count: u64,
    pub holiday: bool,
}

/// Parse a stored timestamp. Offsets are dropped without conversion, and a
/// bare date means midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_local());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Count orders per purchase date within `scope.year` and flag each date
/// that is a public holiday.
///
/// Every order timestamp must be present and parse, including orders
/// outside the year. Only dates with at least one order appear; output is sorted by date.
pub fn orders_per_day_and_holidays(
    orders: &[Order],
    holidays: &[PublicHoliday],
    scope: &HolidayScope,
) -> EtlResult<Vec<DailyOrders>> {
    let mut per_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for order in orders {
        let raw = order.purchase_timestamp.as_deref().ok_or_else(|| {
            EtlError::execution(format!("order '{}' has no purchase timestamp", order.order_id))
        })?;
        let purchased = parse_timestamp(raw).ok_or_else(|| {
            EtlError::execution(format!(
                "order '{}' has an unparsable purchase timestamp '{}'",
                order.order_id, raw
            ))
        })?;
        if purchased.year() == scope.year {
            *per_day.entry(purchased.date()).or_insert(0) += 1;
        }
    }

    let mut holiday_dates: HashSet<NaiveDate> = HashSet::new();
    for holiday in holidays.iter().filter(|h| scope.covers(h)) {
        let date = parse_timestamp(&holiday.date).ok_or_else(|| {
            EtlError::execution(format!("unparsable holiday date '{}'", holiday.date))
        })?;
        holiday_dates.insert(date.date());
    }

    debug!(
        days = per_day.len(),
        holidays = holiday_dates.len(),
        year = scope.year,
        "orders grouped by purchase date"
    );

    Ok(per_day
        .into_iter()
        .map(|(date, order_count)| DailyOrders {
            date,
            order_count,
            holiday: holiday_dates.contains(&date),
        })
        .collect())
}

pub(crate) fn to_table(rows: &[DailyOrders]) -> EtlResult<Table> {
    let mut table = Table::new(["date", "order_count", "holiday"]);
    for row in rows {
        table.push_row(vec![
            json!(row.date.format("%Y-%m-%d").to_string()),
            json!(row.order_count),
            json!(row.holiday),
        ])?;
    }
    Ok(table)
}
