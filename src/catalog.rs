//! The fixed catalog of named analytical queries.
//!
//! Each [`QueryId`] maps to either a SQL resource or a custom [`Transform`].
//! Entries keep their registration order, which is also the order the
//! pipeline runs them and the order results appear in.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{EtlError, EtlResult};
use crate::transform::{HolidayScope, Transform};

/// Identifier of a catalog query.
///
/// The string forms are the names downstream reports look results up by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryId {
    DeliveryDateDifference,
    GlobalAmmountOrderStatus,
    RevenueByMonthYear,
    RevenuePerState,
    Top10LeastRevenueCategories,
    Top10RevenueCategories,
    RealVsEstimatedDeliveredTime,
    OrdersPerDayAndHolidays2017,
    FreightValueWeightRelationship,
}

impl QueryId {
    /// Every identifier, in registration order.
    pub const ALL: [QueryId; 9] = [
        QueryId::DeliveryDateDifference,
        QueryId::GlobalAmmountOrderStatus,
        QueryId::RevenueByMonthYear,
        QueryId::RevenuePerState,
        QueryId::Top10LeastRevenueCategories,
        QueryId::Top10RevenueCategories,
        QueryId::RealVsEstimatedDeliveredTime,
        QueryId::OrdersPerDayAndHolidays2017,
        QueryId::FreightValueWeightRelationship,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeliveryDateDifference => "delivery_date_difference",
            Self::GlobalAmmountOrderStatus => "global_ammount_order_status",
            Self::RevenueByMonthYear => "revenue_by_month_year",
            Self::RevenuePerState => "revenue_per_state",
            Self::Top10LeastRevenueCategories => "top_10_least_revenue_categories",
            Self::Top10RevenueCategories => "top_10_revenue_categories",
            Self::RealVsEstimatedDeliveredTime => "real_vs_estimated_delivered_time",
            Self::OrdersPerDayAndHolidays2017 => "orders_per_day_and_holidays_2017",
            Self::FreightValueWeightRelationship => "get_freight_value_weight_relationship",
        }
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryId {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QueryId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| EtlError::NotFound(s.to_string()))
    }
}

/// How a catalog entry produces its table.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryKind {
    /// Run the statement stored in the named SQL resource.
    Sql { resource: String },
    /// Read prerequisite tables and run a transform over them.
    Custom(Transform),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub id: QueryId,
    pub kind: EntryKind,
}

impl CatalogEntry {
    /// A SQL entry whose resource is named after the identifier.
    pub fn sql(id: QueryId) -> Self {
        Self::sql_resource(id, id.as_str())
    }

    pub fn sql_resource(id: QueryId, resource: impl Into<String>) -> Self {
        Self {
            id,
            kind: EntryKind::Sql {
                resource: resource.into(),
            },
        }
    }

    pub fn custom(id: QueryId, transform: Transform) -> Self {
        Self {
            id,
            kind: EntryKind::Custom(transform),
        }
    }
}

/// An ordered registry of catalog entries with unique identifiers.
#[derive(Debug, Clone)]
pub struct QueryCatalog {
    entries: Vec<CatalogEntry>,
}

impl QueryCatalog {
    /// Build a catalog, rejecting duplicate identifiers.
    pub fn new(entries: Vec<CatalogEntry>) -> EtlResult<Self> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.id) {
                return Err(EtlError::Config(format!(
                    "query '{}' is registered more than once",
                    entry.id
                )));
            }
        }
        Ok(Self { entries })
    }

    /// The standard nine-entry catalog.
    pub fn standard(scope: HolidayScope) -> Self {
        let entries = QueryId::ALL
            .into_iter()
            .map(|id| match id {
                QueryId::OrdersPerDayAndHolidays2017 => CatalogEntry::custom(
                    id,
                    Transform::OrdersPerDayAndHolidays(scope.clone()),
                ),
                QueryId::FreightValueWeightRelationship => {
                    CatalogEntry::custom(id, Transform::FreightValueWeight)
                }
                _ => CatalogEntry::sql(id),
            })
            .collect();
        Self { entries }
    }

    /// Look up an entry by its string identifier.
    pub fn lookup(&self, id: &str) -> EtlResult<&CatalogEntry> {
        let id: QueryId = id.parse()?;
        self.get(id)
            .ok_or_else(|| EtlError::NotFound(id.as_str().to_string()))
    }

    pub fn get(&self, id: QueryId) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Entries in registration order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn ids(&self) -> impl Iterator<Item = QueryId> + '_ {
        self.entries.iter().map(|entry| entry.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
