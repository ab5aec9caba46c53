//! Execution of single catalog entries.

use std::time::Instant;

use tracing::{debug, info};

use crate::catalog::{CatalogEntry, EntryKind};
use crate::config::TableNames;
use crate::connection::DataConnection;
use crate::error::EtlResult;
use crate::resources::QueryResources;
use crate::table::Table;
use crate::transform::{Inputs, Transform};

/// A named result table.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Catalog identifier of the query that produced the table.
    pub name: String,
    pub table: Table,
}

/// Runs one catalog entry against a connection.
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    resources: QueryResources,
    tables: TableNames,
}

impl QueryExecutor {
    pub fn new(resources: QueryResources, tables: TableNames) -> Self {
        Self { resources, tables }
    }

    pub fn resources(&self) -> &QueryResources {
        &self.resources
    }

    /// Execute an entry. Failures are returned as-is, never retried.
    pub async fn execute(
        &self,
        entry: &CatalogEntry,
        conn: &mut dyn DataConnection,
    ) -> EtlResult<QueryResult> {
        let started = Instant::now();

        let table = match &entry.kind {
            EntryKind::Sql { resource } => {
                let sql = self.resources.load(resource)?;
                debug!(query = %entry.id, sql = %sql.trim(), "executing statement");
                conn.query(&sql).await?
            }
            EntryKind::Custom(transform) => self.run_transform(transform, conn).await?,
        };

        info!(query = %entry.id, rows = table.len(), "query finished");
        debug!(
            query = %entry.id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "query timing"
        );

        Ok(QueryResult {
            name: entry.id.to_string(),
            table,
        })
    }

    /// Read every prerequisite in full, then apply the transform in memory.
    async fn run_transform(
        &self,
        transform: &Transform,
        conn: &mut dyn DataConnection,
    ) -> EtlResult<Table> {
        let mut inputs = Inputs::new();
        for &source in transform.prerequisites() {
            let name = self.tables.name_of(source);
            let table = conn.read_table(name).await?;
            debug!(
                transform = transform.name(),
                table = name,
                rows = table.len(),
                "prerequisite read"
            );
            inputs.insert(source, name, table);
        }
        transform.apply(&inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::QueryId;
    use crate::error::EtlError;
    use crate::transform::HolidayScope;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeConnection {
        tables: HashMap<String, Table>,
        reads: Vec<String>,
        statements: Vec<String>,
        fail_statements: bool,
    }

    #[async_trait]
    impl DataConnection for FakeConnection {
        async fn query(&mut self, sql: &str) -> EtlResult<Table> {
            self.statements.push(sql.to_string());
            if self.fail_statements {
                return Err(EtlError::execution("no such table: olist_customers"));
            }
            Table::from_rows(["statement"], vec![vec![json!(sql.trim())]])
        }

        async fn read_table(&mut self, name: &str) -> EtlResult<Table> {
            self.reads.push(name.to_string());
            self.tables
                .get(name)
                .cloned()
                .ok_or_else(|| EtlError::execution(format!("no such table: {}", name)))
        }
    }

    fn executor(root: &std::path::Path) -> QueryExecutor {
        QueryExecutor::new(QueryResources::new(root), TableNames::default())
    }

    #[tokio::test]
    async fn test_sql_entry_runs_resource_text() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("revenue_per_state.sql"),
            "SELECT 1 AS revenue;\n",
        )
        .unwrap();

        let mut conn = FakeConnection::default();
        let result = executor(dir.path())
            .execute(&CatalogEntry::sql(QueryId::RevenuePerState), &mut conn)
            .await
            .unwrap();

        assert_eq!(result.name, "revenue_per_state");
        assert_eq!(conn.statements, vec!["SELECT 1 AS revenue;\n"]);
        assert!(conn.reads.is_empty());
    }

    #[tokio::test]
    async fn test_missing_resource_skips_connection() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = FakeConnection::default();

        let err = executor(dir.path())
            .execute(&CatalogEntry::sql(QueryId::RevenuePerState), &mut conn)
            .await
            .unwrap_err();

        assert!(matches!(err, EtlError::ResourceNotFound { .. }));
        assert!(conn.statements.is_empty());
    }

    #[tokio::test]
    async fn test_statement_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("revenue_per_state.sql"), "SELECT 1;").unwrap();

        let mut conn = FakeConnection {
            fail_statements: true,
            ..Default::default()
        };
        let err = executor(dir.path())
            .execute(&CatalogEntry::sql(QueryId::RevenuePerState), &mut conn)
            .await
            .unwrap_err();

        assert!(matches!(err, EtlError::Execution(_)));
        assert_eq!(conn.statements.len(), 1);
    }

    #[tokio::test]
    async fn test_custom_entry_reads_prerequisites() {
        let mut conn = FakeConnection::default();
        conn.tables.insert(
            "olist_orders".to_string(),
            Table::from_rows(
                ["order_id", "order_status", "order_purchase_timestamp"],
                vec![
                    vec![json!("o1"), json!("delivered"), json!("2017-03-05 10:00:00")],
                    vec![json!("o2"), json!("delivered"), json!("2018-01-01 09:00:00")],
                ],
            )
            .unwrap(),
        );
        conn.tables.insert(
            "olist_order_items".to_string(),
            Table::from_rows(
                ["order_id", "product_id", "freight_value"],
                vec![
                    vec![json!("o1"), json!("p1"), json!(10.0)],
                    vec![json!("o1"), json!("p2"), json!(5.0)],
                ],
            )
            .unwrap(),
        );
        conn.tables.insert(
            "olist_products".to_string(),
            Table::from_rows(
                ["product_id", "product_weight_g"],
                vec![
                    vec![json!("p1"), json!(100)],
                    vec![json!("p2"), json!(null)],
                ],
            )
            .unwrap(),
        );

        let dir = tempfile::tempdir().unwrap();
        let result = executor(dir.path())
            .execute(
                &CatalogEntry::custom(
                    QueryId::FreightValueWeightRelationship,
                    Transform::FreightValueWeight,
                ),
                &mut conn,
            )
            .await
            .unwrap();

        assert_eq!(result.name, "get_freight_value_weight_relationship");
        assert_eq!(
            conn.reads,
            vec!["olist_orders", "olist_order_items", "olist_products"]
        );
        assert!(conn.statements.is_empty());
        assert_eq!(
            result.table.rows(),
            [vec![json!("o1"), json!(15.0), json!(100.0)]]
        );
    }

    #[tokio::test]
    async fn test_custom_entry_missing_table_fails() {
        let mut conn = FakeConnection::default();
        let dir = tempfile::tempdir().unwrap();

        let err = executor(dir.path())
            .execute(
                &CatalogEntry::custom(
                    QueryId::OrdersPerDayAndHolidays2017,
                    Transform::OrdersPerDayAndHolidays(HolidayScope::new(2017)),
                ),
                &mut conn,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, EtlError::Execution(_)));
        assert_eq!(conn.reads, vec!["olist_orders"]);
    }
}
