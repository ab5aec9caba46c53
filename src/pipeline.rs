//! The batch pipeline: run the whole catalog, collect every result.

use std::time::Instant;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::info;

use crate::catalog::{QueryCatalog, QueryId};
use crate::config::PipelineConfig;
use crate::connection::DataConnection;
use crate::error::{EtlError, EtlResult};
use crate::executor::{QueryExecutor, QueryResult};
use crate::resources::QueryResources;
use crate::table::Table;

/// Results keyed by catalog identifier, in the order they were produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultMap {
    results: Vec<QueryResult>,
}

impl ResultMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a result. A result with the same name is replaced in place.
    pub fn insert(&mut self, result: QueryResult) {
        match self.results.iter_mut().find(|r| r.name == result.name) {
            Some(existing) => *existing = result,
            None => self.results.push(result),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.results
            .iter()
            .find(|r| r.name == name)
            .map(|r| &r.table)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.results.iter().map(|r| r.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueryResult> + '_ {
        self.results.iter()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn into_results(self) -> Vec<QueryResult> {
        self.results
    }
}

impl Serialize for ResultMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.results.len()))?;
        for result in &self.results {
            map.serialize_entry(&result.name, &result.table)?;
        }
        map.end()
    }
}

/// Runs a catalog entry by entry against one connection.
#[derive(Debug, Clone)]
pub struct Pipeline {
    catalog: QueryCatalog,
    executor: QueryExecutor,
}

impl Pipeline {
    pub fn new(catalog: QueryCatalog, executor: QueryExecutor) -> Self {
        Self { catalog, executor }
    }

    /// The standard catalog wired to the configured resources and tables.
    pub fn from_config(config: &PipelineConfig) -> Self {
        let catalog = QueryCatalog::standard(config.holiday_scope());
        let executor = QueryExecutor::new(
            QueryResources::new(&config.queries_root),
            config.tables.clone(),
        );
        Self::new(catalog, executor)
    }

    pub fn catalog(&self) -> &QueryCatalog {
        &self.catalog
    }

    pub fn executor(&self) -> &QueryExecutor {
        &self.executor
    }

    /// Run every entry in registration order.
    ///
    /// The first failure aborts the run; no partial map is returned.
    pub async fn run(&self, conn: &mut dyn DataConnection) -> EtlResult<ResultMap> {
        let ids: Vec<QueryId> = self.catalog.ids().collect();
        self.run_only(conn, &ids).await
    }

    /// Run the selected entries, still in registration order.
    pub async fn run_only(
        &self,
        conn: &mut dyn DataConnection,
        ids: &[QueryId],
    ) -> EtlResult<ResultMap> {
        if let Some(missing) = ids.iter().find(|id| self.catalog.get(**id).is_none()) {
            return Err(EtlError::NotFound(missing.to_string()));
        }

        let started = Instant::now();
        info!(queries = ids.len(), "pipeline run started");

        let mut results = ResultMap::new();
        for entry in self.catalog.entries() {
            if !ids.contains(&entry.id) {
                continue;
            }
            let result = self.executor.execute(entry, conn).await?;
            results.insert(result);
        }

        info!(
            results = results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipeline run finished"
        );
        Ok(results)
    }
}
