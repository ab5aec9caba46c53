//! Pipeline configuration

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{EtlError, EtlResult};
use crate::transform::{HolidayScope, SourceTable};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "order-insights.toml";

/// Main pipeline configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Database connection URL
    pub database_url: Option<String>,

    /// Directory holding the `<query>.sql` resources
    pub queries_root: PathBuf,

    /// Calendar year counted by the holiday report
    pub target_year: i32,

    /// Restrict holidays to one country code (optional)
    pub holiday_country: Option<String>,

    /// Physical names of the source tables
    pub tables: TableNames,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            queries_root: PathBuf::from("queries"),
            target_year: 2017,
            holiday_country: None,
            tables: TableNames::default(),
        }
    }
}

/// Physical table names of the source data.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableNames {
    pub orders: String,
    pub order_items: String,
    pub products: String,
    pub public_holidays: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            orders: "olist_orders".to_string(),
            order_items: "olist_order_items".to_string(),
            products: "olist_products".to_string(),
            public_holidays: "public_holidays".to_string(),
        }
    }
}

impl TableNames {
    pub fn name_of(&self, source: SourceTable) -> &str {
        match source {
            SourceTable::Orders => &self.orders,
            SourceTable::OrderItems => &self.order_items,
            SourceTable::Products => &self.products,
            SourceTable::PublicHolidays => &self.public_holidays,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> EtlResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| EtlError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: &Path) -> EtlResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                EtlError::Config(format!("config file {} not found", path.display()))
            }
            _ => EtlError::Io(e),
        })?;
        Self::from_toml(&content)
    }

    /// Resolve the configuration: an explicit path must exist; otherwise the
    /// local file, then the user config file, then defaults.
    pub fn load(explicit: Option<&Path>) -> EtlResult<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let local = Path::new(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Self::from_file(local);
        }

        if let Some(user) = Self::user_config_path().filter(|p| p.exists()) {
            return Self::from_file(&user);
        }

        Ok(Self::default())
    }

    /// `<config dir>/order-insights/config.toml`, if the platform has one.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("order-insights").join("config.toml"))
    }

    pub fn validate(&self) -> EtlResult<()> {
        if !(1..=9999).contains(&self.target_year) {
            return Err(EtlError::Config(format!(
                "target_year {} is out of range",
                self.target_year
            )));
        }
        if self.holiday_country.as_deref().is_some_and(str::is_empty) {
            return Err(EtlError::Config("holiday_country is empty".to_string()));
        }
        Ok(())
    }

    /// Holiday scope handed to the holiday transform.
    pub fn holiday_scope(&self) -> HolidayScope {
        let scope = HolidayScope::new(self.target_year);
        match &self.holiday_country {
            Some(country) => scope.with_country(country.clone()),
            None => scope,
        }
    }
}

/// Builder for PipelineConfig
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Set the database URL
    pub fn database(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = Some(url.into());
        self
    }

    /// Set the SQL resource directory
    pub fn queries_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.queries_root = root.into();
        self
    }

    /// Set the year counted by the holiday report
    pub fn target_year(mut self, year: i32) -> Self {
        self.config.target_year = year;
        self
    }

    /// Restrict holidays to one country
    pub fn holiday_country(mut self, country: impl Into<String>) -> Self {
        self.config.holiday_country = Some(country.into());
        self
    }

    /// Override the source table names
    pub fn tables(mut self, tables: TableNames) -> Self {
        self.config.tables = tables;
        self
    }

    /// Build the configuration
    pub fn build(self) -> PipelineConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::from_toml("").unwrap();
        assert_eq!(config.target_year, 2017);
        assert_eq!(config.queries_root, PathBuf::from("queries"));
        assert_eq!(config.tables, TableNames::default());
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_full_document() {
        let config = PipelineConfig::from_toml(
            r#"
            database_url = "sqlite://olist.db"
            queries_root = "sql"
            target_year = 2018
            holiday_country = "BR"

            [tables]
            orders = "orders"
            "#,
        )
        .unwrap();

        assert_eq!(config.database_url.as_deref(), Some("sqlite://olist.db"));
        assert_eq!(config.tables.orders, "orders");
        assert_eq!(config.tables.products, "olist_products");
        assert_eq!(
            config.holiday_scope(),
            HolidayScope::new(2018).with_country("BR")
        );
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = PipelineConfig::from_toml("target_yaer = 2018").unwrap_err();
        assert!(matches!(err, EtlError::Config(_)));
    }

    #[test]
    fn test_year_out_of_range() {
        assert!(PipelineConfig::from_toml("target_year = 0").is_err());
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = PipelineConfig::load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err, EtlError::Config(_)));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.toml");
        fs::write(&path, "target_year = 2016\n").unwrap();

        let config = PipelineConfig::load(Some(&path)).unwrap();
        assert_eq!(config.target_year, 2016);
    }

    #[test]
    fn test_builder() {
        let config = PipelineConfig::builder()
            .database("sqlite::memory:")
            .queries_root("/srv/queries")
            .target_year(2018)
            .build();
        assert_eq!(config.database_url.as_deref(), Some("sqlite::memory:"));
        assert_eq!(config.queries_root, PathBuf::from("/srv/queries"));
        assert_eq!(config.holiday_scope(), HolidayScope::new(2018));
    }

    #[test]
    fn test_example_file_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config.example.toml");
        let config = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(config.holiday_country.as_deref(), Some("BR"));
        assert_eq!(config.tables, TableNames::default());
    }

    #[test]
    fn test_table_names_by_source() {
        let names = TableNames::default();
        assert_eq!(names.name_of(SourceTable::PublicHolidays), "public_holidays");
        assert_eq!(names.name_of(SourceTable::OrderItems), "olist_order_items");
    }
}
