//! Tabular dataset cache backing the dashboard charts and chat context.
//!
//! The CSV is fetched once at startup. The configured value column is coerced
//! to a number and rows where that fails are dropped; other cells keep their
//! natural JSON type (integer, float, string, or null for empty cells).

mod summary;

pub use summary::describe;

use serde_json::{Number, Value};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use crate::config::DatasetConfig;
use crate::error::DatasetError;
use crate::source::RemoteSource;

/// One CSV row as a JSON object keyed by column name.
pub type Record = serde_json::Map<String, Value>;

/// Parsed, cleaned CSV contents.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Header names in file order
    pub columns: Vec<String>,
    /// Rows that survived value-column coercion
    pub records: Vec<Record>,
}

impl Dataset {
    /// Parse CSV bytes, keeping only rows whose `value_column` is a finite number.
    pub fn parse(bytes: &[u8], value_column: &str) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(bytes);

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let value_idx = columns
            .iter()
            .position(|c| c == value_column)
            .ok_or_else(|| DatasetError::MissingColumn(value_column.to_string()))?;

        let mut records = Vec::new();
        let mut dropped = 0usize;
        for row in reader.records() {
            let row = row?;
            let value = row
                .get(value_idx)
                .and_then(|cell| cell.parse::<f64>().ok())
                .and_then(Number::from_f64);
            let Some(value) = value else {
                dropped += 1;
                continue;
            };

            let mut record = Record::new();
            for (i, name) in columns.iter().enumerate() {
                let cell = if i == value_idx {
                    Value::Number(value.clone())
                } else {
                    row.get(i).map(parse_cell).unwrap_or(Value::Null)
                };
                record.insert(name.clone(), cell);
            }
            records.push(record);
        }

        tracing::debug!(rows = records.len(), dropped, "Parsed CSV");
        Ok(Self { columns, records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All values of a column if every non-null cell is numeric.
    pub fn numeric_column(&self, name: &str) -> Option<Vec<f64>> {
        let mut values = Vec::with_capacity(self.records.len());
        for record in &self.records {
            match record.get(name) {
                Some(Value::Number(n)) => values.push(n.as_f64()?),
                Some(Value::Null) | None => {}
                Some(_) => return None,
            }
        }
        (!values.is_empty()).then_some(values)
    }
}

fn parse_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = cell.parse::<i64>() {
        return Value::Number(i.into());
    }
    cell.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(cell.to_string()))
}

/// Shared, replaceable cache of the cleaned dataset.
pub struct DatasetStore {
    data: RwLock<Option<Arc<Dataset>>>,
    source: Arc<dyn RemoteSource>,
    config: DatasetConfig,
}

impl DatasetStore {
    pub const UNAVAILABLE: &'static str = "Data unavailable.";

    pub fn new(source: Arc<dyn RemoteSource>, config: DatasetConfig) -> Self {
        Self {
            data: RwLock::new(None),
            source,
            config,
        }
    }

    /// Fetch and parse the CSV, replacing the cached dataset on success.
    pub async fn load(&self) -> Result<usize, DatasetError> {
        let timeout = Duration::from_secs(self.config.timeout_secs);
        let bytes = self.source.fetch(timeout).await?;
        let dataset = Dataset::parse(&bytes, &self.config.value_column)?;
        let rows = dataset.len();
        self.set(dataset);
        tracing::info!(source = self.source.location(), rows, "CSV cached");
        Ok(rows)
    }

    pub fn set(&self, dataset: Dataset) {
        *self.data.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(dataset));
    }

    /// The cached dataset, if one has been loaded and it has rows.
    pub fn get(&self) -> Option<Arc<Dataset>> {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|d| !d.is_empty())
    }

    /// Describe-style text summary for the chat context.
    pub fn summary(&self) -> String {
        match self.get() {
            Some(dataset) => describe(&dataset),
            None => Self::UNAVAILABLE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::testing::CountingSource;

    const CSV: &str = "\
region,year,value,unit
World,2020,10.5,Mt
World,2021,n/a,Mt
Europe,2020,4,Mt
Asia,2020,,Mt
Africa,2022,7.25,
";

    #[test]
    fn test_parse_drops_non_numeric_values() {
        let dataset = Dataset::parse(CSV.as_bytes(), "value").unwrap();
        assert_eq!(dataset.columns, vec!["region", "year", "value", "unit"]);
        assert_eq!(dataset.len(), 3);

        let first = &dataset.records[0];
        assert_eq!(first["region"], "World");
        assert_eq!(first["year"], 2020);
        assert_eq!(first["value"], 10.5);

        let europe = &dataset.records[1];
        assert_eq!(europe["value"].as_f64(), Some(4.0));

        let africa = &dataset.records[2];
        assert_eq!(africa["unit"], Value::Null);
    }

    #[test]
    fn test_parse_missing_value_column() {
        let err = Dataset::parse(b"a,b\n1,2\n", "value").unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn(c) if c == "value"));
    }

    #[test]
    fn test_short_rows_fill_with_null() {
        let dataset = Dataset::parse(b"value,label\n1,a\n2\n", "value").unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records[1]["label"], Value::Null);
    }

    #[test]
    fn test_numeric_column() {
        let dataset = Dataset::parse(CSV.as_bytes(), "value").unwrap();
        assert_eq!(dataset.numeric_column("year"), Some(vec![2020.0, 2020.0, 2022.0]));
        assert_eq!(dataset.numeric_column("region"), None);
        assert_eq!(dataset.numeric_column("missing"), None);
    }

    #[tokio::test]
    async fn test_store_load_and_summary() {
        let source = Arc::new(CountingSource::ok(CSV.as_bytes().to_vec()));
        let store = DatasetStore::new(source.clone(), DatasetConfig::default());
        assert!(store.get().is_none());
        assert_eq!(store.summary(), "Data unavailable.");

        assert_eq!(store.load().await.unwrap(), 3);
        assert_eq!(store.get().unwrap().len(), 3);
        assert!(store.summary().contains("count"));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_store_failed_load_stays_empty() {
        let store = DatasetStore::new(
            Arc::new(CountingSource::failing()),
            DatasetConfig::default(),
        );
        assert!(matches!(store.load().await, Err(DatasetError::Fetch(_))));
        assert!(store.get().is_none());
    }
}
