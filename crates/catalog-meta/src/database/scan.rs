//! Bulk column scans over many tables.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{watch, Semaphore};
use tracing::{info, warn};

use crate::core::schema::{ColumnDefinition, TableId};
use crate::error::{CatalogError, Result};

use super::Database;

/// Outcome of one table's scan.
#[derive(Debug)]
pub struct TableScan {
    pub table: TableId,
    pub result: Result<Arc<Vec<ColumnDefinition>>>,
}

/// Per-table outcomes of [`Database::scan_columns`], sorted by table id.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub tables: Vec<TableScan>,
}

impl ScanReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &TableScan> {
        self.tables.iter().filter(|t| t.result.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &TableScan> {
        self.tables.iter().filter(|t| t.result.is_err())
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }

    pub fn is_complete(&self) -> bool {
        self.failure_count() == 0
    }

    /// The first failure, for callers that treat any failed table as fatal.
    pub fn first_error(&self) -> Option<&CatalogError> {
        self.tables.iter().find_map(|t| t.result.as_ref().err())
    }
}

impl Database {
    /// Fill the column cache for many tables with at most `workers` catalog
    /// queries in flight.
    ///
    /// A failing table is recorded in the report and does not stop the
    /// others. Once `cancel` flips to `true`, tables not yet started are
    /// reported as cancelled; scans already running finish.
    pub async fn scan_columns(
        self: &Arc<Self>,
        tables: Vec<TableId>,
        workers: usize,
        cancel: Option<watch::Receiver<bool>>,
    ) -> ScanReport {
        let cancel = cancel.unwrap_or_else(|| {
            let (_, rx) = watch::channel(false);
            rx
        });
        let workers = workers.max(1);
        let semaphore = Arc::new(Semaphore::new(workers));

        info!("Scanning {} tables with {} workers", tables.len(), workers);

        let mut handles = Vec::with_capacity(tables.len());
        let mut report = ScanReport::default();

        for table in tables {
            if *cancel.borrow() {
                report.tables.push(TableScan {
                    result: Err(CatalogError::Cancelled.with_table(&table)),
                    table,
                });
                continue;
            }

            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    report.tables.push(TableScan {
                        result: Err(CatalogError::Cancelled.with_table(&table)),
                        table,
                    });
                    continue;
                }
            };

            // Cancellation may arrive while waiting for a permit.
            if *cancel.borrow() {
                drop(permit);
                report.tables.push(TableScan {
                    result: Err(CatalogError::Cancelled.with_table(&table)),
                    table,
                });
                continue;
            }

            let db = self.clone();
            let id = table.clone();
            let handle = tokio::spawn(async move {
                let result = db.columns(&id).await;
                drop(permit);
                result
            });
            handles.push((table, handle));
        }

        let (ids, handles): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
        for (table, joined) in ids.into_iter().zip(join_all(handles).await) {
            let result = match joined {
                Ok(result) => result,
                Err(e) => Err(CatalogError::access("column scan task", e).with_table(&table)),
            };
            if let Err(e) = &result {
                warn!("{}: scan failed: {}", table, e);
            }
            report.tables.push(TableScan { table, result });
        }

        report.tables.sort_by(|a, b| a.table.cmp(&b.table));
        info!(
            "Scanned {} tables ({} failed)",
            report.tables.len(),
            report.failure_count()
        );
        report
    }
}
