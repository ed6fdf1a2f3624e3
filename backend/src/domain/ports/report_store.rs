//! Driven port for the asnaf report collection.

use std::sync::Mutex;

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::reports::AsnafReportRecord;
use crate::domain::user::UserId;

define_port_error! {
    /// Failures surfaced by the report store.
    pub enum ReportStoreError {
        /// The backing store could not be reached.
        Transport { message: String } => "report store unreachable: {message}",
        /// The backing store denied the read or write.
        PermissionDenied { message: String } => "report store denied access: {message}",
        /// A stored report could not be interpreted.
        Decode { message: String } => "report document invalid: {message}",
    }
}

/// Domain port over the report collection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Append a new report and return the source-assigned id.
    async fn append_report(
        &self,
        reporter: &UserId,
        report: AsnafReportRecord,
    ) -> Result<String, ReportStoreError>;

    /// List every report, newest first. Admin review surface.
    async fn list_reports(&self) -> Result<Vec<AsnafReportRecord>, ReportStoreError>;
}

/// In-memory report store used in tests and local development.
#[derive(Debug, Default)]
pub struct FixtureReportStore {
    reports: Mutex<Vec<AsnafReportRecord>>,
}

#[async_trait]
impl ReportStore for FixtureReportStore {
    async fn append_report(
        &self,
        reporter: &UserId,
        mut report: AsnafReportRecord,
    ) -> Result<String, ReportStoreError> {
        let mut reports = self
            .reports
            .lock()
            .map_err(|_| ReportStoreError::transport("fixture lock poisoned"))?;
        let id = format!("fixture-report-{}", reports.len() + 1);
        report.id = Some(id.clone());
        report.reported_by = Some(reporter.as_ref().to_owned());
        reports.push(report);
        Ok(id)
    }

    async fn list_reports(&self) -> Result<Vec<AsnafReportRecord>, ReportStoreError> {
        let reports = self
            .reports
            .lock()
            .map_err(|_| ReportStoreError::transport("fixture lock poisoned"))?;
        let mut listed = reports.clone();
        listed.reverse();
        Ok(listed)
    }
}
