//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and services, and remain testable without I/O.
//! There is deliberately no ambient session or identity singleton here:
//! per-request identity comes from the session cookie as an explicit
//! snapshot.

use std::sync::Arc;

use crate::domain::ports::{
    AttachmentStore, ExchangeGateway, FixtureAttachmentStore, FixtureExchangeGateway,
    FixtureIdentityProvider, FixtureLedger, FixtureReportStore, FixtureUserDirectory,
    IdentityProvider, ReportStore, TransactionLedger, UserDirectory,
};
use crate::domain::{
    CombinedHistoryService, NavigationGate, PaymentService, ReportSubmissionService, RoleResolver,
    RouteRegistry,
};

/// Parameter object bundling the ports HTTP handlers depend on.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub identity: Arc<dyn IdentityProvider>,
    pub directory: Arc<dyn UserDirectory>,
    pub donations: Arc<dyn TransactionLedger>,
    pub zakat: Arc<dyn TransactionLedger>,
    pub reports: Arc<dyn ReportStore>,
    pub attachments: Arc<dyn AttachmentStore>,
    pub exchange: Arc<dyn ExchangeGateway>,
}

impl Default for HttpStatePorts {
    fn default() -> Self {
        Self {
            identity: Arc::new(FixtureIdentityProvider),
            directory: Arc::new(FixtureUserDirectory::default()),
            donations: Arc::new(FixtureLedger::default()),
            zakat: Arc::new(FixtureLedger::default()),
            reports: Arc::new(FixtureReportStore::default()),
            attachments: Arc::new(FixtureAttachmentStore::default()),
            exchange: Arc::new(FixtureExchangeGateway::default()),
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub identity: Arc<dyn IdentityProvider>,
    pub directory: Arc<dyn UserDirectory>,
    pub donations: Arc<dyn TransactionLedger>,
    pub zakat: Arc<dyn TransactionLedger>,
    pub report_store: Arc<dyn ReportStore>,
    pub exchange: Arc<dyn ExchangeGateway>,
    pub routes: RouteRegistry,
    pub gate: Arc<NavigationGate>,
    pub resolver: RoleResolver,
    pub history: CombinedHistoryService,
    pub payments: PaymentService,
    pub report_submission: ReportSubmissionService,
}

impl HttpState {
    /// Wire the domain services from a ports bundle.
    ///
    /// # Examples
    /// ```no_run
    /// use amanah_backend::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// let state = HttpState::new(HttpStatePorts::default());
    /// let _gate = state.gate.clone();
    /// ```
    #[must_use]
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            identity,
            directory,
            donations,
            zakat,
            reports,
            attachments,
            exchange,
        } = ports;

        let resolver = RoleResolver::new(Arc::clone(&directory));
        let gate = Arc::new(NavigationGate::new(resolver.clone()));
        let history = CombinedHistoryService::new(Arc::clone(&donations), Arc::clone(&zakat));
        let payments = PaymentService::new(
            Arc::clone(&donations),
            Arc::clone(&zakat),
            Arc::clone(&directory),
        );
        let report_submission = ReportSubmissionService::new(
            attachments,
            Arc::clone(&reports),
            Arc::clone(&directory),
        );

        Self {
            identity,
            directory,
            donations,
            zakat,
            report_store: reports,
            exchange,
            routes: RouteRegistry,
            gate,
            resolver,
            history,
            payments,
            report_submission,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
