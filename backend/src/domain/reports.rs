//! Asnaf report submission flow.
//!
//! A report nominates a potential aid recipient for review: validated form
//! fields, optional photo attachments, and reward points for the reporter.
//! Submission uploads the attachments, writes the report with `pending`
//! status, then credits the reporter's reward counters.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::domain::ports::{
    AttachmentStore, AttachmentStoreError, ReportStore, ReportStoreError, UserDirectory,
};
use crate::domain::user::UserId;

/// Maximum number of attachments accepted on one report.
pub const ATTACHMENT_MAX: usize = 6;
/// Maximum reward points a single report may claim.
pub const REWARD_POINTS_MAX: u32 = 100;

/// Field-level validation failure, recoverable by the submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportValidationError {
    EmptyName,
    EmptyAddress,
    InvalidPhoneNumber,
    EmptyDescription,
    EmptyLocation,
    RewardPointsTooHigh { max: u32 },
    TooManyAttachments { max: usize },
    EmptyAttachment { file_name: String },
}

impl ReportValidationError {
    /// Machine-readable field name for client-side highlighting.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyName => "name",
            Self::EmptyAddress => "address",
            Self::InvalidPhoneNumber => "phoneNumber",
            Self::EmptyDescription => "description",
            Self::EmptyLocation => "location",
            Self::RewardPointsTooHigh { .. } => "rewardPoints",
            Self::TooManyAttachments { .. } | Self::EmptyAttachment { .. } => "attachments",
        }
    }
}

impl fmt::Display for ReportValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::EmptyAddress => write!(f, "address must not be empty"),
            Self::InvalidPhoneNumber => {
                write!(f, "phone number must contain 7 to 15 digits")
            }
            Self::EmptyDescription => write!(f, "description must not be empty"),
            Self::EmptyLocation => write!(f, "location must not be empty"),
            Self::RewardPointsTooHigh { max } => {
                write!(f, "reward points must be at most {max}")
            }
            Self::TooManyAttachments { max } => {
                write!(f, "at most {max} attachments are allowed")
            }
            Self::EmptyAttachment { file_name } => {
                write!(f, "attachment '{file_name}' is empty")
            }
        }
    }
}

impl std::error::Error for ReportValidationError {}

/// One attachment to upload alongside the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportAttachment {
    /// Original file name, used to build the object name.
    pub file_name: String,
    /// MIME type declared by the uploader.
    pub content_type: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

/// Validated report form.
///
/// ## Invariants
/// - Text fields are trimmed and non-empty.
/// - The phone number contains 7–15 digits once separators are stripped.
/// - At most [`ATTACHMENT_MAX`] attachments, each non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsnafReportForm {
    name: String,
    address: String,
    phone_number: String,
    description: String,
    location: String,
    reward_points: u32,
    attachments: Vec<ReportAttachment>,
}

/// Raw form fields prior to validation.
#[derive(Debug, Clone, Default)]
pub struct AsnafReportDraft {
    /// Name of the nominated recipient.
    pub name: String,
    /// Street address of the nominated recipient.
    pub address: String,
    /// Contact phone number.
    pub phone_number: String,
    /// Why this person qualifies for aid.
    pub description: String,
    /// Area or coordinates of the household.
    pub location: String,
    /// Points claimed for this report.
    pub reward_points: u32,
    /// Photo evidence.
    pub attachments: Vec<ReportAttachment>,
}

impl AsnafReportForm {
    /// Validate a draft into a submittable form.
    pub fn try_from_draft(draft: AsnafReportDraft) -> Result<Self, ReportValidationError> {
        let name = non_empty(draft.name, ReportValidationError::EmptyName)?;
        let address = non_empty(draft.address, ReportValidationError::EmptyAddress)?;
        let description = non_empty(draft.description, ReportValidationError::EmptyDescription)?;
        let location = non_empty(draft.location, ReportValidationError::EmptyLocation)?;

        let digits: String = draft
            .phone_number
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        if !(7..=15).contains(&digits.len()) {
            return Err(ReportValidationError::InvalidPhoneNumber);
        }

        if draft.reward_points > REWARD_POINTS_MAX {
            return Err(ReportValidationError::RewardPointsTooHigh {
                max: REWARD_POINTS_MAX,
            });
        }
        if draft.attachments.len() > ATTACHMENT_MAX {
            return Err(ReportValidationError::TooManyAttachments {
                max: ATTACHMENT_MAX,
            });
        }
        for attachment in &draft.attachments {
            if attachment.bytes.is_empty() {
                return Err(ReportValidationError::EmptyAttachment {
                    file_name: attachment.file_name.clone(),
                });
            }
        }

        Ok(Self {
            name,
            address,
            phone_number: draft.phone_number.trim().to_owned(),
            description,
            location,
            reward_points: draft.reward_points,
            attachments: draft.attachments,
        })
    }

    /// Points claimed for this report.
    #[must_use]
    pub fn reward_points(&self) -> u32 {
        self.reward_points
    }
}

fn non_empty(raw: String, err: ReportValidationError) -> Result<String, ReportValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(err)
    } else {
        Ok(trimmed.to_owned())
    }
}

/// Report document as stored and listed for review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AsnafReportRecord {
    /// Store-assigned id, present once persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Name of the nominated recipient.
    pub name: String,
    /// Street address of the nominated recipient.
    pub address: String,
    /// Contact phone number.
    pub phone_number: String,
    /// Why this person qualifies for aid.
    pub description: String,
    /// Area or coordinates of the household.
    pub location: String,
    /// Download URLs of the uploaded attachments.
    #[serde(default)]
    pub image_urls: Vec<String>,
    /// Review status; new reports start `pending`.
    pub status: String,
    /// RFC 3339 submission time.
    pub reported_at: String,
    /// Uid of the reporter, present once persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_by: Option<String>,
    /// Points claimed for this report.
    pub reward_points: u32,
}

/// Failure while submitting a report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportSubmissionError {
    /// An attachment upload failed; the report was not written.
    #[error("attachment upload failed: {source}")]
    Upload {
        /// Underlying store failure.
        #[from]
        source: AttachmentStoreError,
    },
    /// The report write failed.
    #[error("report write failed: {source}")]
    Store {
        /// Underlying store failure.
        #[from]
        source: ReportStoreError,
    },
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedReport {
    /// Store-assigned report id.
    pub id: String,
    /// Points credited to the reporter.
    pub points_awarded: u32,
}

/// Drives the upload → write → reward flow.
#[derive(Clone)]
pub struct ReportSubmissionService {
    attachments: Arc<dyn AttachmentStore>,
    reports: Arc<dyn ReportStore>,
    directory: Arc<dyn UserDirectory>,
}

impl ReportSubmissionService {
    /// Build the service over its three collaborators.
    #[must_use]
    pub fn new(
        attachments: Arc<dyn AttachmentStore>,
        reports: Arc<dyn ReportStore>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            attachments,
            reports,
            directory,
        }
    }

    /// Submit a validated report for the signed-in reporter.
    ///
    /// Attachments upload first so a storage failure leaves no half-written
    /// report. A failure while crediting reward points is logged but does
    /// not undo the submission; the report itself is the authoritative
    /// outcome.
    pub async fn submit(
        &self,
        reporter: &UserId,
        form: AsnafReportForm,
    ) -> Result<SubmittedReport, ReportSubmissionError> {
        let mut image_urls = Vec::with_capacity(form.attachments.len());
        for attachment in &form.attachments {
            let object_name = object_name_for(reporter, &attachment.file_name);
            let url = self
                .attachments
                .upload(&object_name, &attachment.content_type, attachment.bytes.clone())
                .await?;
            image_urls.push(url);
        }

        let record = AsnafReportRecord {
            id: None,
            name: form.name.clone(),
            address: form.address.clone(),
            phone_number: form.phone_number.clone(),
            description: form.description.clone(),
            location: form.location.clone(),
            image_urls,
            status: "pending".to_owned(),
            reported_at: Utc::now().to_rfc3339(),
            reported_by: Some(reporter.as_ref().to_owned()),
            reward_points: form.reward_points,
        };
        let id = self.reports.append_report(reporter, record).await?;
        info!(uid = %reporter, %id, "asnaf report submitted");

        if let Err(err) = self
            .directory
            .award_report_points(reporter, form.reward_points)
            .await
        {
            warn!(uid = %reporter, error = %err, "reward credit failed after report write");
        }

        Ok(SubmittedReport {
            id,
            points_awarded: form.reward_points,
        })
    }
}

fn object_name_for(reporter: &UserId, file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    format!(
        "asnaf_reports/{}_{}_{safe}",
        Utc::now().timestamp_millis(),
        reporter.as_ref()
    )
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{
        FixtureAttachmentStore, FixtureReportStore, FixtureUserDirectory, MockAttachmentStore,
        MockReportStore, UserDirectory,
    };
    use rstest::rstest;

    fn uid(raw: &str) -> UserId {
        UserId::new(raw).expect("fixture uid")
    }

    fn draft() -> AsnafReportDraft {
        AsnafReportDraft {
            name: "Pak Abu".to_owned(),
            address: "Kampung Baru, Lot 7".to_owned(),
            phone_number: "+60 12-345 6789".to_owned(),
            description: "Single-income household, roof damaged by floods".to_owned(),
            location: "Kelantan".to_owned(),
            reward_points: 5,
            attachments: vec![],
        }
    }

    fn attachment(file_name: &str) -> ReportAttachment {
        ReportAttachment {
            file_name: file_name.to_owned(),
            content_type: "image/jpeg".to_owned(),
            bytes: vec![0xFF, 0xD8],
        }
    }

    #[rstest]
    #[case(AsnafReportDraft { name: "  ".to_owned(), ..draft() }, "name")]
    #[case(AsnafReportDraft { address: String::new(), ..draft() }, "address")]
    #[case(AsnafReportDraft { phone_number: "12345".to_owned(), ..draft() }, "phoneNumber")]
    #[case(AsnafReportDraft { description: String::new(), ..draft() }, "description")]
    #[case(AsnafReportDraft { location: " ".to_owned(), ..draft() }, "location")]
    #[case(AsnafReportDraft { reward_points: 500, ..draft() }, "rewardPoints")]
    fn rejects_invalid_fields(#[case] invalid: AsnafReportDraft, #[case] field: &str) {
        let err = AsnafReportForm::try_from_draft(invalid).expect_err("must fail");
        assert_eq!(err.field(), field);
    }

    #[test]
    fn rejects_oversized_attachment_list() {
        let mut invalid = draft();
        invalid.attachments = (0..=ATTACHMENT_MAX).map(|i| attachment(&format!("{i}.jpg"))).collect();
        let err = AsnafReportForm::try_from_draft(invalid).expect_err("must fail");
        assert!(matches!(err, ReportValidationError::TooManyAttachments { .. }));
    }

    #[tokio::test]
    async fn submission_uploads_writes_and_credits() {
        let attachments = Arc::new(FixtureAttachmentStore::default());
        let reports = Arc::new(FixtureReportStore::default());
        let directory = Arc::new(FixtureUserDirectory::default());
        let service = ReportSubmissionService::new(
            Arc::clone(&attachments) as Arc<dyn AttachmentStore>,
            Arc::clone(&reports) as Arc<dyn ReportStore>,
            Arc::clone(&directory) as Arc<dyn UserDirectory>,
        );

        let mut submitted_draft = draft();
        submitted_draft.attachments = vec![attachment("roof.jpg"), attachment("house.jpg")];
        let form = AsnafReportForm::try_from_draft(submitted_draft).expect("valid form");
        let reporter = uid("reporter");

        let submitted = service.submit(&reporter, form).await.expect("submission succeeds");
        assert_eq!(submitted.points_awarded, 5);
        assert_eq!(attachments.uploaded().len(), 2);

        let listed = reports.list_reports().await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, "pending");
        assert_eq!(listed[0].image_urls.len(), 2);
        assert_eq!(listed[0].reported_by.as_deref(), Some("reporter"));

        let profile = directory
            .fetch_profile(&reporter)
            .await
            .expect("fetch")
            .expect("profile created by award");
        assert_eq!(profile.reward_points, 5);
        assert_eq!(profile.reports_submitted, 1);
    }

    #[tokio::test]
    async fn upload_failure_prevents_report_write() {
        let mut attachments = MockAttachmentStore::new();
        attachments
            .expect_upload()
            .returning(|_, _, _| Err(AttachmentStoreError::transport("bucket down")));
        let mut reports = MockReportStore::new();
        reports.expect_append_report().never();

        let service = ReportSubmissionService::new(
            Arc::new(attachments),
            Arc::new(reports),
            Arc::new(FixtureUserDirectory::default()),
        );

        let mut failing_draft = draft();
        failing_draft.attachments = vec![attachment("roof.jpg")];
        let form = AsnafReportForm::try_from_draft(failing_draft).expect("valid form");

        let err = service
            .submit(&uid("reporter"), form)
            .await
            .expect_err("upload failure propagates");
        assert!(matches!(err, ReportSubmissionError::Upload { .. }));
    }

    #[tokio::test]
    async fn reward_failure_does_not_undo_submission() {
        struct RewardlessDirectory;
        #[async_trait::async_trait]
        impl UserDirectory for RewardlessDirectory {
            async fn create_profile(
                &self,
                _: &UserId,
                _: crate::domain::ports::NewUserProfile,
            ) -> Result<(), crate::domain::ports::DirectoryError> {
                Ok(())
            }
            async fn fetch_profile(
                &self,
                _: &UserId,
            ) -> Result<Option<crate::domain::ports::UserProfile>, crate::domain::ports::DirectoryError>
            {
                Ok(None)
            }
            async fn award_report_points(
                &self,
                _: &UserId,
                _: u32,
            ) -> Result<(), crate::domain::ports::DirectoryError> {
                Err(crate::domain::ports::DirectoryError::transport("down"))
            }
        }

        let service = ReportSubmissionService::new(
            Arc::new(FixtureAttachmentStore::default()),
            Arc::new(FixtureReportStore::default()),
            Arc::new(RewardlessDirectory),
        );
        let form = AsnafReportForm::try_from_draft(draft()).expect("valid form");

        let submitted = service
            .submit(&uid("reporter"), form)
            .await
            .expect("submission still succeeds");
        assert!(!submitted.id.is_empty());
    }
}
