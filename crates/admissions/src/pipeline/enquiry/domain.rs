use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::pipeline::directory::UserId;
use crate::pipeline::store::StoreError;

/// Identifier wrapper for admission enquiries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnquiryId(pub String);

/// Program a lead is enquiring about. Stored uppercase-canonical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProgramType {
    Ug,
    Pg,
    Phd,
}

impl ProgramType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "UG" => Some(Self::Ug),
            "PG" => Some(Self::Pg),
            "PHD" => Some(Self::Phd),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ProgramType::Ug => "UG",
            ProgramType::Pg => "PG",
            ProgramType::Phd => "PHD",
        }
    }
}

/// Review pipeline state of a lead. Admin updates may only move an enquiry
/// into the four reviewer-settable states; `New` is the creation default and
/// `FollowUp`/`Admitted` are set by flows outside this excerpt of the
/// platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnquiryStatus {
    New,
    Pending,
    Contacted,
    #[serde(rename = "follow up")]
    FollowUp,
    Converted,
    Rejected,
    Admitted,
}

impl EnquiryStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "new" => Some(Self::New),
            "pending" => Some(Self::Pending),
            "contacted" => Some(Self::Contacted),
            "follow up" | "follow-up" | "followup" => Some(Self::FollowUp),
            "converted" => Some(Self::Converted),
            "rejected" => Some(Self::Rejected),
            "admitted" => Some(Self::Admitted),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            EnquiryStatus::New => "new",
            EnquiryStatus::Pending => "pending",
            EnquiryStatus::Contacted => "contacted",
            EnquiryStatus::FollowUp => "follow up",
            EnquiryStatus::Converted => "converted",
            EnquiryStatus::Rejected => "rejected",
            EnquiryStatus::Admitted => "admitted",
        }
    }

    /// Whether the status-update endpoint may set this value.
    pub const fn reviewer_settable(self) -> bool {
        matches!(
            self,
            EnquiryStatus::Pending
                | EnquiryStatus::Contacted
                | EnquiryStatus::Converted
                | EnquiryStatus::Rejected
        )
    }
}

/// Free-form audit note appended by admin actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryNote {
    pub author: String,
    pub body: String,
    pub recorded_at: DateTime<Utc>,
}

/// Admission processing details; written wholesale by the
/// process-to-admission action, never merged field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionDetails {
    pub source: Option<String>,
    pub is_scholarship: bool,
    pub scholarship_type: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
    pub fee: Option<u64>,
    pub processed_by: String,
    pub processed_at: DateTime<Utc>,
}

/// Public-facing lead record for a program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionEnquiry {
    pub id: EnquiryId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub program_type: ProgramType,
    pub date_of_birth: NaiveDate,
    pub gender: Option<String>,
    /// Last class attended; the intake payload calls this `qualification`.
    pub last_class: String,
    pub board_school_name: String,
    pub percentage: Option<f32>,
    pub stream: Option<String>,
    pub graduation_course: String,
    pub status: EnquiryStatus,
    pub notes: Vec<EnquiryNote>,
    pub admission_details: Option<AdmissionDetails>,
    pub user: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Raw intake payload before validation. Every field is optional here so a
/// single pass can report all missing fields at once.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryDraft {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub program_type: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub qualification: Option<String>,
    pub board_school_name: Option<String>,
    pub graduation_course: Option<String>,
    pub gender: Option<String>,
    pub percentage: Option<f32>,
    pub stream: Option<String>,
}

/// Validated intake fields ready to become an `AdmissionEnquiry`.
#[derive(Debug, Clone)]
pub(crate) struct ValidatedDraft {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) phone: String,
    pub(crate) program_type: ProgramType,
    pub(crate) date_of_birth: NaiveDate,
    pub(crate) last_class: String,
    pub(crate) board_school_name: String,
    pub(crate) graduation_course: String,
    pub(crate) gender: Option<String>,
    pub(crate) percentage: Option<f32>,
    pub(crate) stream: Option<String>,
}

fn required(
    missing: &mut BTreeMap<&'static str, String>,
    key: &'static str,
    value: Option<&String>,
) -> String {
    match value.map(|value| value.trim()).filter(|value| !value.is_empty()) {
        Some(value) => value.to_string(),
        None => {
            missing.insert(key, format!("{key} is required"));
            String::new()
        }
    }
}

impl EnquiryDraft {
    /// Validates required fields, reporting every gap in one field-keyed
    /// map, and canonicalizes email (lowercase) and program type
    /// (uppercase).
    pub(crate) fn validate(self) -> Result<ValidatedDraft, EnquiryError> {
        let mut missing = BTreeMap::new();

        let name = required(&mut missing, "name", self.name.as_ref());
        let email = required(&mut missing, "email", self.email.as_ref()).to_lowercase();
        let phone = required(&mut missing, "phone", self.phone.as_ref());
        let program_raw = required(&mut missing, "programType", self.program_type.as_ref());
        let last_class = required(&mut missing, "qualification", self.qualification.as_ref());
        let board_school_name = required(
            &mut missing,
            "boardSchoolName",
            self.board_school_name.as_ref(),
        );
        let graduation_course = required(
            &mut missing,
            "graduationCourse",
            self.graduation_course.as_ref(),
        );

        let date_of_birth = match self.date_of_birth {
            Some(date) => date,
            None => {
                missing.insert("dateOfBirth", "dateOfBirth is required".to_string());
                NaiveDate::default()
            }
        };

        if !missing.is_empty() {
            return Err(EnquiryError::Validation { missing });
        }

        let program_type = ProgramType::parse(&program_raw)
            .ok_or(EnquiryError::InvalidProgram { raw: program_raw })?;

        Ok(ValidatedDraft {
            name,
            email,
            phone,
            program_type,
            date_of_birth,
            last_class,
            board_school_name,
            graduation_course,
            gender: self.gender,
            percentage: self.percentage,
            stream: self.stream,
        })
    }
}

/// Body of the process-to-admission admin action.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessToAdmissionRequest {
    pub source: Option<String>,
    #[serde(default)]
    pub is_scholarship: bool,
    pub scholarship_type: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
    pub fee: Option<u64>,
    pub notes: Option<String>,
}

/// Error raised by enquiry intake and administration.
#[derive(Debug, thiserror::Error)]
pub enum EnquiryError {
    #[error("required fields are missing")]
    Validation { missing: BTreeMap<&'static str, String> },
    #[error("programType '{raw}' must be one of UG, PG, PHD")]
    InvalidProgram { raw: String },
    #[error("status '{raw}' is not an allowed review status")]
    InvalidStatus { raw: String },
    #[error("an enquiry already exists for this email and program")]
    Duplicate(Box<AdmissionEnquiry>),
    #[error(transparent)]
    Store(#[from] StoreError),
}
