//! Citizen application form: pick a document type and branch, attach the
//! required file, submit.
//!
//! Submission is two requests: create the application, then upload the
//! attachment against the new id. If the upload fails the application has
//! already been created; the form reports the generic failure either way.

#[cfg(test)]
#[path = "application_form_test.rs"]
mod application_form_test;

use std::path::Path;

use tracing::info;

use super::{Notice, ViewError};
use crate::net::api::{self, Upload};
use crate::net::client::ApiClient;
use crate::net::types::{Application, Branch, DocumentType};

pub const OPTIONS_FAILED: &str = "Failed to load form options.";
pub const INCOMPLETE: &str = "Please complete all fields and upload the required document.";
pub const SUBMIT_FAILED: &str = "Submission failed. Please try again.";
pub const SUBMITTED: &str = "Application submitted!";
pub const ACCEPT: &str = ".jpg,.jpeg,.png,.pdf";
const ACCEPTED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "pdf"];

/// Guidance shown for the upload field of a document type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadRequirement {
    pub title: &'static str,
    pub description: &'static str,
    pub placeholder: &'static str,
    pub accept: &'static str,
}

/// Upload guidance keyed off the document type's name.
#[must_use]
pub fn upload_requirement(document_name: &str) -> UploadRequirement {
    let name = document_name.to_lowercase();
    let mentions = |a: &str, b: &str| name.contains(a) || name.contains(b);

    if mentions("national id", "nationalid") {
        UploadRequirement {
            title: "Upload Birth Certificate or Photocopy",
            description: "For National ID applications, you must upload your birth certificate or a clear photocopy as proof of identity and age.",
            placeholder: "Select birth certificate or photocopy...",
            accept: ACCEPT,
        }
    } else if name.contains("passport") {
        UploadRequirement {
            title: "Upload Birth Certificate or Photocopy",
            description: "For Passport applications, you must upload your birth certificate or a clear photocopy as proof of citizenship and identity.",
            placeholder: "Select birth certificate or photocopy...",
            accept: ACCEPT,
        }
    } else if mentions("birth certificate", "birthcertificate") {
        UploadRequirement {
            title: "Upload Supporting Documents",
            description: "Please upload supporting documents such as hospital records, baptismal certificate, or other proof of birth.",
            placeholder: "Select supporting documents...",
            accept: ACCEPT,
        }
    } else if mentions("death certificate", "deathcertificate") {
        UploadRequirement {
            title: "Upload Supporting Documents",
            description: "Please upload supporting documents such as medical records, burial permit, or other proof of death.",
            placeholder: "Select supporting documents...",
            accept: ACCEPT,
        }
    } else {
        UploadRequirement {
            title: "Upload Required Documents",
            description: "Please upload the required documents for your application.",
            placeholder: "Select required documents...",
            accept: ACCEPT,
        }
    }
}

#[must_use]
pub fn is_accepted_file(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ACCEPTED_EXTENSIONS.iter().any(|ok| ext.eq_ignore_ascii_case(ok)))
}

pub struct ApplicationForm {
    api: ApiClient,
    document_types: Vec<DocumentType>,
    branches: Vec<Branch>,
    document_type_id: Option<String>,
    branch_id: Option<String>,
    upload: Option<Upload>,
    description: String,
    pub notice: Notice,
}

impl ApplicationForm {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            document_types: Vec::new(),
            branches: Vec::new(),
            document_type_id: None,
            branch_id: None,
            upload: None,
            description: String::new(),
            notice: Notice::default(),
        }
    }

    /// Load document types and branches concurrently.
    ///
    /// # Errors
    ///
    /// [`ViewError::Failed`] with `Failed to load form options.` if either
    /// request fails; neither list is replaced in that case.
    pub async fn load_options(&mut self) -> Result<(), ViewError> {
        let (types, branches) =
            tokio::join!(api::list_document_types(&self.api), api::list_registry_branches(&self.api));
        match types.and_then(|types| Ok((types, branches?))) {
            Ok((types, branches)) => {
                self.document_types = types;
                self.branches = branches;
                Ok(())
            }
            Err(e) => Err(self.notice.fail(ViewError::failed(OPTIONS_FAILED, e))),
        }
    }

    #[must_use]
    pub fn document_types(&self) -> &[DocumentType] {
        &self.document_types
    }

    #[must_use]
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn select_document_type(&mut self, id: Option<&str>) {
        self.document_type_id = id.map(str::to_owned);
    }

    pub fn select_branch(&mut self, id: Option<&str>) {
        self.branch_id = id.map(str::to_owned);
    }

    #[must_use]
    pub fn selected_document_type(&self) -> Option<&DocumentType> {
        let id = self.document_type_id.as_deref()?;
        self.document_types.iter().find(|t| t.id == id)
    }

    /// Upload guidance for the selected document type.
    #[must_use]
    pub fn requirement(&self) -> Option<UploadRequirement> {
        self.selected_document_type().map(|t| upload_requirement(&t.name))
    }

    /// Attach the file to upload.
    ///
    /// # Errors
    ///
    /// [`ViewError::Invalid`] when the extension is not one of the accepted
    /// types.
    pub fn attach(&mut self, upload: Upload) -> Result<(), ViewError> {
        if !is_accepted_file(&upload.file_name) {
            let message = format!("Unsupported file type. Accepted types: {ACCEPT}");
            return Err(self.notice.fail(ViewError::invalid(message)));
        }
        self.upload = Some(upload);
        Ok(())
    }

    pub fn set_description(&mut self, description: &str) {
        description.clone_into(&mut self.description);
    }

    /// Create the application and upload its attachment. The form resets on
    /// success.
    ///
    /// # Errors
    ///
    /// [`ViewError::Invalid`] when a field or the file is missing (nothing is
    /// sent); [`ViewError::Failed`] when either request fails.
    pub async fn submit(&mut self) -> Result<Application, ViewError> {
        self.notice.clear();
        let (Some(document_type), Some(branch), Some(upload)) =
            (self.document_type_id.clone(), self.branch_id.clone(), self.upload.clone())
        else {
            return Err(self.notice.fail(ViewError::invalid(INCOMPLETE)));
        };

        let application = match api::create_application(&self.api, &document_type, &branch).await {
            Ok(application) => application,
            Err(e) => return Err(self.notice.fail(ViewError::failed(SUBMIT_FAILED, e))),
        };
        let description = Some(self.description.as_str()).filter(|d| !d.trim().is_empty());
        if let Err(e) = api::upload_attachment(&self.api, &application.id, upload, description).await {
            return Err(self.notice.fail(ViewError::failed(SUBMIT_FAILED, e)));
        }

        info!(id = %application.id, "application submitted");
        self.reset();
        self.notice.succeed(SUBMITTED);
        Ok(application)
    }

    fn reset(&mut self) {
        self.document_type_id = None;
        self.branch_id = None;
        self.upload = None;
        self.description.clear();
    }
}
