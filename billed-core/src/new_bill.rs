//! New Bill form: attachment upload, then the complete record on submit.
//!
//! Uploading the attachment is what creates the bill server-side; the store
//! answers with the attachment URL and a provisional key. Submitting sends the
//! full record as an update selected by that key, then leaves the page.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{debug, error, info, warn};

use crate::attachment::{INVALID_EXTENSION_MESSAGE, SelectedFile};
use crate::bill::{Bill, BillStatus, ExpenseType};
use crate::error::{FormError, StoreError};
use crate::routes;
use crate::session::Session;
use crate::store::{AttachmentUpload, BillStore, CreatedBill};

/// VAT percent used when the field is empty, zero or not a number
pub const DEFAULT_VAT_PERCENT: f64 = 20.0;

/// Leading number of an input, e.g. `42` in `"42 €"`; decimal comma accepted
static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([+-]?\d+(?:[.,]\d+)?)").expect("valid number pattern"));

/// Raw form values as read from the inputs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormFields {
    pub expense_type: String,
    pub name: String,
    pub date: String,
    pub amount: String,
    pub vat: String,
    pub pct: String,
    pub commentary: String,
}

/// Typed form values, ready to be merged with the upload state.
///
/// Values that do not parse are absent rather than errors.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFields {
    pub expense_type: Option<ExpenseType>,
    pub name: String,
    pub date: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub vat: Option<f64>,
    pub pct: f64,
    pub commentary: Option<String>,
}

impl FormFields {
    pub fn parse(&self) -> ParsedFields {
        let expense_type = ExpenseType::from_label(&self.expense_type);
        if expense_type.is_none() {
            debug!(value = %self.expense_type, "expense type matches no label");
        }
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok();
        if date.is_none() {
            debug!(value = %self.date, "expense date is not YYYY-MM-DD");
        }

        ParsedFields {
            expense_type,
            name: self.name.trim().to_string(),
            date,
            amount: leading_number(&self.amount),
            vat: leading_number(&self.vat),
            pct: leading_number(&self.pct)
                .filter(|pct| *pct != 0.0)
                .unwrap_or(DEFAULT_VAT_PERCENT),
            commentary: non_blank(&self.commentary),
        }
    }
}

fn leading_number(value: &str) -> Option<f64> {
    let caps = LEADING_NUMBER.captures(value)?;
    caps[1].replace(',', ".").parse::<f64>().ok()
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// The submit event handed over by the UI layer
pub trait SubmitEvent {
    /// Stop the host from performing its own submission
    fn prevent_default(&mut self);

    /// Current values of the form inputs
    fn form_fields(&self) -> FormFields;
}

/// Plain [`SubmitEvent`] for hosts without an event object of their own
#[derive(Debug, Clone, Default)]
pub struct FormSubmission {
    pub fields: FormFields,
    prevent_default_calls: usize,
}

impl FormSubmission {
    pub fn new(fields: FormFields) -> Self {
        Self {
            fields,
            prevent_default_calls: 0,
        }
    }

    pub fn prevent_default_calls(&self) -> usize {
        self.prevent_default_calls
    }
}

impl SubmitEvent for FormSubmission {
    fn prevent_default(&mut self) {
        self.prevent_default_calls += 1;
    }

    fn form_fields(&self) -> FormFields {
        self.fields.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Editing,
    Uploading,
    Uploaded,
    UploadRejected,
    Submitted,
}

/// What happened to a file selection
#[derive(Debug, Clone, PartialEq)]
pub enum FileSelection {
    /// Extension not allowed; the user was alerted
    Rejected(FormError),
    Uploaded(CreatedBill),
    /// The store refused the upload; logged only
    Failed(StoreError),
    /// A later selection was made before this upload settled
    Superseded,
}

/// An accepted selection whose upload has not been sent yet.
///
/// Holds no borrow on the form, so a host can keep the form responsive while
/// the upload runs and hand the result back with [`NewBill::finish_upload`].
#[derive(Debug)]
pub struct PendingUpload {
    selection: u64,
    file_name: String,
    upload: AttachmentUpload,
}

impl PendingUpload {
    pub async fn send(self, store: &dyn BillStore) -> CompletedUpload {
        let result = store.create(self.upload).await;
        CompletedUpload {
            selection: self.selection,
            file_name: self.file_name,
            result,
        }
    }
}

#[derive(Debug)]
pub struct CompletedUpload {
    selection: u64,
    file_name: String,
    result: Result<CreatedBill, StoreError>,
}

type Callback = Box<dyn FnMut(&str) + Send>;

pub struct NewBill {
    store: Arc<dyn BillStore>,
    session: Session,
    on_navigate: Callback,
    alert: Callback,
    state: FormState,
    file_url: Option<String>,
    file_name: Option<String>,
    bill_id: Option<String>,
    /// Id of the latest accepted selection; older uploads are discarded on completion
    selection: u64,
}

impl NewBill {
    pub fn new(
        store: Arc<dyn BillStore>,
        session: Session,
        on_navigate: impl FnMut(&str) + Send + 'static,
        alert: impl FnMut(&str) + Send + 'static,
    ) -> Self {
        Self {
            store,
            session,
            on_navigate: Box::new(on_navigate),
            alert: Box::new(alert),
            state: FormState::Editing,
            file_url: None,
            file_name: None,
            bill_id: None,
            selection: 0,
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn file_url(&self) -> Option<&str> {
        self.file_url.as_deref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Provisional key returned by the upload
    pub fn bill_id(&self) -> Option<&str> {
        self.bill_id.as_deref()
    }

    /// Validate and upload the selected attachment.
    ///
    /// Never fails: a bad extension alerts the user, a store error is logged
    /// and the form keeps its previous attachment state.
    pub async fn handle_file_selected(&mut self, file: SelectedFile) -> FileSelection {
        let pending = match self.begin_upload(file) {
            Ok(pending) => pending,
            Err(rejected) => return FileSelection::Rejected(rejected),
        };
        let store = Arc::clone(&self.store);
        let completed = pending.send(store.as_ref()).await;
        self.finish_upload(completed)
    }

    /// First half of [`Self::handle_file_selected`]: run the extension gate
    /// and package the multipart payload.
    ///
    /// A rejected file leaves any upload already in flight untouched.
    pub fn begin_upload(&mut self, file: SelectedFile) -> Result<PendingUpload, FormError> {
        let selected_name = file.name.clone();
        let Some(valid) = file.validate() else {
            warn!(file = %selected_name, "rejected attachment extension");
            (self.alert)(INVALID_EXTENSION_MESSAGE);
            if self.file_url.is_none() && self.state != FormState::Uploading {
                self.state = FormState::UploadRejected;
            }
            return Err(FormError::InvalidFileExtension(selected_name));
        };

        self.selection += 1;
        self.state = FormState::Uploading;
        debug!(file = %valid.name, selection = self.selection, "uploading attachment");

        Ok(PendingUpload {
            selection: self.selection,
            file_name: valid.name.clone(),
            upload: AttachmentUpload {
                file: valid,
                email: self.session.email().to_string(),
            },
        })
    }

    /// Second half of [`Self::handle_file_selected`]: apply a settled upload.
    pub fn finish_upload(&mut self, completed: CompletedUpload) -> FileSelection {
        if completed.selection != self.selection {
            debug!(
                file = %completed.file_name,
                selection = completed.selection,
                latest = self.selection,
                "dropping upload of a superseded selection"
            );
            return FileSelection::Superseded;
        }

        match completed.result {
            Ok(created) => {
                info!(file = %completed.file_name, key = %created.key, "attachment uploaded");
                self.file_url = Some(created.file_url.clone());
                self.file_name = Some(completed.file_name);
                self.bill_id = Some(created.key.clone());
                self.state = FormState::Uploaded;
                FileSelection::Uploaded(created)
            }
            Err(e) => {
                error!(file = %completed.file_name, error = %e, "attachment upload failed");
                self.state = if self.file_url.is_some() {
                    FormState::Uploaded
                } else {
                    FormState::Editing
                };
                FileSelection::Failed(e)
            }
        }
    }

    /// Build the complete bill from the form and the upload state
    pub fn build_bill(&self, fields: &FormFields) -> Bill {
        let parsed = fields.parse();
        Bill {
            id: None,
            expense_type: parsed.expense_type,
            name: parsed.name,
            date: parsed.date,
            amount: parsed.amount,
            vat: parsed.vat,
            pct: parsed.pct,
            commentary: parsed.commentary,
            file_url: self.file_url.clone(),
            file_name: self.file_name.clone(),
            status: BillStatus::Pending,
            email: self.session.email().to_string(),
        }
    }

    /// Send the complete bill, selected by the upload key when there is one,
    /// then navigate to the bills listing.
    ///
    /// The listing is shown whatever the store answers. A store error is
    /// logged and returned; the form keeps its upload state.
    pub async fn handle_submit(&mut self, event: &mut impl SubmitEvent) -> Result<Bill, FormError> {
        event.prevent_default();

        let bill = self.build_bill(&event.form_fields());
        let selector = self.bill_id.clone();
        if selector.is_none() {
            warn!("submitting a bill without an uploaded attachment");
        }

        let result = self.store.update(selector.as_deref(), &bill).await;
        match &result {
            Ok(saved) => {
                info!(key = saved.id.as_deref().unwrap_or("-"), "bill submitted");
                self.state = FormState::Submitted;
            }
            Err(e) => {
                error!(key = selector.as_deref().unwrap_or("-"), error = %e, "bill update failed");
            }
        }
        (self.on_navigate)(routes::BILLS);
        result.map_err(FormError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> FormFields {
        FormFields {
            expense_type: "Transports".to_string(),
            name: "Vol Paris Londres".to_string(),
            date: "2022-02-15".to_string(),
            amount: "348".to_string(),
            vat: "70".to_string(),
            pct: "".to_string(),
            commentary: "  ".to_string(),
        }
    }

    #[test]
    fn test_parse_defaults() {
        let p = fields().parse();
        assert_eq!(p.expense_type, Some(ExpenseType::Transports));
        assert_eq!(p.date, NaiveDate::from_ymd_opt(2022, 2, 15));
        assert_eq!(p.amount, Some(348.0));
        assert_eq!(p.vat, Some(70.0));
        assert_eq!(p.pct, DEFAULT_VAT_PERCENT);
        assert_eq!(p.commentary, None);
    }

    #[test]
    fn test_parse_decimal_comma() {
        let mut f = fields();
        f.amount = "12,50".to_string();
        assert_eq!(f.parse().amount, Some(12.5));
    }

    #[test]
    fn test_parse_keeps_leading_number() {
        let mut f = fields();
        f.amount = " 42abc".to_string();
        f.vat = "8.4 €".to_string();
        f.pct = "10%".to_string();
        let p = f.parse();
        assert_eq!(p.amount, Some(42.0));
        assert_eq!(p.vat, Some(8.4));
        assert_eq!(p.pct, 10.0);
    }

    #[test]
    fn test_parse_unreadable_values_are_absent() {
        let f = FormFields {
            expense_type: "test".to_string(),
            name: "test".to_string(),
            date: "test".to_string(),
            amount: "test".to_string(),
            vat: "test".to_string(),
            pct: "test".to_string(),
            commentary: "test".to_string(),
        };
        let p = f.parse();
        assert_eq!(p.expense_type, None);
        assert_eq!(p.date, None);
        assert_eq!(p.amount, None);
        assert_eq!(p.vat, None);
        assert_eq!(p.pct, DEFAULT_VAT_PERCENT);
        assert_eq!(p.name, "test");
        assert_eq!(p.commentary.as_deref(), Some("test"));
    }

    #[test]
    fn test_zero_pct_falls_back_to_default() {
        let mut f = fields();
        f.pct = "0".to_string();
        assert_eq!(f.parse().pct, DEFAULT_VAT_PERCENT);
    }

    #[test]
    fn test_form_submission_counts_prevent_default() {
        let mut ev = FormSubmission::new(fields());
        assert_eq!(ev.prevent_default_calls(), 0);
        ev.prevent_default();
        assert_eq!(ev.prevent_default_calls(), 1);
    }
}
