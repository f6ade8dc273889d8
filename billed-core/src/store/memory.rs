//! In-memory bill store for tests and offline runs.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use super::{AttachmentUpload, BillStore, CreatedBill};
use crate::bill::Bill;
use crate::error::StoreError;

/// In-memory store that records every call it receives.
///
/// Failures can be queued per operation; each queued error is returned by
/// exactly one call, after which the store behaves normally again.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    bills: Vec<Bill>,
    provisional: Vec<String>,
    next_key: u64,
    create_response: Option<CreatedBill>,
    create_failures: VecDeque<StoreError>,
    update_failures: VecDeque<StoreError>,
    list_failures: VecDeque<StoreError>,
    uploads: Vec<AttachmentUpload>,
    updates: Vec<(Option<String>, Bill)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing bills
    pub fn with_bills(bills: Vec<Bill>) -> Self {
        let store = Self::new();
        store.lock().bills = bills;
        store
    }

    /// Answer every upload with a fixed acknowledgement
    pub fn with_create_response(self, response: CreatedBill) -> Self {
        self.lock().create_response = Some(response);
        self
    }

    pub fn fail_next_create(&self, err: StoreError) {
        self.lock().create_failures.push_back(err);
    }

    pub fn fail_next_update(&self, err: StoreError) {
        self.lock().update_failures.push_back(err);
    }

    pub fn fail_next_list(&self, err: StoreError) {
        self.lock().list_failures.push_back(err);
    }

    /// Uploads received so far, failed ones included
    pub fn uploads(&self) -> Vec<AttachmentUpload> {
        self.lock().uploads.clone()
    }

    /// Updates received so far as `(selector, record)`, failed ones included
    pub fn updates(&self) -> Vec<(Option<String>, Bill)> {
        self.lock().updates.clone()
    }

    pub fn bills(&self) -> Vec<Bill> {
        self.lock().bills.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl BillStore for MemoryStore {
    async fn create(&self, upload: AttachmentUpload) -> Result<CreatedBill, StoreError> {
        let mut inner = self.lock();
        let file_name = upload.file.name.clone();
        inner.uploads.push(upload);

        if let Some(err) = inner.create_failures.pop_front() {
            return Err(err);
        }

        let created = match inner.create_response.clone() {
            Some(fixed) => fixed,
            None => {
                inner.next_key += 1;
                let key = format!("bill-{:04}", inner.next_key);
                CreatedBill {
                    file_url: format!("memory://{key}/{file_name}"),
                    key,
                }
            }
        };
        inner.provisional.push(created.key.clone());
        Ok(created)
    }

    async fn update(&self, selector: Option<&str>, bill: &Bill) -> Result<Bill, StoreError> {
        let mut inner = self.lock();
        inner.updates.push((selector.map(str::to_string), bill.clone()));

        if let Some(err) = inner.update_failures.pop_front() {
            return Err(err);
        }

        let id = match selector {
            Some(id) => {
                let known = inner.provisional.iter().any(|k| k == id)
                    || inner.bills.iter().any(|b| b.id.as_deref() == Some(id));
                if !known {
                    return Err(StoreError::NotFound(id.to_string()));
                }
                id.to_string()
            }
            None => {
                inner.next_key += 1;
                format!("bill-{:04}", inner.next_key)
            }
        };

        let mut stored = bill.clone();
        stored.id = Some(id.clone());
        inner.provisional.retain(|k| *k != id);
        match inner.bills.iter_mut().find(|b| b.id.as_deref() == Some(id.as_str())) {
            Some(existing) => *existing = stored.clone(),
            None => inner.bills.push(stored.clone()),
        }
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<Bill>, StoreError> {
        let mut inner = self.lock();
        if let Some(err) = inner.list_failures.pop_front() {
            return Err(err);
        }
        Ok(inner.bills.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::SelectedFile;
    use crate::bill::{BillStatus, ExpenseType};
    use chrono::NaiveDate;

    fn upload(name: &str) -> AttachmentUpload {
        AttachmentUpload {
            file: SelectedFile::new(name, &b"image"[..]).validate().unwrap(),
            email: "employee@test.tld".to_string(),
        }
    }

    fn record() -> Bill {
        Bill {
            id: None,
            expense_type: Some(ExpenseType::OnlineServices),
            name: "hosting".to_string(),
            date: NaiveDate::from_ymd_opt(2023, 5, 2),
            amount: Some(12.0),
            vat: None,
            pct: 20.0,
            commentary: None,
            file_url: Some("memory://bill-0001/a.png".to_string()),
            file_name: Some("a.png".to_string()),
            status: BillStatus::Pending,
            email: "employee@test.tld".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_then_update() {
        let store = MemoryStore::new();
        let created = store.create(upload("a.png")).await.unwrap();
        assert_eq!(created.key, "bill-0001");
        assert_eq!(created.file_url, "memory://bill-0001/a.png");

        let stored = store.update(Some(&created.key), &record()).await.unwrap();
        assert_eq!(stored.id.as_deref(), Some("bill-0001"));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_unknown_selector() {
        let store = MemoryStore::new();
        let err = store.update(Some("nope"), &record()).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound("nope".to_string()));
    }

    #[tokio::test]
    async fn test_update_without_selector_files_new_bill() {
        let store = MemoryStore::new();
        let stored = store.update(None, &record()).await.unwrap();
        assert_eq!(stored.id.as_deref(), Some("bill-0001"));
        assert_eq!(store.bills(), vec![stored]);
        assert_eq!(store.updates()[0].0, None);
    }

    #[tokio::test]
    async fn test_queued_failure_applies_once() {
        let store = MemoryStore::new();
        store.fail_next_list(StoreError::Status(500));
        assert_eq!(store.list().await.unwrap_err().to_string(), "Erreur 500");
        assert!(store.list().await.unwrap().is_empty());
    }
}
