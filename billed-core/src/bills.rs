//! Bills listing page: fetch, order and hand over to the New Bill form.

use std::sync::Arc;
use tracing::{error, info};

use crate::bill::{Bill, sort_latest_first};
use crate::routes;
use crate::store::BillStore;

#[derive(Debug, Clone, PartialEq)]
pub enum BillsView {
    Loading,
    /// Store message, e.g. `Erreur 404`
    Error(String),
    /// Latest first
    Loaded(Vec<Bill>),
}

pub struct Bills {
    store: Arc<dyn BillStore>,
    on_navigate: Box<dyn FnMut(&str) + Send>,
    view: BillsView,
}

impl Bills {
    pub fn new(store: Arc<dyn BillStore>, on_navigate: impl FnMut(&str) + Send + 'static) -> Self {
        Self {
            store,
            on_navigate: Box::new(on_navigate),
            view: BillsView::Loading,
        }
    }

    pub fn view(&self) -> &BillsView {
        &self.view
    }

    /// Fetch the bills and switch the view to the result
    pub async fn load(&mut self) -> &BillsView {
        self.view = match self.store.list().await {
            Ok(mut bills) => {
                sort_latest_first(&mut bills);
                info!(count = bills.len(), "bills loaded");
                BillsView::Loaded(bills)
            }
            Err(e) => {
                error!(error = %e, "listing bills failed");
                BillsView::Error(e.to_string())
            }
        };
        &self.view
    }

    /// "Nouvelle note de frais"
    pub fn handle_click_new_bill(&mut self) {
        (self.on_navigate)(routes::NEW_BILL);
    }

    /// Attachment URL to show in the preview modal
    pub fn handle_click_icon_eye<'a>(&self, bill: &'a Bill) -> Option<&'a str> {
        bill.file_url.as_deref()
    }
}
