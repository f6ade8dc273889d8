//! Bill record types shared by the listing and the New Bill form

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// An expense report submitted by an employee for reimbursement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    /// Server identifier, set once the store acknowledged creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Expense category; `None` when the form value matched no label
    #[serde(rename = "type", default, deserialize_with = "lenient_expense_type")]
    pub expense_type: Option<ExpenseType>,
    /// Human-readable label
    pub name: String,
    /// Date of the expense (YYYY-MM-DD)
    #[serde(default, deserialize_with = "lenient_date")]
    pub date: Option<NaiveDate>,
    /// Amount including VAT, in euros
    #[serde(default)]
    pub amount: Option<f64>,
    /// VAT amount, when the receipt shows one
    #[serde(default)]
    pub vat: Option<f64>,
    /// VAT percent
    pub pct: f64,
    #[serde(default)]
    pub commentary: Option<String>,
    /// Attachment URL returned by the upload
    #[serde(default)]
    pub file_url: Option<String>,
    /// Original attachment file name
    #[serde(default)]
    pub file_name: Option<String>,
    pub status: BillStatus,
    /// Owner email
    pub email: String,
}

/// Expense categories offered by the New Bill form
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ExpenseType {
    #[serde(rename = "Transports")]
    Transports,
    #[serde(rename = "Restaurants et bars")]
    RestaurantsAndBars,
    #[serde(rename = "Hôtel et logement")]
    HotelAndLodging,
    #[serde(rename = "Services en ligne")]
    OnlineServices,
    #[serde(rename = "IT et électronique")]
    ItAndElectronics,
    #[serde(rename = "Equipement et matériel")]
    Equipment,
    #[serde(rename = "Fournitures de bureau")]
    OfficeSupplies,
}

impl ExpenseType {
    pub const ALL: [ExpenseType; 7] = [
        ExpenseType::Transports,
        ExpenseType::RestaurantsAndBars,
        ExpenseType::HotelAndLodging,
        ExpenseType::OnlineServices,
        ExpenseType::ItAndElectronics,
        ExpenseType::Equipment,
        ExpenseType::OfficeSupplies,
    ];

    /// Label shown in the form's select and stored on the wire
    pub fn label(&self) -> &'static str {
        match self {
            ExpenseType::Transports => "Transports",
            ExpenseType::RestaurantsAndBars => "Restaurants et bars",
            ExpenseType::HotelAndLodging => "Hôtel et logement",
            ExpenseType::OnlineServices => "Services en ligne",
            ExpenseType::ItAndElectronics => "IT et électronique",
            ExpenseType::Equipment => "Equipement et matériel",
            ExpenseType::OfficeSupplies => "Fournitures de bureau",
        }
    }

    /// Parse a select value. Matches labels exactly, ignoring surrounding whitespace.
    pub fn from_label(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|t| t.label() == value)
    }
}

/// Review state of a bill
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    #[default]
    Pending,
    Accepted,
    Refused,
}

impl BillStatus {
    /// Label shown in the listing
    pub fn label(&self) -> &'static str {
        match self {
            BillStatus::Pending => "En attente",
            BillStatus::Accepted => "Accepté",
            BillStatus::Refused => "Refused",
        }
    }
}

impl Bill {
    /// Returns true once an attachment has been uploaded for this bill
    pub fn has_attachment(&self) -> bool {
        self.file_url.is_some()
    }
}

/// Unknown labels read as `None` instead of failing the whole record.
fn lenient_expense_type<'de, D>(deserializer: D) -> Result<Option<ExpenseType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(ExpenseType::from_label))
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok()))
}

/// Anti-chronological order: latest bill first, undated bills last.
pub fn sort_latest_first(bills: &mut [Bill]) {
    bills.sort_by(|a, b| b.date.cmp(&a.date));
}
