//! billed-core: bill types, attachment validation, session and the page components

pub mod attachment;
pub mod bill;
pub mod bills;
pub mod error;
pub mod new_bill;
pub mod routes;
pub mod session;
pub mod store;

pub use attachment::{ALLOWED_EXTENSIONS, INVALID_EXTENSION_MESSAGE, SelectedFile, UploadedFile};
pub use bill::{Bill, BillStatus, ExpenseType};
pub use bills::{Bills, BillsView};
pub use error::{FormError, SessionError, StoreError};
pub use new_bill::{FileSelection, FormFields, FormState, FormSubmission, NewBill, SubmitEvent};
pub use session::{Session, User, UserType};
pub use store::{AttachmentUpload, BillStore, CreatedBill, MemoryStore};
