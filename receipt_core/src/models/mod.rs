pub mod field;
pub mod receipt;
pub mod request;

pub use field::{FieldAccess, FieldValue};
pub use receipt::{LineItem, Receipt, SEARCHABLE_FIELDS, UPDATABLE_FIELDS};
pub use request::{
    AggregateRequest, ApiResponse, CreateReceiptRequest, SearchRequest, SortRequest,
};
