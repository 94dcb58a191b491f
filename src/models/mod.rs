pub mod comparison;
pub mod decimal;
pub mod document;
pub mod item;

pub use comparison::{
    ComparisonResult, DocumentComparison, Issue, IssueType, IssueValue, Matches,
    PriceComparisonDetail,
};
pub use document::{Contract, InvoiceData};
pub use item::{ContractItem, InvoiceItem, LineItem};
