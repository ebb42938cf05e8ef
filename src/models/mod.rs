//! Typed views over proxycheck.io response documents
//!
//! Every record is built once from a JSON sub-document by a pure
//! constructor. Absent fields become [`FIELD_IS_NOT_SET`]; values with the
//! wrong shape are reported as [`ModelError`].

pub mod address;
pub mod field;
pub mod result;

pub use address::{
    AddressRecord, AttackHistoryRecord, CurrencyRecord, OperatorPolicyRecord, OperatorRecord,
};
pub use field::{Document, ModelError, ModelResult, FIELD_IS_NOT_SET};
pub use result::{LookupResult, StatusRecord, SuccessRecord};
