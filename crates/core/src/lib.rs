pub mod codec;
pub mod collection;
pub mod error;
pub mod records;

pub use codec::{decode, encode, RecordSchema, Substitution};
pub use collection::RecordCollection;
pub use error::CoreError;
pub use records::{BaseRecord, OverrideField, OverrideRecord};
