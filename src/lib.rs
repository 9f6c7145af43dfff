//! Field Definition Registry
//!
//! Maintains JSON fields-files: named field definitions that drive scaffold
//! and form generators.
//!
//! ## Features
//!
//! - **Normalization**: Positional names, data-types and html-types become canonical field records
//! - **Pluggable Profiles**: A named transformer expands raw input with derived attributes
//! - **Duplicate-safe Merging**: New fields are appended, existing names are never overwritten
//! - **Safe Writes**: Exclusive lock around read-merge-write, temp file + rename on write
//!
//! ## Layout
//!
//! ```text
//! resources/field-definitions/
//! ├── users.json
//! ├── users.json.lock
//! └── posts.json
//! ```
//!
//! Each fields-file is a pretty-printed JSON array:
//!
//! ```text
//! [
//!   {
//!     "name": "email",
//!     "data-type": "string",
//!     "html-type": "email",
//!     "is-nullable": false,
//!     "is-on-form": true,
//!     "is-on-index": true,
//!     "is-on-show": true,
//!     "label": "Email"
//!   }
//! ]
//! ```

pub mod config;
pub mod error;
pub mod field;
pub mod merge;
pub mod normalize;
pub mod store;
pub mod transform;

pub use config::{DuplicatePolicy, FieldsConfig};
pub use error::{FieldsError, Result};
pub use field::{FieldProperties, FieldRecord};
pub use merge::{merge, DuplicateField, MergeOutcome, Registry};
pub use normalize::{normalize, split_positional, RawFieldInput};
pub use store::{AppendOutcome, RegistryLock, RegistryStore, WriteOptions};
pub use transform::{transformer_for, FieldTransformer, GenericTransformer, GENERIC_PROFILE};
