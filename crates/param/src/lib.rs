//! Typed request parameters.
//!
//! This crate holds the leaf layer of the dispatch core: the dynamic [`Value`] every request
//! parameter is carried as, the [`Rule`]s that sanitize, validate and export one semantic type
//! each, and the [`Parameter`] slot a controller declares.
//!
//! # Example
//!
//! ```
//! use micro_param::{Parameter, RuleKind, Source, Value};
//!
//! let mut limit = Parameter::new(RuleKind::Int).with_default(20);
//! limit.set("50", Source::Query).validate().unwrap();
//! assert_eq!(limit.value(), &Value::Int(50));
//!
//! let mut page = Parameter::new(RuleKind::Int).with_default(1);
//! page.set(Value::Null, Source::Default).validate().unwrap();
//! assert_eq!(page.value(), &Value::Int(1));
//! ```

mod error;
mod file;
mod object_id;
mod parameter;
mod source;
mod value;

pub mod rule;

pub use error::RuleError;
pub use file::UploadedFile;
pub use object_id::{ObjectId, ObjectIdError};
pub use parameter::Parameter;
pub use rule::{Rule, RuleKind};
pub use source::Source;
pub use value::{Map, Value};
