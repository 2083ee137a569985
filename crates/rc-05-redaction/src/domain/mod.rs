//! Domain layer for redaction governance

pub mod error;
pub mod operation;
pub mod policy;
pub mod proof;
pub mod request;

pub use error::*;
pub use operation::*;
pub use policy::*;
pub use proof::*;
pub use request::*;
