//! Consistency validation and ingestion warnings.

mod axis;
mod validator;
mod warning;

pub use axis::{AxisKey, UnknownLabel};
pub use validator::{ConsistencyValidator, TableShape};
pub use warning::{Evidence, Severity, Warning, WarningKind};
