pub mod appointment;
pub mod enums;
pub mod filters;
pub mod goal;
pub mod patient;
pub mod payment;
pub mod service;
pub mod user;
pub mod visit;

pub use appointment::*;
pub use filters::*;
pub use goal::*;
pub use patient::*;
pub use payment::*;
pub use service::*;
pub use user::*;
pub use visit::*;

/// Storage format for timestamps (`start_time`, `paid_at`, ...).
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Storage format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
