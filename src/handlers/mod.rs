pub mod common;
pub mod health;
pub mod po_uploads;
