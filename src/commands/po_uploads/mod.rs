mod add_po_upload_line_command;
mod cancel_po_upload_command;
mod confirm_po_upload_command;
mod create_po_upload_command;
mod delete_po_upload_command;
mod remove_po_upload_line_command;
mod update_po_upload_line_command;
mod validate_po_upload_command;

pub use add_po_upload_line_command::{AddPoUploadLineCommand, PoUploadLineInput};
pub use cancel_po_upload_command::{CancelPoUploadCommand, CancelPoUploadResult};
pub use confirm_po_upload_command::{
    ConfirmPoUploadCommand, ConfirmationSummary, QuotationSummary,
};
pub use create_po_upload_command::CreatePoUploadCommand;
pub use delete_po_upload_command::DeletePoUploadCommand;
pub use remove_po_upload_line_command::RemovePoUploadLineCommand;
pub use update_po_upload_line_command::UpdatePoUploadLineCommand;
pub use validate_po_upload_command::{ValidatePoUploadCommand, ValidationReport};

pub(crate) use add_po_upload_line_command::insert_line;
