// PO upload workflow
pub mod po_uploads;

// Collaborators consulted by the workflow
pub mod catalog;
pub mod partners;
pub mod sequences;
