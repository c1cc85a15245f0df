// Owned by the PO upload workflow
pub mod po_upload;
pub mod po_upload_line;

// Collaborator tables the workflow reads from or writes to
pub mod partner;
pub mod product_template;
pub mod product_variant;
pub mod sales_order;
pub mod sales_order_line;
pub mod sequence;
