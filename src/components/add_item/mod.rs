pub mod dialog;
pub mod form;

pub use dialog::AddItemDialog;
