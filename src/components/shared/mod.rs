pub mod instruction_footer;
pub mod modal;
