pub mod error;
pub mod helpers;
pub mod input_dialog;
pub mod palette;
