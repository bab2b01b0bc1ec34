pub mod datetime_input;
pub mod popup;
pub mod text_input;
