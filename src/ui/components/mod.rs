pub mod notice_popup;
pub mod spinner;
pub mod stepper;
pub mod text_field;
pub mod toast;
