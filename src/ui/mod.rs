pub mod main_frame;
pub mod session_ui;
