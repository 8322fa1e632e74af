pub mod alert;
pub mod config;
pub mod debug_recorder;
pub mod matcher;
pub mod monitor;
pub mod ocr;
pub mod screen_capture;
