pub mod camera_control;
pub mod logger;
