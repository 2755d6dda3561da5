pub mod notification;
pub mod photo;
pub mod report;
