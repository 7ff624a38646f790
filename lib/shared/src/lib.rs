pub mod catalog;
pub mod history;
pub mod report;
