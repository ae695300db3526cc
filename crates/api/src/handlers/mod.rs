pub mod pages;
pub mod report;
pub mod wizard;
