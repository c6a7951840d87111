pub mod report;

pub use report::ReportHandler;
