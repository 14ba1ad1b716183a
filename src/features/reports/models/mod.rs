mod report;

pub use report::{CreateReport, Report, ReportDetails, ReportStatus};
