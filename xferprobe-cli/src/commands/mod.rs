mod all;
mod checksum;
mod diagnose;
mod harness;
mod layout;
mod logs;
mod report;

pub use all::AllCommand;
pub use checksum::ChecksumCommand;
pub use diagnose::DiagnoseCommand;
pub use harness::HarnessCommand;
pub use layout::LayoutCommand;
pub use logs::LogsCommand;
pub use report::ReportCommands;
