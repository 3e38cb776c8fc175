pub mod api;
pub mod data;
pub mod logger;
pub mod mailer;
pub mod pages;
pub mod report;
pub mod settings;
pub mod squash;

// Re-export common items
pub use data::DataLoader;
pub use logger::RunLogger;
pub use mailer::EmailReporter;
pub use report::{flatten, load_report, summarize};
pub use settings::Settings;
pub use squash::SquashClient;
