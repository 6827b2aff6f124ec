pub mod convert;
pub mod history;
pub mod interactive;
pub mod setup;
pub mod stats;
pub mod ui;
