pub mod apply;
pub mod jobs;
pub mod show;
