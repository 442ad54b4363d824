pub mod app_user;
pub mod department;
pub mod dependent;
pub mod employee;
pub mod project;
pub mod report;
pub mod session;
pub mod works_on;

// Re-export models for easier access
pub use app_user::*;
pub use department::*;
pub use dependent::*;
pub use employee::*;
pub use project::*;
pub use report::*;
pub use session::*;
pub use works_on::*;
