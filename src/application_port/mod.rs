mod account_service;
mod session_manager;

pub use account_service::*;
pub use session_manager::*;
