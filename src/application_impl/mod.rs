mod account_service_impl;
mod credential;
mod session_manager_impl;
mod token_codec;

pub use account_service_impl::*;
pub use credential::*;
pub use session_manager_impl::*;
pub use token_codec::*;
