pub mod login;
pub mod logout;
pub mod session;

pub use login::handle_login;
pub use logout::handle_logout;
pub use session::handle_current_session;
