pub mod dashboard;
pub mod users;

pub use dashboard::{handle_dashboard, handle_login_page};
pub use users::{handle_create_user, handle_list_users};
