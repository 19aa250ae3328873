pub mod account;
pub mod json_error;
pub mod jwt;
pub mod login;
pub mod role;
pub mod server_config;
pub mod session;

pub use self::account::{AccountError, AccountSummary, NewAccount};
pub use self::json_error::{Acknowledgement, ApiSuccess, ErrorResponse};
pub use self::jwt::SessionClaims;
pub use self::login::{LoginData, LoginPayload, LoginUser};
pub use self::role::{Role, UnknownRole};
pub use self::session::SessionInfo;
