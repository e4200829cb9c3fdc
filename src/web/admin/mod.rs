mod auth;
mod password;

pub use auth::admin_login;
pub use password::change_admin_password;
