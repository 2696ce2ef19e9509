pub mod manager;
pub mod model;
pub mod password;
pub mod permissions;
pub mod store;
pub mod validate;

pub use manager::UserManager;
pub use model::{NewUser, User};
pub use permissions::has_permission;
pub use store::{MemoryUserStore, PgUserStore, UserStore};
