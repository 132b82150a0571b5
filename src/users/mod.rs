pub mod password;
pub mod repo;
mod repo_types;

pub use repo::{MemoryUserStore, PgUserStore, UserStore};
pub use repo_types::User;
