pub mod db;
pub mod uploads;

pub use db::DbAdapter;
pub use uploads::LocalFotoStore;
