pub mod manager;

pub use manager::AlertManager;
