pub mod domain;
pub use self::domain::{Product, ProductId};

pub(crate) mod repository;
pub use self::repository::Seed;

pub(crate) mod routes;
