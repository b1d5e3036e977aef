//! Generic entity model
//!
//! [`EntityModel`] is the table-agnostic CRUD and validation surface. Concrete
//! entities only contribute a [`TableSchema`](crate::schema::TableSchema).

pub mod core;
pub mod crud;
pub mod validate;


pub use self::core::EntityModel;
