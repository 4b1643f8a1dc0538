pub mod entities;
pub mod entity;
pub mod events;
pub mod registry;
pub mod repo;
pub mod service;
pub mod store;
