//! Playlist module: domain, store abstraction (SeaORM and in-memory) and the service.

pub mod context;
pub mod domain;
pub mod errors;
pub mod repo;
pub mod repository;
pub mod service;

pub use context::{CancelHandle, RequestContext};
pub use errors::PlaylistError;
pub use service::{PlaylistService, PlaylistServiceImpl};
