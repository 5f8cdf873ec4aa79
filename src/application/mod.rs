// Application layer - Use cases over the snapshot store
pub mod dashboard_loader;
pub mod recently_played_service;
pub mod resource_locator;
pub mod snapshot_repository;
