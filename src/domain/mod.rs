// Domain layer - Periods, resources, entities and the dashboard view model
pub mod dashboard;
pub mod entity;
pub mod error;
pub mod freshness;
pub mod period;
pub mod resource;
