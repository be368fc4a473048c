pub mod types;

pub mod organizations;
pub mod members;
pub mod services;
pub mod incidents;
pub mod incident_updates;

pub mod prelude;
