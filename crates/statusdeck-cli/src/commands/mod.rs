pub mod seed;
pub mod serve;

pub use seed::SeedCommand;
pub use serve::ServeCommand;
