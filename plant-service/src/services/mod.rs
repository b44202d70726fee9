pub mod database;
pub mod diagnosis;
pub mod metrics;
pub mod providers;

pub use database::PlantDb;
pub use metrics::{get_metrics, init_metrics};
