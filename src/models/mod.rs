mod api;
mod record;

pub use api::{DeliveryStatsResponse, HealthResponse};
pub use record::Record;
