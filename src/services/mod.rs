mod delivery;
mod request;

pub use delivery::DeliveryReportLoop;
pub use request::RequestService;
