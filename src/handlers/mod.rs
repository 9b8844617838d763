mod docs;
mod health;
mod records;

pub use docs::{openapi_document, swagger, swagger_index};
pub use health::health_check;
pub use records::{send_record, send_record_list, welcome};
