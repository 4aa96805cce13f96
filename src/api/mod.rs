pub mod envelope;
pub mod params;

pub use envelope::{notify, notify_error, notify_no_resource, ApiResponse, ApiResult, Page};
pub use params::RequestParams;
