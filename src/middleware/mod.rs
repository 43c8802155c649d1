pub mod body;
pub mod panic;
pub mod response;

pub use body::RequestBody;
pub use panic::panic_response;
pub use response::{ApiResponse, ApiResult};
