pub mod request;
pub mod response;

pub use request::{Request, RequestKind};
pub use response::Response;
