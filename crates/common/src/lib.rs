pub mod context;
pub mod endpoint;
pub mod operations;
pub mod response;
pub mod templates;

pub use context::RequestContext;
pub use endpoint::{resolve, EndpointError, Environment, Method, Operation, Params, Region};
pub use response::{normalize, Outcome, RawResponse, Response, TransportError};
pub use templates::{RenderError, Template};
