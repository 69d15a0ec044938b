pub mod errors;
pub mod model;
pub mod params;
pub mod pipeline;
pub mod query;
pub mod resource;

pub use errors::*;
pub use model::*;
pub use params::QueryParams;
pub use pipeline::{compose, QueryPipeline};
pub use query::*;
pub use resource::{Resource, ResourceSpec};
