pub mod error;
pub mod interpret;
pub mod model;
pub mod page;
pub mod plan;
pub mod preload;
pub mod request;
pub mod resolver;
pub mod response;

pub use error::{BuildError, Result};
pub use interpret::{interpret, interpret_with_preloads, DefaultValueSource, NoComputedDefaults};
pub use model::{ScalarValue, SchemaRegistry, SpecList};
pub use page::PageInfo;
pub use plan::QueryPlan;
pub use request::ListRequest;
