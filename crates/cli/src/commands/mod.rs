mod plan;
mod query;

pub use plan::PlanCommand;
pub use query::QueryCommand;
