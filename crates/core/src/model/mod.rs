pub mod registry;
pub mod schema;
pub mod spec;
pub mod value;

pub use registry::SchemaRegistry;
pub use schema::{AssociationEdge, Cardinality, FieldDef, FieldType, SchemaDescriptor};
pub use spec::{
    CompareOp, DefaultValue, FilterSpec, OperatorSpec, SortDirection, SortSpec, SpecList,
};
pub use value::ScalarValue;
