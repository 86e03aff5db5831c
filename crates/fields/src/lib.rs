//! Selection-set model for typed GraphQL clients.
//!
//! Shapes describe themselves through [`GraphQLObject`]; the [`FieldBuilder`]
//! turns a description into an ordered [`Field`] tree that the query
//! serializer renders and the response deserializer reads back.
//!
//! ```
//! use graphql_fields::{FieldBuilder, GraphQLObject, Member, ObjectDescriptor};
//!
//! struct Query;
//!
//! impl GraphQLObject for Query {
//!     fn descriptor() -> ObjectDescriptor {
//!         ObjectDescriptor::new("Query")
//!             .member(Member::scalar("A"))
//!             .member(Member::scalar("B"))
//!     }
//! }
//!
//! let fields = FieldBuilder::build::<Query>().unwrap();
//! assert_eq!(fields.len(), 2);
//! assert_eq!(fields[1].path, "B");
//! ```

mod builder;
mod descriptor;
mod error;
mod field;
mod filter;
mod selection;

pub use builder::{FieldBuilder, FieldCache};
pub use descriptor::{
    GraphQLObject, Member, MemberKind, ObjectDescriptor, PossibleType, TypeRef,
};
pub use error::{BuildError, Result};
pub use field::{
    join_path, walk_fields, BaseType, Field, FieldArgument, FieldDirective, OperationType,
    PossibleTypeSelection, TYPENAME_FIELD,
};
pub use filter::{prune, OutputFilter, PathSelection};
pub use selection::{DynamicField, SelectionBuilder};
