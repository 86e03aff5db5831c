//! GraphQL response decoding.
//!
//! A response envelope is split into `data`, `errors` and any other top-level
//! keys. The data is read against the [`Field`](graphql_fields::Field) tree it
//! was requested with, dispatching polymorphic objects by `__typename`.

mod deserializer;
mod dynamic;
mod error;
mod polymorphic;
mod result;

pub use deserializer::{
    deserialize, deserialize_value, normalize_data, parse_envelope, parse_response,
};
pub use dynamic::DynamicResult;
pub use error::{ResponseError, Result};
pub use polymorphic::Polymorphic;
pub use result::{DataError, ErrorLocation, GraphQLDataResult};
