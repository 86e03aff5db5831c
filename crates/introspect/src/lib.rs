//! GraphQL introspection schema model and offline validation.
//!
//! The schema is fetched once with [`INTROSPECTION_QUERY`] over whatever
//! transport the caller uses, parsed with [`parse_introspection`], and then
//! used to check selections with [`validate`] without further network access.
//!
//! ```
//! use graphql_fields::{Field, OperationType};
//! use graphql_introspect::{parse_introspection, validate};
//!
//! let schema = parse_introspection(
//!     r#"{"data":{"__schema":{"queryType":{"name":"Query"},"types":[
//!         {"kind":"OBJECT","name":"Query","fields":[
//!             {"name":"hello","args":[],"type":{"kind":"SCALAR","name":"String"},"isDeprecated":false}
//!         ]}
//!     ]}}}"#,
//! )
//! .unwrap();
//!
//! let errors = validate(&[Field::leaf("goodbye", None)], &schema, OperationType::Query);
//! assert_eq!(errors[0].code(), "FIELD_NOT_FOUND");
//! ```

mod error;
mod query;
mod types;
mod validator;

pub use error::{IntrospectionError, Result};
pub use query::{introspection_request, parse_introspection, INTROSPECTION_QUERY};
pub use types::*;
pub use validator::{validate, ValidationError};
