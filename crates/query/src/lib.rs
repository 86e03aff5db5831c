//! GraphQL query text generation.
//!
//! Turns a [`Field`](graphql_fields::Field) tree plus caller-supplied
//! [`QueryArgument`]s into a [`QueryDocument`]: the operation text and its
//! variables map, ready to post as a JSON request envelope.

mod argument;
mod batch;
mod error;
mod serializer;

pub use argument::QueryArgument;
pub use batch::{batch_prefix, merge_batch, slice_batch_data, BatchEntry};
pub use error::{QueryError, Result};
pub use serializer::{check_arguments, render_literal, serialize, QueryDocument};
