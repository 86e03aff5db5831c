//! Typed GraphQL client.
//!
//! Shapes implementing [`GraphQLObject`](graphql_fields::GraphQLObject) are
//! turned into queries, sent over an [`HttpExecutor`], and read back from the
//! response into the same shapes. Batches merge several queries into one
//! round trip; subscriptions stream typed messages over `graphql-transport-ws`.
//!
//! ```no_run
//! use graphql_fields::{GraphQLObject, Member, ObjectDescriptor, OutputFilter, OperationType};
//! use graphql_typed_client::GraphQLClient;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Hero {
//!     name: String,
//!     height: Option<f64>,
//! }
//!
//! impl GraphQLObject for Hero {
//!     fn descriptor() -> ObjectDescriptor {
//!         ObjectDescriptor::new("Hero")
//!             .member(Member::scalar("name"))
//!             .member(Member::scalar("height"))
//!     }
//! }
//!
//! #[derive(Deserialize)]
//! struct Query {
//!     hero: Hero,
//! }
//!
//! impl GraphQLObject for Query {
//!     fn descriptor() -> ObjectDescriptor {
//!         ObjectDescriptor::new("Query").member(Member::object::<Hero>("hero"))
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GraphQLClient::new("https://api.example.com/graphql");
//!
//! // Only `hero.name` is requested.
//! let filter = OutputFilter::new(["hero.name"], |query: Query| query.hero.name);
//! let response = client
//!     .create_http_request(OperationType::Query, filter)?
//!     .execute()
//!     .await?;
//! println!("{:?}", response.data());
//! # Ok(())
//! # }
//! ```

mod batch;
mod client;
mod error;
mod request;
mod response;
pub mod subscription;
pub mod transport;

pub use batch::{BatchQuery, BatchRequest};
pub use client::GraphQLClient;
pub use error::{ClientError, Result};
pub use graphql_response::{DataError, DynamicResult, Polymorphic};
pub use request::HttpRequest;
pub use response::Response;
pub use subscription::{SubscriptionOperation, SubscriptionRequest, SubscriptionState};
pub use transport::{
    HttpExecutor, HttpTransport, SubscriptionConnection, SubscriptionTransport, TransportError,
    TransportRequest, TransportResponse, WebSocketTransport,
};
