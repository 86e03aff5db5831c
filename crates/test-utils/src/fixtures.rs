//! A small Star Wars schema and shapes that select from it.
//!
//! ```graphql
//! interface Character { name: String! }
//! type Human implements Character { name: String! height: Float }
//! type Droid implements Character { name: String! primaryFunction: String }
//! type Review { stars: Int! commentary: String }
//! enum Episode { NEWHOPE EMPIRE JEDI }
//!
//! type Query {
//!   hero(episode: Episode): Character
//!   greeting(name: String!): String @deprecated(reason: "Use hero")
//! }
//! type Mutation { createReview(episode: Episode, stars: Int!): Review }
//! type Subscription { reviewAdded(episode: Episode): Review }
//! ```

use graphql_fields::{FieldArgument, GraphQLObject, Member, ObjectDescriptor};
use serde::Deserialize;
use serde_json::{json, Value};

fn named(kind: &str, name: &str) -> Value {
    json!({"kind": kind, "name": name, "ofType": null})
}

fn non_null(inner: Value) -> Value {
    json!({"kind": "NON_NULL", "name": null, "ofType": inner})
}

fn field(name: &str, args: Value, type_ref: Value) -> Value {
    json!({"name": name, "args": args, "type": type_ref, "isDeprecated": false})
}

fn argument(name: &str, type_ref: Value) -> Value {
    json!({"name": name, "type": type_ref, "defaultValue": null})
}

/// The introspection result envelope for the sample schema.
#[must_use]
pub fn introspection_response() -> Value {
    let episode_arg = || json!([argument("episode", named("ENUM", "Episode"))]);
    let name_field = || field("name", json!([]), non_null(named("SCALAR", "String")));

    json!({
        "data": {
            "__schema": {
                "queryType": {"name": "Query"},
                "mutationType": {"name": "Mutation"},
                "subscriptionType": {"name": "Subscription"},
                "types": [
                    {"kind": "OBJECT", "name": "Query", "interfaces": [], "fields": [
                        field("hero", episode_arg(), named("INTERFACE", "Character")),
                        {
                            "name": "greeting",
                            "args": [argument("name", non_null(named("SCALAR", "String")))],
                            "type": named("SCALAR", "String"),
                            "isDeprecated": true,
                            "deprecationReason": "Use hero"
                        }
                    ]},
                    {"kind": "OBJECT", "name": "Mutation", "interfaces": [], "fields": [
                        field(
                            "createReview",
                            json!([
                                argument("episode", named("ENUM", "Episode")),
                                argument("stars", non_null(named("SCALAR", "Int")))
                            ]),
                            named("OBJECT", "Review")
                        )
                    ]},
                    {"kind": "OBJECT", "name": "Subscription", "interfaces": [], "fields": [
                        field("reviewAdded", episode_arg(), named("OBJECT", "Review"))
                    ]},
                    {"kind": "INTERFACE", "name": "Character", "interfaces": [], "fields": [
                        name_field()
                    ], "possibleTypes": [{"name": "Human"}, {"name": "Droid"}]},
                    {"kind": "OBJECT", "name": "Human", "interfaces": [{"name": "Character"}], "fields": [
                        name_field(),
                        field("height", json!([]), named("SCALAR", "Float"))
                    ]},
                    {"kind": "OBJECT", "name": "Droid", "interfaces": [{"name": "Character"}], "fields": [
                        name_field(),
                        field("primaryFunction", json!([]), named("SCALAR", "String"))
                    ]},
                    {"kind": "OBJECT", "name": "Review", "interfaces": [], "fields": [
                        field("stars", json!([]), non_null(named("SCALAR", "Int"))),
                        field("commentary", json!([]), named("SCALAR", "String"))
                    ]},
                    {"kind": "ENUM", "name": "Episode", "enumValues": [
                        {"name": "NEWHOPE", "isDeprecated": false},
                        {"name": "EMPIRE", "isDeprecated": false},
                        {"name": "JEDI", "isDeprecated": false}
                    ]},
                    {"kind": "SCALAR", "name": "String"},
                    {"kind": "SCALAR", "name": "Int"},
                    {"kind": "SCALAR", "name": "Float"},
                    {"kind": "SCALAR", "name": "Boolean"}
                ],
                "directives": []
            }
        }
    })
}

/// [`introspection_response`] as a response body.
#[must_use]
pub fn introspection_body() -> String {
    introspection_response().to_string()
}

/// Abstract `Character` selection.
pub struct Character;

impl GraphQLObject for Character {
    fn descriptor() -> ObjectDescriptor {
        ObjectDescriptor::new("Character")
            .abstract_type()
            .member(Member::scalar("name"))
    }
}

pub struct Human;

impl GraphQLObject for Human {
    fn descriptor() -> ObjectDescriptor {
        ObjectDescriptor::new("Human")
            .extends::<Character>()
            .member(Member::scalar("height"))
    }
}

pub struct Droid;

impl GraphQLObject for Droid {
    fn descriptor() -> ObjectDescriptor {
        ObjectDescriptor::new("Droid")
            .extends::<Character>()
            .member(Member::scalar("primaryFunction"))
    }
}

/// A `Character`, dispatched on `__typename`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "__typename")]
pub enum Hero {
    Human {
        name: String,
        height: Option<f64>,
    },
    Droid {
        name: String,
        #[serde(rename = "primaryFunction")]
        primary_function: Option<String>,
    },
}

impl Hero {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Human { name, .. } | Self::Droid { name, .. } => name,
        }
    }
}

/// `query($episode:Episode){hero(episode:$episode){...}}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HeroQuery {
    pub hero: Option<Hero>,
}

impl GraphQLObject for HeroQuery {
    fn descriptor() -> ObjectDescriptor {
        ObjectDescriptor::new("Query").member(
            Member::object::<Character>("hero")
                .argument(FieldArgument::new("episode", "Episode", "episode"))
                .possible_type::<Human>("Human")
                .possible_type::<Droid>("Droid"),
        )
    }
}

/// Selects the deprecated `greeting` field with a required argument.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GreetingQuery {
    pub greeting: Option<String>,
}

impl GraphQLObject for GreetingQuery {
    fn descriptor() -> ObjectDescriptor {
        ObjectDescriptor::new("Query").member(
            Member::scalar("greeting")
                .argument(FieldArgument::new("name", "String!", "name").required()),
        )
    }
}

/// Selects a field the schema does not have.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InvalidQuery {
    pub villain: Option<String>,
}

impl GraphQLObject for InvalidQuery {
    fn descriptor() -> ObjectDescriptor {
        ObjectDescriptor::new("Query").member(Member::scalar("villain"))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Review {
    pub stars: i64,
    pub commentary: Option<String>,
}

impl GraphQLObject for Review {
    fn descriptor() -> ObjectDescriptor {
        ObjectDescriptor::new("Review")
            .member(Member::scalar("stars"))
            .member(Member::scalar("commentary"))
    }
}

/// `mutation($episode:Episode,$stars:Int!){createReview(...){stars commentary}}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateReview {
    #[serde(rename = "createReview")]
    pub create_review: Option<Review>,
}

impl GraphQLObject for CreateReview {
    fn descriptor() -> ObjectDescriptor {
        ObjectDescriptor::new("Mutation").member(
            Member::object::<Review>("createReview")
                .argument(FieldArgument::new("episode", "Episode", "episode"))
                .argument(FieldArgument::new("stars", "Int!", "stars").required()),
        )
    }
}

/// `subscription($episode:Episode){reviewAdded(episode:$episode){stars commentary}}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReviewAdded {
    #[serde(rename = "reviewAdded")]
    pub review_added: Review,
}

impl GraphQLObject for ReviewAdded {
    fn descriptor() -> ObjectDescriptor {
        ObjectDescriptor::new("Subscription").member(
            Member::object::<Review>("reviewAdded")
                .argument(FieldArgument::new("episode", "Episode", "episode")),
        )
    }
}
