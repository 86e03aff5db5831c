//! Typed fallback for polymorphic fields.

use serde::Deserialize;

/// A polymorphic object read as one of the known possible types, or as the
/// base shape when the server reports a `__typename` with no matching
/// variant in `K`.
///
/// `K` is normally an enum tagged by `__typename`. Objects that do not fit
/// `K` for any other reason also land in `Base`.
///
/// ```
/// use graphql_response::Polymorphic;
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Debug, Deserialize, PartialEq)]
/// #[serde(tag = "__typename")]
/// enum Pet {
///     Cat { name: String },
/// }
///
/// #[derive(Debug, Deserialize, PartialEq)]
/// struct AnyPet {
///     #[serde(rename = "__typename")]
///     typename: String,
///     name: String,
/// }
///
/// let bird: Polymorphic<Pet, AnyPet> =
///     serde_json::from_value(json!({"__typename": "Bird", "name": "Tweety"})).unwrap();
/// assert_eq!(bird.base().map(|pet| pet.typename.as_str()), Some("Bird"));
/// assert!(bird.known().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Polymorphic<K, B> {
    Known(K),
    Base(B),
}

impl<K, B> Polymorphic<K, B> {
    #[must_use]
    pub const fn known(&self) -> Option<&K> {
        match self {
            Self::Known(known) => Some(known),
            Self::Base(_) => None,
        }
    }

    #[must_use]
    pub const fn base(&self) -> Option<&B> {
        match self {
            Self::Known(_) => None,
            Self::Base(base) => Some(base),
        }
    }

    #[must_use]
    pub const fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}
