//! Static type descriptions consumed by the field builder.
//!
//! Every shape that can be queried implements [`GraphQLObject`] and returns an
//! [`ObjectDescriptor`]: the ordered list of its members plus the per-member
//! configuration (wire name, arguments, directives, possible types, max depth).
//!
//! ```
//! use graphql_fields::{FieldArgument, GraphQLObject, Member, ObjectDescriptor};
//!
//! struct Hero;
//!
//! impl GraphQLObject for Hero {
//!     fn descriptor() -> ObjectDescriptor {
//!         ObjectDescriptor::new("Character")
//!             .member(Member::scalar("name"))
//!             .member(Member::list_of::<Hero>("friends").max_depth(1))
//!     }
//! }
//!
//! struct Query;
//!
//! impl GraphQLObject for Query {
//!     fn descriptor() -> ObjectDescriptor {
//!         ObjectDescriptor::new("Query").member(
//!             Member::object::<Hero>("hero")
//!                 .argument(FieldArgument::new("episode", "Episode", "episode")),
//!         )
//!     }
//! }
//! ```

use crate::field::{FieldArgument, FieldDirective};

/// A shape with a static GraphQL description.
pub trait GraphQLObject {
    fn descriptor() -> ObjectDescriptor;
}

/// A lazily described reference to a [`GraphQLObject`].
///
/// Identity is the Rust type, so two references to the same type compare
/// equal no matter how they were created.
#[derive(Debug, Clone, Copy)]
pub struct TypeRef {
    id: &'static str,
    describe: fn() -> ObjectDescriptor,
}

impl TypeRef {
    #[must_use]
    pub fn of<T: GraphQLObject>() -> Self {
        Self {
            id: std::any::type_name::<T>(),
            describe: T::descriptor,
        }
    }

    /// Rust type name used as identity for cycle detection and caching.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        self.id
    }

    #[must_use]
    pub fn describe(&self) -> ObjectDescriptor {
        (self.describe)()
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeRef {}

/// Description of one object, interface or union shape.
#[derive(Debug, Clone)]
pub struct ObjectDescriptor {
    /// GraphQL type name.
    pub name: String,
    /// Shape whose members are inherited ahead of this shape's own.
    pub base: Option<TypeRef>,
    pub members: Vec<Member>,
    /// Concrete shapes selectable by discriminator wherever this shape is used.
    pub possible_types: Vec<PossibleType>,
    pub is_abstract: bool,
}

impl ObjectDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: None,
            members: Vec::new(),
            possible_types: Vec::new(),
            is_abstract: false,
        }
    }

    /// Inherits the members of `T`.
    #[must_use]
    pub fn extends<T: GraphQLObject>(mut self) -> Self {
        self.base = Some(TypeRef::of::<T>());
        self
    }

    #[must_use]
    pub fn member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    /// Marks the shape as an interface or union.
    #[must_use]
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Registers a concrete shape for a discriminator value. Implies
    /// [`abstract_type`](Self::abstract_type).
    #[must_use]
    pub fn possible_type<T: GraphQLObject>(mut self, discriminator: impl Into<String>) -> Self {
        self.possible_types.push(PossibleType::new::<T>(discriminator));
        self.is_abstract = true;
        self
    }
}

/// The value shape of a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberKind {
    Scalar,
    Object(TypeRef),
    List(Box<MemberKind>),
}

impl MemberKind {
    /// The object type after unwrapping lists, if any.
    #[must_use]
    pub fn object_type(&self) -> Option<&TypeRef> {
        match self {
            Self::Scalar => None,
            Self::Object(type_ref) => Some(type_ref),
            Self::List(inner) => inner.object_type(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PossibleType {
    pub discriminator: String,
    pub type_ref: TypeRef,
}

impl PossibleType {
    #[must_use]
    pub fn new<T: GraphQLObject>(discriminator: impl Into<String>) -> Self {
        Self {
            discriminator: discriminator.into(),
            type_ref: TypeRef::of::<T>(),
        }
    }
}

/// Per-member configuration.
#[derive(Debug, Clone)]
pub struct Member {
    /// Member name; the response key and path segment for this member.
    pub name: String,
    /// Wire name override.
    pub field_name: Option<String>,
    pub kind: MemberKind,
    pub arguments: Vec<FieldArgument>,
    pub directives: Vec<FieldDirective>,
    pub possible_types: Vec<PossibleType>,
    pub max_depth: Option<u32>,
    pub ignore: bool,
}

impl Member {
    fn with_kind(name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            name: name.into(),
            field_name: None,
            kind,
            arguments: Vec::new(),
            directives: Vec::new(),
            possible_types: Vec::new(),
            max_depth: None,
            ignore: false,
        }
    }

    /// A scalar, enum, or list-of-scalar member.
    #[must_use]
    pub fn scalar(name: impl Into<String>) -> Self {
        Self::with_kind(name, MemberKind::Scalar)
    }

    #[must_use]
    pub fn object<T: GraphQLObject>(name: impl Into<String>) -> Self {
        Self::with_kind(name, MemberKind::Object(TypeRef::of::<T>()))
    }

    #[must_use]
    pub fn list_of<T: GraphQLObject>(name: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            MemberKind::List(Box::new(MemberKind::Object(TypeRef::of::<T>()))),
        )
    }

    /// Requests a different wire field; the member name becomes the alias.
    #[must_use]
    pub fn field_name(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = Some(field_name.into());
        self
    }

    #[must_use]
    pub fn argument(mut self, argument: FieldArgument) -> Self {
        self.arguments.push(argument);
        self
    }

    #[must_use]
    pub fn directive(mut self, directive: FieldDirective) -> Self {
        self.directives.push(directive);
        self
    }

    #[must_use]
    pub fn possible_type<T: GraphQLObject>(mut self, discriminator: impl Into<String>) -> Self {
        self.possible_types.push(PossibleType::new::<T>(discriminator));
        self
    }

    /// Bounds recursion below this member to `depth` levels.
    #[must_use]
    pub fn max_depth(mut self, depth: u32) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Excludes the member from the selection set.
    #[must_use]
    pub fn ignore(mut self) -> Self {
        self.ignore = true;
        self
    }

    /// The wire field name.
    #[must_use]
    pub fn wire_name(&self) -> &str {
        self.field_name.as_deref().unwrap_or(&self.name)
    }
}
