//! Canonical field names referenced by the built-in set clauses.
//!
//! The clause factory predicates over this fixed vocabulary; storage
//! schemas that want the built-in clauses to apply expose these fields.

/// Record visibility: "visibility"
pub const VISIBILITY: &str = "visibility";
/// Activation timestamp: "validFrom"
pub const VALID_FROM: &str = "validFrom";
/// Expiry timestamp: "validUntil"
pub const VALID_UNTIL: &str = "validUntil";
/// Creation timestamp: "createdAt"
pub const CREATED_AT: &str = "createdAt";
/// Owning user ids: "ownerUsers"
pub const OWNER_USERS: &str = "ownerUsers";
/// Owning group ids: "ownerGroups"
pub const OWNER_GROUPS: &str = "ownerGroups";
/// Denormalized owner-user count: "ownerUsersCount"
pub const OWNER_USERS_COUNT: &str = "ownerUsersCount";
/// Denormalized owner-group count: "ownerGroupsCount"
pub const OWNER_GROUPS_COUNT: &str = "ownerGroupsCount";
/// Record kind discriminator: "kind"
pub const KIND: &str = "kind";

/// Well-known values of the `visibility` field.
pub mod visibility {
    /// Readable by anyone: "public"
    pub const PUBLIC: &str = "public";
    /// Readable by owners only: "private"
    pub const PRIVATE: &str = "private";
    /// Readable by authenticated users: "protected"
    pub const PROTECTED: &str = "protected";
}

/// Operator names of the predicate dialect.
pub mod ops {
    /// Equality: "eq"
    pub const EQ: &str = "eq";
    /// Inequality: "neq"
    pub const NEQ: &str = "neq";
    /// Greater than: "gt"
    pub const GT: &str = "gt";
    /// Greater than or equal: "gte"
    pub const GTE: &str = "gte";
    /// Less than: "lt"
    pub const LT: &str = "lt";
    /// Less than or equal: "lte"
    pub const LTE: &str = "lte";
    /// Inclusive range over a two-element list: "between"
    pub const BETWEEN: &str = "between";
    /// Membership in a list: "inq"
    pub const INQ: &str = "inq";
    /// Absence from a list: "nin"
    pub const NIN: &str = "nin";
    /// Pattern match: "like"
    pub const LIKE: &str = "like";
}
