//! Entity to model mappers
//!
//! Conversions from database rows to domain objects. Rows whose text
//! columns fall outside the domain's closed sets convert with `TryFrom`.

mod comment;
mod like;
mod member;
mod notification;

pub use comment::profile_from_join;
