//! WITSML schema knowledge
//!
//! Plurality, leaf typing and queryable object types, selected explicitly
//! through [`SchemaVariant`].

pub mod objects;
pub mod variant;

pub use objects::ObjectType;
pub use variant::SchemaVariant;
