//! Naming convention engine.
//!
//! [`transform`] holds the text transforms, [`renamers`] the per-kind
//! conventions and [`protocol`] the rule that applies a convention safely
//! across the whole program.

pub mod protocol;
pub mod renamers;
pub mod transform;

pub use protocol::{FieldNames, LocalVariables, MethodNames, NamingRule, PropertyNames};
pub use renamers::{
    Declaration, FieldRenamer, LocalVariableRenamer, MethodRenamer, PropertyRenamer, Renamer,
};
pub use transform::{
    CONSTANT_PREFIX, MARKER_PREFIX, SEPARATOR, SERIALIZED_FIELD_ATTRIBUTE, SHORT_PREFIXES,
    TRAILING_MARKER, capitalize, to_identifier_style,
};
