//! Attribute-driven symbolization of vector map features.
//!
//! A symbol spec maps feature attribute values to graphics property values
//! (colors, line widths, marker sizes). The pipeline is:
//!
//! 1. [`compile_symbol_spec`] turns flat [`RuleTuple`]s into a [`SymbolSpec`]
//! 2. [`extract_attributes`] reads the referenced attributes from a
//!    [`FeatureCollection`]
//! 3. [`evaluate_rules`] applies defaults and rules in order, producing a
//!    [`PropertyTable`]
//! 4. [`PropertyTable::properties_for`] lists the set properties of a feature
//!
//! [`symbolize`] runs steps 2 and 3 after checking geometry.

pub mod attributes;
pub mod compile;
pub mod config;
pub mod evaluate;
pub mod rule;
pub mod value;

pub use attributes::{
    extract_attributes, AttributeArray, AttributeClass, AttributeData, AttributeInfo,
    AttributeTable, Feature, FeatureCollection, INDEX_ATTRIBUTE,
};
pub use compile::{compile_symbol_spec, PropertySpec, RuleTuple, SymbolSpec};
pub use config::SymbolSpecConfig;
pub use evaluate::{evaluate_rules, symbolize, PropertyTable};
pub use rule::{RuleKind, RuleSpec};
pub use value::{PropertyValue, RuleInput};
