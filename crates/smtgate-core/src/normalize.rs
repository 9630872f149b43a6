//! Result normalizer
//!
//! Turns an engine model into portable entries, one per declaration, in the
//! engine's enumeration order. Every value decodes to something: whatever
//! has no portable shape is emitted as the engine's own rendering.

use crate::engine::{Decoded, EngineModel, EngineValue};
use crate::types::{ModelEntry, ModelValue};

/// Fractional digits kept when a rational becomes a float
pub const DECIMAL_PRECISION: u32 = 10;

/// Normalize every declaration of `model`
pub fn normalize(model: &EngineModel) -> Vec<ModelEntry> {
    model
        .iter()
        .map(|decl| ModelEntry::new(decl.name.clone(), normalize_value(&decl.value)))
        .collect()
}

/// Normalize a single engine value
pub fn normalize_value(value: &EngineValue) -> ModelValue {
    match value.decode() {
        Decoded::Integer(n) => ModelValue::Int(n),
        Decoded::Boolean(b) => ModelValue::Bool(b),
        Decoded::Rational(r) => ModelValue::Float(r.to_decimal(DECIMAL_PRECISION)),
        Decoded::String(s) => ModelValue::String(s),
        Decoded::Other => ModelValue::Opaque(value.to_string()),
    }
}
