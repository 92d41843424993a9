//! Descriptor for one declared command parameter.

use std::sync::Arc;

use crate::reader::TypeReader;
use crate::value::{ArgValue, TypeTag};

/// Shape of one parameter: name, declared type, resolved reader, and the
/// optional / remainder / variadic flags.
///
/// Invariant (enforced at build time): at most one of remainder/variadic is
/// set, and only on the last parameter.
pub struct ParameterInfo {
    name: String,
    tag: TypeTag,
    reader: Arc<dyn TypeReader>,
    optional: bool,
    remainder: bool,
    variadic: bool,
    default: Option<ArgValue>,
}

impl ParameterInfo {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: String,
        tag: TypeTag,
        reader: Arc<dyn TypeReader>,
        optional: bool,
        remainder: bool,
        variadic: bool,
        default: Option<ArgValue>,
    ) -> Self {
        Self {
            name,
            tag,
            reader,
            optional,
            remainder,
            variadic,
            default,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag of the declared value type (element type for variadic parameters).
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    pub(crate) fn reader(&self) -> &Arc<dyn TypeReader> {
        &self.reader
    }

    /// Whether the parameter may be omitted from the input.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Whether the parameter consumes the rest of the input verbatim.
    pub fn is_remainder(&self) -> bool {
        self.remainder
    }

    /// Whether the parameter collects remaining tokens into a sequence.
    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    /// Value used when an optional parameter is omitted.
    pub fn default_value(&self) -> Option<&ArgValue> {
        self.default.as_ref()
    }
}

impl std::fmt::Debug for ParameterInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterInfo")
            .field("name", &self.name)
            .field("type", &self.tag.name())
            .field("optional", &self.optional)
            .field("remainder", &self.remainder)
            .field("variadic", &self.variadic)
            .finish()
    }
}
