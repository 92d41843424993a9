//! Type-erased argument values and the typed accessor handed to handlers.
//!
//! Type readers produce [`ArgValue`]s (tagged, reference-counted `Any`
//! payloads). After a successful parse the dispatcher bundles one value per
//! parameter into an [`Args`] and hands it to the handler, which recovers
//! concrete types with [`Args::get`] / [`Args::many`].

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use anyhow::{bail, Result};

/// Tag identifying a parameter's declared value type.
///
/// This is the key of the type-reader registry: readers are registered and
/// resolved by tag, never by runtime reflection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    /// Tag for a concrete Rust type.
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Short display name (last path segment of the full type name).
    pub fn name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A converted argument value, shared and type-erased.
#[derive(Clone)]
pub struct ArgValue {
    inner: Arc<dyn Any + Send + Sync>,
}

impl ArgValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }

    /// Borrow the payload as `T`, or `None` on a type mismatch.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }
}

impl fmt::Debug for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ArgValue(..)")
    }
}

/// Ordered, named argument values for one invocation.
///
/// One slot per declared parameter. A slot is `None` when an optional
/// parameter had neither input nor a default. A variadic tail parameter's
/// slot holds a `Vec<ArgValue>` retrieved with [`Args::many`].
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: Vec<(String, Option<ArgValue>)>,
    remaining: String,
}

impl Args {
    pub(crate) fn new(values: Vec<(String, Option<ArgValue>)>) -> Self {
        Self {
            values,
            remaining: String::new(),
        }
    }

    pub(crate) fn with_remaining(mut self, remaining: &str) -> Self {
        self.remaining = remaining.to_string();
        self
    }

    /// Input left over after every parameter was filled. Non-empty only when
    /// the configuration ignores extra arguments instead of rejecting them.
    pub fn remaining(&self) -> &str {
        &self.remaining
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Typed access by position. Errors name the parameter so the message is
    /// actionable when a handler and its registration record disagree.
    pub fn get<T: Any>(&self, index: usize) -> Result<&T> {
        let (name, slot) = match self.values.get(index) {
            Some(entry) => entry,
            None => bail!("no parameter at position {index}"),
        };
        let value = match slot {
            Some(value) => value,
            None => bail!("parameter {name:?} has no value"),
        };
        match value.downcast_ref::<T>() {
            Some(v) => Ok(v),
            None => bail!(
                "parameter {name:?} is not a {}",
                TypeTag::of::<T>().name()
            ),
        }
    }

    /// Typed access by position for optional parameters; `None` when the
    /// parameter was omitted and carried no default.
    pub fn get_opt<T: Any>(&self, index: usize) -> Option<&T> {
        self.values
            .get(index)?
            .1
            .as_ref()
            .and_then(|v| v.downcast_ref::<T>())
    }

    /// Typed access by parameter name.
    pub fn get_named<T: Any>(&self, name: &str) -> Result<&T> {
        match self.values.iter().position(|(n, _)| n == name) {
            Some(index) => self.get(index),
            None => bail!("no parameter named {name:?}"),
        }
    }

    /// The collected values of a variadic tail parameter.
    pub fn many<T: Any>(&self, index: usize) -> Result<Vec<&T>> {
        let items = self.get::<Vec<ArgValue>>(index)?;
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match item.downcast_ref::<T>() {
                Some(v) => out.push(v),
                None => bail!(
                    "variadic element {i} is not a {}",
                    TypeTag::of::<T>().name()
                ),
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tag_short_name() {
        assert_eq!(TypeTag::of::<String>().name(), "String");
        assert_eq!(TypeTag::of::<i64>().name(), "i64");
    }

    #[test]
    fn test_arg_value_downcast() {
        let v = ArgValue::new(42i64);
        assert_eq!(v.downcast_ref::<i64>(), Some(&42));
        assert!(v.downcast_ref::<String>().is_none());
        assert!(v.is::<i64>());
    }

    #[test]
    fn test_args_typed_access() {
        let args = Args::new(vec![
            ("x".into(), Some(ArgValue::new(2i64))),
            ("label".into(), Some(ArgValue::new(String::from("hi")))),
            ("opt".into(), None),
        ]);
        assert_eq!(*args.get::<i64>(0).expect("x"), 2);
        assert_eq!(args.get::<String>(1).expect("label"), "hi");
        assert_eq!(*args.get_named::<i64>("x").expect("named"), 2);
        assert!(args.get::<i64>(2).is_err());
        assert!(args.get_opt::<i64>(2).is_none());
        assert!(args.get::<String>(0).is_err());
    }

    #[test]
    fn test_args_variadic_access() {
        let items = vec![ArgValue::new(1i64), ArgValue::new(2i64)];
        let args = Args::new(vec![("rest".into(), Some(ArgValue::new(items)))]);
        let rest = args.many::<i64>(0).expect("variadic");
        assert_eq!(rest, vec![&1, &2]);
        assert!(args.many::<String>(0).is_err());
    }
}
