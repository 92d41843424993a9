//! Type readers: pluggable token-to-value converters and their registry.
//!
//! A [`TypeReader`] converts one raw token into zero, one, or several ranked
//! candidate values. Readers are registered against a [`TypeTag`] in the
//! [`TypeReaderRegistry`], either globally or scoped to a single module, and
//! are resolved once at command build time -- a missing reader is a fatal
//! registration error, never a parse-time surprise.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tiller_types::{CommandContext, CommandError};

use crate::value::{ArgValue, TypeTag};

/// One ranked conversion candidate.
#[derive(Debug, Clone)]
pub struct ReaderValue {
    /// The converted value.
    pub value: ArgValue,
    /// Relative confidence in `[0.0, 1.0]`; used to pick between candidates
    /// under the `Best` multi-match policy.
    pub score: f32,
}

impl ReaderValue {
    pub fn new<T: Any + Send + Sync>(value: T, score: f32) -> Self {
        Self {
            value: ArgValue::new(value),
            score,
        }
    }
}

/// Converts a raw text token into typed candidate values.
///
/// Returning an empty candidate list is treated as `ObjectNotFound` by the
/// parser; returning several candidates invokes the configured multi-match
/// policy. Readers receive the context so entity-style readers can resolve
/// against it.
#[async_trait]
pub trait TypeReader: Send + Sync {
    async fn read(
        &self,
        ctx: &CommandContext,
        input: &str,
    ) -> Result<Vec<ReaderValue>, CommandError>;
}

/// Factory used to synthesize a reader on first request (enum readers).
pub type ReaderFactory = fn() -> Arc<dyn TypeReader>;

/// `FromStr`-backed reader for primitive types.
pub struct PrimitiveReader<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> PrimitiveReader<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for PrimitiveReader<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> TypeReader for PrimitiveReader<T>
where
    T: FromStr + Any + Send + Sync,
{
    async fn read(
        &self,
        _ctx: &CommandContext,
        input: &str,
    ) -> Result<Vec<ReaderValue>, CommandError> {
        match input.parse::<T>() {
            Ok(value) => Ok(vec![ReaderValue::new(value, 1.0)]),
            Err(_) => Err(CommandError::CastFailed {
                input: input.to_string(),
                target: TypeTag::of::<T>().name().to_string(),
            }),
        }
    }
}

/// Enum-like argument types with a fixed set of named variants.
///
/// Implementing this trait gives the type an automatically synthesized
/// case-insensitive name/ordinal reader the first time a command declares a
/// parameter of the type; the reader is then cached for reuse.
pub trait EnumArg: Any + Clone + Send + Sync + Sized {
    /// Variant names paired with their values, in declaration order. The
    /// position in this slice is the variant's ordinal.
    fn variants() -> &'static [(&'static str, Self)];
}

/// Synthesized reader for [`EnumArg`] types: accepts a variant name
/// (case-insensitive) or its ordinal index.
pub struct EnumReader<T: EnumArg> {
    _marker: PhantomData<fn() -> T>,
}

impl<T: EnumArg> EnumReader<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T: EnumArg> Default for EnumReader<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: EnumArg> TypeReader for EnumReader<T> {
    async fn read(
        &self,
        _ctx: &CommandContext,
        input: &str,
    ) -> Result<Vec<ReaderValue>, CommandError> {
        for (name, value) in T::variants() {
            if name.eq_ignore_ascii_case(input) {
                return Ok(vec![ReaderValue::new(value.clone(), 1.0)]);
            }
        }
        if let Ok(ordinal) = input.parse::<usize>() {
            if let Some((_, value)) = T::variants().get(ordinal) {
                return Ok(vec![ReaderValue::new(value.clone(), 0.9)]);
            }
        }
        Err(CommandError::CastFailed {
            input: input.to_string(),
            target: TypeTag::of::<T>().name().to_string(),
        })
    }
}

/// Reader factory for an [`EnumArg`] type, suitable for deferred synthesis.
pub fn enum_reader<T: EnumArg>() -> Arc<dyn TypeReader> {
    Arc::new(EnumReader::<T>::new())
}

struct RegistryInner {
    global: HashMap<TypeId, Arc<dyn TypeReader>>,
    /// Keyed by (canonical module path, type). Applies only to commands
    /// declared directly in that module; nested modules do not inherit.
    overrides: HashMap<(String, TypeId), Arc<dyn TypeReader>>,
}

/// Registry mapping value types to their readers.
///
/// Built with `FromStr` readers for the primitive types pre-registered.
/// Safe for concurrent use; registration takes a short write lock, resolution
/// a read lock.
pub struct TypeReaderRegistry {
    inner: RwLock<RegistryInner>,
}

macro_rules! register_primitives {
    ($map:expr, $($ty:ty),+ $(,)?) => {
        $(
            $map.insert(
                TypeId::of::<$ty>(),
                Arc::new(PrimitiveReader::<$ty>::new()) as Arc<dyn TypeReader>,
            );
        )+
    };
}

impl TypeReaderRegistry {
    pub fn new() -> Self {
        let mut global: HashMap<TypeId, Arc<dyn TypeReader>> = HashMap::new();
        register_primitives!(
            global, bool, char, i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, usize, isize,
            f32, f64, String,
        );
        Self {
            inner: RwLock::new(RegistryInner {
                global,
                overrides: HashMap::new(),
            }),
        }
    }

    /// Register (or replace) the global reader for `T`. Replacing an existing
    /// reader is legal but logged, since already-built commands keep the
    /// reader they resolved.
    pub fn register<T: Any>(&self, reader: Arc<dyn TypeReader>) {
        let tag = TypeTag::of::<T>();
        let mut inner = self.inner.write().expect("reader registry lock poisoned");
        if inner.global.insert(tag.id(), reader).is_some() {
            tracing::warn!(
                ty = tag.name(),
                "replacing registered type reader; already-built commands keep the old one"
            );
        }
    }

    /// Register a reader for `T` scoped to one module.
    ///
    /// The override applies to commands declared directly in the module named
    /// by `module_path` (its canonical, prefix-joined path). Nested modules
    /// do not inherit it; they must register their own.
    pub fn register_override<T: Any>(&self, module_path: &str, reader: Arc<dyn TypeReader>) {
        let mut inner = self.inner.write().expect("reader registry lock poisoned");
        inner
            .overrides
            .insert((module_path.to_string(), TypeId::of::<T>()), reader);
    }

    /// Resolve the reader for a type in the scope of `module_path`:
    /// module override first, then the global table, then `factory` (cached
    /// globally once invoked). `None` means the type is unresolvable and the
    /// command under construction must be rejected.
    pub fn resolve(
        &self,
        tag: TypeTag,
        module_path: &str,
        factory: Option<ReaderFactory>,
    ) -> Option<Arc<dyn TypeReader>> {
        {
            let inner = self.inner.read().expect("reader registry lock poisoned");
            if let Some(reader) = inner
                .overrides
                .get(&(module_path.to_string(), tag.id()))
            {
                return Some(Arc::clone(reader));
            }
            if let Some(reader) = inner.global.get(&tag.id()) {
                return Some(Arc::clone(reader));
            }
        }
        let factory = factory?;
        let mut inner = self.inner.write().expect("reader registry lock poisoned");
        let reader = inner
            .global
            .entry(tag.id())
            .or_insert_with(factory);
        Some(Arc::clone(reader))
    }
}

impl Default for TypeReaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
