use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use tracing::debug;

use crate::error::Result;

/// Decoder for an abstract type `T` (usually `dyn Trait`).
///
/// Receives every remaining input byte and returns the decoded value together
/// with the bytes it did not consume.
pub type DecodeFn<T> = dyn for<'a> Fn(&'a [u8]) -> Result<(Box<T>, &'a [u8])> + Send + Sync;

struct Entry {
    type_name: &'static str,
    // Always an `Arc<DecodeFn<T>>` for the `T` this entry is keyed by.
    decoder: Box<dyn Any + Send + Sync>,
}

/// Abstract-type keyed table of caller-supplied decoders.
///
/// Consulted only when decoding; encoding always goes through the concrete
/// value.
#[derive(Default)]
pub struct DecoderRegistry {
    decoders: HashMap<TypeId, Entry>,
}

impl DecoderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace the decoder for abstract type `T`.
    pub fn register<T, F>(&mut self, decoder: F)
    where
        T: ?Sized + 'static,
        F: for<'a> Fn(&'a [u8]) -> Result<(Box<T>, &'a [u8])> + Send + Sync + 'static,
    {
        let decoder: Arc<DecodeFn<T>> = Arc::new(decoder);
        let type_name = type_name::<T>();
        let replaced = self
            .decoders
            .insert(
                TypeId::of::<T>(),
                Entry {
                    type_name,
                    decoder: Box::new(decoder),
                },
            )
            .is_some();
        debug!(type_name, replaced, "registered abstract decoder");
    }

    /// Decoder registered for abstract type `T`, if any.
    pub fn lookup<T: ?Sized + 'static>(&self) -> Option<Arc<DecodeFn<T>>> {
        self.decoders
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.decoder.downcast_ref::<Arc<DecodeFn<T>>>())
            .cloned()
    }

    /// Remove the decoder for `T`; returns whether one was registered.
    pub fn unregister<T: ?Sized + 'static>(&mut self) -> bool {
        let removed = self.decoders.remove(&TypeId::of::<T>()).is_some();
        if removed {
            debug!(type_name = type_name::<T>(), "unregistered abstract decoder");
        }
        removed
    }

    /// Check if a decoder is registered for `T`.
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.decoders.contains_key(&TypeId::of::<T>())
    }

    /// Names of the abstract types with registered decoders, sorted.
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.decoders.values().map(|e| e.type_name).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

impl std::fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}

/// Process-wide registry used by [`crate::deserialize`] and [`crate::from_bytes`].
///
/// Register during start-up, before decode traffic begins. Lookups clone the
/// decoder handle and release the lock before the decoder runs, so decoders
/// may themselves call back into the codec.
pub fn global() -> &'static RwLock<DecoderRegistry> {
    static GLOBAL: OnceLock<RwLock<DecoderRegistry>> = OnceLock::new();
    GLOBAL.get_or_init(|| RwLock::new(DecoderRegistry::new()))
}

/// Install or replace a decoder for abstract type `T` in the global registry.
pub fn register_decoder<T, F>(decoder: F)
where
    T: ?Sized + 'static,
    F: for<'a> Fn(&'a [u8]) -> Result<(Box<T>, &'a [u8])> + Send + Sync + 'static,
{
    global().write().register::<T, F>(decoder);
}
