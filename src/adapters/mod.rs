// Adapters layer: concrete cache service backends.

pub mod memory_cache;
