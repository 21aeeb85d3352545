// Adapters layer: concrete implementations for external systems (snapshot sources, storage formats).

pub mod firebase;
pub mod source;
