//! JSON class-model adapter: reads the document emitted by an external source-model provider.

pub mod adapter;

pub use adapter::JsonModelSource;
