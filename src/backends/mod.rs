//! Concrete HTTP backends.

mod openai_compatible;

pub use openai_compatible::ProviderClient;
