pub mod errors;
pub mod openrouter;

pub use errors::ProviderError;
pub use openrouter::OpenRouterProvider;
