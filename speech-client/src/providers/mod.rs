//! Speech provider implementations

pub mod google_translate;
pub mod mock;

pub use google_translate::GoogleTranslateProvider;
pub use mock::MockProvider;
