//! Translation engines.

pub mod factory;
pub mod gpt;
pub mod libre;
pub mod marian;
pub mod translator;
