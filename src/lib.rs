pub mod evaluator;
pub mod filter;
pub mod query;
pub mod record;
pub mod saved;
