pub mod envelope;
pub mod predicate;
