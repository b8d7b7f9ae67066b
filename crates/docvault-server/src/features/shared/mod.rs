//! Utilities shared across feature slices

pub mod validation;

#[cfg(test)]
pub mod test_helpers;
