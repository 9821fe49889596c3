pub mod collocation;
pub mod error;

#[cfg(test)]
pub mod test_support;
