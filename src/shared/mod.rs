pub mod constants;
pub mod object_key;

#[cfg(test)]
pub mod test_helpers;
