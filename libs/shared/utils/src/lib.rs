pub mod authz;
pub mod extractor;
pub mod jwt;
pub mod validation;

pub mod test_utils;
