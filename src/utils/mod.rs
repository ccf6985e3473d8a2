pub mod address_validator;
pub mod chain_normalizer;
pub mod encoding;
pub mod error_codes;
