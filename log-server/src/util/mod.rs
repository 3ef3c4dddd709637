//! Small shared helpers.

pub mod correlation;

pub use correlation::{correlation_id, short_id, ID_ALPHABET, SHORT_ID_LEN};
