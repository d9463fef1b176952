//! `allyflow-text`: turning externally generated text into structured values.
//!
//! - [`sanitize`]: fence/prose/quote cleanup and the strict-then-lenient
//!   structured payload extractor.
//! - [`dates`]: the natural-language date-range resolver.
//! - [`names`]: school names mentioned in free text.
//!
//! Everything here is pure: no IO, no clocks (callers pass reference dates).

pub mod dates;
pub mod names;
pub mod sanitize;

pub use dates::{DateRangeError, PatternFamily, detect, resolve, resolve_first};
pub use names::school_name;
pub use sanitize::{ExtractError, extract, extract_value, sanitize, strip_fences};
