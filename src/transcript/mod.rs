//! Transcript classification.
//!
//! STT backends reliably emit fixed junk phrases when fed silence or noise;
//! the filter here rejects those before normalization sees them.

mod filter;

pub use filter::{classify, RejectReason, Verdict};
