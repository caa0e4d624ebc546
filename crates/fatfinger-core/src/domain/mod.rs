//! # Domain Models
//!
//! Typed records flowing through candidate generation. Raw provider output is
//! parsed into these types at the adapter boundary; nothing downstream sees
//! untyped rows.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Ticker`] | Validated, uppercased exchange symbol |
//! | [`Security`] | Ticker plus issuer/security name |
//! | [`Universe`] | Ticker-keyed snapshot of all securities |
//! | [`Bar`] / [`BarSeries`] | OHLCV history used for activity checks |
//! | [`Match`] | Edit-distance hit against a target |
//! | [`TypoCandidatePair`] | Final pipeline output record |
//! | [`IpoListing`] | Priced IPO from an IPO calendar |

mod candidate;
mod interval;
mod models;
mod security;
mod ticker;
mod timestamp;

pub use candidate::{parse_listing_date, IpoListing, IpoTypoCandidate, Match, TypoCandidatePair};
pub use interval::Interval;
pub use models::{Bar, BarSeries};
pub use security::{Security, Universe};
pub use ticker::Ticker;
pub use timestamp::UtcDateTime;
