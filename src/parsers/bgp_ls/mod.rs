/*!
BGP-LS (RFC 7752) table parsing.

- `raw`: wire-shaped structs for the table returned by the BGP speaker.
- `attribute`: the fixed table of opaque type URLs and their semantic names.
- `normalize`: turns raw paths into `NormalizedRecord`s.
*/

pub mod attribute;
pub mod normalize;
pub mod raw;

pub use normalize::{MalformedRecordError, Normalizer, PathSelection};
