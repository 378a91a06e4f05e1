pub mod types;

pub use types::{HitSource, Resolution, SpamCheckRequest, SpamHit, Verdict};
