//! µ-law/PCM16 companding per ITU-T G.711.

mod g711;

pub use g711::{decode, decode_sample, encode, encode_sample};
