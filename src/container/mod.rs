//! Binary container for sealed chunks.
//!
//! A container is a bare concatenation of records, with no magic, header,
//! footer or checksum. End of container is end of stream.
//!
//! ```text
//! record    := chunkID(int32 BE) nonceLen(uint8) nonce cipherLen(int32 BE) ciphertext
//! container := record*
//! ```
//!
//! The writer expects records in ascending id order; the reader returns them
//! in disk order and leaves reordering to the caller.

mod deserializer;
mod serializer;

pub use deserializer::Deserializer;
pub use serializer::{Serializer, encode_record};

use crate::config::{CIPHER_LEN_FIELD_SIZE, ID_FIELD_SIZE, NONCE_LEN_FIELD_SIZE};

/// Bytes of framing around every record's nonce and ciphertext.
pub const RECORD_OVERHEAD: usize = ID_FIELD_SIZE + NONCE_LEN_FIELD_SIZE + CIPHER_LEN_FIELD_SIZE;
