//! Reading configuration text from byte streams.
//!
//! `encoding_rs_io` sniffs a byte order mark and transcodes UTF-16 input to UTF-8; input
//! without a BOM is taken as UTF-8 and validated once fully read.

use encoding_rs_io::DecodeReaderBytesBuilder;
use std::io::{self, Read};

const CHUNK: usize = 8 * 1024;

/// Read the whole stream as text, failing once more than `max_bytes` decoded bytes arrive.
pub(crate) fn read_to_string<R: Read>(reader: R, max_bytes: Option<usize>) -> io::Result<String> {
    let mut decoder = DecodeReaderBytesBuilder::new()
        .encoding(None) // sniff BOM, UTF-8 otherwise
        .strip_bom(true)
        .build(reader);

    let mut bytes = Vec::new();
    let mut tmp = vec![0u8; CHUNK];
    loop {
        let n = match decoder.read(&mut tmp) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if let Some(limit) = max_bytes {
            if bytes.len().saturating_add(n) > limit {
                return Err(io::Error::new(
                    io::ErrorKind::FileTooLarge,
                    format!("input size limit of {limit} bytes exceeded"),
                ));
            }
        }
        bytes.extend_from_slice(&tmp[..n]);
    }
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
