use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::Path,
};

use tracing::debug;

use crate::TextBufferBuilder;
use crate::buffer::TextBuffer;

const READ_SIZE: usize = 64 * 1024;

pub fn load_from_path<P: AsRef<Path>>(path: P) -> io::Result<TextBuffer> {
    let path = path.as_ref();
    let mut builder = TextBufferBuilder::new();
    let mut chunks = 0;
    read_chunks(File::open(path)?, |chunk| {
        chunks += 1;
        builder.accept_chunk(chunk);
    })?;

    let buffer = builder.finish();
    debug!(
        path = %path.display(),
        chunks,
        len = buffer.get_length(),
        lines = buffer.get_line_count(),
        "loaded text buffer"
    );
    Ok(buffer)
}

pub fn read_chunks_from_path<P: AsRef<Path>>(path: P) -> io::Result<Vec<String>> {
    let mut out = Vec::new();
    read_chunks(File::open(path)?, |chunk| out.push(chunk.to_string()))?;
    Ok(out)
}

/// Streams `source` as UTF-8 text in blocks of up to 64 KiB. A code point cut
/// by a read boundary is carried over to the next block; invalid bytes become
/// U+FFFD.
pub fn read_chunks<R: Read>(source: R, mut on_chunk: impl FnMut(&str)) -> io::Result<()> {
    let mut reader = BufReader::new(source);
    let mut buf = vec![0u8; READ_SIZE];
    let mut carry: Vec<u8> = Vec::new();

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }

        carry.extend_from_slice(&buf[..n]);
        let text = decode_prefix(&mut carry);
        if !text.is_empty() {
            on_chunk(&text);
        }
    }

    // Whatever is left is a truncated sequence at end of input.
    if !carry.is_empty() {
        on_chunk(&String::from_utf8_lossy(&carry));
    }
    Ok(())
}

/// Removes and decodes the longest prefix of `bytes` that does not end in an
/// incomplete code point.
fn decode_prefix(bytes: &mut Vec<u8>) -> String {
    let mut text = String::with_capacity(bytes.len());
    let mut consumed = 0;
    loop {
        match std::str::from_utf8(&bytes[consumed..]) {
            Ok(valid) => {
                text.push_str(valid);
                consumed = bytes.len();
                break;
            }
            Err(e) => {
                let valid_end = consumed + e.valid_up_to();
                text.push_str(&String::from_utf8_lossy(&bytes[consumed..valid_end]));
                match e.error_len() {
                    Some(len) => {
                        text.push(char::REPLACEMENT_CHARACTER);
                        consumed = valid_end + len;
                    }
                    None => {
                        consumed = valid_end;
                        break;
                    }
                }
            }
        }
    }
    bytes.drain(..consumed);
    text
}
