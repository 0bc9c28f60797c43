use crate::SerialError;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Longest line accepted from the controller. Real tokens are under 20 bytes.
pub const MAX_LINE_LEN: usize = 256;

/// Write `text` followed by `\n` and flush.
pub async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, text: &str) -> Result<(), SerialError> {
    let mut buf = Vec::with_capacity(text.len() + 1);
    buf.extend_from_slice(text.as_bytes());
    buf.push(b'\n');
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one `\n`-terminated line with trailing whitespace removed.
///
/// Returns `SerialError::ConnectionClosed` at EOF. A trailing fragment without
/// a newline at EOF is discarded. Invalid UTF-8 yields `SerialError::Decode`
/// and oversize lines `SerialError::LineTooLong`; both consume the line so the
/// next call starts fresh. At most `MAX_LINE_LEN` bytes are buffered; the rest
/// of an oversize line is skipped as it arrives.
pub async fn read_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<String, SerialError> {
    let mut buf = Vec::new();
    let mut total = 0usize;

    loop {
        let (used, complete) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                return Err(SerialError::ConnectionClosed);
            }
            let (chunk, complete) = match available.iter().position(|&b| b == b'\n') {
                Some(end) => (&available[..=end], true),
                None => (available, false),
            };
            total = total.saturating_add(chunk.len());
            if total <= MAX_LINE_LEN {
                buf.extend_from_slice(chunk);
            } else if !buf.is_empty() {
                buf = Vec::new();
            }
            (chunk.len(), complete)
        };
        reader.consume(used);
        if complete {
            break;
        }
    }

    if total > MAX_LINE_LEN {
        return Err(SerialError::LineTooLong(total));
    }

    let text = String::from_utf8(buf).map_err(|e| SerialError::Decode(e.to_string()))?;
    Ok(text.trim_end().to_string())
}
