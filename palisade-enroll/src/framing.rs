//! Length-delimited message framing for the CA exchange.
//!
//! Wire format: 2-byte little-endian length prefix followed by exactly that
//! many payload bytes. The 16-bit length field caps a single frame at
//! 65535 bytes, which is a hard protocol ceiling.

use bytes::{Bytes, BytesMut};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Maximum frame payload, imposed by the u16 length field.
pub const MAX_FRAME_SIZE: usize = u16::MAX as usize;

/// Read one frame from an async reader.
///
/// Reads to the exact declared length; if the connection closes first this
/// fails with `UnexpectedEof` rather than returning a truncated payload.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> io::Result<Bytes> {
    let mut len_buf = [0u8; 2];
    reader.read_exact(&mut len_buf).await?;
    let len = u16::from_le_bytes(len_buf) as usize;

    let mut buf = BytesMut::with_capacity(len);
    buf.resize(len, 0);
    reader.read_exact(&mut buf).await?;

    Ok(buf.freeze())
}

/// Write one frame to an async writer and flush it.
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, data: &[u8]) -> io::Result<()> {
    if data.len() > MAX_FRAME_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("frame too large: {} bytes", data.len()),
        ));
    }

    let len = data.len() as u16;
    writer.write_all(&len.to_le_bytes()).await?;
    writer.write_all(data).await?;
    writer.flush().await?;

    Ok(())
}
