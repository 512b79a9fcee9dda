//! Fixed-endian primitive and length-prefixed string codecs.
//!
//! All integers are little-endian and unsigned; `f32` is IEEE-754 LE. Strings
//! are encoded as a u32 LE byte-length prefix followed by UTF-8 bytes — the
//! length is a byte count, not a code-point count. Every decoder returns the
//! value plus the number of bytes consumed and fails with `CorruptRecord` on
//! a short read.

use std::io::{Read, Write};

use crate::core::error::{Error, Result};

pub fn encode_u8(v: u8) -> [u8; 1] {
    [v]
}

pub fn decode_u8(buf: &[u8]) -> Result<(u8, usize)> {
    if buf.is_empty() {
        return Err(Error::corrupt("short read decoding u8"));
    }
    Ok((buf[0], 1))
}

pub fn encode_u32(v: u32) -> [u8; 4] {
    v.to_le_bytes()
}

pub fn decode_u32(buf: &[u8]) -> Result<(u32, usize)> {
    if buf.len() < 4 {
        return Err(Error::corrupt("short read decoding u32"));
    }
    let mut arr = [0u8; 4];
    arr.copy_from_slice(&buf[..4]);
    Ok((u32::from_le_bytes(arr), 4))
}

pub fn encode_u64(v: u64) -> [u8; 8] {
    v.to_le_bytes()
}

pub fn decode_u64(buf: &[u8]) -> Result<(u64, usize)> {
    if buf.len() < 8 {
        return Err(Error::corrupt("short read decoding u64"));
    }
    let mut arr = [0u8; 8];
    arr.copy_from_slice(&buf[..8]);
    Ok((u64::from_le_bytes(arr), 8))
}

pub fn encode_f32(v: f32) -> [u8; 4] {
    v.to_le_bytes()
}

pub fn decode_f32(buf: &[u8]) -> Result<(f32, usize)> {
    if buf.len() < 4 {
        return Err(Error::corrupt("short read decoding f32"));
    }
    let mut arr = [0u8; 4];
    arr.copy_from_slice(&buf[..4]);
    Ok((f32::from_le_bytes(arr), 4))
}

pub fn encode_str(s: &str) -> Vec<u8> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(4 + bytes.len());
    out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(bytes);
    out
}

pub fn decode_str(buf: &[u8]) -> Result<(String, usize)> {
    let (len, _) = decode_u32(buf)?;
    let len = len as usize;
    let body = buf
        .get(4..4 + len)
        .ok_or_else(|| Error::corrupt("short read decoding str body"))?;
    let s = std::str::from_utf8(body)
        .map_err(|e| Error::corrupt(format!("invalid utf-8 in str: {e}")))?
        .to_string();
    Ok((s, 4 + len))
}

// Stream-oriented helpers for sequential file I/O. These wrap the slice
// codecs above around `read_exact`/`write_all`.

pub fn write_u8<W: Write>(w: &mut W, v: u8) -> Result<()> {
    w.write_all(&encode_u8(v))?;
    Ok(())
}

pub fn write_u32<W: Write>(w: &mut W, v: u32) -> Result<()> {
    w.write_all(&encode_u32(v))?;
    Ok(())
}

pub fn write_u64<W: Write>(w: &mut W, v: u64) -> Result<()> {
    w.write_all(&encode_u64(v))?;
    Ok(())
}

pub fn write_f32<W: Write>(w: &mut W, v: f32) -> Result<()> {
    w.write_all(&encode_f32(v))?;
    Ok(())
}

pub fn write_str<W: Write>(w: &mut W, s: &str) -> Result<()> {
    w.write_all(&encode_str(s))?;
    Ok(())
}

pub fn read_u8<R: Read>(r: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf).map_err(|_| Error::corrupt("short read of u8"))?;
    Ok(buf[0])
}

pub fn read_u32<R: Read>(r: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf).map_err(|_| Error::corrupt("short read of u32"))?;
    Ok(u32::from_le_bytes(buf))
}

pub fn read_u64<R: Read>(r: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf).map_err(|_| Error::corrupt("short read of u64"))?;
    Ok(u64::from_le_bytes(buf))
}

pub fn read_f32<R: Read>(r: &mut R) -> Result<f32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf).map_err(|_| Error::corrupt("short read of f32"))?;
    Ok(f32::from_le_bytes(buf))
}

pub fn read_str<R: Read>(r: &mut R) -> Result<String> {
    let len = read_u32(r)? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf).map_err(|_| Error::corrupt("short read of str body"))?;
    String::from_utf8(buf).map_err(|e| Error::corrupt(format!("invalid utf-8 in str: {e}")))
}
