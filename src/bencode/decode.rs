use super::error::BencodeError;
use super::value::Value;
use bytes::Bytes;
use std::collections::BTreeMap;

/// Containers nested deeper than this are rejected rather than recursed into.
const MAX_DEPTH: usize = 64;

/// Decodes a complete bencoded value.
///
/// The whole input must be consumed; bytes after the outermost value are a
/// [`BencodeError::TrailingData`] error. Byte strings that are not valid
/// UTF-8 are preserved as raw bytes.
pub fn decode(data: &[u8]) -> Result<Value, BencodeError> {
    let (value, used) = decode_prefix(data)?;
    if used != data.len() {
        return Err(BencodeError::TrailingData);
    }
    Ok(value)
}

/// Decodes one value from the front of `data`.
///
/// Returns the value together with the number of bytes consumed, leaving any
/// remainder to the caller. Useful when a bencoded document is embedded in a
/// larger buffer.
pub fn decode_prefix(data: &[u8]) -> Result<(Value, usize), BencodeError> {
    let mut cursor = Cursor { data, pos: 0 };
    let value = cursor.value(0)?;
    Ok((value, cursor.pos))
}

/// Byte-level reader over the input buffer. Errors leave `pos` unspecified;
/// no partial values escape.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Result<u8, BencodeError> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or(BencodeError::UnexpectedEof)
    }

    fn value(&mut self, depth: usize) -> Result<Value, BencodeError> {
        if depth > MAX_DEPTH {
            return Err(BencodeError::NestingTooDeep);
        }

        match self.peek()? {
            b'i' => self.integer(),
            b'l' => self.list(depth),
            b'd' => self.dict(depth),
            b'0'..=b'9' => Ok(Value::Bytes(self.byte_string()?)),
            other => Err(BencodeError::UnexpectedByte(other)),
        }
    }

    fn integer(&mut self) -> Result<Value, BencodeError> {
        self.pos += 1;
        let body = self.take_until(b'e')?;

        let text = std::str::from_utf8(body)
            .map_err(|_| BencodeError::InvalidInteger("not ascii".into()))?;
        if text.is_empty() || text == "-" {
            return Err(BencodeError::InvalidInteger("empty".into()));
        }
        // "i-0e" and zero-padded forms are not canonical and are rejected.
        let digits = text.strip_prefix('-').unwrap_or(text);
        if digits.starts_with('0') && digits.len() > 1 || text.starts_with("-0") {
            return Err(BencodeError::InvalidInteger(text.into()));
        }

        let value: i64 = text
            .parse()
            .map_err(|_| BencodeError::InvalidInteger(text.into()))?;
        Ok(Value::Integer(value))
    }

    fn byte_string(&mut self) -> Result<Bytes, BencodeError> {
        let prefix = self.take_until(b':')?;
        let text = std::str::from_utf8(prefix).map_err(|_| BencodeError::InvalidLength)?;
        let len: usize = text.parse().map_err(|_| BencodeError::InvalidLength)?;

        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(BencodeError::UnexpectedEof)?;
        let bytes = Bytes::copy_from_slice(&self.data[self.pos..end]);
        self.pos = end;
        Ok(bytes)
    }

    fn list(&mut self, depth: usize) -> Result<Value, BencodeError> {
        self.pos += 1;
        let mut items = Vec::new();
        while self.peek()? != b'e' {
            items.push(self.value(depth + 1)?);
        }
        self.pos += 1;
        Ok(Value::List(items))
    }

    fn dict(&mut self, depth: usize) -> Result<Value, BencodeError> {
        self.pos += 1;
        let mut entries = BTreeMap::new();
        while self.peek()? != b'e' {
            if !self.peek()?.is_ascii_digit() {
                return Err(BencodeError::NonStringKey);
            }
            let key = self.byte_string()?;
            let value = self.value(depth + 1)?;
            entries.insert(key, value);
        }
        self.pos += 1;
        Ok(Value::Dict(entries))
    }

    /// Advances past `stop` and returns the bytes before it.
    fn take_until(&mut self, stop: u8) -> Result<&[u8], BencodeError> {
        let start = self.pos;
        while self.peek()? != stop {
            self.pos += 1;
        }
        let body = &self.data[start..self.pos];
        self.pos += 1;
        Ok(body)
    }
}
