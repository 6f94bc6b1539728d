use super::error::NatNetError;
use super::layout;

/// Sequential cursor over one datagram payload.
///
/// Every read consumes exactly the number of bytes its format specifies and
/// advances the cursor; a read that would pass the end of the payload fails
/// with `TooShort` and leaves the cursor untouched. Multi-byte fields are in
/// sender-host native byte order.
pub struct NatNetReader<'a> {
    payload: &'a [u8],
    offset: usize,
}

impl<'a> NatNetReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload, offset: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.payload.len() - self.offset
    }

    pub fn require_len(&self, needed: usize) -> Result<(), NatNetError> {
        if self.remaining() < needed {
            return Err(NatNetError::TooShort {
                needed,
                actual: self.remaining(),
            });
        }
        Ok(())
    }

    fn take(&mut self, width: usize) -> Result<&'a [u8], NatNetError> {
        self.require_len(width)?;
        let bytes = &self.payload[self.offset..self.offset + width];
        self.offset += width;
        Ok(bytes)
    }

    pub fn read_u16(&mut self) -> Result<u16, NatNetError> {
        let bytes = self.take(2)?;
        Ok(u16::from_ne_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_i32(&mut self) -> Result<i32, NatNetError> {
        let bytes = self.take(4)?;
        Ok(i32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, NatNetError> {
        let bytes = self.take(4)?;
        Ok(u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_f32(&mut self) -> Result<f32, NatNetError> {
        let bytes = self.take(4)?;
        Ok(f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_u8_quad(&mut self) -> Result<[u8; 4], NatNetError> {
        let bytes = self.take(4)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Read a count prefix for a list whose elements occupy at least
    /// `min_elem_len` bytes each. Negative or implausibly large counts are
    /// rejected as `TooShort` before any allocation happens.
    pub fn read_count(&mut self, min_elem_len: usize) -> Result<usize, NatNetError> {
        let actual = self.remaining();
        let count = usize::try_from(self.read_i32()?).unwrap_or(usize::MAX);
        let needed = count.saturating_mul(min_elem_len);
        if needed > self.remaining() {
            return Err(NatNetError::TooShort { needed, actual });
        }
        Ok(count)
    }

    /// Read a fixed-size name block, truncated at the first NUL. The full
    /// block is always consumed.
    pub fn read_name_block(&mut self) -> Result<String, NatNetError> {
        let bytes = self.take(layout::MAX_NAME_LEN)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    /// Read a variable-length NUL-terminated string bounded by `max_len`.
    ///
    /// Consumes the string plus its terminator. A missing terminator within
    /// the bound is tolerated (observed server behavior): the full bound is
    /// taken as the string. A payload that ends before the bound without a
    /// terminator is truncated.
    pub fn read_cstring(&mut self, max_len: usize) -> Result<String, NatNetError> {
        let window = &self.payload[self.offset..];
        let bound = max_len.min(window.len());
        match window[..bound].iter().position(|&b| b == 0) {
            Some(nul) => {
                let bytes = self.take(nul + 1)?;
                Ok(String::from_utf8_lossy(&bytes[..nul]).into_owned())
            }
            None if window.len() >= max_len => {
                let bytes = self.take(max_len)?;
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
            None => Err(NatNetError::TooShort {
                needed: max_len,
                actual: self.remaining(),
            }),
        }
    }
}
