use super::error::Pn532Error;

pub struct Pn532Reader<'a> {
    bytes: &'a [u8],
}

impl<'a> Pn532Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, Pn532Error> {
        self.bytes
            .get(offset)
            .copied()
            .ok_or(Pn532Error::TooShort {
                needed: offset + 1,
                actual: self.bytes.len(),
            })
    }

    pub fn read_slice(&self, range: std::ops::Range<usize>) -> Result<&'a [u8], Pn532Error> {
        self.bytes.get(range.clone()).ok_or(Pn532Error::TooShort {
            needed: range.end,
            actual: self.bytes.len(),
        })
    }

    /// Everything from `offset` on; empty when `offset` is at the end.
    pub fn rest(&self, offset: usize) -> Result<&'a [u8], Pn532Error> {
        self.read_slice(offset..self.bytes.len().max(offset))
    }
}
