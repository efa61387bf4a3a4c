use super::error::Iso14230Error;

pub struct Iso14230Reader<'a> {
    bytes: &'a [u8],
}

impl<'a> Iso14230Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), Iso14230Error> {
        if self.bytes.len() < needed {
            return Err(Iso14230Error::TooShort {
                needed,
                actual: self.bytes.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, Iso14230Error> {
        self.bytes
            .get(offset)
            .copied()
            .ok_or(Iso14230Error::TooShort {
                needed: offset + 1,
                actual: self.bytes.len(),
            })
    }

    pub fn read_slice(&self, range: std::ops::Range<usize>) -> Result<&'a [u8], Iso14230Error> {
        self.bytes.get(range.clone()).ok_or(Iso14230Error::TooShort {
            needed: range.end,
            actual: self.bytes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Iso14230Reader;
    use crate::protocols::iso14230::error::Iso14230Error;

    #[test]
    fn read_past_end_reports_needed_len() {
        let reader = Iso14230Reader::new(&[0x81, 0x10]);
        assert_eq!(reader.read_u8(1).unwrap(), 0x10);
        assert_eq!(
            reader.read_u8(2).unwrap_err(),
            Iso14230Error::TooShort {
                needed: 3,
                actual: 2
            }
        );
        assert!(reader.read_slice(1..4).is_err());
    }
}
