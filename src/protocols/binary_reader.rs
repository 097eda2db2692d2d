use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};
use thiserror::Error;

/// Borrowing little-endian reader over Anchor/Borsh style layouts.
pub struct BinaryReader<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            buffer: data,
            offset: 0,
        }
    }

    /// Reader positioned after a discriminator of `skip` bytes.
    pub fn after(data: &'a [u8], skip: usize) -> Result<Self, BinaryReaderError> {
        let mut reader = Self::new(data);
        reader.skip(skip)?;
        Ok(reader)
    }

    pub fn skip(&mut self, length: usize) -> Result<(), BinaryReaderError> {
        self.check_bounds(length)?;
        self.offset += length;
        Ok(())
    }

    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8], BinaryReaderError> {
        self.check_bounds(length)?;
        let slice = &self.buffer[self.offset..self.offset + length];
        self.offset += length;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, BinaryReaderError> {
        self.check_bounds(1)?;
        let value = self.buffer[self.offset];
        self.offset += 1;
        Ok(value)
    }

    pub fn read_bool(&mut self) -> Result<bool, BinaryReaderError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(BinaryReaderError::InvalidBool(other)),
        }
    }

    pub fn read_u64(&mut self) -> Result<u64, BinaryReaderError> {
        let mut cursor = Cursor::new(self.read_bytes(8)?);
        Ok(cursor.read_u64::<LittleEndian>()?)
    }

    pub fn read_i64(&mut self) -> Result<i64, BinaryReaderError> {
        let mut cursor = Cursor::new(self.read_bytes(8)?);
        Ok(cursor.read_i64::<LittleEndian>()?)
    }

    pub fn read_string(&mut self) -> Result<String, BinaryReaderError> {
        let mut cursor = Cursor::new(self.read_bytes(4)?);
        let length = cursor.read_u32::<LittleEndian>()? as usize;
        let bytes = self.read_bytes(length)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    /// 32-byte public key rendered as base58.
    pub fn read_pubkey(&mut self) -> Result<String, BinaryReaderError> {
        Ok(bs58::encode(self.read_bytes(32)?).into_string())
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    fn check_bounds(&self, length: usize) -> Result<(), BinaryReaderError> {
        if self.offset + length > self.buffer.len() {
            return Err(BinaryReaderError::BufferOverflow {
                length,
                offset: self.offset,
                buffer_len: self.buffer.len(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum BinaryReaderError {
    #[error("buffer overflow: trying to read {length} bytes at offset {offset} from buffer of length {buffer_len}")]
    BufferOverflow {
        length: usize,
        offset: usize,
        buffer_len: usize,
    },
    #[error("invalid bool byte {0}")]
    InvalidBool(u8),
    #[error("failed to read value: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to read string: {0}")]
    InvalidString(#[from] std::string::FromUtf8Error),
}
