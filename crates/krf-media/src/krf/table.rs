//! Length-prefixed u32 tables.
//!
//! Every index table in a KRF file uses the same record:
//! `size: u32`, `type: u32`, `count: u32`, then `count` little-endian u32
//! items. All fields are little-endian.

use super::io::ByteReader;
use crate::{Error, Result};
use std::io::{Read, Seek};

/// Size of the table record header (size, type, count).
pub const TABLE_HEADER_SIZE: u64 = 12;

/// An owned table of u32 values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Declared record size.
    pub size: u32,
    /// Table type tag.
    pub table_type: u32,
    /// Table items.
    pub items: Vec<u32>,
}

impl Table {
    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the table has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Record size implied by the item count.
    pub fn expected_size(count: u32) -> u64 {
        TABLE_HEADER_SIZE + 4 * count as u64
    }
}

/// Read one table record.
///
/// Fails with [`Error::TruncatedInput`] before allocating if fewer than
/// `4 * count` bytes remain. When `check_size` is set the size field must
/// equal `12 + 4 * count`.
pub(crate) fn read_table<R: Read + Seek>(
    reader: &mut ByteReader<R>,
    check_size: bool,
) -> Result<Table> {
    let size = reader.read_u32_le("table size")?;
    let table_type = reader.read_u32_le("table type")?;
    let count = reader.read_u32_le("table count")?;

    let need = 4 * count as u64;
    let have = reader.remaining()?;
    if need > have {
        return Err(Error::TruncatedInput {
            context: "table items",
            need,
            have,
        });
    }

    if check_size && size as u64 != Table::expected_size(count) {
        return Err(Error::MalformedTable { size, count });
    }

    let mut raw = vec![0u8; need as usize];
    reader.read_exact(&mut raw, "table items")?;
    let items = raw
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    Ok(Table {
        size,
        table_type,
        items,
    })
}
