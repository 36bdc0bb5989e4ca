//! On-disk container for pattern tables.
//!
//! Layout, all integers single bytes or little-endian:
//!
//! | field | encoding |
//! |-------|----------|
//! | magic | `QPDB` |
//! | version | `u8`, currently 1 |
//! | board side | `u8` |
//! | group count | `u8` |
//! | per group | size `u8`, then that many label bytes |
//! | entry width | `u8`, currently 1 |
//! | table bodies | per group, `P(side², size)` cost bytes in rank order |
//!
//! Readers validate everything before the first entry is consulted: magic,
//! version, the partition itself, the entry width, exact body lengths, and
//! the absence of unfilled entries.

use std::io::{self, Read, Write};

use super::{Partition, PatternGroup, PdbError, builder::UNFILLED, ranking};

const MAGIC: [u8; 4] = *b"QPDB";
const VERSION: u8 = 1;
const ENTRY_WIDTH: u8 = 1;

/// Serialises a partition and its tables.
pub(crate) fn write_to<W: Write>(
    writer: &mut W,
    partition: &Partition,
    tables: &[Box<[u8]>],
) -> io::Result<()> {
    #[expect(clippy::cast_possible_truncation)]
    let group_count = partition.groups().len() as u8;
    writer.write_all(&MAGIC)?;
    writer.write_all(&[VERSION, partition.side(), group_count])?;
    for group in partition.groups() {
        #[expect(clippy::cast_possible_truncation)]
        let size = group.len() as u8;
        writer.write_all(&[size])?;
        writer.write_all(group.labels())?;
    }
    writer.write_all(&[ENTRY_WIDTH])?;
    for table in tables {
        writer.write_all(table)?;
    }
    Ok(())
}

/// Deserialises and fully validates a container.
pub(crate) fn read_from<R: Read>(reader: &mut R) -> Result<(Partition, Vec<Box<[u8]>>), PdbError> {
    let mut magic = [0u8; 4];
    read_bytes(reader, &mut magic)?;
    if magic != MAGIC {
        return Err(corrupt("bad magic"));
    }
    let version = read_byte(reader)?;
    if version != VERSION {
        return Err(corrupt(format!("unsupported version {version}")));
    }
    let side = read_byte(reader)?;
    let group_count = read_byte(reader)?;

    let mut groups = Vec::with_capacity(usize::from(group_count));
    for _ in 0..group_count {
        let size = read_byte(reader)?;
        let mut labels = vec![0u8; usize::from(size)];
        read_bytes(reader, &mut labels)?;
        let group = PatternGroup::new(labels);
        if group.len() != usize::from(size) {
            return Err(corrupt("group has repeated labels"));
        }
        groups.push(group);
    }
    let partition = Partition::new(side, groups)
        .map_err(|err| corrupt(format!("invalid partition: {err}")))?;

    let entry_width = read_byte(reader)?;
    if entry_width != ENTRY_WIDTH {
        return Err(corrupt(format!("unsupported entry width {entry_width}")));
    }

    let area = side * side;
    let mut tables = Vec::with_capacity(partition.groups().len());
    for group in partition.groups() {
        #[expect(clippy::cast_possible_truncation)]
        let len = ranking::arrangement_count(area, group.len() as u8);
        let mut table = vec![0u8; usize::try_from(len).expect("table too large")];
        read_bytes(reader, &mut table)?;
        if table.contains(&UNFILLED) {
            return Err(corrupt("table contains an unfilled entry"));
        }
        tables.push(table.into_boxed_slice());
    }

    // A valid container ends exactly after the last table.
    let mut excess = [0u8; 1];
    match reader.read(&mut excess) {
        Ok(0) => Ok((partition, tables)),
        Ok(_) => Err(corrupt("trailing data after tables")),
        Err(err) => Err(PdbError::Io(err)),
    }
}

fn corrupt(reason: impl Into<String>) -> PdbError {
    PdbError::Corrupt {
        reason: reason.into(),
    }
}

fn read_byte<R: Read>(reader: &mut R) -> Result<u8, PdbError> {
    let mut buf = [0u8; 1];
    read_bytes(reader, &mut buf)?;
    Ok(buf[0])
}

fn read_bytes<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<(), PdbError> {
    reader.read_exact(buf).map_err(|err| {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            corrupt("file is truncated")
        } else {
            PdbError::Io(err)
        }
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::pattern::builder::build_group_table;

    fn sample() -> (Partition, Vec<Box<[u8]>>) {
        let partition = Partition::default_for(3).unwrap();
        let tables = partition
            .groups()
            .iter()
            .map(|group| build_group_table(3, group).into_boxed_slice())
            .collect();
        (partition, tables)
    }

    fn encode(partition: &Partition, tables: &[Box<[u8]>]) -> Vec<u8> {
        let mut bytes = Vec::new();
        write_to(&mut bytes, partition, tables).unwrap();
        bytes
    }

    #[test]
    fn test_round_trip() {
        let (partition, tables) = sample();
        let bytes = encode(&partition, &tables);
        let (read_partition, read_tables) = read_from(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(read_partition, partition);
        assert_eq!(read_tables, tables);
    }

    #[test]
    fn test_rejects_bad_magic() {
        let (partition, tables) = sample();
        let mut bytes = encode(&partition, &tables);
        bytes[0] = b'X';
        let err = read_from(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, PdbError::Corrupt { .. }));
    }

    #[test]
    fn test_rejects_unknown_version() {
        let (partition, tables) = sample();
        let mut bytes = encode(&partition, &tables);
        bytes[4] = 9;
        let err = read_from(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, PdbError::Corrupt { .. }));
    }

    #[test]
    fn test_rejects_truncated_file() {
        let (partition, tables) = sample();
        let mut bytes = encode(&partition, &tables);
        bytes.truncate(bytes.len() - 100);
        let err = read_from(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, PdbError::Corrupt { .. }));
    }

    #[test]
    fn test_rejects_trailing_data() {
        let (partition, tables) = sample();
        let mut bytes = encode(&partition, &tables);
        bytes.push(0);
        let err = read_from(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, PdbError::Corrupt { .. }));
    }

    #[test]
    fn test_rejects_unfilled_entry() {
        let (partition, tables) = sample();
        let mut bytes = encode(&partition, &tables);
        let last = bytes.len() - 1;
        bytes[last] = UNFILLED;
        let err = read_from(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, PdbError::Corrupt { reason } if reason.contains("unfilled")));
    }

    #[test]
    fn test_rejects_invalid_partition() {
        // A header whose single group covers only part of the board.
        let bytes = [
            b'Q', b'P', b'D', b'B', // magic
            1, 3, 1, // version, side, one group
            2, 1, 2, // group of two labels
            1, // entry width
        ];
        let err = read_from(&mut Cursor::new(bytes.to_vec())).unwrap_err();
        assert!(matches!(err, PdbError::Corrupt { .. }));
    }
}
