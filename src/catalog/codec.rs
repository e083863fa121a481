//! Textual encoding of one record in the backing store. A block is exactly
//! three newline-terminated lines: decimal identifier, title, author. There is
//! no header, count, or escaping; a line terminator inside a field is
//! indistinguishable from a field boundary, which is a documented limitation
//! of the format rather than something this module tries to repair.

use std::io::{self, BufRead, Lines, Write};

use crate::catalog::error::CatalogError;
use crate::models::Book;

/// Write one record as a three-line block. No separators are added beyond the
/// terminating newline of each line, so field contents survive verbatim.
pub fn encode<W: Write>(book: &Book, sink: &mut W) -> io::Result<()> {
    writeln!(sink, "{}", book.id)?;
    writeln!(sink, "{}", book.title)?;
    writeln!(sink, "{}", book.author)
}

/// Line-oriented reader positioned at the start of a block. Buffering one
/// peeked line lets `has_more` answer without consuming anything, so bulk load
/// can stop silently at end-of-data instead of erroring.
pub struct BlockReader<R> {
    lines: Lines<R>,
    peeked: Option<String>,
}

impl<R: BufRead> BlockReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            peeked: None,
        }
    }

    /// Whether at least one more block is available.
    pub fn has_more(&mut self) -> Result<bool, CatalogError> {
        if self.peeked.is_none() {
            self.peeked = self.fetch_line()?;
        }
        Ok(self.peeked.is_some())
    }

    /// Consume the next block. The reader must be positioned at an identifier
    /// line; anything else is a `MalformedRecord`.
    pub fn decode(&mut self) -> Result<Book, CatalogError> {
        let id_line = self.next_line()?.ok_or_else(|| {
            CatalogError::MalformedRecord("end of store before identifier line".to_string())
        })?;
        let id = id_line.trim().parse::<i64>().map_err(|_| {
            CatalogError::MalformedRecord(format!("identifier line {id_line:?} is not an integer"))
        })?;
        let title = self.next_line()?.ok_or_else(|| {
            CatalogError::MalformedRecord(format!("record {id} is missing its title line"))
        })?;
        let author = self.next_line()?.ok_or_else(|| {
            CatalogError::MalformedRecord(format!("record {id} is missing its author line"))
        })?;
        Ok(Book { id, title, author })
    }

    fn next_line(&mut self) -> Result<Option<String>, CatalogError> {
        if let Some(line) = self.peeked.take() {
            return Ok(Some(line));
        }
        self.fetch_line()
    }

    fn fetch_line(&mut self) -> Result<Option<String>, CatalogError> {
        self.lines
            .next()
            .transpose()
            .map_err(CatalogError::StoreUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn encode_emits_three_lines() {
        let mut out = Vec::new();
        encode(&Book::new(7, "Dune", "Frank Herbert"), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "7\nDune\nFrank Herbert\n");
    }

    #[test]
    fn decode_reads_one_block() {
        let mut reader = BlockReader::new(Cursor::new("3\nA\nx\n1\nB\ny\n"));
        assert!(reader.has_more().unwrap());
        assert_eq!(reader.decode().unwrap(), Book::new(3, "A", "x"));
        assert!(reader.has_more().unwrap());
        assert_eq!(reader.decode().unwrap(), Book::new(1, "B", "y"));
        assert!(!reader.has_more().unwrap());
    }

    #[test]
    fn has_more_does_not_consume() {
        let mut reader = BlockReader::new(Cursor::new("5\nT\nA\n"));
        assert!(reader.has_more().unwrap());
        assert!(reader.has_more().unwrap());
        assert_eq!(reader.decode().unwrap().id, 5);
    }

    #[test]
    fn non_integer_identifier_is_malformed() {
        let mut reader = BlockReader::new(Cursor::new("not-a-number\nT\nA\n"));
        let err = reader.decode().unwrap_err();
        assert!(matches!(err, CatalogError::MalformedRecord(_)));
    }

    #[test]
    fn truncated_block_is_malformed() {
        let mut reader = BlockReader::new(Cursor::new("12\nonly a title\n"));
        let err = reader.decode().unwrap_err();
        assert!(matches!(err, CatalogError::MalformedRecord(_)));
    }

    #[test]
    fn empty_source_has_no_blocks() {
        let mut reader = BlockReader::new(Cursor::new(""));
        assert!(!reader.has_more().unwrap());
    }
}
