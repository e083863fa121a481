//! The ordered catalog: an unbalanced binary search tree keyed by identifier.
//! Nodes are single-owner (`Option<Box<Node>>` links), so teardown is
//! structural: dropping the root releases every descendant post-order with no
//! parent link ever pointing at a freed child. No rebalancing is attempted;
//! the shape is purely a function of insertion order.

use std::io::{self, BufRead, Write};

use crate::catalog::codec::{self, BlockReader};
use crate::catalog::error::CatalogError;
use crate::models::Book;

type Link = Option<Box<Node>>;

struct Node {
    book: Book,
    left: Link,
    right: Link,
}

impl Node {
    fn new(book: Book) -> Self {
        Self {
            book,
            left: None,
            right: None,
        }
    }
}

/// In-memory collection of every book, ordered by identifier. Owns the full
/// lifetime of all records between a bulk load and a bulk save.
pub struct Catalog {
    root: Link,
    len: usize,
}

impl Catalog {
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Place a record by recursive descent on its identifier. Equal keys
    /// route right, so duplicate identifiers are stored rather than rejected
    /// or overwritten. Never fails.
    pub fn insert(&mut self, book: Book) {
        insert_at(&mut self.root, book);
        self.len += 1;
    }

    /// Exact-key lookup. With duplicate identifiers in the tree this returns
    /// the match nearest the root along the descent path, never an exhaustive
    /// set.
    pub fn find(&self, id: i64) -> Option<&Book> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            if id < node.book.id {
                current = node.left.as_deref();
            } else if id > node.book.id {
                current = node.right.as_deref();
            } else {
                return Some(&node.book);
            }
        }
        None
    }

    /// Remove the first node matching `id`, or report `NotFound`. Leaf nodes
    /// unlink, single-child nodes splice their child into the parent link,
    /// and two-child nodes take the in-order successor's record before the
    /// successor itself is removed from the right subtree.
    pub fn remove(&mut self, id: i64) -> Result<(), CatalogError> {
        if remove_at(&mut self.root, id) {
            self.len -= 1;
            Ok(())
        } else {
            Err(CatalogError::NotFound(id))
        }
    }

    /// Lazy in-order iterator yielding records in ascending identifier order.
    /// Restartable: each call walks the tree from scratch.
    pub fn iter(&self) -> InOrder<'_> {
        InOrder::new(self.root.as_deref())
    }

    /// Decode and insert blocks until the source runs out. Stops silently at
    /// end-of-data; a malformed block aborts the remaining load while records
    /// decoded before it stay in the catalog. Returns how many were loaded.
    pub fn bulk_load<R: BufRead>(&mut self, reader: R) -> Result<usize, CatalogError> {
        let mut blocks = BlockReader::new(reader);
        let mut loaded = 0;
        while blocks.has_more()? {
            self.insert(blocks.decode()?);
            loaded += 1;
        }
        Ok(loaded)
    }

    /// Encode every record to the sink in ascending identifier order, so the
    /// persisted order never depends on historical insertion order.
    pub fn bulk_save<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        for book in self.iter() {
            codec::encode(book, sink)?;
        }
        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

fn insert_at(link: &mut Link, book: Book) {
    match link {
        None => *link = Some(Box::new(Node::new(book))),
        Some(node) if book.id < node.book.id => insert_at(&mut node.left, book),
        Some(node) => insert_at(&mut node.right, book),
    }
}

/// Classic BST deletion. Returns whether a node was removed so the caller can
/// keep the length in step.
fn remove_at(link: &mut Link, id: i64) -> bool {
    let Some(node) = link.as_deref_mut() else {
        return false;
    };
    if id < node.book.id {
        return remove_at(&mut node.left, id);
    }
    if id > node.book.id {
        return remove_at(&mut node.right, id);
    }
    if node.left.is_some() {
        if let Some(right) = node.right.as_deref() {
            // Two children: copy the successor's record into this node, then
            // remove the successor (by its own identifier) from the right
            // subtree. Copy-then-remove keeps the ordering invariant intact
            // at every step; naive pointer relinking would not.
            let successor = min_book(right).clone();
            node.book = successor;
            let successor_id = node.book.id;
            remove_at(&mut node.right, successor_id);
            return true;
        }
    }
    // Zero or one child: splice the child, if any, into the parent link.
    if let Some(mut removed) = link.take() {
        *link = removed.left.take().or_else(|| removed.right.take());
    }
    true
}

/// Minimum-keyed record of a subtree, used as the in-order successor during
/// two-child deletion.
fn min_book(mut node: &Node) -> &Book {
    while let Some(left) = node.left.as_deref() {
        node = left;
    }
    &node.book
}

/// Iterative in-order walk. The stack holds every unvisited ancestor on the
/// path to the current minimum, so `next` is amortized O(1).
pub struct InOrder<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> InOrder<'a> {
    fn new(root: Option<&'a Node>) -> Self {
        let mut iter = Self { stack: Vec::new() };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut node: Option<&'a Node>) {
        while let Some(current) = node {
            self.stack.push(current);
            node = current.left.as_deref();
        }
    }
}

impl<'a> Iterator for InOrder<'a> {
    type Item = &'a Book;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        Some(&node.book)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;

    use super::*;

    fn ids(catalog: &Catalog) -> Vec<i64> {
        catalog.iter().map(|book| book.id).collect()
    }

    #[test]
    fn traversal_yields_ascending_ids() {
        let mut catalog = Catalog::new();
        for id in [8, 3, 10, 1, 6, 14, 4, 7, 13] {
            catalog.insert(Book::new(id, format!("title {id}"), "author"));
        }
        assert_eq!(ids(&catalog), vec![1, 3, 4, 6, 7, 8, 10, 13, 14]);
        // Restartable: a second walk sees the same sequence.
        assert_eq!(ids(&catalog), vec![1, 3, 4, 6, 7, 8, 10, 13, 14]);
    }

    #[test]
    fn find_hits_and_misses() {
        let mut catalog = Catalog::new();
        catalog.insert(Book::new(2, "Emma", "Austen"));
        catalog.insert(Book::new(9, "Ulysses", "Joyce"));
        assert_eq!(catalog.find(9).map(|b| b.title.as_str()), Some("Ulysses"));
        assert!(catalog.find(5).is_none());
    }

    #[test]
    fn remove_leaf_then_find_misses() {
        let mut catalog = Catalog::new();
        catalog.insert(Book::new(3, "A", "x"));
        catalog.insert(Book::new(1, "B", "y"));
        catalog.insert(Book::new(2, "C", "z"));
        assert_eq!(ids(&catalog), vec![1, 2, 3]);

        catalog.remove(3).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.find(3).is_none());
        assert_eq!(ids(&catalog), vec![1, 2]);
    }

    #[test]
    fn remove_single_child_node_splices_child() {
        let mut catalog = Catalog::new();
        catalog.insert(Book::new(5, "root", "a"));
        catalog.insert(Book::new(2, "left", "b"));
        catalog.insert(Book::new(1, "left-left", "c"));

        catalog.remove(2).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(ids(&catalog), vec![1, 5]);
        assert_eq!(catalog.find(1).map(|b| b.title.as_str()), Some("left-left"));
    }

    #[test]
    fn remove_two_child_node_uses_successor() {
        let mut catalog = Catalog::new();
        for id in [8, 3, 10, 1, 6, 4, 7] {
            catalog.insert(Book::new(id, format!("t{id}"), "a"));
        }
        // 3 has children on both sides; its in-order successor is 4.
        catalog.remove(3).unwrap();
        assert_eq!(catalog.len(), 6);
        assert!(catalog.find(3).is_none());
        assert_eq!(catalog.find(4).map(|b| b.title.as_str()), Some("t4"));
        assert_eq!(ids(&catalog), vec![1, 4, 6, 7, 8, 10]);
    }

    #[test]
    fn remove_root_with_two_children() {
        let mut catalog = Catalog::new();
        for id in [5, 2, 8, 6, 9] {
            catalog.insert(Book::new(id, format!("t{id}"), "a"));
        }
        catalog.remove(5).unwrap();
        assert_eq!(ids(&catalog), vec![2, 6, 8, 9]);
    }

    #[test]
    fn remove_missing_id_reports_not_found() {
        let mut catalog = Catalog::new();
        catalog.insert(Book::new(1, "only", "one"));
        let err = catalog.remove(42).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(42)));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn duplicate_ids_are_both_stored() {
        let mut catalog = Catalog::new();
        catalog.insert(Book::new(4, "first copy", "a"));
        catalog.insert(Book::new(4, "second copy", "b"));
        assert_eq!(catalog.len(), 2);
        // Lookup reaches the earlier insert, which sits nearer the root.
        assert_eq!(catalog.find(4).map(|b| b.title.as_str()), Some("first copy"));
        let titles: Vec<_> = catalog.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["first copy", "second copy"]);
    }

    #[test]
    fn bulk_save_then_load_round_trips() {
        let mut catalog = Catalog::new();
        catalog.insert(Book::new(3, "A", "x"));
        catalog.insert(Book::new(1, "B", "y"));
        catalog.insert(Book::new(2, "C", "z"));
        catalog.remove(3).unwrap();

        let mut buffer = Vec::new();
        catalog.bulk_save(&mut buffer).unwrap();

        let mut reloaded = Catalog::new();
        let loaded = reloaded.bulk_load(Cursor::new(buffer)).unwrap();
        assert_eq!(loaded, 2);
        assert_eq!(ids(&reloaded), vec![1, 2]);
        let books: Vec<_> = reloaded.iter().cloned().collect();
        assert_eq!(books, vec![Book::new(1, "B", "y"), Book::new(2, "C", "z")]);
    }

    #[test]
    fn bulk_load_keeps_records_before_a_malformed_block() {
        let mut catalog = Catalog::new();
        let err = catalog
            .bulk_load(Cursor::new("1\ngood\nbook\nbroken-id\nt\na\n"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::MalformedRecord(_)));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.find(1).map(|b| b.title.as_str()), Some("good"));
    }
}
