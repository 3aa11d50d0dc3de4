//! Chained hash index over window positions
//!
//! Each bucket holds a doubly linked list of window positions whose content
//! currently hashes there.  The lists live in parallel index arrays sized to
//! the window, with `NIL` standing in for no link, giving O(1) insert at the
//! head and O(1) delete by position.

pub const NIL: usize = usize::MAX;

pub struct ChainIndex {
    head: Vec<usize>,
    next: Vec<usize>,
    prev: Vec<usize>
}

impl ChainIndex {
    pub fn new(buckets: usize,positions: usize) -> Self {
        Self {
            head: vec![NIL;buckets],
            next: vec![NIL;positions],
            prev: vec![NIL;positions]
        }
    }
    /// most recently inserted position in the bucket, or `NIL`
    pub fn head(&self,bucket: usize) -> usize {
        self.head[bucket]
    }
    /// next older position in the same chain, or `NIL`
    pub fn next(&self,pos: usize) -> usize {
        self.next[pos]
    }
    /// push `pos` onto the head of the bucket's chain
    pub fn insert(&mut self,bucket: usize,pos: usize) {
        let old = self.head[bucket];
        self.prev[pos] = NIL;
        self.next[pos] = old;
        if old != NIL {
            self.prev[old] = pos;
        }
        self.head[bucket] = pos;
    }
    /// unlink `pos` from wherever it sits in the bucket's chain
    pub fn remove(&mut self,bucket: usize,pos: usize) {
        if self.prev[pos] == NIL {
            if self.head[bucket] == pos {
                self.head[bucket] = self.next[pos];
            }
        } else {
            self.next[self.prev[pos]] = self.next[pos];
        }
        if self.next[pos] != NIL {
            self.prev[self.next[pos]] = self.prev[pos];
        }
        self.next[pos] = NIL;
        self.prev[pos] = NIL;
    }
}

#[test]
fn insert_order() {
    let mut idx = ChainIndex::new(8,8);
    idx.insert(3,0);
    idx.insert(3,5);
    idx.insert(3,2);
    assert_eq!(idx.head(3),2);
    assert_eq!(idx.next(2),5);
    assert_eq!(idx.next(5),0);
    assert_eq!(idx.next(0),NIL);
    assert_eq!(idx.head(4),NIL);
}

#[test]
fn remove_anywhere() {
    let mut idx = ChainIndex::new(8,8);
    for p in [0,5,2] {
        idx.insert(3,p);
    }
    idx.remove(3,5); // middle
    assert_eq!(idx.head(3),2);
    assert_eq!(idx.next(2),0);
    idx.remove(3,2); // head
    assert_eq!(idx.head(3),0);
    idx.remove(3,0); // last
    assert_eq!(idx.head(3),NIL);
}

#[test]
fn reinsert_after_remove() {
    let mut idx = ChainIndex::new(4,4);
    idx.insert(1,3);
    idx.remove(1,3);
    idx.insert(2,3);
    assert_eq!(idx.head(1),NIL);
    assert_eq!(idx.head(2),3);
}
