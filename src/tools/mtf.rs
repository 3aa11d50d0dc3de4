//! Move-to-front list for literal coding
//!
//! Keeps the 256 byte values ordered by recency of use, so bytes seen
//! recently get small ranks and short codes.  Starts in identity order.

pub struct MtfList {
    order: Vec<u8>
}

impl MtfList {
    pub fn create() -> Self {
        Self {
            order: (0u8..=255).collect()
        }
    }
    /// rank of `val`, moving it to the front
    pub fn rank(&mut self,val: u8) -> usize {
        let r = self.order.iter().position(|&c| c == val).unwrap(); // permutation, always found
        self.order.remove(r);
        self.order.insert(0,val);
        r
    }
    /// value at `rank`, moving it to the front
    pub fn take(&mut self,rank: usize) -> u8 {
        let val = self.order.remove(rank);
        self.order.insert(0,val);
        val
    }
}

#[test]
fn identity_at_start() {
    let mut list = MtfList::create();
    assert_eq!(list.rank(65),65);
    let mut list = MtfList::create();
    assert_eq!(list.take(200),200);
}

#[test]
fn recency_ordering() {
    let mut list = MtfList::create();
    assert_eq!(list.rank(10),10);
    assert_eq!(list.rank(10),0);
    // value 9 was pushed back one slot by the move
    assert_eq!(list.rank(9),10);
    assert_eq!(list.rank(10),1);
}

#[test]
fn coder_symmetry() {
    let mut coder = MtfList::create();
    let mut decoder = MtfList::create();
    for &b in b"abracadabra" {
        let r = coder.rank(b);
        assert_eq!(decoder.take(r),b);
    }
}
