//! Ring buffer for LZ type compression windows
use num_traits::PrimInt;

pub struct RingBuffer<T: PrimInt> {
    buf: Vec<T>,
    n: usize
}

impl <T: PrimInt> RingBuffer<T> {
    pub fn create(fill: T,n: usize) -> Self {
        Self {
            buf: vec![fill;n],
            n
        }
    }
    pub fn capacity(&self) -> usize {
        self.n
    }
    /// get value at absolute position, wrapping into range
    pub fn get_abs(&self,abs: usize) -> T {
        self.buf[abs % self.n]
    }
    /// set value at absolute position, wrapping into range
    pub fn set_abs(&mut self,abs: usize,val: T) {
        self.buf[abs % self.n] = val;
    }
}

#[test]
fn wraparound() {
    let mut ring: RingBuffer<u8> = RingBuffer::create(0,4);
    ring.set_abs(5,7);
    assert_eq!(ring.get_abs(1),7);
    assert_eq!(ring.get_abs(5),7);
    assert_eq!(ring.get_abs(9),7);
    assert_eq!(ring.get_abs(0),0);
}
