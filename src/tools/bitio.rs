//! Bit level I/O for the compression streams
//!
//! Bits fill each byte starting at the most significant end.  Multi-bit
//! fields go out low bit first, so the zero that terminates a unary run can
//! be read before the remainder field that follows it.

use bit_vec::BitVec;
use std::io::{Read,Write};

pub struct BitWriter<W: Write> {
    inner: W,
    bits: BitVec
}

impl <W: Write> BitWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            bits: BitVec::new()
        }
    }
    /// append one bit to the stream
    pub fn put_bit(&mut self,bit: u8) -> Result<(),std::io::Error> {
        self.bits.push(bit != 0);
        if self.bits.len() == 8 {
            self.inner.write_all(&self.bits.to_bytes())?;
            self.bits.truncate(0);
        }
        Ok(())
    }
    /// append the low `n` bits of `value`, lowest bit first
    pub fn put_bits(&mut self,value: usize,n: usize) -> Result<(),std::io::Error> {
        for i in 0..n {
            self.put_bit(((value >> i) & 1) as u8)?;
        }
        Ok(())
    }
    /// pad the final partial byte with zeros and flush the stream
    pub fn flush(&mut self) -> Result<(),std::io::Error> {
        if self.bits.len() > 0 {
            self.inner.write_all(&self.bits.to_bytes())?;
            self.bits.truncate(0);
        }
        self.inner.flush()
    }
    pub fn into_inner(self) -> W {
        self.inner
    }
}

pub struct BitReader<R: Read> {
    inner: R,
    bits: BitVec,
    ptr: usize
}

impl <R: Read> BitReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            bits: BitVec::new(),
            ptr: 0
        }
    }
    /// keep the bit vector small, we don't need the bits behind us
    fn drop_leading_bits(&mut self) {
        let cpy = self.bits.clone();
        self.bits = BitVec::new();
        for i in self.ptr..cpy.len() {
            self.bits.push(cpy.get(i).unwrap());
        }
        self.ptr = 0;
    }
    /// Get the next bit, reading from the stream as needed.
    /// Running out of bytes mid-token means a malformed stream, the
    /// underlying error is passed along.
    pub fn get_bit(&mut self) -> Result<u8,std::io::Error> {
        match self.bits.get(self.ptr) {
            Some(bit) => {
                self.ptr += 1;
                Ok(bit as u8)
            },
            None => {
                let mut by: [u8;1] = [0];
                self.inner.read_exact(&mut by)?;
                if self.bits.len() > 512 {
                    self.drop_leading_bits();
                }
                self.bits.append(&mut BitVec::from_bytes(&by));
                self.get_bit()
            }
        }
    }
    /// read `n` bits into the low bits of the result, lowest bit first
    pub fn get_bits(&mut self,n: usize) -> Result<usize,std::io::Error> {
        let mut ans: usize = 0;
        for i in 0..n {
            ans |= (self.get_bit()? as usize) << i;
        }
        Ok(ans)
    }
}

#[test]
fn msb_packing() {
    let mut sink = BitWriter::new(Vec::new());
    sink.put_bit(1).unwrap();
    sink.flush().unwrap();
    assert_eq!(sink.into_inner(),vec![0x80]);
}

#[test]
fn field_order() {
    // value 1 in a 3 bit field: low bit first means 1,0,0 on the wire
    let mut sink = BitWriter::new(Vec::new());
    sink.put_bits(1,3).unwrap();
    sink.flush().unwrap();
    assert_eq!(sink.into_inner(),vec![0x80]);
}

#[test]
fn bit_round_trip() {
    let mut sink = BitWriter::new(Vec::new());
    sink.put_bits(0x5a3,11).unwrap();
    sink.put_bit(1).unwrap();
    sink.put_bits(19,5).unwrap();
    sink.flush().unwrap();
    let bytes = sink.into_inner();
    let mut src = BitReader::new(&bytes[..]);
    assert_eq!(src.get_bits(11).unwrap(),0x5a3);
    assert_eq!(src.get_bit().unwrap(),1);
    assert_eq!(src.get_bits(5).unwrap(),19);
}
