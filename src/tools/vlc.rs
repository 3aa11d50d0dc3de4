//! Self-delimiting variable length codes
//!
//! Non-negative integers are split into groups of escalating size: the
//! first group holds `2^width` values, the next `2^(width+1)`, and so on.
//! The group is chosen with a unary run of set bits, a zero terminates the
//! run, and the offset within the group follows as a fixed width field.

use std::io::{Read,Write};
use crate::tools::bitio::{BitReader,BitWriter};

pub fn put_vlcode<W: Write>(sink: &mut BitWriter<W>,mut code: usize,mut width: usize) -> Result<(),std::io::Error> {
    while code >= (1 << width) {
        code -= 1 << width;
        sink.put_bit(1)?;
        width += 1;
    }
    sink.put_bit(0)?;
    sink.put_bits(code,width)
}

pub fn get_vlcode<R: Read>(src: &mut BitReader<R>,mut width: usize) -> Result<usize,std::io::Error> {
    let mut base: usize = 0;
    while src.get_bit()? == 1 {
        base += 1 << width;
        width += 1;
    }
    Ok(base + src.get_bits(width)?)
}

#[test]
fn code_round_trip() {
    let vals: [usize;9] = [0,1,2,3,7,8,100,1000,65535];
    for width in 1..=4 {
        let mut sink = BitWriter::new(Vec::new());
        for v in vals {
            put_vlcode(&mut sink,v,width).unwrap();
        }
        sink.flush().unwrap();
        let bytes = sink.into_inner();
        let mut src = BitReader::new(&bytes[..]);
        for v in vals {
            assert_eq!(get_vlcode(&mut src,width).unwrap(),v);
        }
    }
}

#[test]
fn small_codes_are_short() {
    // rank 0 with width 3 is the cheapest literal: 0 + three zero bits
    let mut sink = BitWriter::new(Vec::new());
    put_vlcode(&mut sink,0,3).unwrap();
    sink.flush().unwrap();
    assert_eq!(sink.into_inner(),vec![0x00]);
}
