//! LZUF Compression
//!
//! Traditional LZ77/LZSS in which the length of a longer-than-minimum match
//! goes out as a unary code, shortened by "folding": only the quotient of
//! the length code is sent in unary, the remainder follows as a fixed width
//! field.  Literal bytes pass through a move-to-front list and are sent as
//! variable length codes, so recently seen values stay cheap.  Matches are
//! found with a chained hash over 4 byte strings, checked context first so
//! most chain entries are rejected on a single comparison.
//!
//! * This transforms streams; buffers can use the `_slice` wrappers
//! * The 8 byte header is always little endian
//!
//! The decoder performs no searching, it only replays window references,
//! so `expand` is a fraction of the work of `compress`.

use std::io::{Cursor,Read,Write,Seek,SeekFrom,BufReader,BufWriter,ErrorKind};
use crate::tools::bitio::{BitReader,BitWriter};
use crate::tools::lzhash::{ChainIndex,NIL};
use crate::tools::mtf::MtfList;
use crate::tools::ring_buffer::RingBuffer;
use crate::tools::vlc;
use crate::DYNERR;

const MAGIC: [u8;3] = *b"LZU";
/// width in bytes of the strings fed to the hash
const HASH_SPAN: usize = 4;

/// Options controlling compression.
/// The decompressor must be given the same values.
#[derive(Clone)]
pub struct Options {
    /// log2 of the window size, 12..=21
    pub window_bits: usize,
    /// shortest run coded as a match, at least 2
    pub min_match: usize,
    /// low bits of a folded length code sent as the fixed remainder field
    pub fold_bits: usize,
    /// end the search after this many improved candidates
    pub max_hits: usize,
    /// end the search after this many chain entries visited
    pub max_visits: usize,
    /// inputs at least this long use the folded length code
    pub large_threshold: u64,
    /// return error if file is larger
    pub max_file_size: u64
}

pub const STD_OPTIONS: Options = Options {
    window_bits: 17,
    min_match: 4,
    fold_bits: 2,
    max_hits: 196,
    max_visits: 4096,
    large_threshold: 1048576,
    max_file_size: u32::MAX as u64
};

impl Options {
    fn validate(&self) -> Result<(),crate::Error> {
        // below 12 bits the hash terms overrun the bucket array
        if self.window_bits < 12 || self.window_bits > 21 {
            return Err(crate::Error::InvalidOptions);
        }
        if self.min_match < 2 || self.fold_bits < 1 {
            return Err(crate::Error::InvalidOptions);
        }
        if self.max_hits < 1 || self.max_visits < 1 {
            return Err(crate::Error::InvalidOptions);
        }
        // the header length field is 32 bits
        if self.max_file_size > u32::MAX as u64 {
            return Err(crate::Error::InvalidOptions);
        }
        Ok(())
    }
}

/// Bucket for the `HASH_SPAN` bytes starting at `pos`.  Applied identically
/// to window and lookahead contents, so pending input lands in the buckets
/// where matching history was filed.  Wraparound is the ring buffer's job,
/// only the bucket count is masked here.
fn bucket_of(buf: &RingBuffer<u8>,pos: usize,shift: usize,mask: usize) -> usize {
    ((buf.get_abs(pos) as usize) << shift)
        ^ ((buf.get_abs(pos+1) as usize) << 1)
        ^ ((buf.get_abs(pos+2) as usize) << 4)
        ^ (((buf.get_abs(pos+3) as usize) << 7) & mask)
}

/// best candidate so far; `len` below `min_match` means no usable match
struct Match {
    pos: usize,
    len: usize
}

/// outcome of testing one chain entry
enum Probe {
    /// mismatch inside the verified prefix, drop the candidate
    Reject,
    /// candidate beats the best so far, keep scanning the chain
    Better(usize),
    /// candidate matched everything available, stop the search
    Done(usize)
}

/// Structure to perform LZUF compression.  Owns the sliding window
/// ("dictionary"), the lookahead buffer of pending input, the chained hash
/// over window positions, and the move-to-front list for literals.
struct Session {
    opt: Options,
    window: RingBuffer<u8>,
    lookahead: RingBuffer<u8>,
    chains: ChainIndex,
    mtf: MtfList,
    /// next window position to be overwritten
    win_cnt: usize,
    /// next unconsumed lookahead position
    pat_cnt: usize,
    /// valid bytes in the lookahead
    buf_cnt: usize,
    /// folded length codes in effect
    large: bool,
    shift: usize,
    bucket_mask: usize
}

impl Session {
    fn create(opt: &Options,large: bool) -> Result<Self,crate::Error> {
        opt.validate()?;
        let win_size = 1 << opt.window_bits;
        let shift = opt.window_bits - 8;
        let bucket_mask = win_size - 1;
        let window: RingBuffer<u8> = RingBuffer::create(0,win_size);
        let mut chains = ChainIndex::new(win_size,win_size);
        // the zero filled window is indexed up front, so the earliest
        // matches may legitimately point into the zero run
        for i in 0..win_size {
            chains.insert(bucket_of(&window,i,shift,bucket_mask),i);
        }
        Ok(Self {
            opt: opt.clone(),
            window,
            lookahead: RingBuffer::create(0,win_size/2),
            chains,
            mtf: MtfList::create(),
            win_cnt: 0,
            pat_cnt: 0,
            buf_cnt: 0,
            large,
            shift,
            bucket_mask
        })
    }
    /// Test one chain entry against the lookahead, given that the best
    /// candidate so far matched `ctx` bytes.  The already verified prefix
    /// plus one suffix byte is compared right to left, so the prior match
    /// length acts as a skip count and no skip table is needed (see
    /// P. Fenwick, "Differential Ziv-Lempel Text Compression", J.UCS 1995).
    /// Only if the context holds is the suffix extended left to right.
    fn probe(&self,at: usize,ctx: usize) -> Probe {
        let mut k = ctx;
        loop {
            if self.lookahead.get_abs(self.pat_cnt + k) != self.window.get_abs(at + k) {
                return Probe::Reject;
            }
            if k == 0 {
                break;
            }
            k -= 1;
        }
        let mut len = ctx + 1;
        while len < self.buf_cnt && self.lookahead.get_abs(self.pat_cnt + len) == self.window.get_abs(at + len) {
            len += 1;
        }
        match len == self.buf_cnt {
            true => Probe::Done(len),
            false => Probe::Better(len)
        }
    }
    /// Walk the hash chain for the next lookahead bytes and return the best
    /// match found.  The search is bounded both by entries visited and by
    /// accepted improvements.
    fn find_match(&self) -> Match {
        let mut best = Match { pos: 0, len: 0 };
        if self.buf_cnt <= 1 {
            return best;
        }
        let mut at = self.chains.head(bucket_of(&self.lookahead,self.pat_cnt,self.shift,self.bucket_mask));
        let mut hits: usize = 0;
        let mut visits: usize = 0;
        while at != NIL {
            match self.probe(at,best.len) {
                Probe::Reject => {},
                Probe::Better(len) => {
                    best = Match { pos: at, len };
                    hits += 1;
                    if hits == self.opt.max_hits {
                        break;
                    }
                },
                Probe::Done(len) => {
                    best = Match { pos: at, len };
                    break;
                }
            }
            visits += 1;
            if visits == self.opt.max_visits {
                break;
            }
            at = self.chains.next(at);
        }
        best
    }
    /// Emit the body of one unit and slide the buffers.  The selector bits
    /// in front of the unit are the caller's business.  A no-match forces
    /// the length to 1 and sends the byte's move-to-front rank instead.
    fn put_codes<R,W>(&mut self,m: &mut Match,sink: &mut BitWriter<W>,reader: &mut BufReader<R>) -> Result<(),std::io::Error>
    where R: Read, W: Write {
        if m.len > self.opt.min_match {
            // only the suffix length beyond the implied minimum is sent
            let code = m.len - (self.opt.min_match + 1);
            if self.large {
                let mut q = code >> self.opt.fold_bits;
                while q > 0 {
                    sink.put_bit(1)?;
                    q -= 1;
                }
                sink.put_bits((code % (1 << self.opt.fold_bits)) << 1,self.opt.fold_bits + 1)?;
            } else {
                vlc::put_vlcode(sink,code,1)?;
            }
        }
        if m.len >= self.opt.min_match {
            log::trace!("match pos {} len {}",m.pos,m.len);
            sink.put_bits(m.pos,self.opt.window_bits)?;
        } else {
            m.len = 1;
            let c = self.lookahead.get_abs(self.pat_cnt);
            log::trace!("literal {}",c);
            vlc::put_vlcode(sink,self.mtf.rank(c),3)?;
        }
        self.slide(m.len,reader)
    }
    /// Copy the consumed bytes into the window, fix up the chain index
    /// around them, and refill the lookahead from the input.
    fn slide<R: Read>(&mut self,len: usize,reader: &mut BufReader<R>) -> Result<(),std::io::Error> {
        let win_size = self.window.capacity();
        let pat_size = self.lookahead.capacity();
        // hash strings span HASH_SPAN bytes, so the HASH_SPAN-1 positions
        // behind the cursor reach into the slide region and must be refiled
        // along with it
        let left = (self.win_cnt + win_size - (HASH_SPAN - 1)) % win_size;
        let touched = len + HASH_SPAN - 1;
        for i in 0..touched {
            self.chains.remove(bucket_of(&self.window,left + i,self.shift,self.bucket_mask),(left + i) % win_size);
        }
        for i in 0..len {
            self.window.set_abs(self.win_cnt + i,self.lookahead.get_abs(self.pat_cnt + i));
        }
        for i in 0..touched {
            self.chains.insert(bucket_of(&self.window,left + i,self.shift,self.bucket_mask),(left + i) % win_size);
        }
        let mut got: usize = 0;
        let mut by: [u8;1] = [0];
        while got < len {
            match reader.read_exact(&mut by) {
                Ok(()) => {
                    self.lookahead.set_abs(self.pat_cnt + got,by[0]);
                    got += 1;
                },
                Err(e) if e.kind()==ErrorKind::UnexpectedEof => {
                    break;
                },
                Err(e) => return Err(e)
            }
        }
        // a short refill at end of input shrinks the pending count, so the
        // session loop winds down at exactly the right byte
        self.buf_cnt -= len - got;
        self.win_cnt = (self.win_cnt + len) % win_size;
        self.pat_cnt = (self.pat_cnt + len) % pat_size;
        Ok(())
    }
}

/// Main compression function.
/// `expanded_in` is an object with `Read` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<&[u8]>`.
/// `compressed_out` is an object with `Write` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<Vec<u8>>`.
/// Returns (in_size,out_size) or error.
pub fn compress<R,W>(expanded_in: &mut R,compressed_out: &mut W,opt: &Options) -> Result<(u64,u64),DYNERR>
where R: Read + Seek, W: Write + Seek {
    opt.validate()?;
    let mut reader = BufReader::new(expanded_in);
    let mut writer = BufWriter::new(compressed_out);
    let in_size = reader.seek(SeekFrom::End(0))?;
    if in_size > opt.max_file_size {
        return Err(Box::new(crate::Error::FileTooLarge));
    }
    reader.seek(SeekFrom::Start(0))?;
    let large = in_size >= opt.large_threshold;
    // header: tag, length coding flag, expanded length
    writer.write_all(&MAGIC)?;
    writer.write_all(&[large as u8])?;
    writer.write_all(&u32::to_le_bytes(in_size as u32))?;
    let mut session = Session::create(opt,large)?;
    log::debug!("window {} bytes, lookahead {} bytes, folded codes: {}",
        session.window.capacity(),session.lookahead.capacity(),large);
    // prime the lookahead
    let mut first = vec![0u8;session.lookahead.capacity()];
    let mut filled: usize = 0;
    loop {
        match reader.read(&mut first[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) => return Err(Box::new(e))
        }
    }
    for i in 0..filled {
        session.lookahead.set_abs(i,first[i]);
    }
    session.buf_cnt = filled;
    log::debug!("entering session loop");
    let mut sink = BitWriter::new(writer);
    while session.buf_cnt > 0 {
        let mut m = session.find_match();
        if m.len > opt.min_match {
            sink.put_bit(1)?;
        } else if m.len == opt.min_match {
            sink.put_bit(0)?;
            sink.put_bit(1)?;
        } else {
            sink.put_bit(0)?;
            sink.put_bit(0)?;
        }
        session.put_codes(&mut m,&mut sink,&mut reader)?;
    }
    sink.flush()?;
    let mut writer = sink.into_inner();
    Ok((in_size,writer.stream_position()?))
}

/// Main decompression function.
/// `compressed_in` is an object with `Read` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<&[u8]>`.
/// `expanded_out` is an object with `Write` and `Seek` traits, usually `std::fs::File`, or `std::io::Cursor<Vec<u8>>`.
/// `opt` must carry the same constants the compressor used.
/// Returns (in_size,out_size) or error.
pub fn expand<R,W>(compressed_in: &mut R,expanded_out: &mut W,opt: &Options) -> Result<(u64,u64),DYNERR>
where R: Read + Seek, W: Write + Seek {
    opt.validate()?;
    let mut reader = BufReader::new(compressed_in);
    let mut writer = BufWriter::new(expanded_out);
    let compressed_size = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(0))?;
    let mut header: [u8;8] = [0;8];
    reader.read_exact(&mut header)?;
    if header[0..3] != MAGIC {
        log::error!("bad signature in header");
        return Err(Box::new(crate::Error::FileFormatMismatch));
    }
    let large = header[3] != 0;
    let size = u32::from_le_bytes([header[4],header[5],header[6],header[7]]) as u64;
    let win_size = 1usize << opt.window_bits;
    let mut window: RingBuffer<u8> = RingBuffer::create(0,win_size);
    let mut mtf = MtfList::create();
    let mut src = BitReader::new(reader);
    let mut cursor: usize = 0;
    let mut written: u64 = 0;
    log::debug!("expanding {} bytes, folded codes: {}",size,large);
    while written < size {
        let len: usize;
        if src.get_bit()? == 1 {
            let code = match large {
                true => {
                    let mut q: usize = 0;
                    while src.get_bit()? == 1 {
                        q += 1;
                    }
                    (q << opt.fold_bits) + src.get_bits(opt.fold_bits)?
                },
                false => vlc::get_vlcode(&mut src,1)?
            };
            len = code + opt.min_match + 1;
        } else if src.get_bit()? == 1 {
            len = opt.min_match;
        } else {
            let rank = vlc::get_vlcode(&mut src,3)?;
            if rank > 255 {
                return Err(Box::new(crate::Error::FileFormatMismatch));
            }
            let c = mtf.take(rank);
            window.set_abs(cursor,c);
            cursor = (cursor + 1) % win_size;
            writer.write_all(&[c])?;
            written += 1;
            continue;
        }
        // no match can outrun the compressor's lookahead
        if len > win_size/2 {
            return Err(Box::new(crate::Error::FileFormatMismatch));
        }
        let pos = src.get_bits(opt.window_bits)?;
        // the reference is to the window as it stood when the unit was
        // coded, so the run is captured before any of it is overwritten
        let mut run: Vec<u8> = Vec::with_capacity(len);
        for i in 0..len {
            run.push(window.get_abs(pos + i));
        }
        for &c in &run {
            window.set_abs(cursor,c);
            cursor = (cursor + 1) % win_size;
        }
        writer.write_all(&run)?;
        written += len as u64;
    }
    writer.flush()?;
    Ok((compressed_size,written))
}

/// Convenience function, calls `compress` with a slice returning a Vec
pub fn compress_slice(slice: &[u8],opt: &Options) -> Result<Vec<u8>,DYNERR> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    compress(&mut src,&mut ans,opt)?;
    Ok(ans.into_inner())
}

/// Convenience function, calls `expand` with a slice returning a Vec
pub fn expand_slice(slice: &[u8],opt: &Options) -> Result<Vec<u8>,DYNERR> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    expand(&mut src,&mut ans,opt)?;
    Ok(ans.into_inner())
}


// *************** TESTS *****************

#[test]
fn empty_input_is_header_only() {
    let compressed = compress_slice(&[],&STD_OPTIONS).expect("compression failed");
    assert_eq!(compressed,hex::decode("4c5a550000000000").unwrap());
    let expanded = expand_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(expanded,Vec::<u8>::new());
}

#[test]
fn single_literal_stream() {
    // 'A' has rank 65 in the fresh list: selector 0,0 then 1,1,1,0 then
    // 6 bits of 9 low first, packed into 0x3a 0x40
    let compressed = compress_slice(b"A",&STD_OPTIONS).expect("compression failed");
    assert_eq!(compressed,hex::decode("4c5a5500010000003a40").unwrap());
    let expanded = expand_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(expanded,b"A".to_vec());
}

#[test]
fn short_input_is_all_literals() {
    // three distinct bytes, nothing reaches the minimum match
    let compressed = compress_slice(b"abc",&STD_OPTIONS).expect("compression failed");
    // 12 bits per literal: 8 header bytes + 36 bits -> 13 bytes
    assert_eq!(compressed.len(),13);
    let expanded = expand_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(expanded,b"abc".to_vec());
}

#[test]
fn invertibility() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let compressed = compress_slice(test_data,&STD_OPTIONS).expect("compression failed");
    let expanded = expand_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(test_data.to_vec(),expanded);
}

#[test]
fn determinism() {
    let test_data = "TOBEORNOTTOBEORTOBEORNOT#\n".as_bytes();
    let first = compress_slice(test_data,&STD_OPTIONS).expect("compression failed");
    let second = compress_slice(test_data,&STD_OPTIONS).expect("compression failed");
    assert_eq!(first,second);
}

#[test]
fn run_collapses_into_matches() {
    let test_data = vec![b'z';100];
    let compressed = compress_slice(&test_data,&STD_OPTIONS).expect("compression failed");
    // a few literals to seed the window, then long matches
    assert!(compressed.len() < 40);
    let expanded = expand_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
    assert_eq!(test_data,expanded);
}

#[test]
fn folded_path_matches_plain_path() {
    // force the folded length code on the same data the plain path sees
    let mut folded_opt = STD_OPTIONS;
    folded_opt.large_threshold = 0;
    let test_data = vec![b'z';100];
    let plain = compress_slice(&test_data,&STD_OPTIONS).expect("compression failed");
    let folded = compress_slice(&test_data,&folded_opt).expect("compression failed");
    assert_eq!(plain[3],0);
    assert_eq!(folded[3],1);
    assert_eq!(expand_slice(&plain,&STD_OPTIONS).expect("expansion failed"),test_data);
    assert_eq!(expand_slice(&folded,&folded_opt).expect("expansion failed"),test_data);
}

#[test]
fn window_capacity_straddles() {
    // a 12 bit window wraps within test sized inputs
    let mut opt = STD_OPTIONS;
    opt.window_bits = 12;
    for n in [2048,2049,4096,4097,8192] {
        let test_data: Vec<u8> = (0..n).map(|i| (i % 251) as u8).collect();
        let compressed = compress_slice(&test_data,&opt).expect("compression failed");
        let expanded = expand_slice(&compressed,&opt).expect("expansion failed");
        assert_eq!(test_data,expanded);
    }
}

#[test]
fn hash_collisions_are_rejected() {
    // with a 12 bit window the strings [1,0,0,0] and [0,0,1,0] share
    // bucket 16; verification must throw the false candidates out
    let mut opt = STD_OPTIONS;
    opt.window_bits = 12;
    let mut test_data: Vec<u8> = Vec::new();
    for _i in 0..64 {
        test_data.extend_from_slice(&[1,0,0,0,0,0,1,0]);
    }
    let compressed = compress_slice(&test_data,&opt).expect("compression failed");
    let expanded = expand_slice(&compressed,&opt).expect("expansion failed");
    assert_eq!(test_data,expanded);
}

#[test]
fn search_finds_real_match() {
    let mut opt = STD_OPTIONS;
    opt.window_bits = 12;
    let mut session = Session::create(&opt,false).expect("bad options");
    for (i,c) in b"wxyzwxyz".iter().enumerate() {
        session.lookahead.set_abs(i,*c);
    }
    session.buf_cnt = 8;
    let mut sink = BitWriter::new(Vec::new());
    let mut reader = BufReader::new(Cursor::new(Vec::<u8>::new()));
    // nothing in the window matches 'w', so four literal slides
    for _i in 0..4 {
        let mut m = session.find_match();
        assert!(m.len < opt.min_match);
        session.put_codes(&mut m,&mut sink,&mut reader).expect("emit failed");
    }
    // "wxyz" now sits at window position 0 and must be found whole
    let m = session.find_match();
    assert_eq!(m.len,4);
    assert_eq!(m.pos,0);
    for j in 0..m.len {
        assert_eq!(session.window.get_abs(m.pos + j),session.lookahead.get_abs(session.pat_cnt + j));
    }
}

#[test]
fn rejects_foreign_header() {
    let not_ours = b"XYZ\x00\x10\x00\x00\x00junk".to_vec();
    assert!(expand_slice(&not_ours,&STD_OPTIONS).is_err());
}

#[test]
fn rejects_bad_options() {
    let mut opt = STD_OPTIONS;
    opt.window_bits = 8;
    assert!(compress_slice(b"abc",&opt).is_err());
    let mut opt = STD_OPTIONS;
    opt.min_match = 1;
    assert!(compress_slice(b"abc",&opt).is_err());
}
