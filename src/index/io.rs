//! Index file format
//!
//! ```text
//! magic "PMIX" | version u8
//! bbit u8 | kmer u8 | mod_bit u8 | trans_code u8 | min_aa_len u32
//! sequence store (its own magic and version)
//! n_blocks u32 | block_off[n_blocks + 1] u64
//! n_keys u64   | keys[n_keys] u32 | key_start[n_keys + 1] u64
//! n_pos u64    | positions[n_pos] u64
//! ```
//!
//! All integers are little-endian.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::info;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use super::KmerIndex;
use crate::config::IndexOptions;
use crate::error::{MapError, MapResult};
use crate::sequence::SequenceStore;
use crate::utils::genetic_code::GeneticCode;

pub const INDEX_MAGIC: &[u8; 4] = b"PMIX";
pub const INDEX_VERSION: u8 = 1;

fn read_u64_vec<R: Read>(r: &mut R, n: u64) -> MapResult<Vec<u64>> {
    let mut v = Vec::with_capacity(n.min(1 << 24) as usize);
    for _ in 0..n {
        v.push(r.read_u64::<LittleEndian>().map_err(|e| MapError::from_read(e, "index"))?);
    }
    Ok(v)
}

fn check_offsets(offsets: &[u64], end: u64, what: &str) -> MapResult<()> {
    let monotonic = offsets.windows(2).all(|w| w[0] <= w[1]);
    if !monotonic || offsets.first() != Some(&0) || offsets.last() != Some(&end) {
        return Err(MapError::format(format!("inconsistent {} offsets", what)));
    }
    Ok(())
}

impl KmerIndex {
    pub fn write_to<W: Write>(&self, w: &mut W) -> MapResult<()> {
        let opt = self.options();
        w.write_all(INDEX_MAGIC)?;
        w.write_u8(INDEX_VERSION)?;
        w.write_u8(opt.bbit)?;
        w.write_u8(opt.kmer)?;
        w.write_u8(opt.mod_bit)?;
        w.write_u8(opt.trans_code)?;
        w.write_u32::<LittleEndian>(opt.min_aa_len)?;
        self.store().write_to(w)?;

        let (block_off, keys, key_start, positions) = self.tables();
        w.write_u32::<LittleEndian>((block_off.len() - 1) as u32)?;
        for &x in block_off {
            w.write_u64::<LittleEndian>(x)?;
        }
        w.write_u64::<LittleEndian>(keys.len() as u64)?;
        for &k in keys {
            w.write_u32::<LittleEndian>(k)?;
        }
        for &x in key_start {
            w.write_u64::<LittleEndian>(x)?;
        }
        w.write_u64::<LittleEndian>(positions.len() as u64)?;
        for &p in positions {
            w.write_u64::<LittleEndian>(p)?;
        }
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> MapResult<Self> {
        let err = |e| MapError::from_read(e, "index");
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic).map_err(err)?;
        if &magic != INDEX_MAGIC {
            return Err(MapError::format("not an index file (bad magic)"));
        }
        let version = r.read_u8().map_err(err)?;
        if version != INDEX_VERSION {
            return Err(MapError::format(format!(
                "index version {} is not supported (expected {})",
                version, INDEX_VERSION
            )));
        }
        let opt = IndexOptions {
            bbit: r.read_u8().map_err(err)?,
            kmer: r.read_u8().map_err(err)?,
            mod_bit: r.read_u8().map_err(err)?,
            trans_code: r.read_u8().map_err(err)?,
            min_aa_len: r.read_u32::<LittleEndian>().map_err(err)?,
        };
        opt.check()
            .map_err(|e| MapError::format(format!("index options: {}", e)))?;
        let code = GeneticCode::try_from_id(opt.trans_code)
            .ok_or_else(|| MapError::format("unsupported genetic code in index"))?;
        let store = SequenceStore::read_from(r)?;

        let n_blocks = r.read_u32::<LittleEndian>().map_err(err)? as usize;
        if n_blocks != 1usize << opt.bbit {
            return Err(MapError::format(format!(
                "index has {} blocks, options imply {}",
                n_blocks,
                1usize << opt.bbit
            )));
        }
        let block_off = read_u64_vec(r, n_blocks as u64 + 1)?;
        let n_keys = r.read_u64::<LittleEndian>().map_err(err)?;
        check_offsets(&block_off, n_keys, "block")?;
        let mut keys = Vec::with_capacity(n_keys.min(1 << 24) as usize);
        for _ in 0..n_keys {
            keys.push(r.read_u32::<LittleEndian>().map_err(err)?);
        }
        let key_start = read_u64_vec(r, n_keys + 1)?;
        let n_pos = r.read_u64::<LittleEndian>().map_err(err)?;
        check_offsets(&key_start, n_pos, "key")?;
        let positions = read_u64_vec(r, n_pos)?;
        Ok(KmerIndex::from_parts(
            opt, store, code, block_off, keys, key_start, positions,
        ))
    }

    pub fn dump(&self, path: &Path) -> MapResult<()> {
        let mut w = BufWriter::new(File::create(path)?);
        self.write_to(&mut w)?;
        w.flush()?;
        info!("wrote index to {}", path.display());
        Ok(())
    }

    /// Restore an index written by [`KmerIndex::dump`]. Wrong magic,
    /// unsupported version, inconsistent tables and truncation all give
    /// [`MapError::Format`].
    pub fn restore(path: &Path) -> MapResult<Self> {
        let mut r = BufReader::new(File::open(path)?);
        KmerIndex::read_from(&mut r)
    }

    /// Restore `path` if it is an index file, otherwise read it as FASTA and
    /// build a new index with `opt`.
    pub fn load(path: &Path, opt: &IndexOptions, n_threads: usize) -> MapResult<Self> {
        let mut head = [0u8; 4];
        let n = File::open(path)?.read(&mut head)?;
        if n == 4 && &head == INDEX_MAGIC {
            let idx = KmerIndex::restore(path)?;
            if idx.options() != opt {
                log::warn!(
                    "using index options stored in {} ({:?})",
                    path.display(),
                    idx.options()
                );
            }
            return Ok(idx);
        }
        let store = SequenceStore::from_fasta(path)?;
        KmerIndex::build(store, opt, n_threads)
    }
}
