//! Contig table and packed genome
//!
//! Coordinates come in two flavours. Forward coordinates count from the
//! start of a contig on the `+` strand. Strand-local coordinates count from
//! the start of the strand being read, so on the `-` strand local position
//! `x` is forward position `len - 1 - x` (complemented).

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, info, warn};
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use super::packed::PackedSeq;
use super::splice::{self, SpliceTable};
use crate::error::{MapError, MapResult};
use crate::utils::alphabet::comp_nt2;
use crate::utils::io::reader;

pub const STORE_MAGIC: &[u8; 4] = b"PMSQ";
pub const STORE_VERSION: u8 = 1;

const MAX_NAME_LEN: usize = 1 << 16;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contig {
    pub name: String,
    /// offset of the first base in the packed sequence
    pub offset: u64,
    pub len: u64,
}

#[derive(Clone, Debug, Default)]
pub struct SequenceStore {
    contigs: Vec<Contig>,
    seq: PackedSeq,
    names: FxHashMap<String, u32>,
    splice: Option<SpliceTable>,
}

impl SequenceStore {
    pub fn new() -> Self {
        SequenceStore::default()
    }

    /// Append a contig. Names must be unique.
    pub fn push(&mut self, name: &str, seq: &[u8]) -> MapResult<u32> {
        if self.names.contains_key(name) {
            return Err(MapError::config(format!("duplicate contig name '{}'", name)));
        }
        if self.splice.is_some() {
            return Err(MapError::config("contigs cannot be added after splice scores"));
        }
        let cid = self.contigs.len() as u32;
        self.contigs.push(Contig {
            name: name.to_string(),
            offset: self.seq.len(),
            len: seq.len() as u64,
        });
        self.seq.extend_ascii(seq);
        self.names.insert(name.to_string(), cid);
        Ok(cid)
    }

    /// Read every record of a (possibly gzip'd) FASTA file.
    pub fn from_fasta(path: &Path) -> MapResult<Self> {
        let records = bio::io::fasta::Reader::new(reader(path)?).records();
        let mut store = SequenceStore::new();
        for record in records {
            let record = record.map_err(|e| MapError::format(format!("FASTA: {}", e)))?;
            if record.seq().is_empty() {
                warn!("skipping empty contig '{}'", record.id());
                continue;
            }
            store.push(record.id(), record.seq())?;
        }
        if store.contigs.is_empty() {
            return Err(MapError::format(format!("no sequences in {}", path.display())));
        }
        info!(
            "read {} contigs, {} bases from {}",
            store.n_contigs(),
            store.total_len(),
            path.display()
        );
        Ok(store)
    }

    pub fn n_contigs(&self) -> usize {
        self.contigs.len()
    }

    pub fn total_len(&self) -> u64 {
        self.seq.len()
    }

    pub fn contigs(&self) -> &[Contig] {
        &self.contigs
    }

    pub fn contig(&self, cid: u32) -> &Contig {
        &self.contigs[cid as usize]
    }

    pub fn contig_id(&self, name: &str) -> Option<u32> {
        self.names.get(name).copied()
    }

    pub fn packed(&self) -> &PackedSeq {
        &self.seq
    }

    /// Contig holding packed offset `off`, and the offset within it
    pub fn locate(&self, off: u64) -> Option<(u32, u64)> {
        let i = self.contigs.partition_point(|c| c.offset <= off);
        if i == 0 {
            return None;
        }
        let c = &self.contigs[i - 1];
        (off < c.offset + c.len).then(|| ((i - 1) as u32, off - c.offset))
    }

    /// 2-bit base at strand-local position `pos`
    #[inline]
    pub fn base(&self, cid: u32, rev: bool, pos: u64) -> u8 {
        let c = &self.contigs[cid as usize];
        if pos >= c.len {
            return 4;
        }
        if rev {
            comp_nt2(self.seq.get_nt2(c.offset + c.len - 1 - pos))
        } else {
            self.seq.get_nt2(c.offset + pos)
        }
    }

    /// Strand-local bases `[start, end)` as 2-bit codes, replacing `out`.
    /// The range is clamped to the contig.
    pub fn extract(&self, cid: u32, rev: bool, start: u64, end: u64, out: &mut Vec<u8>) {
        out.clear();
        let c = &self.contigs[cid as usize];
        let end = end.min(c.len);
        if start >= end {
            return;
        }
        out.reserve((end - start) as usize);
        if rev {
            for pos in start..end {
                out.push(comp_nt2(self.seq.get_nt2(c.offset + c.len - 1 - pos)));
            }
        } else {
            out.extend((start..end).map(|pos| self.seq.get_nt2(c.offset + pos)));
        }
    }

    /// Strand-local half-open span to forward coordinates
    #[inline]
    pub fn to_forward(&self, cid: u32, rev: bool, start: u64, end: u64) -> (u64, u64) {
        if rev {
            let len = self.contigs[cid as usize].len;
            (len - end, len - start)
        } else {
            (start, end)
        }
    }

    pub fn splice_table(&self) -> Option<&SpliceTable> {
        self.splice.as_ref()
    }

    /// External score of the site at strand-local `pos`, if one was loaded
    pub fn splice_score(&self, cid: u32, rev: bool, pos: u64, acceptor: bool) -> Option<f32> {
        self.splice.as_ref()?.get(cid, rev, pos, acceptor)
    }

    /// Load external splice scores, clipping them to `[-cap, cap]`.
    /// Returns the number of sites kept.
    pub fn load_splice_scores(&mut self, path: &Path, cap: f32) -> MapResult<usize> {
        let input = reader(path)?;
        let (table, skipped) = splice::read_sites(input, self.contigs.len(), cap.abs(), |name| {
            self.contig_id(name).map(|cid| (cid, self.contigs[cid as usize].len))
        })?;
        if skipped > 0 {
            warn!("{} splice sites on unknown contigs or out of range were skipped", skipped);
        }
        let n = table.n_sites();
        debug!("loaded {} splice sites from {}", n, path.display());
        self.splice = Some(table);
        Ok(n)
    }

    pub fn heap_bytes(&self) -> usize {
        self.seq.heap_bytes()
            + self.contigs.iter().map(|c| c.name.capacity()).sum::<usize>()
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> MapResult<()> {
        w.write_all(STORE_MAGIC)?;
        w.write_u8(STORE_VERSION)?;
        w.write_u32::<LittleEndian>(self.contigs.len() as u32)?;
        for c in &self.contigs {
            w.write_u32::<LittleEndian>(c.name.len() as u32)?;
            w.write_all(c.name.as_bytes())?;
            w.write_u64::<LittleEndian>(c.len)?;
        }
        w.write_u64::<LittleEndian>(self.seq.len())?;
        w.write_all(self.seq.as_bytes())?;
        match &self.splice {
            Some(table) => {
                w.write_u8(1)?;
                table.write_to(w)?;
            }
            None => w.write_u8(0)?,
        }
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> MapResult<Self> {
        let err = |e| MapError::from_read(e, "sequence store");
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic).map_err(err)?;
        if &magic != STORE_MAGIC {
            return Err(MapError::format("not a sequence store (bad magic)"));
        }
        let version = r.read_u8().map_err(err)?;
        if version != STORE_VERSION {
            return Err(MapError::format(format!(
                "sequence store version {} is not supported (expected {})",
                version, STORE_VERSION
            )));
        }
        let n = r.read_u32::<LittleEndian>().map_err(err)? as usize;
        let mut contigs = Vec::with_capacity(n.min(1 << 20));
        let mut names = FxHashMap::default();
        let mut offset = 0u64;
        for cid in 0..n {
            let name_len = r.read_u32::<LittleEndian>().map_err(err)? as usize;
            if name_len > MAX_NAME_LEN {
                return Err(MapError::format(format!("contig name of {} bytes", name_len)));
            }
            let mut name = vec![0u8; name_len];
            r.read_exact(&mut name).map_err(err)?;
            let name = String::from_utf8(name)
                .map_err(|_| MapError::format("contig name is not UTF-8"))?;
            let len = r.read_u64::<LittleEndian>().map_err(err)?;
            if names.insert(name.clone(), cid as u32).is_some() {
                return Err(MapError::format(format!("duplicate contig '{}'", name)));
            }
            contigs.push(Contig { name, offset, len });
            offset += len;
        }
        let total = r.read_u64::<LittleEndian>().map_err(err)?;
        if total != offset {
            return Err(MapError::format(format!(
                "packed length {} does not match contig total {}",
                total, offset
            )));
        }
        let n_bytes = total.div_ceil(2) as usize;
        let mut data = Vec::new();
        r.by_ref()
            .take(n_bytes as u64)
            .read_to_end(&mut data)
            .map_err(err)?;
        if data.len() != n_bytes {
            return Err(MapError::format("truncated sequence store"));
        }
        let seq = PackedSeq::from_raw(data, total)
            .ok_or_else(|| MapError::format("packed sequence length mismatch"))?;
        let splice = match r.read_u8().map_err(err)? {
            0 => None,
            1 => Some(SpliceTable::read_from(r, contigs.len())?),
            x => return Err(MapError::format(format!("bad splice table flag {}", x))),
        };
        Ok(SequenceStore {
            contigs,
            seq,
            names,
            splice,
        })
    }

    pub fn dump(&self, path: &Path) -> MapResult<()> {
        let mut w = BufWriter::new(File::create(path)?);
        self.write_to(&mut w)?;
        w.flush()?;
        Ok(())
    }

    pub fn restore(path: &Path) -> MapResult<Self> {
        let mut r = BufReader::new(File::open(path)?);
        SequenceStore::read_from(&mut r)
    }
}

impl PartialEq for SequenceStore {
    fn eq(&self, other: &Self) -> bool {
        self.contigs == other.contigs && self.seq == other.seq && self.splice == other.splice
    }
}
