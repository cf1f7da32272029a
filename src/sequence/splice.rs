//! External splice site scores
//!
//! Text input has one site per line:
//!
//! ```text
//! contig  pos  strand  type  score
//! chr1    1203 +       D     6.2
//! ```
//!
//! `pos` is the 0-based forward-strand coordinate of the first intron base
//! for a donor (`D`) and of the last intron base for an acceptor (`A`), in
//! the orientation of the gene. On the `-` strand the first intron base is
//! therefore the highest coordinate of the intron. Internally sites are kept
//! in strand-local coordinates, one sorted array per contig, strand and type.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{BufRead, Read, Write};

use crate::error::{MapError, MapResult};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpliceSite {
    /// strand-local coordinate
    pub pos: u64,
    pub score: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpliceTable {
    // index: (cid * 2 + rev) * 2 + acceptor
    arrays: Vec<Vec<SpliceSite>>,
}

#[inline]
fn slot(cid: u32, rev: bool, acceptor: bool) -> usize {
    ((cid as usize * 2 + rev as usize) << 1) | acceptor as usize
}

impl SpliceTable {
    pub fn new(n_contigs: usize) -> Self {
        SpliceTable {
            arrays: vec![Vec::new(); n_contigs * 4],
        }
    }

    pub fn n_sites(&self) -> usize {
        self.arrays.iter().map(Vec::len).sum()
    }

    pub fn push(&mut self, cid: u32, rev: bool, acceptor: bool, site: SpliceSite) {
        let s = slot(cid, rev, acceptor);
        if s < self.arrays.len() {
            self.arrays[s].push(site);
        }
    }

    /// Sort every array; a position given twice keeps its last score.
    pub fn finish(&mut self) {
        for a in self.arrays.iter_mut() {
            a.reverse();
            a.sort_by_key(|s| s.pos);
            a.dedup_by_key(|s| s.pos);
        }
    }

    /// Whether any site is known on this contig strand
    pub fn has_strand(&self, cid: u32, rev: bool) -> bool {
        let s = slot(cid, rev, false);
        self.arrays.get(s).is_some_and(|a| !a.is_empty())
            || self.arrays.get(s + 1).is_some_and(|a| !a.is_empty())
    }

    pub fn get(&self, cid: u32, rev: bool, pos: u64, acceptor: bool) -> Option<f32> {
        let a = self.arrays.get(slot(cid, rev, acceptor))?;
        a.binary_search_by_key(&pos, |s| s.pos).ok().map(|i| a[i].score)
    }

    /// All sites of one contig strand and type within `[start, end)`
    pub fn range(&self, cid: u32, rev: bool, acceptor: bool, start: u64, end: u64) -> &[SpliceSite] {
        let Some(a) = self.arrays.get(slot(cid, rev, acceptor)) else {
            return &[];
        };
        let lo = a.partition_point(|s| s.pos < start);
        let hi = a.partition_point(|s| s.pos < end);
        &a[lo..hi.max(lo)]
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> MapResult<()> {
        w.write_u32::<LittleEndian>(self.arrays.len() as u32)?;
        for a in &self.arrays {
            w.write_u64::<LittleEndian>(a.len() as u64)?;
            for s in a {
                w.write_u64::<LittleEndian>(s.pos)?;
                w.write_f32::<LittleEndian>(s.score)?;
            }
        }
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R, n_contigs: usize) -> MapResult<Self> {
        let err = |e| MapError::from_read(e, "splice table");
        let n = r.read_u32::<LittleEndian>().map_err(err)? as usize;
        if n != n_contigs * 4 {
            return Err(MapError::format(format!(
                "splice table has {} arrays, expected {}",
                n,
                n_contigs * 4
            )));
        }
        let mut arrays = Vec::with_capacity(n);
        for _ in 0..n {
            let len = r.read_u64::<LittleEndian>().map_err(err)?;
            let mut a = Vec::with_capacity(len.min(1 << 20) as usize);
            let mut last = None;
            for _ in 0..len {
                let pos = r.read_u64::<LittleEndian>().map_err(err)?;
                let score = r.read_f32::<LittleEndian>().map_err(err)?;
                if last.is_some_and(|p| p >= pos) {
                    return Err(MapError::format("splice sites out of order"));
                }
                last = Some(pos);
                a.push(SpliceSite { pos, score });
            }
            arrays.push(a);
        }
        Ok(SpliceTable { arrays })
    }
}

/// One parsed input line, before coordinate conversion
#[derive(Debug, PartialEq)]
pub(crate) struct SpliceRecord<'a> {
    pub contig: &'a str,
    pub pos: u64,
    pub rev: bool,
    pub acceptor: bool,
    pub score: f32,
}

pub(crate) fn parse_line(line: &str, lineno: usize) -> MapResult<Option<SpliceRecord<'_>>> {
    let line = line.trim_end();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let bad = |what: &str| MapError::format(format!("splice score line {}: {}", lineno, what));
    let mut fields = line.split_whitespace();
    let contig = fields.next().ok_or_else(|| bad("missing contig"))?;
    let pos = fields
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| bad("bad position"))?;
    let rev = match fields.next() {
        Some("+") => false,
        Some("-") => true,
        _ => return Err(bad("strand must be + or -")),
    };
    let acceptor = match fields.next() {
        Some("D") | Some("d") => false,
        Some("A") | Some("a") => true,
        _ => return Err(bad("type must be D or A")),
    };
    let score = fields
        .next()
        .and_then(|s| s.parse::<f32>().ok())
        .filter(|s| s.is_finite())
        .ok_or_else(|| bad("bad score"))?;
    Ok(Some(SpliceRecord {
        contig,
        pos,
        rev,
        acceptor,
        score,
    }))
}

/// Read sites from `reader`. `resolve` maps a contig name to its id and
/// length; sites on unknown contigs or past the contig end are skipped.
/// Returns the table and the number of skipped lines.
pub(crate) fn read_sites<R, F>(
    reader: R,
    n_contigs: usize,
    cap: f32,
    resolve: F,
) -> MapResult<(SpliceTable, usize)>
where
    R: BufRead,
    F: Fn(&str) -> Option<(u32, u64)>,
{
    let mut table = SpliceTable::new(n_contigs);
    let mut skipped = 0usize;
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let Some(rec) = parse_line(&line, i + 1)? else {
            continue;
        };
        let Some((cid, len)) = resolve(rec.contig) else {
            skipped += 1;
            continue;
        };
        if rec.pos >= len {
            skipped += 1;
            continue;
        }
        let pos = if rec.rev { len - 1 - rec.pos } else { rec.pos };
        let score = rec.score.clamp(-cap, cap);
        table.push(cid, rec.rev, rec.acceptor, SpliceSite { pos, score });
    }
    table.finish();
    Ok((table, skipped))
}
