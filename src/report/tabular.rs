//! Tab-separated region lines and the aligned sequence lines

use std::io::{self, Write};

use crate::align::{ExtraDetail, OpKind};
use crate::post::AlignmentRegion;
use crate::sequence::SequenceStore;

/// Write one region line without building an intermediate String.
///
/// Columns: query, qlen, qs, qe, strand, contig, clen, vs, ve, n_iden,
/// blen, score, then `tp:A:`, `fs:i:`, `st:i:` and the op string as `cg:Z:`.
pub fn write_region<W: Write>(
    writer: &mut W,
    prefix: Option<&str>,
    qname: &str,
    qlen: usize,
    region: &AlignmentRegion,
    store: &SequenceStore,
    with_ops: bool,
) -> io::Result<()> {
    let contig = store.contig(region.cid);
    if let Some(p) = prefix {
        write!(writer, "{}\t", p)?;
    }
    write!(writer, "{}\t{}\t{}\t{}", qname, qlen, region.qs, region.qe)?;
    write!(writer, "\t{}", if region.rev { '-' } else { '+' })?;
    write!(writer, "\t{}\t{}\t{}\t{}", contig.name, contig.len, region.vs, region.ve)?;
    let (n_iden, blen, n_fs, n_stop) = region
        .detail
        .as_ref()
        .map_or((0, 0, 0, 0), |d| (d.n_iden, d.blen, d.n_fs, d.n_stop));
    write!(writer, "\t{}\t{}\t{}", n_iden, blen, region.score)?;
    write!(writer, "\ttp:A:{}", if region.is_primary() { 'P' } else { 'S' })?;
    write!(writer, "\tfs:i:{}\tst:i:{}", n_fs, n_stop)?;
    if let Some(d) = region.detail.as_ref() {
        write!(writer, "\tms:i:{}\tda:i:{}", d.dp_max, d.dp_max2)?;
        if with_ops {
            write!(writer, "\tcg:Z:{}", d.cigar())?;
        }
    }
    writeln!(writer)
}

/// `*` line for a query without regions
pub fn write_unmapped<W: Write>(writer: &mut W, prefix: Option<&str>, qname: &str, qlen: usize) -> io::Result<()> {
    if let Some(p) = prefix {
        write!(writer, "{}\t", p)?;
    }
    writeln!(writer, "{}\t{}\t0\t0\t*\t*\t0\t0\t0\t0\t0\t0", qname, qlen)
}

/// Query residues laid out against the alignment columns: inserted
/// residues in lower case, deleted codons as `-`
pub fn aligned_query(detail: &ExtraDetail, qseq: &[u8], qs: u32) -> String {
    let mut out = String::with_capacity(detail.blen as usize);
    let mut q = qs as usize;
    let residue = |i: usize| qseq.get(i).copied().unwrap_or(b'X').to_ascii_uppercase() as char;
    for op in detail.ops() {
        match op.kind {
            OpKind::Match | OpKind::Mismatch => {
                for _ in 0..op.len {
                    out.push(residue(q));
                    q += 1;
                }
            }
            OpKind::Insertion => {
                for _ in 0..op.len {
                    out.push(residue(q).to_ascii_lowercase());
                    q += 1;
                }
            }
            OpKind::Deletion => out.extend(std::iter::repeat('-').take(op.len as usize)),
            OpKind::Frameshift | OpKind::Intron { .. } => {}
        }
    }
    out
}
