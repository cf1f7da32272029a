//! GFF3 and GTF feature lines

use std::io::{self, Write};

use crate::align::FeatureKind;
use crate::post::AlignmentRegion;
use crate::sequence::SequenceStore;

const SOURCE: &str = "protomap";

fn strand(rev: bool) -> char {
    if rev {
        '-'
    } else {
        '+'
    }
}

/// mRNA, CDS and stop_codon lines of one region. `id` names the mRNA;
/// `rank` is the 1-based position of the region among the query's regions.
pub fn write_gff3<W: Write>(
    writer: &mut W,
    id: &str,
    rank: usize,
    qname: &str,
    region: &AlignmentRegion,
    store: &SequenceStore,
) -> io::Result<()> {
    let contig = &store.contig(region.cid).name;
    let s = strand(region.rev);
    write!(
        writer,
        "{}\t{}\tmRNA\t{}\t{}\t{}\t{}\t.\tID={};Rank={}",
        contig,
        SOURCE,
        region.vs + 1,
        region.ve,
        region.score,
        s,
        id,
        rank
    )?;
    if let Some(d) = region.detail.as_ref() {
        write!(writer, ";Identity={:.4};Positive={:.4}", region.identity(), region.similarity())?;
        if d.n_fs > 0 {
            write!(writer, ";Frameshift={}", d.n_fs)?;
        }
        if d.n_stop > 0 {
            write!(writer, ";StopCodon={}", d.n_stop)?;
        }
    }
    writeln!(writer, ";Target={} {} {}", qname, region.qs + 1, region.qe)?;

    for f in &region.features {
        let (kind, phase) = match f.kind {
            FeatureKind::Cds => ("CDS", f.phase),
            FeatureKind::Stop => ("stop_codon", 0),
        };
        write!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\tParent={};Rank={}",
            contig,
            SOURCE,
            kind,
            f.vs + 1,
            f.ve,
            f.score,
            s,
            phase,
            id,
            rank
        )?;
        if f.kind == FeatureKind::Cds {
            if f.blen > 0 {
                write!(writer, ";Identity={:.4}", f.n_iden as f32 / f.blen as f32)?;
            }
            if let Some(a) = f.acceptor_str() {
                write!(writer, ";Acceptor={}", a)?;
            }
            if let Some(d) = f.donor_str() {
                write!(writer, ";Donor={}", d)?;
            }
            write!(writer, ";Target={} {} {}", qname, f.qs + 1, f.qe)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// transcript, CDS and stop_codon lines in GTF
pub fn write_gtf<W: Write>(
    writer: &mut W,
    id: &str,
    qname: &str,
    region: &AlignmentRegion,
    store: &SequenceStore,
) -> io::Result<()> {
    let contig = &store.contig(region.cid).name;
    let s = strand(region.rev);
    writeln!(
        writer,
        "{}\t{}\ttranscript\t{}\t{}\t{}\t{}\t.\tgene_id \"{}\"; transcript_id \"{}\"; query \"{}\";",
        contig,
        SOURCE,
        region.vs + 1,
        region.ve,
        region.score,
        s,
        id,
        id,
        qname
    )?;
    let mut exon = 0;
    for f in &region.features {
        let (kind, phase) = match f.kind {
            FeatureKind::Cds => {
                exon += 1;
                ("CDS", f.phase)
            }
            FeatureKind::Stop => ("stop_codon", 0),
        };
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\tgene_id \"{}\"; transcript_id \"{}\"; exon_number \"{}\";",
            contig,
            SOURCE,
            kind,
            f.vs + 1,
            f.ve,
            f.score,
            s,
            phase,
            id,
            id,
            exon
        )?;
    }
    Ok(())
}
