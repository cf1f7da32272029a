//! Output writer
//!
//! Region lines come first for each region, followed by the optional
//! `##STA`/`##ATA` sequence lines and the GFF3 or GTF features. When
//! features are written, region lines are prefixed with `##PAF` so the
//! stream stays valid GFF.

pub mod gff;
pub mod tabular;

use std::io::{self, Write};

use crate::config::MapOptions;
use crate::mapper::MapOutput;
use crate::sequence::SequenceStore;

pub struct Reporter<'a> {
    store: &'a SequenceStore,
    opt: &'a MapOptions,
    /// mRNAs written so far, numbering the GFF ids
    n_mrna: u64,
}

impl<'a> Reporter<'a> {
    pub fn new(store: &'a SequenceStore, opt: &'a MapOptions) -> Self {
        Reporter { store, opt, n_mrna: 0 }
    }

    fn features(&self) -> bool {
        self.opt.flags.gff || self.opt.flags.gtf
    }

    fn line_prefix(&self) -> Option<&'static str> {
        self.features().then_some("##PAF")
    }

    pub fn write_header<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if self.opt.flags.gff {
            writeln!(writer, "##gff-version 3")?;
        }
        Ok(())
    }

    fn next_id(&mut self) -> String {
        self.n_mrna += 1;
        format!("{}{}{:06}", self.opt.gff_prefix, self.opt.gff_delim, self.n_mrna)
    }

    /// Write everything reported for one query
    pub fn write_query<W: Write>(
        &mut self,
        writer: &mut W,
        qname: &str,
        qseq: &[u8],
        out: &MapOutput,
    ) -> io::Result<()> {
        let flags = self.opt.flags;
        if out.regions.is_empty() {
            if flags.show_unmap && !flags.no_paf {
                tabular::write_unmapped(writer, self.line_prefix(), qname, out.qlen)?;
            }
            return Ok(());
        }
        for (rank, region) in out.regions.iter().enumerate() {
            if !flags.no_paf {
                tabular::write_region(
                    writer,
                    self.line_prefix(),
                    qname,
                    out.qlen,
                    region,
                    self.store,
                    !flags.no_cs,
                )?;
            }
            if let Some(d) = region.detail.as_ref() {
                if flags.show_trans {
                    if let Some(t) = d.translation.as_ref() {
                        writeln!(writer, "##STA\t{}", t)?;
                    }
                }
                if flags.show_residue {
                    writeln!(writer, "##ATA\t{}", tabular::aligned_query(d, qseq, region.qs))?;
                }
            }
            if self.features() {
                let id = self.next_id();
                if flags.gff {
                    gff::write_gff3(writer, &id, rank + 1, qname, region, self.store)?;
                } else {
                    gff::write_gtf(writer, &id, qname, region, self.store)?;
                }
            }
        }
        Ok(())
    }
}
