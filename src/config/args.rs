//! Command-line arguments

use clap::Args;
use std::path::PathBuf;

use super::{IndexOptions, MapFlags, MapOptions, SpliceModel};
use crate::error::MapResult;

/// Index construction options shared by `index` and `map`
#[derive(Args, Debug, Clone)]
pub struct IndexArgs {
    /// k-mer length (residues)
    #[arg(short = 'k', long, default_value_t = 6)]
    pub kmer: u8,
    /// log2 of the number of hash blocks
    #[arg(long, default_value_t = 8)]
    pub bbit: u8,
    /// modulus sampling bits
    #[arg(short = 'M', long, default_value_t = 1)]
    pub mod_bit: u8,
    /// genetic code
    #[arg(short = 'T', long, default_value_t = 1)]
    pub trans_code: u8,
    /// minimum ORF length to index (residues)
    #[arg(short = 'L', long, default_value_t = 30)]
    pub min_aa_len: u32,
}

impl IndexArgs {
    pub fn to_options(&self) -> MapResult<IndexOptions> {
        let opt = IndexOptions {
            bbit: self.bbit,
            kmer: self.kmer,
            mod_bit: self.mod_bit,
            trans_code: self.trans_code,
            min_aa_len: self.min_aa_len,
        };
        opt.check()?;
        Ok(opt)
    }
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// genome FASTA (optionally gzip'd)
    pub genome: PathBuf,
    /// index file to write
    #[arg(short = 'd', long)]
    pub out: PathBuf,
    #[arg(short = 't', long, default_value_t = 4)]
    pub num_threads: usize,
    #[command(flatten)]
    pub index: IndexArgs,
}

#[derive(Args, Debug)]
pub struct MapArgs {
    /// genome FASTA or prebuilt index
    pub target: PathBuf,
    /// protein FASTA (optionally gzip'd)
    pub query: PathBuf,
    #[arg(short, long)]
    pub out: Option<PathBuf>,
    #[arg(short = 't', long, default_value_t = 4)]
    pub num_threads: usize,
    #[command(flatten)]
    pub index: IndexArgs,

    /// splice score file: `contig pos strand D|A score` per line
    #[arg(short = 'j', long)]
    pub splice_scores: Option<PathBuf>,
    /// absolute cap applied to splice scores on load
    #[arg(long, default_value_t = 15.0)]
    pub splice_cap: f32,

    #[arg(long, default_value_t = 100_000_000)]
    pub mini_batch_size: u64,
    #[arg(long, default_value_t = 20_000)]
    pub max_occ: u32,
    #[arg(short = 'G', long)]
    pub max_intron: Option<i32>,
    #[arg(long, default_value_t = 30)]
    pub min_intron: i32,
    #[arg(long, default_value_t = 1000)]
    pub max_gap: i32,
    #[arg(long, default_value_t = 1000)]
    pub bw: i32,
    #[arg(long, default_value_t = 32)]
    pub dp_bw: i32,
    #[arg(short = 'e', long, default_value_t = 10_000)]
    pub max_ext: i32,
    #[arg(long, default_value_t = 200_000)]
    pub max_ava: usize,
    #[arg(short = 'n', long, default_value_t = 3)]
    pub min_chn_cnt: usize,
    #[arg(long, default_value_t = 25)]
    pub max_chn_max_skip: usize,
    #[arg(long, default_value_t = 5000)]
    pub max_chn_iter: usize,
    #[arg(long, default_value_t = 0)]
    pub min_chn_sc: i32,
    #[arg(long, default_value_t = 0.75)]
    pub chn_coef_log: f32,
    #[arg(long, default_value_t = 0.5)]
    pub mask_level: f32,
    #[arg(long, default_value_t = i32::MAX)]
    pub mask_len: i32,
    #[arg(short = 'p', long, default_value_t = 0.7)]
    pub pri_ratio: f32,
    #[arg(long, default_value_t = 0.5)]
    pub out_sim: f32,
    #[arg(long, default_value_t = 0.1)]
    pub out_cov: f32,
    #[arg(short = 'N', long, default_value_t = 30)]
    pub best_n: usize,
    #[arg(long, default_value_t = 1000)]
    pub out_n: usize,
    #[arg(long, default_value_t = 5)]
    pub kmer2: u8,
    #[arg(short = 'O', long, default_value_t = 11)]
    pub gap_open: i32,
    #[arg(short = 'E', long, default_value_t = 1)]
    pub gap_ext: i32,
    #[arg(short = 'J', long, default_value_t = 29)]
    pub intron_open: i32,
    #[arg(short = 'F', long, default_value_t = 23)]
    pub frameshift: i32,
    #[arg(long, default_value_t = 43)]
    pub io_end: i32,
    #[arg(short = 'C', long, default_value_t = 1.4)]
    pub ie_coef: f32,
    /// 0: off, 1: GT-AG/GC-AG, 2: also AT-AC
    #[arg(long, default_value_t = 1)]
    pub splice_model: u8,
    #[arg(long, default_value_t = -7, allow_negative_numbers = true)]
    pub sp_null_bonus: i32,
    #[arg(long, default_value_t = 7)]
    pub sp_max_bonus: i32,
    #[arg(long, default_value_t = 0.8)]
    pub sp_scale: f32,
    #[arg(long, default_value_t = 100)]
    pub xdrop: i32,
    #[arg(short = 'B', long, default_value_t = 5)]
    pub end_bonus: i32,
    #[arg(long, default_value_t = 5000)]
    pub max_intron_flank: i32,
    #[arg(long, default_value_t = 1 << 26)]
    pub max_dp_cells: usize,
    #[arg(long, default_value_t = '_')]
    pub gff_delim: char,
    #[arg(short = 'P', long, default_value = "PM")]
    pub gff_prefix: String,

    #[arg(long)]
    pub no_splice: bool,
    #[arg(long)]
    pub no_align: bool,
    #[arg(short = 'u', long)]
    pub show_unmap: bool,
    #[arg(long)]
    pub gff: bool,
    #[arg(long)]
    pub gtf: bool,
    #[arg(long)]
    pub no_paf: bool,
    #[arg(long)]
    pub no_pre_chain: bool,
    #[arg(long)]
    pub aln: bool,
    #[arg(long)]
    pub trans: bool,
    #[arg(long)]
    pub no_cs: bool,
}

impl MapArgs {
    /// Build mapping options. `max_intron` is left at its default when not
    /// given so the caller can derive it from the genome size.
    pub fn to_options(&self) -> MapResult<MapOptions> {
        let mut opt = MapOptions {
            flags: MapFlags {
                no_splice: self.no_splice,
                no_align: self.no_align,
                show_unmap: self.show_unmap,
                gff: self.gff,
                no_paf: self.no_paf,
                gtf: self.gtf,
                no_pre_chain: self.no_pre_chain,
                show_residue: self.aln,
                show_trans: self.trans,
                no_cs: self.no_cs,
            },
            mini_batch_size: self.mini_batch_size,
            max_occ: self.max_occ,
            max_gap: self.max_gap,
            min_intron: self.min_intron,
            bw: self.bw,
            dp_bw: self.dp_bw,
            max_ext: self.max_ext,
            max_ava: self.max_ava,
            min_chn_cnt: self.min_chn_cnt,
            max_chn_max_skip: self.max_chn_max_skip,
            max_chn_iter: self.max_chn_iter,
            min_chn_sc: self.min_chn_sc,
            chn_coef_log: self.chn_coef_log,
            mask_level: self.mask_level,
            mask_len: self.mask_len,
            pri_ratio: self.pri_ratio,
            out_sim: self.out_sim,
            out_cov: self.out_cov,
            best_n: self.best_n,
            out_n: self.out_n,
            kmer2: self.kmer2,
            go: self.gap_open,
            ge: self.gap_ext,
            io: self.intron_open,
            io_end: self.io_end,
            ie_coef: self.ie_coef,
            sp_model: SpliceModel::from_level(self.splice_model)?,
            sp_null_bonus: self.sp_null_bonus,
            sp_max_bonus: self.sp_max_bonus,
            sp_scale: self.sp_scale,
            xdrop: self.xdrop,
            end_bonus: self.end_bonus,
            max_intron_flank: self.max_intron_flank,
            max_dp_cells: self.max_dp_cells,
            gff_delim: self.gff_delim,
            gff_prefix: self.gff_prefix.clone(),
            ..MapOptions::default()
        };
        if let Some(max_intron) = self.max_intron {
            opt.max_intron = max_intron;
        }
        opt.set_fs(self.frameshift);
        Ok(opt)
    }
}
