//! Index and mapping configuration
//!
//! [`IndexOptions`] is fixed when an index is built and travels with it in the
//! index file. [`MapOptions`] is per run; its defaults are tuned for
//! mammalian-size genomes and [`MapOptions::set_max_intron`] adapts the intron
//! bound to the genome size.

pub mod args;

use crate::error::{MapError, MapResult};
use crate::utils::alphabet::{AA_SIZE, BITS_PER_AA};
use crate::utils::genetic_code::GeneticCode;
use crate::utils::matrix::ScoreMatrix;

/// Options fixed at index build time
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexOptions {
    /// log2 of the number of hash blocks
    pub bbit: u8,
    /// k-mer length in residues
    pub kmer: u8,
    /// keep a k-mer when the low `mod_bit` bits above the block bits are zero
    pub mod_bit: u8,
    /// NCBI genetic code ID
    pub trans_code: u8,
    /// ORFs shorter than this many residues are not indexed
    pub min_aa_len: u32,
}

impl Default for IndexOptions {
    fn default() -> Self {
        IndexOptions {
            bbit: 8,
            kmer: 6,
            mod_bit: 1,
            trans_code: 1,
            min_aa_len: 30,
        }
    }
}

impl IndexOptions {
    /// Number of bits in a packed k-mer
    pub fn kmer_bits(&self) -> u32 {
        self.kmer as u32 * BITS_PER_AA
    }

    pub fn check(&self) -> MapResult<()> {
        if self.kmer < 2 || self.kmer_bits() > 32 {
            return Err(MapError::config(format!(
                "k-mer length {} must be within [2, 8]",
                self.kmer
            )));
        }
        if self.bbit == 0 || self.bbit as u32 + self.mod_bit as u32 >= self.kmer_bits() {
            return Err(MapError::config(format!(
                "block bits ({}) plus sampling bits ({}) must be below the k-mer width ({} bits)",
                self.bbit,
                self.mod_bit,
                self.kmer_bits()
            )));
        }
        if self.bbit > 24 {
            return Err(MapError::config("block bits must not exceed 24"));
        }
        if !GeneticCode::is_supported(self.trans_code) {
            return Err(MapError::config(format!(
                "unsupported genetic code {}",
                self.trans_code
            )));
        }
        if self.min_aa_len < self.kmer as u32 {
            return Err(MapError::config("minimum ORF length is shorter than the k-mer"));
        }
        Ok(())
    }
}

/// Output and behaviour switches
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MapFlags {
    /// treat every target gap as an indel, never as an intron
    pub no_splice: bool,
    /// report chains only, skip the DP
    pub no_align: bool,
    /// write a line for queries without regions
    pub show_unmap: bool,
    pub gff: bool,
    /// suppress the tabular region lines
    pub no_paf: bool,
    pub gtf: bool,
    /// keep anchors without a nearby partner
    pub no_pre_chain: bool,
    pub show_residue: bool,
    pub show_trans: bool,
    /// leave out the op string
    pub no_cs: bool,
}

/// Dinucleotide splice signal model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SpliceModel {
    /// no signal scoring
    Off,
    /// GT-AG favoured, GC-AG mildly penalised
    #[default]
    Canonical,
    /// GT-AG, GC-AG and AT-AC all recognised
    Extended,
}

impl SpliceModel {
    pub fn from_level(level: u8) -> MapResult<Self> {
        match level {
            0 => Ok(SpliceModel::Off),
            1 => Ok(SpliceModel::Canonical),
            2 => Ok(SpliceModel::Extended),
            _ => Err(MapError::config(format!("unknown splice model {}", level))),
        }
    }
}

/// Per-run mapping options
#[derive(Clone, Debug)]
pub struct MapOptions {
    pub flags: MapFlags,
    /// residues read per batch by the driver
    pub mini_batch_size: u64,
    /// k-mers with more occurrences are not used for seeding
    pub max_occ: u32,
    /// largest query gap (aa) bridged in a chain
    pub max_gap: i32,
    /// largest intron (nt)
    pub max_intron: i32,
    pub min_max_intron: i32,
    pub max_max_intron: i32,
    /// smallest intron (nt) the aligner will open
    pub min_intron: i32,
    /// chaining bandwidth (aa) for indels
    pub bw: i32,
    /// DP band half width (aa) around chain anchors
    pub dp_bw: i32,
    /// extension (nt) beyond the chain ends
    pub max_ext: i32,
    /// anchor cap per query
    pub max_ava: usize,
    pub min_chn_cnt: usize,
    pub max_chn_max_skip: usize,
    pub max_chn_iter: usize,
    pub min_chn_sc: i32,
    pub chn_coef_log: f32,
    pub chn_gap_open: f32,
    pub chn_gap_ext: f32,
    pub chn_intron_open: f32,
    pub mask_level: f32,
    pub mask_len: i32,
    pub pri_ratio: f32,
    pub out_sim: f32,
    pub out_cov: f32,
    pub best_n: usize,
    pub out_n: usize,
    /// k-mer length for gap re-seeding, 0 disables
    pub kmer2: u8,
    pub go: i32,
    pub ge: i32,
    pub io: i32,
    /// frameshift and in-frame stop penalty
    pub fs: i32,
    /// intron open penalty close to the protein ends
    pub io_end: i32,
    pub ie_coef: f32,
    pub sp_model: SpliceModel,
    pub sp_null_bonus: i32,
    pub sp_max_bonus: i32,
    pub sp_scale: f32,
    pub xdrop: i32,
    pub end_bonus: i32,
    /// residues in the score matrix
    pub asize: usize,
    pub gff_delim: char,
    pub gff_prefix: String,
    /// flank (nt) kept on each side of a long gap in the DP band
    pub max_intron_flank: i32,
    /// DP cells above which a chain is skipped
    pub max_dp_cells: usize,
    pub mat: ScoreMatrix,
}

/// Residues from either protein end within which `io_end` applies
pub const END_INTRON_LEN: usize = 10;

impl Default for MapOptions {
    fn default() -> Self {
        let mut opt = MapOptions {
            flags: MapFlags::default(),
            mini_batch_size: 100_000_000,
            max_occ: 20_000,
            max_gap: 1000,
            max_intron: 200_000,
            min_max_intron: 10_000,
            max_max_intron: 200_000,
            min_intron: 30,
            bw: 1000,
            dp_bw: 32,
            max_ext: 10_000,
            max_ava: 200_000,
            min_chn_cnt: 3,
            max_chn_max_skip: 25,
            max_chn_iter: 5000,
            min_chn_sc: 0,
            chn_coef_log: 0.75,
            chn_gap_open: 2.0,
            chn_gap_ext: 0.25,
            chn_intron_open: 3.0,
            mask_level: 0.5,
            mask_len: i32::MAX,
            pri_ratio: 0.7,
            out_sim: 0.5,
            out_cov: 0.1,
            best_n: 30,
            out_n: 1000,
            kmer2: 5,
            go: 11,
            ge: 1,
            io: 29,
            fs: 23,
            io_end: 43,
            ie_coef: 1.4,
            sp_model: SpliceModel::Canonical,
            sp_null_bonus: -7,
            sp_max_bonus: 7,
            sp_scale: 0.8,
            xdrop: 100,
            end_bonus: 5,
            asize: AA_SIZE,
            gff_delim: '_',
            gff_prefix: "PM".to_string(),
            max_intron_flank: 5000,
            max_dp_cells: 1 << 26,
            mat: ScoreMatrix::blosum62(),
        };
        opt.set_fs(opt.fs);
        opt
    }
}

impl MapOptions {
    /// Set the frameshift penalty; stop codons in the matrix cost the same.
    pub fn set_fs(&mut self, fs: i32) {
        self.fs = fs;
        self.mat.set_stop_penalty(fs);
    }

    /// Scale the intron bound with the genome size: `3.6 * sqrt(gsize)`,
    /// clamped to `[min_max_intron, max_max_intron]`.
    pub fn set_max_intron(&mut self, gsize: u64) {
        let estimate = (3.6 * (gsize as f64).sqrt()) as i64;
        let estimate = estimate.clamp(self.min_max_intron as i64, self.max_max_intron as i64);
        self.max_intron = estimate as i32;
    }

    pub fn check(&self) -> MapResult<()> {
        let fail = |msg: String| Err(MapError::Config(msg));
        if self.go < 0 || self.ge < 0 || self.io < 0 || self.io_end < 0 {
            return fail("gap and intron penalties must be non-negative".into());
        }
        if self.fs <= 0 {
            return fail(format!("frameshift penalty must be positive, got {}", self.fs));
        }
        if self.min_intron < 4 {
            return fail(format!("minimum intron {} is too small", self.min_intron));
        }
        if self.max_intron < self.min_intron {
            return fail(format!(
                "maximum intron {} is below the minimum intron {}",
                self.max_intron, self.min_intron
            ));
        }
        if self.min_max_intron > self.max_max_intron {
            return fail("intron bound window is empty".into());
        }
        if self.bw <= 0 || self.dp_bw <= 0 || self.max_gap <= 0 {
            return fail("bandwidths and maximum gap must be positive".into());
        }
        if self.max_ext < 0 || self.max_intron_flank <= 0 {
            return fail("extension and flank lengths must be positive".into());
        }
        if self.xdrop <= 0 {
            return fail(format!("x-drop must be positive, got {}", self.xdrop));
        }
        if self.max_occ == 0 || self.max_ava == 0 {
            return fail("occurrence and anchor caps must be positive".into());
        }
        if self.kmer2 as u32 * BITS_PER_AA > 32 {
            return fail(format!("second-round k-mer {} is too long", self.kmer2));
        }
        for (name, v) in [
            ("mask level", self.mask_level),
            ("primary ratio", self.pri_ratio),
            ("output similarity", self.out_sim),
            ("output coverage", self.out_cov),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return fail(format!("{} must be within [0, 1], got {}", name, v));
            }
        }
        if self.sp_max_bonus < 0 || self.sp_scale < 0.0 {
            return fail("splice bonus cap and scale must be non-negative".into());
        }
        if self.asize != self.mat.size() {
            return fail(format!(
                "alphabet size {} does not match the {}x{} matrix",
                self.asize,
                self.mat.size(),
                self.mat.size()
            ));
        }
        if self.max_dp_cells == 0 {
            return fail("DP cell bound must be positive".into());
        }
        if self.flags.gff && self.flags.gtf {
            return fail("GFF3 and GTF output are mutually exclusive".into());
        }
        Ok(())
    }

    /// Intron open penalty for an intron after `i` residues of an
    /// `m`-residue protein.
    #[inline]
    pub fn intron_open(&self, i: usize, m: usize) -> i32 {
        if i < END_INTRON_LEN || i + END_INTRON_LEN > m {
            self.io_end
        } else {
            self.io
        }
    }
}
