//! End-to-end mapping of synthetic genes

use bio::io::fasta;

use protomap::align::FeatureKind;
use protomap::chain::dp::{chain_anchors, ChainBuffers};
use protomap::chain::select::{prefilter_isolated, select_chains};
use protomap::chain::ChainConfig;
use protomap::seed::{collect_anchors, refine_chain, RefineBuffers, RefineParams};
use protomap::utils::alphabet::{encode_protein, reduce};
use protomap::{map, map_batch, Degradation, KmerIndex, MapOptions, ThreadScratch};

use super::helpers::{
    back_translate, build_index, contig_with, random_protein, revcomp, rng, single_exon, two_exon,
    two_exon_repeated_boundary,
};

fn map_one(index: &KmerIndex, opt: &MapOptions, seq: &[u8]) -> protomap::MapOutput {
    let mut scratch = ThreadScratch::new();
    map(index, opt, "q", seq, &mut scratch)
}

fn cds_features(region: &protomap::AlignmentRegion) -> Vec<&protomap::align::Feature> {
    region
        .features
        .iter()
        .filter(|f| f.kind == FeatureKind::Cds)
        .collect()
}

/// Writes a splice score file marking `donor` and `acceptor` on chr1 `+`
fn with_splice_sites(index: &mut KmerIndex, donor: usize, acceptor: usize) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sites.tsv");
    let text = format!("chr1\t{}\t+\tD\t5.0\nchr1\t{}\t+\tA\t5.0\n", donor, acceptor);
    std::fs::write(&path, text).unwrap();
    assert_eq!(index.set_splice_scores(&path, 15.0).unwrap(), 2);
    dir
}

#[test]
fn test_single_exon_forward() {
    let gene = single_exon(21);
    let index = build_index(&[("chr1", gene.genome)]);
    let out = map_one(&index, &MapOptions::default(), &gene.protein);
    assert_eq!(out.qlen, 50);
    assert_eq!(out.regions.len(), 1);
    let r = &out.regions[0];
    assert!(r.is_primary());
    assert!(!r.rev);
    assert_eq!((r.qs, r.qe), (0, 50));
    assert_eq!((r.vs, r.ve), (100, 250));
    let cds = cds_features(r);
    assert_eq!(cds.len(), 1);
    assert_eq!(cds[0].n_fs, 0);
    assert_eq!(cds[0].n_stop, 0);
    assert_eq!(cds[0].n_iden, 50);
    let detail = r.detail.as_ref().unwrap();
    assert_eq!(detail.n_introns(), 0);
    assert_eq!((detail.n_fs, detail.n_stop), (0, 0));
    assert_eq!(detail.dist_start, Some(0));
    assert!((r.identity() - 1.0).abs() < 1e-6);
}

#[test]
fn test_single_exon_reverse_strand() {
    let gene = single_exon(22);
    let index = build_index(&[("chr1", revcomp(&gene.genome))]);
    let out = map_one(&index, &MapOptions::default(), &gene.protein);
    assert_eq!(out.regions.len(), 1);
    let r = &out.regions[0];
    assert!(r.rev);
    assert_eq!((r.qs, r.qe), (0, 50));
    assert_eq!((r.vs, r.ve), (750, 900));
    let cds = cds_features(r);
    assert_eq!((cds[0].vs, cds[0].ve), (750, 900));
}

#[test]
fn test_stop_codon_feature() {
    let mut r = rng(23);
    let protein = random_protein(&mut r, 60);
    let mut cds = back_translate(&protein);
    cds.extend_from_slice(b"TAA");
    let index = build_index(&[("chr1", contig_with(&mut r, 1200, 300, &cds))]);
    let out = map_one(&index, &MapOptions::default(), &protein);
    let region = &out.regions[0];
    assert_eq!((region.vs, region.ve), (300, 483));
    let stop: Vec<_> = region
        .features
        .iter()
        .filter(|f| f.kind == FeatureKind::Stop)
        .collect();
    assert_eq!(stop.len(), 1);
    assert_eq!((stop[0].vs, stop[0].ve), (480, 483));
    assert_eq!(region.detail.as_ref().unwrap().dist_stop, Some(0));
}

#[test]
fn test_two_exons_phase0() {
    let gene = two_exon(24, 0);
    let mut index = build_index(&[("chr1", gene.genome.clone())]);
    let _dir = with_splice_sites(&mut index, gene.donor, gene.acceptor);
    let out = map_one(&index, &MapOptions::default(), &gene.protein);
    assert_eq!(out.regions.len(), 1);
    let r = &out.regions[0];
    assert_eq!((r.qs, r.qe), (0, 80));
    let cds = cds_features(r);
    assert_eq!(cds.len(), 2);
    assert_eq!((cds[0].vs, cds[0].ve), (200, 320));
    assert_eq!((cds[0].qs, cds[0].qe), (0, 40));
    assert_eq!(cds[0].donor_str().as_deref(), Some("GT"));
    assert_eq!(cds[0].donor_score, 4);
    assert_eq!((cds[1].vs, cds[1].ve), (820, 940));
    assert_eq!((cds[1].qs, cds[1].qe), (40, 80));
    assert_eq!(cds[1].phase, 0);
    assert_eq!(cds[1].acceptor_str().as_deref(), Some("AG"));
    assert_eq!(cds[1].acceptor_score, 4);
    assert_eq!(r.detail.as_ref().unwrap().n_introns(), 1);
}

#[test]
fn test_two_exons_repeated_boundary_residue() {
    let gene = two_exon_repeated_boundary(32);
    let mut index = build_index(&[("chr1", gene.genome.clone())]);
    let _dir = with_splice_sites(&mut index, gene.donor, gene.acceptor);
    let out = map_one(&index, &MapOptions::default(), &gene.protein);
    assert_eq!(out.regions.len(), 1);
    let r = &out.regions[0];
    assert_eq!((r.qs, r.qe), (0, 80));
    let cds = cds_features(r);
    assert_eq!(cds.len(), 2);
    assert_eq!((cds[0].vs, cds[0].ve), (200, 320));
    assert_eq!((cds[0].qs, cds[0].qe), (0, 40));
    assert_eq!((cds[1].vs, cds[1].ve), (820, 940));
    assert_eq!((cds[1].qs, cds[1].qe), (40, 80));
    assert_eq!(cds[1].phase, 0);
    assert!(cds.iter().all(|f| f.n_fs == 0));
}

#[test]
fn test_two_exons_split_codon() {
    let gene = two_exon(25, 1);
    let mut index = build_index(&[("chr1", gene.genome.clone())]);
    let _dir = with_splice_sites(&mut index, gene.donor, gene.acceptor);
    let out = map_one(&index, &MapOptions::default(), &gene.protein);
    let r = &out.regions[0];
    let cds = cds_features(r);
    assert_eq!(cds.len(), 2);
    assert_eq!((cds[0].vs, cds[0].ve), (200, 321));
    assert_eq!(cds[0].qe, 40);
    assert_eq!((cds[1].vs, cds[1].ve), (821, 940));
    assert_eq!(cds[1].qs, 40);
    assert_eq!(cds[1].phase, 2);
}

#[test]
fn test_frameshift_is_reported() {
    let mut r = rng(26);
    let protein = random_protein(&mut r, 90);
    let mut cds = back_translate(&protein);
    cds.insert(45 * 3 + 1, b'C');
    cds.extend_from_slice(b"GCT");
    let index = build_index(&[("chr1", contig_with(&mut r, 1200, 200, &cds))]);
    let out = map_one(&index, &MapOptions::default(), &protein);
    assert_eq!(out.regions.len(), 1);
    let detail = out.regions[0].detail.as_ref().unwrap();
    assert_eq!(detail.n_fs, 1);
    assert_eq!(detail.n_stop, 0);
}

#[test]
fn test_premature_stop_is_reported() {
    let mut r = rng(27);
    let protein = random_protein(&mut r, 90);
    let mut cds = back_translate(&protein);
    cds[45 * 3..45 * 3 + 3].copy_from_slice(b"TAA");
    cds.extend_from_slice(b"GCT");
    let index = build_index(&[("chr1", contig_with(&mut r, 1200, 200, &cds))]);
    let out = map_one(&index, &MapOptions::default(), &protein);
    let region = &out.regions[0];
    assert_eq!((region.qs, region.qe), (0, 90));
    assert_eq!(region.detail.as_ref().unwrap().n_stop, 1);
    assert_eq!(cds_features(region)[0].n_stop, 1);
}

#[test]
fn test_anchor_cap_degrades() {
    let gene = single_exon(28);
    let index = build_index(&[("chr1", gene.genome)]);
    let opt = MapOptions {
        max_ava: 4,
        ..MapOptions::default()
    };
    let out = map_one(&index, &opt, &gene.protein);
    assert!(out
        .degradations
        .iter()
        .any(|d| matches!(d, Degradation::AnchorsTruncated { kept: 4, .. })));
    assert!(out.stats.n_anchors > 4);
}

#[test]
fn test_over_cap_kmers_give_no_anchor() {
    let mut r = rng(33);
    let protein = random_protein(&mut r, 50);
    let cds = back_translate(&protein);
    let mut genome = contig_with(&mut r, 4000, 200, &cds);
    for pos in [1500, 2800] {
        genome[pos..pos + cds.len()].copy_from_slice(&cds);
    }
    let index = build_index(&[("chr1", genome)]);

    let mut qcodes = Vec::new();
    encode_protein(&protein, &mut qcodes);
    let qred: Vec<u8> = qcodes.iter().map(|&c| reduce(c)).collect();
    let mut anchors = Vec::new();
    let report = collect_anchors(&index, &qred, 2, 1000, &mut anchors);
    assert!(report.n_over_cap > 0);
    assert!(anchors.iter().all(|a| a.occ <= 2));

    let capped = map_one(&index, &MapOptions { max_occ: 2, ..MapOptions::default() }, &protein);
    assert!(capped.regions.is_empty());
    assert!(capped.stats.n_over_cap > 0);
    let open = map_one(&index, &MapOptions { max_occ: 3, ..MapOptions::default() }, &protein);
    assert!(!open.regions.is_empty());
}

#[test]
fn test_chains_stay_colinear() {
    let gene = two_exon(34, 1);
    let index = build_index(&[("chr1", gene.genome.clone())]);
    let opt = MapOptions::default();
    let mut qcodes = Vec::new();
    encode_protein(&gene.protein, &mut qcodes);
    let qred: Vec<u8> = qcodes.iter().map(|&c| reduce(c)).collect();

    let mut anchors = Vec::new();
    collect_anchors(&index, &qred, opt.max_occ, opt.max_ava, &mut anchors);
    prefilter_isolated(&mut anchors, opt.max_gap, opt.max_intron, opt.max_chn_iter);
    let mut buf = ChainBuffers::default();
    let chains = chain_anchors(&anchors, &ChainConfig::from(&opt), &mut buf);
    let mut chains = select_chains(chains, "q", opt.mask_level, opt.mask_len, opt.best_n);
    assert!(!chains.is_empty());

    let params = RefineParams {
        kmer2: opt.kmer2,
        max_gap_nt: opt.max_intron as u64,
        diag_tol: 3 * opt.dp_bw as i64,
    };
    let mut rbuf = RefineBuffers::default();
    for chain in chains.iter_mut() {
        assert!(chain.is_colinear());
        refine_chain(chain, index.store(), index.genetic_code(), &qred, &params, &mut rbuf);
        assert!(chain.is_colinear());
        for w in chain.anchors.windows(2) {
            assert_eq!(w[0].vid, w[1].vid);
            assert!(w[0].qpos < w[1].qpos);
            assert!(w[0].tpos < w[1].tpos);
        }
    }
}

#[test]
fn test_unrelated_query_is_unmapped() {
    let gene = single_exon(29);
    let index = build_index(&[("chr1", gene.genome)]);
    let mut r = rng(1029);
    let other = random_protein(&mut r, 50);
    let out = map_one(&index, &MapOptions::default(), &other);
    assert!(out.regions.is_empty());
}

#[test]
fn test_no_align_keeps_chain_spans() {
    let gene = single_exon(30);
    let index = build_index(&[("chr1", gene.genome)]);
    let mut opt = MapOptions::default();
    opt.flags.no_align = true;
    let out = map_one(&index, &opt, &gene.protein);
    assert_eq!(out.regions.len(), 1);
    let r = &out.regions[0];
    assert!(r.detail.is_none());
    assert!(r.vs >= 100 && r.ve <= 250);
    assert_eq!(out.stats.n_aligned, 0);
}

#[test]
fn test_features_tile_region() {
    let gene = two_exon(31, 2);
    let mut index = build_index(&[("chr1", gene.genome.clone())]);
    let _dir = with_splice_sites(&mut index, gene.donor, gene.acceptor);
    let out = map_one(&index, &MapOptions::default(), &gene.protein);
    for region in &out.regions {
        let cds = cds_features(region);
        let qsum: u32 = cds.iter().map(|f| f.qlen()).sum();
        assert_eq!(qsum, region.qe - region.qs);
        let detail = region.detail.as_ref().unwrap();
        assert_eq!(detail.n_iden, cds.iter().map(|f| f.n_iden).sum::<u32>());
        assert_eq!(detail.n_plus, cds.iter().map(|f| f.n_plus).sum::<u32>());
        assert_eq!(detail.blen, cds.iter().map(|f| f.blen).sum::<u32>());
        assert_eq!(region.vs, cds[0].vs);
        for pair in cds.windows(2) {
            assert!(pair[0].ve <= pair[1].vs);
        }
    }
}

#[test]
fn test_batch_matches_sequential() {
    let genes: Vec<_> = (0..4).map(|s| single_exon(40 + s)).collect();
    let contigs: Vec<(String, Vec<u8>)> = genes
        .iter()
        .enumerate()
        .map(|(i, g)| (format!("chr{}", i + 1), g.genome.clone()))
        .collect();
    let refs: Vec<(&str, Vec<u8>)> = contigs.iter().map(|(n, s)| (n.as_str(), s.clone())).collect();
    let index = build_index(&refs);
    let opt = MapOptions::default();
    let records: Vec<fasta::Record> = genes
        .iter()
        .enumerate()
        .map(|(i, g)| fasta::Record::with_attrs(&format!("p{}", i), None, &g.protein))
        .collect();

    let mut scratch = ThreadScratch::new();
    let sequential: Vec<_> = records
        .iter()
        .map(|rec| map(&index, &opt, rec.id(), rec.seq(), &mut scratch))
        .collect();
    for (i, out) in sequential.iter().enumerate() {
        assert_eq!(out.regions[0].cid, i as u32);
    }
    for n_threads in [1, 2, 4] {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(n_threads).build().unwrap();
        assert_eq!(map_batch(&pool, &index, &opt, &records), sequential);
        // workers keep their scratch between batches
        let mut reversed = records.clone();
        reversed.reverse();
        let mut again = map_batch(&pool, &index, &opt, &reversed);
        again.reverse();
        assert_eq!(again, sequential);
    }
}
