//! Unit tests for index build, lookup and persistence

use protomap::index::KmerIter;
use protomap::utils::alphabet::{aa_to_code, reduce};
use protomap::{IndexOptions, KmerIndex, MapError, SequenceStore};

use super::helpers::{back_translate, build_index, contig_with, random_dna, random_protein, rng, single_exon};

fn reduced(protein: &[u8]) -> Vec<u8> {
    protein.iter().map(|&c| reduce(aa_to_code(c))).collect()
}

fn to_bytes(index: &KmerIndex) -> Vec<u8> {
    let mut buf = Vec::new();
    index.write_to(&mut buf).unwrap();
    buf
}

#[test]
fn test_query_kmers_found_in_gene() {
    let gene = single_exon(1);
    let index = build_index(&[("chr1", gene.genome.clone())]);
    let qred = reduced(&gene.protein);
    let mut found = 0;
    for (qpos, kmer) in KmerIter::new(&qred, index.options().kmer) {
        if index.slot(kmer).is_none() {
            continue;
        }
        let hits = index.lookup(kmer, 100).expect("sampled query k-mer is indexed");
        let on_gene = hits.iter().filter_map(|&p| index.decode(p)).any(|h| {
            h.cid == 0 && !h.rev && h.pos == 100 + 3 * qpos as u64
        });
        assert!(on_gene, "k-mer at {} not on the gene diagonal", qpos);
        found += 1;
    }
    assert!(found > 5);
}

#[test]
fn test_max_occ_excludes_repeated_kmers() {
    let mut r = rng(7);
    let protein = random_protein(&mut r, 40);
    let cds = back_translate(&protein);
    let mut genome = random_dna(&mut r, 100);
    for _ in 0..3 {
        genome.extend_from_slice(&cds);
        genome.extend_from_slice(b"TAATAGTGA");
        genome.extend(random_dna(&mut r, 50));
    }
    let index = build_index(&[("rep", genome)]);
    let qred = reduced(&protein);
    let mut checked = std::collections::HashSet::new();
    for (_, kmer) in KmerIter::new(&qred, index.options().kmer) {
        let occ = index.occurrences(kmer).len();
        if occ == 0 {
            continue;
        }
        assert!(occ >= 3);
        assert!(index.lookup(kmer, 2).is_none());
        assert!(index.lookup(kmer, occ as u32).is_some());
        checked.insert(kmer);
    }
    assert!(!checked.is_empty());
    assert!(index.stats(2).n_over_cap >= checked.len());
}

#[test]
fn test_build_independent_of_thread_count() {
    let mut r = rng(11);
    let contigs: Vec<(String, Vec<u8>)> = (0..5)
        .map(|i| (format!("c{}", i), random_dna(&mut r, 3000 + 500 * i)))
        .collect();
    let build = |n| {
        let mut store = SequenceStore::new();
        for (name, seq) in &contigs {
            store.push(name, seq).unwrap();
        }
        KmerIndex::build(store, &IndexOptions::default(), n).unwrap()
    };
    let one = to_bytes(&build(1));
    assert_eq!(one, to_bytes(&build(3)));
    assert_eq!(one, to_bytes(&build(8)));
}

#[test]
fn test_dump_restore_roundtrip() {
    let gene = single_exon(2);
    let index = build_index(&[("chr1", gene.genome.clone()), ("chr2", gene.genome)]);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("genome.pmi");
    index.dump(&path).unwrap();
    let restored = KmerIndex::restore(&path).unwrap();
    assert_eq!(to_bytes(&index), to_bytes(&restored));
    assert_eq!(restored.store().n_contigs(), 2);
    assert_eq!(restored.store().contig_id("chr2"), Some(1));

    // load dispatches on the magic
    let loaded = KmerIndex::load(&path, &IndexOptions::default(), 1).unwrap();
    assert_eq!(to_bytes(&index), to_bytes(&loaded));
}

#[test]
fn test_truncated_index_is_format_error() {
    let gene = single_exon(3);
    let index = build_index(&[("chr1", gene.genome)]);
    let bytes = to_bytes(&index);
    let dir = tempfile::tempdir().unwrap();
    for cut in [3, 5, bytes.len() / 2, bytes.len() - 1] {
        let path = dir.path().join(format!("cut{}.pmi", cut));
        std::fs::write(&path, &bytes[..cut]).unwrap();
        match KmerIndex::restore(&path) {
            Err(MapError::Format(_)) => {}
            other => panic!("cut at {}: expected a format error, got {:?}", cut, other.err()),
        }
    }
}

#[test]
fn test_load_builds_from_fasta() {
    let mut r = rng(5);
    let seq = contig_with(&mut r, 800, 0, b"ATG");
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("g.fa");
    let mut text = b">only\n".to_vec();
    text.extend_from_slice(&seq);
    text.push(b'\n');
    std::fs::write(&path, text).unwrap();
    let index = KmerIndex::load(&path, &IndexOptions::default(), 2).unwrap();
    assert_eq!(index.store().contig(0).name, "only");
    assert_eq!(index.store().total_len(), 800);
}

#[test]
fn test_wrong_magic_is_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bogus.pmi");
    std::fs::write(&path, b"NOPE\x01\x00\x00\x00\x00\x00\x00\x00").unwrap();
    assert!(matches!(KmerIndex::restore(&path), Err(MapError::Format(_))));
    assert!(matches!(SequenceStore::restore(&path), Err(MapError::Format(_))));
}
