//! Output formatting of mapped queries

use protomap::report::Reporter;
use protomap::{map, KmerIndex, MapOptions, MapOutput, ThreadScratch};

use super::helpers::{build_index, single_exon, two_exon};

fn render(index: &KmerIndex, opt: &MapOptions, outputs: &[(&str, &[u8], &MapOutput)]) -> String {
    let mut buf = Vec::new();
    let mut reporter = Reporter::new(index.store(), opt);
    reporter.write_header(&mut buf).unwrap();
    for (name, seq, out) in outputs {
        reporter.write_query(&mut buf, name, seq, out).unwrap();
    }
    String::from_utf8(buf).unwrap()
}

fn map_one(index: &KmerIndex, opt: &MapOptions, seq: &[u8]) -> MapOutput {
    let mut scratch = ThreadScratch::new();
    map(index, opt, "q", seq, &mut scratch)
}

#[test]
fn test_region_line_columns() {
    let gene = single_exon(51);
    let index = build_index(&[("chr1", gene.genome)]);
    let opt = MapOptions::default();
    let out = map_one(&index, &opt, &gene.protein);
    let text = render(&index, &opt, &[("prot1", &gene.protein, &out)]);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 1);
    let cols: Vec<&str> = lines[0].split('\t').collect();
    assert_eq!(&cols[..11], &["prot1", "50", "0", "50", "+", "chr1", "1000", "100", "250", "50", "50"]);
    assert!(cols.contains(&"tp:A:P"));
    assert!(cols.contains(&"fs:i:0"));
    assert!(cols.contains(&"st:i:0"));
    assert!(cols.contains(&"cg:Z:50M"));
}

#[test]
fn test_no_cs_drops_ops() {
    let gene = single_exon(52);
    let index = build_index(&[("chr1", gene.genome)]);
    let mut opt = MapOptions::default();
    opt.flags.no_cs = true;
    let out = map_one(&index, &opt, &gene.protein);
    let text = render(&index, &opt, &[("p", &gene.protein, &out)]);
    assert!(!text.contains("cg:Z:"));
}

#[test]
fn test_unmapped_line_only_when_requested() {
    let gene = single_exon(53);
    let index = build_index(&[("chr1", gene.genome)]);
    let empty = MapOutput {
        qlen: 12,
        regions: Vec::new(),
        degradations: Vec::new(),
        stats: Default::default(),
    };
    let mut opt = MapOptions::default();
    assert_eq!(render(&index, &opt, &[("lost", b"MKWYCHMKWYCH", &empty)]), "");
    opt.flags.show_unmap = true;
    let text = render(&index, &opt, &[("lost", b"MKWYCHMKWYCH", &empty)]);
    assert!(text.starts_with("lost\t12\t0\t0\t*\t*"));
}

#[test]
fn test_gff3_lines() {
    let gene = two_exon(54, 0);
    let mut index = build_index(&[("chr1", gene.genome)]);
    let dir = tempfile::tempdir().unwrap();
    let sites = dir.path().join("sites.tsv");
    let text = format!("chr1 {} + D 2.0\nchr1 {} + A 2.0\n", gene.donor, gene.acceptor);
    std::fs::write(&sites, text).unwrap();
    index.set_splice_scores(&sites, 15.0).unwrap();
    let mut opt = MapOptions::default();
    opt.flags.gff = true;
    let out = map_one(&index, &opt, &gene.protein);
    let text = render(&index, &opt, &[("prot", &gene.protein, &out), ("prot", &gene.protein, &out)]);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "##gff-version 3");
    assert!(lines[1].starts_with("##PAF\tprot\t80\t"));

    let mrna: Vec<&str> = lines.iter().copied().filter(|l| l.contains("\tmRNA\t")).collect();
    assert_eq!(mrna.len(), 2);
    assert!(mrna[0].contains("ID=PM_000001;Rank=1"));
    assert!(mrna[1].contains("ID=PM_000002;Rank=1"));
    assert!(mrna[0].ends_with(";Target=prot 1 80"));

    let cds: Vec<Vec<&str>> = lines
        .iter()
        .filter(|l| l.contains("\tCDS\t"))
        .map(|l| l.split('\t').collect())
        .collect();
    assert_eq!(cds.len(), 4);
    // 1-based closed intervals
    assert_eq!((cds[0][3], cds[0][4]), ("201", "320"));
    assert_eq!((cds[1][3], cds[1][4]), ("821", "940"));
    assert!(cds[0][8].starts_with("Parent=PM_000001"));
    assert!(cds[0][8].contains(";Donor=GT"));
    assert!(cds[1][8].contains(";Acceptor=AG"));
    assert!(cds[1][8].ends_with(";Target=prot 41 80"));
}

#[test]
fn test_gtf_lines() {
    let gene = single_exon(55);
    let index = build_index(&[("chr1", gene.genome)]);
    let mut opt = MapOptions::default();
    opt.flags.gtf = true;
    opt.gff_prefix = "G".to_string();
    opt.gff_delim = '.';
    let out = map_one(&index, &opt, &gene.protein);
    let text = render(&index, &opt, &[("p", &gene.protein, &out)]);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("##PAF\t"));
    assert!(lines[1].contains("\ttranscript\t101\t250\t"));
    assert!(lines[1].contains("transcript_id \"G.000001\""));
    assert!(lines[2].contains("\tCDS\t101\t250\t"));
    assert!(lines[2].ends_with("exon_number \"1\";"));
}

#[test]
fn test_aligned_residue_lines() {
    let gene = single_exon(56);
    let index = build_index(&[("chr1", gene.genome)]);
    let mut opt = MapOptions::default();
    opt.flags.show_residue = true;
    opt.flags.show_trans = true;
    let out = map_one(&index, &opt, &gene.protein);
    let text = render(&index, &opt, &[("p", &gene.protein, &out)]);
    let protein = String::from_utf8(gene.protein.clone()).unwrap();
    assert!(text.contains(&format!("##STA\t{}\n", protein)));
    assert!(text.contains(&format!("##ATA\t{}\n", protein)));
}
