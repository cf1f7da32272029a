//! Region filters
//!
//! Regions are filtered in place; secondary links are still chain indices
//! at this point (`parent == own index` for primaries).

use super::AlignmentRegion;

/// Drop aligned regions whose similarity is below `min_sim`
pub fn filter_by_similarity(regions: Vec<AlignmentRegion>, min_sim: f32) -> Vec<AlignmentRegion> {
    regions
        .into_iter()
        .filter(|r| r.detail.is_none() || r.similarity() >= min_sim)
        .collect()
}

/// Drop regions covering less than `min_cov` of the query
pub fn filter_by_coverage(regions: Vec<AlignmentRegion>, qlen: usize, min_cov: f32) -> Vec<AlignmentRegion> {
    regions
        .into_iter()
        .filter(|r| r.coverage(qlen) >= min_cov)
        .collect()
}

/// Drop secondaries scoring below `pri_ratio` of their primary. `parent`
/// must refer to the `id` of a region in `regions`.
pub fn filter_by_primary_ratio(regions: Vec<AlignmentRegion>, pri_ratio: f32) -> Vec<AlignmentRegion> {
    let parent_score = |r: &AlignmentRegion| {
        regions
            .iter()
            .find(|p| p.id == r.parent)
            .map_or(0, |p| p.score)
    };
    let keep: Vec<bool> = regions
        .iter()
        .map(|r| r.is_primary() || r.score as f32 >= pri_ratio * parent_score(r) as f32)
        .collect();
    regions
        .into_iter()
        .zip(keep)
        .filter_map(|(r, k)| k.then_some(r))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(id: usize, parent: usize, score: i32, qs: u32, qe: u32) -> AlignmentRegion {
        AlignmentRegion {
            id,
            parent,
            n_sub: 0,
            subsc: 0,
            score,
            chain_score: score,
            chain_ungapped: 0,
            n_anchors: 3,
            hash: id as u32,
            cid: 0,
            rev: false,
            qs,
            qe,
            vs: 0,
            ve: 0,
            features: Vec::new(),
            detail: None,
        }
    }

    #[test]
    fn test_primary_ratio() {
        let regions = vec![region(0, 0, 100, 0, 50), region(1, 0, 80, 0, 50), region(2, 0, 60, 0, 50)];
        let kept = filter_by_primary_ratio(regions, 0.7);
        let ids: Vec<usize> = kept.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_coverage() {
        let regions = vec![region(0, 0, 100, 0, 50), region(1, 1, 90, 0, 5)];
        let kept = filter_by_coverage(regions, 100, 0.1);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, 0);
    }
}
