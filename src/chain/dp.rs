//! Chaining DP
//!
//! Anchors are processed in `(vid, tpos, qpos)` order. The best predecessor
//! of anchor `i` is searched backwards on the same contig strand until the
//! target distance leaves the reachable window, `max_iter` candidates were
//! tried, or `max_skip` consecutive candidates failed to improve the score.

use super::{ChainConfig, Chain};
use crate::seed::Anchor;

/// Reusable chaining arrays
#[derive(Debug, Default)]
pub struct ChainBuffers {
    pub(crate) f: Vec<i32>,
    pub(crate) p: Vec<i32>,
    pub(crate) order: Vec<u32>,
    pub(crate) visited: Vec<bool>,
}

impl ChainBuffers {
    pub fn clear(&mut self) {
        self.f.clear();
        self.p.clear();
        self.order.clear();
        self.visited.clear();
    }

    pub fn capacity_bytes(&self) -> usize {
        self.f.capacity() * 4 + self.p.capacity() * 4 + self.order.capacity() * 4 + self.visited.capacity()
    }
}

/// Cost of linking two anchors `dq` residues and `dt` nt apart, or `None`
/// when neither gap class applies.
pub fn link_cost(dq: i64, dt: i64, cfg: &ChainConfig) -> Option<f32> {
    if dq <= 0 || dt <= 0 || dq > cfg.max_gap as i64 {
        return None;
    }
    let dd = dt - 3 * dq;
    let mut cost: Option<f32> = None;
    if dd.abs() <= 3 * cfg.bw as i64 {
        let c = if dd == 0 {
            0.0
        } else {
            cfg.gap_open + cfg.gap_ext * (dd.abs() as f32 / 3.0)
        };
        cost = Some(c);
    }
    if !cfg.no_splice && dd > 0 && dd <= cfg.max_intron as i64 {
        let c = cfg.intron_open + cfg.coef_log * (dd as f32).log2();
        cost = Some(cost.map_or(c, |x| x.min(c)));
    }
    cost
}

/// Chain `anchors` (sorted by `(vid, tpos, qpos)`). Chains are returned in
/// discovery order, best end first.
pub fn chain_anchors(anchors: &[Anchor], cfg: &ChainConfig, buf: &mut ChainBuffers) -> Vec<Chain> {
    let n = anchors.len();
    buf.clear();
    if n == 0 {
        return Vec::new();
    }
    buf.f.resize(n, 0);
    buf.p.resize(n, -1);
    let max_span = (cfg.max_intron.max(3 * cfg.bw) as i64) + 3 * cfg.max_gap as i64;

    for i in 0..n {
        let ai = &anchors[i];
        let mut best = ai.len as i32;
        let mut best_j = -1i32;
        let mut n_iter = 0usize;
        let mut n_skip = 0usize;
        let mut j = i;
        while j > 0 {
            j -= 1;
            let aj = &anchors[j];
            if aj.vid != ai.vid {
                break;
            }
            let dt = ai.tpos as i64 - aj.tpos as i64;
            if dt > max_span {
                break;
            }
            n_iter += 1;
            if n_iter > cfg.max_iter {
                break;
            }
            let dq = ai.qpos as i64 - aj.qpos as i64;
            let Some(cost) = link_cost(dq, dt, cfg) else {
                continue;
            };
            let bonus = dq.min(dt / 3).min(ai.len as i64) as i32;
            let sc = buf.f[j] + bonus - cost.round() as i32;
            if sc > best {
                best = sc;
                best_j = j as i32;
                n_skip = 0;
            } else {
                n_skip += 1;
                if n_skip > cfg.max_skip {
                    break;
                }
            }
        }
        buf.f[i] = best;
        buf.p[i] = best_j;
    }

    // backtrack from the best ends; a chain stops at an anchor already used
    buf.order.extend(0..n as u32);
    let f = &buf.f;
    buf.order
        .sort_unstable_by(|&a, &b| f[b as usize].cmp(&f[a as usize]).then(a.cmp(&b)));
    buf.visited.resize(n, false);

    let mut chains = Vec::new();
    let mut members = Vec::new();
    for &end in &buf.order {
        let end = end as usize;
        if buf.visited[end] {
            continue;
        }
        members.clear();
        let mut k = end as i32;
        while k >= 0 && !buf.visited[k as usize] {
            buf.visited[k as usize] = true;
            members.push(k as usize);
            k = buf.p[k as usize];
        }
        let score = buf.f[end] - if k >= 0 { buf.f[k as usize] } else { 0 };
        if members.len() < cfg.min_cnt || score < cfg.min_score || score <= 0 {
            continue;
        }
        let chain_anchors: Vec<Anchor> = members.iter().rev().map(|&x| anchors[x]).collect();
        chains.push(Chain::new(anchors[end].vid, score, chain_anchors));
    }
    chains
}
