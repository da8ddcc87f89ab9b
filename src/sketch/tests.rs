//! Behavioural tests for the engine using table-driven strategies

use super::*;
use crate::graph::{Edge, EdgeKey, NodeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Hash and rank double: every node's pattern and ranks are spelled out.
struct Table {
    entries: HashMap<&'static str, (Vec<usize>, Vec<u32>)>,
}

impl Table {
    fn new(rows: &[(&'static str, &[usize], &[u32])]) -> Arc<Self> {
        Arc::new(Self {
            entries: rows
                .iter()
                .map(|(node, pattern, ranks)| (*node, (pattern.to_vec(), ranks.to_vec())))
                .collect(),
        })
    }

    fn row(&self, node: &NodeId) -> &(Vec<usize>, Vec<u32>) {
        self.entries
            .get(node.as_str())
            .unwrap_or_else(|| panic!("node {} not in table", node))
    }
}

impl HashFamily for Table {
    fn bucket(&self, layer: usize, node: &NodeId, _width: usize) -> usize {
        self.row(node).0[layer]
    }
}

impl RankGenerator for Table {
    fn ranks(&self, node: &NodeId, _pattern_length: usize) -> Vec<u32> {
        self.row(node).1.clone()
    }
}

fn engine(table: Arc<Table>, conflict_limit: usize) -> SketchEngine {
    SketchEngine::with_strategies(
        SketchConfig::new(4, 2, 4, conflict_limit),
        table.clone(),
        table,
    )
    .unwrap()
}

fn n(id: &str) -> NodeId {
    NodeId::from(id)
}

// Every source lands in row 0, every dest in column 0, so all edges share
// cell (0, 0, layer) at both layers. Ranks choose who wins.
fn shared_cell_table() -> Arc<Table> {
    Table::new(&[
        ("lo", &[0, 0], &[1, 1]),
        ("mid", &[0, 0], &[2, 0]),
        ("hi", &[0, 0], &[3, 3]),
        ("d", &[0, 0], &[3, 3]),
        ("e", &[0, 0], &[3, 3]),
        ("f", &[0, 0], &[3, 3]),
    ])
}

#[test]
fn higher_rank_evicts_lower_rank_pair() {
    let sketch = engine(shared_cell_table(), 3);
    sketch.update(&[Edge::weighted("lo", "d", 4.0)]);
    assert_eq!(sketch.edge_weight(&n("lo"), &n("d")), 4.0);

    sketch.update(&[Edge::weighted("hi", "e", 2.0)]);
    assert_eq!(sketch.edge_weight(&n("lo"), &n("d")), 0.0);
    assert!(!sketch.member(&n("lo"), &n("d")));
    assert_eq!(sketch.edge_weight(&n("hi"), &n("e")), 2.0);

    let cell = sketch.cell(0, 0, 0).unwrap();
    assert_eq!(cell.rank, Some(3));
    assert_eq!(cell.weight, 2.0);
    assert_eq!(cell.contributors, vec![EdgeKey::new("hi", "e")]);
}

#[test]
fn tie_sums_weights_and_lists_both() {
    let sketch = engine(shared_cell_table(), 3);
    sketch.update(&[Edge::weighted("hi", "d", 1.5), Edge::weighted("hi", "e", 2.5)]);
    assert_eq!(sketch.edge_weight(&n("hi"), &n("d")), 4.0);
    assert_eq!(sketch.edge_weight(&n("hi"), &n("e")), 4.0);
    assert!(sketch.member(&n("hi"), &n("d")));
    assert!(sketch.member(&n("hi"), &n("e")));
}

#[test]
fn lower_rank_leaves_cell_untouched() {
    let sketch = engine(shared_cell_table(), 3);
    sketch.update(&[Edge::weighted("hi", "d", 1.0)]);
    let before = sketch.cell(0, 0, 0);
    let stats = sketch.update(&[Edge::weighted("lo", "e", 9.0)]);
    assert_eq!(stats.dropped, 2);
    assert_eq!(sketch.cell(0, 0, 0), before);
    assert_eq!(sketch.edge_weight(&n("lo"), &n("e")), 0.0);
    assert!(!sketch.member(&n("lo"), &n("e")));
}

#[test]
fn edge_weight_takes_minimum_over_matching_layers() {
    // "mid" ranks [2, 0]: with "d" ([3, 3]) the pair ranks 2 at layer 0 and 0 at layer 1.
    let sketch = engine(shared_cell_table(), 3);
    sketch.update(&[Edge::weighted("mid", "d", 1.0)]);
    // lo/e ranks [1, 1]: dropped at layer 0 (1 < 2), evicts layer 1 (1 > 0)
    sketch.update(&[Edge::weighted("lo", "e", 5.0)]);
    assert_eq!(sketch.edge_weight(&n("mid"), &n("d")), 1.0);
    assert_eq!(sketch.cell(0, 0, 1).unwrap().contributors, vec![EdgeKey::new("lo", "e")]);
    assert!(sketch.member(&n("mid"), &n("d")));

    sketch.update(&[Edge::weighted("mid", "f", 6.0)]);
    // mid/f ties mid/d at layer 0 (rank 2), dropped at layer 1 (0 < 1)
    assert_eq!(sketch.cell(0, 0, 0).unwrap().weight, 7.0);
    assert_eq!(sketch.edge_weight(&n("mid"), &n("d")), 7.0);
    assert_eq!(sketch.edge_weight(&n("lo"), &n("e")), 5.0);
}

#[test]
fn conflict_limit_evicts_oldest_contributor() {
    let sketch = engine(shared_cell_table(), 2);
    sketch.update(&[
        Edge::new("hi", "d"),
        Edge::new("hi", "e"),
        Edge::new("hi", "f"),
    ]);
    assert!(!sketch.member(&n("hi"), &n("d")));
    assert!(sketch.member(&n("hi"), &n("e")));
    assert!(sketch.member(&n("hi"), &n("f")));
    // the evicted pair still contributes to the aggregate weight
    assert_eq!(sketch.edge_weight(&n("hi"), &n("d")), 3.0);
    for layer in 0..2 {
        assert_eq!(sketch.cell(0, 0, layer).unwrap().contributors.len(), 2);
    }
}

#[test]
fn rank_never_decreases_and_contributors_stay_bounded() {
    let sketch = engine(shared_cell_table(), 2);
    let nodes = ["lo", "mid", "hi", "d", "e", "f"];
    let mut last = [None, None];
    let mut step = 0usize;
    for s in nodes {
        for d in nodes.iter().rev() {
            step += 1;
            sketch.update(&[Edge::weighted(s, *d, step as f64)]);
            for layer in 0..2 {
                let cell = sketch.cell(0, 0, layer).unwrap();
                assert!(cell.rank >= last[layer], "rank decreased at layer {}", layer);
                assert!(cell.contributors.len() <= 2);
                last[layer] = cell.rank;
            }
        }
    }
}

#[test]
fn member_has_no_false_positives() {
    let sketch = engine(shared_cell_table(), 3);
    sketch.update(&[Edge::new("hi", "d"), Edge::new("d", "hi")]);
    assert!(sketch.member(&n("hi"), &n("d")));
    assert!(sketch.member(&n("d"), &n("hi")));
    assert!(!sketch.member(&n("hi"), &n("e")));
    assert!(!sketch.member(&n("e"), &n("d")));
}

#[test]
fn identical_streams_give_identical_state() {
    let edges: Vec<Edge> = (0..400)
        .map(|i| Edge::weighted((i % 37).to_string(), (i % 23).to_string(), (i % 5) as f64))
        .collect();
    let config = SketchConfig::new(8, 3, 5, 2);
    let a = SketchEngine::with_seed(config, 11).unwrap();
    let b = SketchEngine::with_seed(config, 11).unwrap();
    for chunk in edges.chunks(50) {
        a.update(chunk);
        b.update(chunk);
    }
    assert_eq!(a.occupied_cells(), b.occupied_cells());
    for x in 0..8 {
        for y in 0..8 {
            for layer in 0..3 {
                assert_eq!(a.cell(x, y, layer), b.cell(x, y, layer));
            }
        }
    }
    for edge in &edges {
        assert_eq!(
            a.edge_weight(&edge.source, &edge.dest),
            b.edge_weight(&edge.source, &edge.dest)
        );
        assert_eq!(a.member(&edge.source, &edge.dest), b.member(&edge.source, &edge.dest));
    }
}

#[test]
fn concurrent_updates_serialize() {
    let sketch = Arc::new(SketchEngine::new(SketchConfig::new(16, 2, 4, 3)).unwrap());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let sketch = sketch.clone();
            std::thread::spawn(move || {
                for _ in 0..25 {
                    sketch.update(&[Edge::new("p", "q")]);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(sketch.edge_weight(&n("p"), &n("q")), 100.0);
}

// Sources rank k at both layers, sinks outrank every source, so edge
// `(SOURCES[k], sink)` lands in cell (0, 0, ·) with rank k and carries weight
// k + 1. A consistent cell at rank k therefore holds a whole multiple of k + 1
// and lists only pairs from `SOURCES[k]`.
const SOURCES: [&str; 6] = ["r0", "r1", "r2", "r3", "r4", "r5"];
const SINKS: [&str; 4] = ["s0", "s1", "s2", "s3"];
const PER_RANK: usize = 40;

fn climbing_table() -> Arc<Table> {
    let ranks: Vec<[u32; 2]> = (0..SOURCES.len() as u32).map(|k| [k, k]).collect();
    let mut rows: Vec<(&'static str, &[usize], &[u32])> = SOURCES
        .iter()
        .zip(&ranks)
        .map(|(node, r)| (*node, &[0usize, 0][..], &r[..]))
        .collect();
    rows.extend(SINKS.iter().map(|node| (*node, &[0usize, 0][..], &[100u32, 100][..])));
    Table::new(&rows)
}

fn assert_consistent(cell: &CellSnapshot, conflict_limit: usize) {
    let Some(rank) = cell.rank else {
        assert!(cell.contributors.is_empty());
        return;
    };
    let unit = (rank + 1) as f64;
    let applied = cell.weight / unit;
    assert!(
        applied >= 1.0 && applied.fract() == 0.0,
        "weight {} does not belong to rank {}",
        cell.weight,
        rank
    );
    // dests cycle through SINKS, so the first n edges at a rank are distinct pairs
    let expected = (applied as usize).min(SINKS.len()).min(conflict_limit);
    assert_eq!(cell.contributors.len(), expected, "cell {:?}", cell);
    for key in &cell.contributors {
        assert_eq!(key.source.as_str(), SOURCES[rank as usize], "cell {:?}", cell);
    }
}

#[test]
fn readers_see_whole_cells_during_updates() {
    use std::sync::atomic::{AtomicBool, Ordering};

    let conflict_limit = 3;
    let sketch = engine(climbing_table(), conflict_limit);
    let done = AtomicBool::new(false);

    std::thread::scope(|scope| {
        let readers: Vec<_> = (0..3)
            .map(|reader| {
                let (sketch, done) = (&sketch, &done);
                scope.spawn(move || {
                    let mut last = [None, None];
                    let mut reads = 0usize;
                    while !done.load(Ordering::Acquire) || reads == 0 {
                        for layer in 0..2 {
                            if let Some(cell) = sketch.cell(0, 0, layer) {
                                assert!(cell.rank >= last[layer], "rank decreased at layer {}", layer);
                                assert_consistent(&cell, conflict_limit);
                                last[layer] = cell.rank;
                            }
                        }
                        let k = (reads + reader) % SOURCES.len();
                        let weight = sketch.edge_weight(&n(SOURCES[k]), &n(SINKS[reads % SINKS.len()]));
                        let applied = weight / (k + 1) as f64;
                        assert_eq!(applied.fract(), 0.0, "estimate {} for rank {}", weight, k);
                        sketch.member(&n(SOURCES[k]), &n(SINKS[0]));
                        reads += 1;
                    }
                    reads
                })
            })
            .collect();

        for (k, source) in SOURCES.iter().enumerate() {
            for i in 0..PER_RANK {
                sketch.update(&[Edge::weighted(*source, SINKS[i % SINKS.len()], (k + 1) as f64)]);
            }
        }
        done.store(true, Ordering::Release);

        for reader in readers {
            assert!(reader.join().unwrap() > 0);
        }
    });

    let top = SOURCES.len() as u32 - 1;
    for layer in 0..2 {
        let cell = sketch.cell(0, 0, layer).unwrap();
        assert_eq!(cell.rank, Some(top));
        assert_eq!(cell.weight, (PER_RANK as u32 * (top + 1)) as f64);
        assert_consistent(&cell, conflict_limit);
    }
}
