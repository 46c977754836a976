// Copyright (C) 2026 the brushwork contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::math::{parallel, COLINEAR_EPSILON};
use crate::prelude::*;

use super::move_ops::FaceManager;
use super::{Brush, BrushGeometry, Edge, EdgeId, SideId};

/// Merges every pair of neighbouring sides whose supporting planes have
/// drifted into coplanarity, until none remain. The plane of each side is
/// derived from its ring rather than its face cache, since the ring is what
/// the preceding edit actually changed.
#[profiling::function]
pub(crate) fn merge_sides(brush: &mut Brush, manager: &mut FaceManager) {
    'scan: loop {
        let side_ids = brush.geometry.sides.keys().collect_vec();
        for side_id in side_ids {
            let Some(side_plane) = brush.geometry.side_plane(side_id) else {
                continue;
            };
            let ring = brush.geometry.sides[side_id].edges.clone();
            for (edge_index, edge_id) in ring.iter().enumerate() {
                let neighbour = brush.geometry.edges[*edge_id]
                    .neighbour(side_id)
                    .expect("Edge with a single side during merge");
                let Some(neighbour_plane) = brush.geometry.side_plane(neighbour) else {
                    continue;
                };
                if side_plane.equals(&neighbour_plane, COLINEAR_EPSILON) {
                    merge_neighbours(brush, side_id, edge_index, manager);
                    continue 'scan;
                }
            }
        }
        break;
    }
}

/// Splices `side_id`'s neighbour across `edge_index` into it: the shared run
/// of edges is removed, the neighbour's remaining ring is appended, and the
/// neighbour with its face goes away.
fn merge_neighbours(
    brush: &mut Brush,
    side_id: SideId,
    edge_index: usize,
    manager: &mut FaceManager,
) {
    let geometry = &mut brush.geometry;
    let edge_id = geometry.sides[side_id].edges[edge_index];
    let neighbour = geometry.edges[edge_id]
        .neighbour(side_id)
        .expect("Merging a side with a boundary edge");

    let side_count = geometry.sides[side_id].edges.len();
    let neighbour_count = geometry.sides[neighbour].edges.len();

    // Walk to both ends of the shared run. The run appears in opposite ring
    // order on the two sides, so one index advances while the other retreats.
    let mut side_index = edge_index;
    let mut neighbour_index = geometry
        .side_edge_index(neighbour, edge_id)
        .expect("Shared edge missing from the neighbour ring");
    loop {
        side_index = succ(side_index, side_count);
        neighbour_index = pred(neighbour_index, neighbour_count);
        if geometry.sides[side_id].edges[side_index]
            != geometry.sides[neighbour].edges[neighbour_index]
        {
            break;
        }
    }

    let mut shared: usize = 0;
    loop {
        side_index = pred(side_index, side_count);
        neighbour_index = succ(neighbour_index, neighbour_count);
        if geometry.sides[side_id].edges[side_index]
            != geometry.sides[neighbour].edges[neighbour_index]
        {
            break;
        }
        shared += 1;
    }
    // side_index now rests on the edge just before the shared run in the
    // side's ring; neighbour_index on the edge just after it in the
    // neighbour's ring.
    debug_assert!(shared >= 1);
    let total = side_count + neighbour_count - 2 * shared;

    // Rotate so the shared run sits at the end of the side's ring and the
    // neighbour's kept run starts its ring.
    geometry.side_shift(side_id, succ_n(side_index, side_count, shared + 1));
    geometry.side_shift(neighbour, neighbour_index);

    let side = &mut geometry.sides[side_id];
    side.edges.truncate(side_count - shared);
    side.vertices.truncate(side_count - shared);

    let kept = neighbour_count - shared;
    for i in 0..kept {
        let edge_id = geometry.sides[neighbour].edges[i];
        let vertex_id = geometry.sides[neighbour].vertices[i];
        geometry.edges[edge_id].replace_side(neighbour, Some(side_id));
        let side = &mut geometry.sides[side_id];
        side.edges.push(edge_id);
        side.vertices.push(vertex_id);
    }

    // The shared edges die, along with the vertices interior to the run.
    for i in kept..neighbour_count {
        let edge_id = geometry.sides[neighbour].edges[i];
        geometry.remove_edge(edge_id);
        if i > kept {
            let vertex_id = geometry.sides[neighbour].vertices[i];
            geometry.remove_vertex(vertex_id);
        }
    }

    manager.drop_side_face(&mut brush.faces, &mut brush.geometry, neighbour);
    brush.geometry.remove_side(neighbour);

    debug_assert_eq!(brush.geometry.sides[side_id].vertices.len(), total);
    debug_assert_eq!(brush.geometry.sides[side_id].edges.len(), total);
}

/// Merges chains of two parallel edges that meet in a vertex of degree
/// matching, replacing them with one edge spanning the outer endpoints. Both
/// incident sides must keep at least three corners, so only sides with four
/// or more vertices qualify.
#[profiling::function]
pub(crate) fn merge_edges(geometry: &mut BrushGeometry) {
    'scan: loop {
        let edge_ids = geometry.edges.keys().collect_vec();
        for (i, edge_id) in edge_ids.iter().enumerate() {
            if !geometry.edges.contains_key(*edge_id) {
                continue;
            }
            let edge_vector = geometry.edge_vector(&geometry.edges[*edge_id]);
            for candidate_id in &edge_ids[i + 1..] {
                if !geometry.edges.contains_key(*candidate_id) {
                    continue;
                }
                let edge = geometry.edges[*edge_id].clone();
                let candidate = &geometry.edges[*candidate_id];
                if !edge.incident_with(candidate) {
                    continue;
                }
                let candidate_vector = geometry.edge_vector(candidate);
                if !parallel(edge_vector, candidate_vector, COLINEAR_EPSILON) {
                    continue;
                }

                if edge.end == candidate.end {
                    geometry.edges[*candidate_id].flip();
                }
                let candidate = geometry.edges[*candidate_id].clone();
                if edge.end == candidate.start
                    && edge.start != candidate.end
                    && edge.left == candidate.left
                    && edge.right == candidate.right
                    && mergeable_rings(geometry, &edge)
                {
                    // `edge` runs into `candidate`; the shared vertex is
                    // edge.end.
                    merge_edge_pair(geometry, *edge_id, *candidate_id, false);
                    continue 'scan;
                }

                if edge.start == candidate.start {
                    geometry.edges[*candidate_id].flip();
                }
                let candidate = geometry.edges[*candidate_id].clone();
                if edge.start == candidate.end
                    && edge.end != candidate.start
                    && edge.left == candidate.left
                    && edge.right == candidate.right
                    && mergeable_rings(geometry, &edge)
                {
                    // `candidate` runs into `edge`; the shared vertex is
                    // edge.start.
                    merge_edge_pair(geometry, *edge_id, *candidate_id, true);
                    continue 'scan;
                }
            }
        }
        break;
    }
}

fn mergeable_rings(geometry: &BrushGeometry, edge: &Edge) -> bool {
    let left = edge.left.expect("Edge with a single side during merge");
    let right = edge.right.expect("Edge with a single side during merge");
    geometry.sides[left].vertices.len() > 3 && geometry.sides[right].vertices.len() > 3
}

/// Replaces the colinear pair (`edge_id`, `candidate_id`) with one spanning
/// edge. With `candidate_first`, the candidate precedes the edge along their
/// common line; otherwise it follows it.
fn merge_edge_pair(
    geometry: &mut BrushGeometry,
    edge_id: EdgeId,
    candidate_id: EdgeId,
    candidate_first: bool,
) {
    let edge = geometry.edges[edge_id].clone();
    let candidate = geometry.edges[candidate_id].clone();
    let left = edge.left.expect("Edge with a single side during merge");
    let right = edge.right.expect("Edge with a single side during merge");
    debug_assert!(left != right);

    let (start, end, obsolete_vertex) = if candidate_first {
        (candidate.start, edge.end, edge.start)
    } else {
        (edge.start, candidate.end, edge.end)
    };
    let new_edge = geometry.alloc_edge(Edge {
        start,
        end,
        left: Some(left),
        right: Some(right),
    });

    let left_index = geometry
        .side_edge_index(left, candidate_id)
        .expect("Candidate edge missing from the left ring");
    let left_count = geometry.sides[left].edges.len();
    let right_index = geometry
        .side_edge_index(right, candidate_id)
        .expect("Candidate edge missing from the right ring");
    let right_count = geometry.sides[right].edges.len();

    if candidate_first {
        geometry.side_replace_edges(
            left,
            pred_n(left_index, left_count, 2),
            succ(left_index, left_count),
            new_edge,
        );
        geometry.side_replace_edges(
            right,
            pred(right_index, right_count),
            succ_n(right_index, right_count, 2),
            new_edge,
        );
    } else {
        geometry.side_replace_edges(
            left,
            pred(left_index, left_count),
            succ_n(left_index, left_count, 2),
            new_edge,
        );
        geometry.side_replace_edges(
            right,
            pred_n(right_index, right_count, 2),
            succ(right_index, right_count),
            new_edge,
        );
    }

    geometry.remove_vertex(obsolete_vertex);
    geometry.remove_edge(candidate_id);
    geometry.remove_edge(edge_id);
}
