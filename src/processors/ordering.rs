//! Reading-order clustering and line merging.
//!
//! Line candidates arrive as bounding-box centers in mask extraction order.
//! This module folds them into rows using the adaptive spacing tolerance,
//! merges components that belong to the same physical line, and emits the
//! final top-to-bottom, left-to-right reading order.

use crate::processors::contours::{Line, LineId};
use crate::processors::geometry::{Contour, Point};
use std::collections::HashMap;
use tracing::debug;

/// A line candidate's center, tagged with the id of the line it belongs
/// to. Grouping resolves members through the id, never through coordinate
/// equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCenter {
    /// Id of the owning line.
    pub id: LineId,
    /// X-coordinate of the bounding-box center.
    pub x: i32,
    /// Y-coordinate of the bounding-box center.
    pub y: i32,
}

impl LineCenter {
    /// Creates a center record for a line.
    pub fn of(line: &Line) -> Self {
        Self {
            id: line.id,
            x: line.center.0,
            y: line.center.1,
        }
    }
}

/// Groups centers into rows with a single left-to-right scan.
///
/// The scan keeps one open group. Each next center is compared against the
/// running mean y-coordinate of the open group's members (not a fixed
/// reference, so slight line bending does not split a row): if the absolute
/// difference exceeds `tolerance`, the group is closed, sorted by x, and a
/// new group is opened with the center; otherwise the center joins the open
/// group.
///
/// After the scan the list of groups is reversed. The input's extraction
/// order trends bottom-to-top, so the reversal yields top-to-bottom groups;
/// this pairing is a deliberate, fragile coupling with the contour
/// extractor and must not be "fixed" on either side alone.
///
/// # Arguments
///
/// * `centers` - Centers in their original extraction order.
/// * `tolerance` - Vertical spacing tolerance. A tolerance of 0 closes a
///   group on every center, degenerating to a pure positional sort with no
///   vertical merging; accepted fallback, not an error.
///
/// # Returns
///
/// Groups ordered top-to-bottom, members sorted ascending by x.
pub fn cluster_centers(centers: &[LineCenter], tolerance: f32) -> Vec<Vec<LineCenter>> {
    let mut groups: Vec<Vec<LineCenter>> = Vec::new();
    let mut open: Vec<LineCenter> = Vec::new();

    for &center in centers {
        if !open.is_empty() {
            let mean_y = open.iter().map(|c| c.y as f32).sum::<f32>() / open.len() as f32;
            if (mean_y - center.y as f32).abs() > tolerance {
                open.sort_by_key(|c| c.x);
                groups.push(std::mem::take(&mut open));
            }
        }
        open.push(center);
    }

    if !open.is_empty() {
        open.sort_by_key(|c| c.x);
        groups.push(open);
    }

    groups.reverse();
    debug!(groups = groups.len(), "clustered line centers");
    groups
}

/// Collapses clustered centers back into ordered lines.
///
/// A group with more than one member becomes a single synthetic line whose
/// contour is the convex hull of all member contours stacked together, with
/// bounding box and center recomputed from that hull. A singleton group
/// passes its original line through unchanged. Output order is the group
/// order with members resolved left-to-right, which defines the reading
/// order consumed downstream.
///
/// # Arguments
///
/// * `clusters` - Output of [`cluster_centers`].
/// * `lines` - The lines the centers were derived from; consumed.
///
/// # Returns
///
/// Lines in reading order. Merged lines receive fresh ids above the
/// existing range.
pub fn group_line_chunks(clusters: &[Vec<LineCenter>], lines: Vec<Line>) -> Vec<Line> {
    let mut next_id = lines.iter().map(|l| l.id.0 + 1).max().unwrap_or(0);
    let mut by_id: HashMap<LineId, Line> = lines.into_iter().map(|l| (l.id, l)).collect();

    let mut ordered = Vec::with_capacity(clusters.len());

    for cluster in clusters {
        if cluster.len() > 1 {
            let mut stacked: Vec<Point> = Vec::new();
            for center in cluster {
                if let Some(line) = by_id.remove(&center.id) {
                    stacked.extend(line.contour.points);
                }
            }
            if stacked.is_empty() {
                continue;
            }

            let hull = Contour::new(stacked).convex_hull();
            let merged = Line::from_contour(LineId(next_id), hull, false);
            next_id += 1;
            ordered.push(merged);
        } else if let Some(center) = cluster.first() {
            if let Some(line) = by_id.remove(&center.id) {
                ordered.push(line);
            }
        }
    }

    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::geometry::Contour;

    fn line_at(id: u32, x: i32, y: i32, w: i32, h: i32) -> Line {
        let contour = Contour::new(vec![
            Point::new(x, y),
            Point::new(x + w - 1, y),
            Point::new(x + w - 1, y + h - 1),
            Point::new(x, y + h - 1),
        ]);
        Line::from_contour(LineId(id), contour, false)
    }

    fn centers_of(lines: &[Line]) -> Vec<LineCenter> {
        lines.iter().map(LineCenter::of).collect()
    }

    #[test]
    fn test_same_row_forms_single_group_sorted_by_x() {
        let centers = vec![
            LineCenter { id: LineId(0), x: 300, y: 101 },
            LineCenter { id: LineId(1), x: 100, y: 99 },
            LineCenter { id: LineId(2), x: 200, y: 100 },
        ];
        let groups = cluster_centers(&centers, 20.0);
        assert_eq!(groups.len(), 1);
        let xs: Vec<i32> = groups[0].iter().map(|c| c.x).collect();
        assert_eq!(xs, vec![100, 200, 300]);
    }

    #[test]
    fn test_distinct_bands_split_and_reverse() {
        // Extraction order trends bottom-to-top; groups come out top-first.
        let centers = vec![
            LineCenter { id: LineId(0), x: 100, y: 500 },
            LineCenter { id: LineId(1), x: 100, y: 300 },
            LineCenter { id: LineId(2), x: 100, y: 100 },
        ];
        let groups = cluster_centers(&centers, 70.0);
        assert_eq!(groups.len(), 3);
        let ys: Vec<i32> = groups.iter().map(|g| g[0].y).collect();
        assert_eq!(ys, vec![100, 300, 500]);
    }

    #[test]
    fn test_zero_tolerance_degenerates_to_one_group_per_center() {
        let centers = vec![
            LineCenter { id: LineId(0), x: 100, y: 10 },
            LineCenter { id: LineId(1), x: 200, y: 10 },
        ];
        // Difference |10 - 10| = 0 is not strictly greater than 0, so equal
        // y still merges; distinct y always splits.
        let groups = cluster_centers(&centers, 0.0);
        assert_eq!(groups.len(), 1);

        let centers = vec![
            LineCenter { id: LineId(0), x: 100, y: 10 },
            LineCenter { id: LineId(1), x: 200, y: 11 },
        ];
        let groups = cluster_centers(&centers, 0.0);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_running_mean_tracks_bent_line() {
        // Centers drift upward slowly; a fixed reference to the first
        // center would split the row, the running mean keeps it together.
        let centers: Vec<LineCenter> = (0..5)
            .map(|i| LineCenter {
                id: LineId(i),
                x: 100 * i as i32,
                y: 100 + 6 * i as i32,
            })
            .collect();
        let groups = cluster_centers(&centers, 10.0);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 5);
    }

    #[test]
    fn test_empty_input_yields_no_groups() {
        assert!(cluster_centers(&[], 20.0).is_empty());
    }

    #[test]
    fn test_singleton_groups_pass_lines_through() {
        let lines = vec![line_at(0, 100, 500, 200, 21), line_at(1, 100, 100, 200, 21)];
        let clusters = cluster_centers(&centers_of(&lines), 50.0);
        let ordered = group_line_chunks(&clusters, lines);
        assert_eq!(ordered.len(), 2);
        assert_eq!(ordered[0].bbox.y, 100);
        assert_eq!(ordered[1].bbox.y, 500);
        assert_eq!(ordered[0].id, LineId(1));
    }

    #[test]
    fn test_multi_member_group_merges_via_hull() {
        // Two chunks of the same physical line, split horizontally.
        let lines = vec![line_at(0, 100, 100, 100, 21), line_at(1, 300, 102, 100, 21)];
        let clusters = cluster_centers(&centers_of(&lines), 30.0);
        assert_eq!(clusters.len(), 1);

        let ordered = group_line_chunks(&clusters, lines);
        assert_eq!(ordered.len(), 1);
        let merged = &ordered[0];
        // Hull spans both chunks; id is freshly assigned.
        assert_eq!(merged.bbox.x, 100);
        assert_eq!(merged.bbox.width, 300);
        assert_eq!(merged.id, LineId(2));
    }
}
