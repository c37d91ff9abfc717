//! Frame-local selection of the player most likely holding the ball.

use nalgebra::{distance, Point2};

use crate::geometry::BoundingBox;
use crate::tracks::{TrackFrame, TrackId};

/// Fraction of the ball's box area covered by the player's box.
///
/// Returns 0 when the ball box has zero area.
pub fn containment_ratio(player: &BoundingBox, ball: &BoundingBox) -> f64 {
    let ball_area = ball.area();
    if ball_area == 0.0 {
        return 0.0;
    }
    player.intersection_area(ball) / ball_area
}

/// Reference points on the player's box used to measure distance to the ball.
///
/// Always contains the four corners and four edge midpoints. When the ball's y
/// lies strictly inside the box's vertical span, its projections onto the left and
/// right edges are added first; likewise for x and the top and bottom edges.
pub fn key_points(player: &BoundingBox, ball_center: &Point2<f64>) -> Vec<Point2<f64>> {
    let BoundingBox { x1, y1, x2, y2 } = *player;
    let mid_x = x1 + player.width() / 2.0;
    let mid_y = y1 + player.height() / 2.0;

    let mut points = Vec::with_capacity(12);

    if y1 < ball_center.y && ball_center.y < y2 {
        points.push(Point2::new(x1, ball_center.y));
        points.push(Point2::new(x2, ball_center.y));
    }
    if x1 < ball_center.x && ball_center.x < x2 {
        points.push(Point2::new(ball_center.x, y1));
        points.push(Point2::new(ball_center.x, y2));
    }

    points.extend_from_slice(&[
        Point2::new(x1, y1),
        Point2::new(x2, y1),
        Point2::new(x1, y2),
        Point2::new(x2, y2),
        Point2::new(mid_x, y1),
        Point2::new(mid_x, y2),
        Point2::new(x1, mid_y),
        Point2::new(x2, mid_y),
    ]);

    points
}

/// Smallest distance from the ball center to any of the player's key points.
pub fn min_distance_to_ball(player: &BoundingBox, ball_center: &Point2<f64>) -> f64 {
    key_points(player, ball_center)
        .iter()
        .map(|p| distance(p, ball_center))
        .fold(f64::INFINITY, f64::min)
}

/// Pick the frame's possession candidate.
///
/// Players whose box covers more than `containment_threshold` of the ball win by
/// highest containment. Otherwise the player with the smallest key-point distance
/// wins if that distance is below `max_loose_distance`. Ties go to the first player
/// in identity order.
pub fn find_best_candidate(
    ball: &BoundingBox,
    players: &TrackFrame,
    containment_threshold: f64,
    max_loose_distance: f64,
) -> Option<TrackId> {
    let ball_center = ball.center();

    let mut best_close: Option<(TrackId, f64)> = None;
    let mut best_loose: Option<(TrackId, f64)> = None;

    for (&player_id, player) in players {
        let containment = containment_ratio(player, ball);

        if containment > containment_threshold {
            if best_close.map_or(true, |(_, best)| containment > best) {
                best_close = Some((player_id, containment));
            }
        } else {
            let dist = min_distance_to_ball(player, &ball_center);
            if best_loose.map_or(true, |(_, best)| dist < best) {
                best_loose = Some((player_id, dist));
            }
        }
    }

    if let Some((player_id, _)) = best_close {
        return Some(player_id);
    }

    best_loose
        .filter(|&(_, dist)| dist < max_loose_distance)
        .map(|(player_id, _)| player_id)
}
