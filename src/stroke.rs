// Brush stroke rasterizer.
// Each segment of a stroke is a capsule (round caps, round joins by union)
// painted into the mask with anti-aliased edges.
// Compositing rule: max opacity wins, so repainting a path never darkens it
// beyond one pass and the result does not depend on segment order.

use kurbo::{Point, Vec2};

use crate::types::MaskBuffer;

/// Coverage of a pixel whose centre sits `dist` px from the segment, for a brush
/// of half-width `half`. Full inside, linear ramp across the last pixel.
#[inline]
fn coverage(dist: f64, half: f64) -> f64 {
    (half + 0.5 - dist).clamp(0.0, 1.0)
}

/// Distance from `p` to the closed segment starting at `a` with direction `ab`.
#[inline]
fn distance_to_segment(p: Point, a: Point, ab: Vec2, len2: f64) -> f64 {
    let ap = p - a;
    let t = if len2 > 0.0 {
        (ap.dot(ab) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (ap - ab * t).hypot()
}

fn is_finite(p: Point) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

/// Paint the segment a→b with a brush `size` px wide (the line width) into `mask`.
/// Points may lie outside the image; only the overlap is touched.
/// Returns how many pixels got more opaque.
pub fn paint_segment(mask: &mut MaskBuffer, a: Point, b: Point, size: f64) -> usize {
    let half = size * 0.5;
    if !(half > 0.0) || !is_finite(a) || !is_finite(b) {
        return 0;
    }

    // Bounding box of the capsule plus the anti-aliasing fringe, clamped to the buffer.
    let reach = half + 0.5;
    let w = i64::from(mask.width());
    let h = i64::from(mask.height());
    let x0 = ((a.x.min(b.x) - reach).floor() as i64).max(0);
    let y0 = ((a.y.min(b.y) - reach).floor() as i64).max(0);
    let x1 = ((a.x.max(b.x) + reach).ceil() as i64).min(w);
    let y1 = ((a.y.max(b.y) + reach).ceil() as i64).min(h);
    if x0 >= x1 || y0 >= y1 {
        return 0;
    }

    let ab = b - a;
    let len2 = ab.hypot2();
    let stride = mask.width() as usize;
    let alpha = mask.alpha_mut();
    let mut raised = 0;

    for y in y0..y1 {
        let row = y as usize * stride;
        for x in x0..x1 {
            // Sample at the pixel centre.
            let p = Point::new(x as f64 + 0.5, y as f64 + 0.5);
            let c = coverage(distance_to_segment(p, a, ab, len2), half);
            if c <= 0.0 {
                continue;
            }
            let v = (c * 255.0).round() as u8;
            let px = &mut alpha[row + x as usize];
            if v > *px {
                *px = v;
                raised += 1;
            }
        }
    }
    raised
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_segment_paints_its_centre_line() {
        let mut m = MaskBuffer::new(32, 32);
        let n = paint_segment(&mut m, Point::new(10.0, 10.0), Point::new(20.0, 20.0), 5.0);
        assert!(n > 0);
        assert_eq!(m.get(15, 15), Some(255));
        assert_eq!(m.get(0, 0), Some(0));
        assert_eq!(m.get(30, 2), Some(0));
    }

    #[test]
    fn round_cap_extends_past_the_endpoint() {
        let mut m = MaskBuffer::new(40, 10);
        paint_segment(&mut m, Point::new(10.0, 5.0), Point::new(20.0, 5.0), 6.0);
        // 2 px beyond the end is still within the half-width of 3.
        assert_eq!(m.get(21, 4), Some(255));
        // Far beyond the cap nothing is painted.
        assert_eq!(m.get(26, 4), Some(0));
    }

    #[test]
    fn repainting_the_same_segment_is_idempotent() {
        let mut once = MaskBuffer::new(24, 24);
        paint_segment(&mut once, Point::new(3.2, 4.7), Point::new(18.9, 11.1), 7.0);
        let mut twice = once.clone();
        let raised = paint_segment(&mut twice, Point::new(3.2, 4.7), Point::new(18.9, 11.1), 7.0);
        assert_eq!(raised, 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn segment_order_does_not_matter() {
        let a = Point::new(2.0, 2.0);
        let b = Point::new(12.0, 3.0);
        let c = Point::new(6.0, 14.0);

        let mut forward = MaskBuffer::new(20, 20);
        paint_segment(&mut forward, a, b, 4.0);
        paint_segment(&mut forward, b, c, 4.0);

        let mut backward = MaskBuffer::new(20, 20);
        paint_segment(&mut backward, b, c, 4.0);
        paint_segment(&mut backward, a, b, 4.0);

        assert_eq!(forward, backward);
    }

    #[test]
    fn edges_are_partially_covered() {
        let mut m = MaskBuffer::new(20, 20);
        paint_segment(&mut m, Point::new(10.0, 10.0), Point::new(10.0, 10.0), 5.0);
        // The pixel whose centre is ~2.9 px from the dot lands on the fringe.
        let fringe = m.get(12, 11).unwrap_or(0);
        assert!(fringe > 0 && fringe < 255, "fringe = {fringe}");
    }

    #[test]
    fn zero_width_and_off_canvas_strokes_do_nothing() {
        let mut m = MaskBuffer::new(8, 8);
        assert_eq!(paint_segment(&mut m, Point::ZERO, Point::new(5.0, 5.0), 0.0), 0);
        assert_eq!(
            paint_segment(&mut m, Point::new(-50.0, -50.0), Point::new(-40.0, -40.0), 4.0),
            0
        );
        assert_eq!(
            paint_segment(&mut m, Point::new(f64::NAN, 1.0), Point::new(2.0, 2.0), 4.0),
            0
        );
        assert!(m.is_clear());
    }
}
