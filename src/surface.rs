// The paint surface: source image + aligned mask + undo history.
// Pointer events drive a tiny state machine (Idle <-> Stroking).
// Visual: pink strokes follow the mouse; undo/redo/clear swap the mask in place.

use kurbo::{Point, Size};

use crate::composite;
use crate::error::Result;
use crate::history::StrokeHistory;
use crate::types::{BinaryMask, Image, MaskBuffer};

/// Maps pointer positions from display space (scaled on screen) to image pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayMapping {
    image: Size,
    display: Size,
}

impl DisplayMapping {
    pub fn new(image: Size, display: Size) -> Self {
        Self { image, display }
    }

    /// Image shown at its native size.
    pub fn identity(image: Size) -> Self {
        Self::new(image, image)
    }

    fn axis_scale(image: f64, display: f64) -> f64 {
        if display > 0.0 { image / display } else { 1.0 }
    }

    pub fn scale_x(&self) -> f64 {
        Self::axis_scale(self.image.width, self.display.width)
    }

    pub fn scale_y(&self) -> f64 {
        Self::axis_scale(self.image.height, self.display.height)
    }

    /// `imagePos = pointerPos * (imageDimension / displayedDimension)`, per axis.
    pub fn to_image(&self, pointer: Point) -> Point {
        Point::new(pointer.x * self.scale_x(), pointer.y * self.scale_y())
    }

    pub fn to_display(&self, image_pos: Point) -> Point {
        Point::new(image_pos.x / self.scale_x(), image_pos.y / self.scale_y())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum StrokeState {
    Idle,
    Stroking { last: Point, size: f64 },
}

pub struct RasterSurface {
    image: Image,
    mask: MaskBuffer,
    history: StrokeHistory,
    state: StrokeState,
}

impl RasterSurface {
    pub fn new(image: Image) -> Self {
        Self::with_history_limit(image, None)
    }

    pub fn with_history_limit(image: Image, limit: Option<usize>) -> Self {
        let mask = MaskBuffer::new(image.width(), image.height());
        let history = StrokeHistory::with_limit(mask.clone(), limit);
        tracing::info!(w = image.width(), h = image.height(), "surface ready");
        Self {
            image,
            mask,
            history,
            state: StrokeState::Idle,
        }
    }

    /// Swap in a new picture. Mask and history start over; nothing carries across images.
    pub fn load_image(&mut self, image: Image) {
        self.mask = MaskBuffer::new(image.width(), image.height());
        // Seed history with the cleared mask directly; a `clear()` here would push a duplicate.
        self.history.reset(self.mask.clone());
        self.state = StrokeState::Idle;
        self.image = image;
        tracing::info!(w = self.image.width(), h = self.image.height(), "image loaded");
    }

    /// Start a path at `point` (image space). Nothing is painted until it is extended.
    pub fn begin_stroke(&mut self, point: Point, brush_size: f64) {
        if let StrokeState::Stroking { .. } = self.state {
            tracing::debug!("begin_stroke while stroking; restarting path");
        }
        self.state = StrokeState::Stroking {
            last: point,
            size: brush_size,
        };
    }

    /// Paint from the previous point to `point`. Returns false when no stroke is active.
    pub fn extend_stroke(&mut self, point: Point) -> bool {
        let StrokeState::Stroking { last, size } = self.state else {
            tracing::trace!("extend_stroke with no active stroke");
            return false;
        };
        crate::stroke::paint_segment(&mut self.mask, last, point, size);
        self.state = StrokeState::Stroking { last: point, size };
        true
    }

    /// Finish the path and record it in history. Returns false when no stroke was active.
    pub fn end_stroke(&mut self) -> bool {
        if self.state == StrokeState::Idle {
            return false;
        }
        self.state = StrokeState::Idle;
        self.history.push(self.mask.clone());
        true
    }

    /// Wipe the mask; this is an undoable step of its own.
    pub fn clear(&mut self) {
        self.state = StrokeState::Idle;
        self.mask.clear();
        self.history.push(self.mask.clone());
    }

    /// Returns false when there was nothing to undo. An unfinished stroke is abandoned first.
    pub fn undo(&mut self) -> bool {
        self.state = StrokeState::Idle;
        match self.history.undo() {
            Some(snapshot) => {
                self.mask.clone_from(snapshot);
                true
            }
            None => {
                // The abandoned path may have painted; show the snapshot again.
                self.mask.clone_from(self.history.current());
                false
            }
        }
    }

    /// Returns false when there was nothing to redo. An unfinished stroke is abandoned first.
    pub fn redo(&mut self) -> bool {
        self.state = StrokeState::Idle;
        match self.history.redo() {
            Some(snapshot) => {
                self.mask.clone_from(snapshot);
                true
            }
            None => {
                self.mask.clone_from(self.history.current());
                false
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn is_stroking(&self) -> bool {
        matches!(self.state, StrokeState::Stroking { .. })
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn mask(&self) -> &MaskBuffer {
        &self.mask
    }

    pub fn history(&self) -> &StrokeHistory {
        &self.history
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Mapping for this image shown at `display` size.
    pub fn display_mapping(&self, display: Size) -> DisplayMapping {
        let (w, h) = self.dimensions();
        DisplayMapping::new(Size::new(f64::from(w), f64::from(h)), display)
    }

    pub fn binary_mask(&self) -> BinaryMask {
        crate::binarize::binarize(&self.mask)
    }

    /// The image with the painted region punched out.
    pub fn payload(&self) -> Result<Image> {
        composite::payload(&self.image, &self.mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn surface(w: u32, h: u32) -> RasterSurface {
        RasterSurface::new(Image::from_pixel(w, h, Rgba([40, 40, 40, 255])))
    }

    fn stroke(s: &mut RasterSurface, from: (f64, f64), to: (f64, f64), size: f64) {
        s.begin_stroke(Point::new(from.0, from.1), size);
        s.extend_stroke(Point::new(to.0, to.1));
        s.end_stroke();
    }

    #[test]
    fn mapping_scales_each_axis_independently() {
        let m = DisplayMapping::new(Size::new(1000.0, 500.0), Size::new(500.0, 100.0));
        assert_eq!(m.to_image(Point::new(10.0, 10.0)), Point::new(20.0, 50.0));
        assert_eq!(m.to_display(Point::new(20.0, 50.0)), Point::new(10.0, 10.0));
        let id = DisplayMapping::identity(Size::new(64.0, 64.0));
        assert_eq!(id.to_image(Point::new(3.5, 7.0)), Point::new(3.5, 7.0));
    }

    #[test]
    fn degenerate_display_size_falls_back_to_identity() {
        let m = DisplayMapping::new(Size::new(100.0, 100.0), Size::new(0.0, 0.0));
        assert_eq!(m.to_image(Point::new(4.0, 5.0)), Point::new(4.0, 5.0));
    }

    #[test]
    fn events_without_a_stroke_are_ignored() {
        let mut s = surface(20, 20);
        assert!(!s.extend_stroke(Point::new(5.0, 5.0)));
        assert!(!s.end_stroke());
        assert!(s.mask().is_clear());
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn begin_alone_paints_nothing_but_end_still_records() {
        let mut s = surface(20, 20);
        s.begin_stroke(Point::new(5.0, 5.0), 8.0);
        assert!(s.is_stroking());
        assert!(s.mask().is_clear());
        assert!(s.end_stroke());
        assert_eq!(s.history().len(), 2);
        assert!(!s.is_stroking());
    }

    #[test]
    fn multi_segment_stroke_is_one_history_step() {
        let mut s = surface(40, 40);
        s.begin_stroke(Point::new(5.0, 5.0), 4.0);
        s.extend_stroke(Point::new(15.0, 5.0));
        s.extend_stroke(Point::new(15.0, 15.0));
        s.extend_stroke(Point::new(30.0, 30.0));
        s.end_stroke();
        assert_eq!(s.history().len(), 2);
        assert_eq!(s.mask().get(15, 10), Some(255));

        assert!(s.undo());
        assert!(s.mask().is_clear());
    }

    #[test]
    fn clear_is_undoable() {
        let mut s = surface(20, 20);
        stroke(&mut s, (2.0, 2.0), (10.0, 10.0), 3.0);
        let painted = s.mask().clone();

        s.clear();
        assert!(s.mask().is_clear());
        assert_eq!(s.history().len(), 3);

        assert!(s.undo());
        assert_eq!(s.mask(), &painted);
    }

    #[test]
    fn load_image_resets_mask_and_history_without_a_duplicate() {
        let mut s = surface(20, 20);
        stroke(&mut s, (2.0, 2.0), (10.0, 10.0), 3.0);
        s.load_image(Image::new(7, 9));

        assert_eq!(s.mask().dimensions(), (7, 9));
        assert!(s.mask().is_clear());
        assert_eq!(s.history().len(), 1);
        assert!(!s.can_undo());
        assert!(!s.can_redo());
    }

    #[test]
    fn undo_mid_stroke_abandons_the_path() {
        let mut s = surface(20, 20);
        s.begin_stroke(Point::new(2.0, 2.0), 4.0);
        s.extend_stroke(Point::new(12.0, 2.0));
        assert!(!s.mask().is_clear());

        assert!(!s.undo());
        assert!(!s.is_stroking());
        assert!(s.mask().is_clear());
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn payload_punches_the_painted_region() {
        let mut s = surface(30, 30);
        stroke(&mut s, (10.0, 10.0), (20.0, 10.0), 6.0);
        let payload = s.payload().unwrap();
        assert_eq!(payload.get_pixel(15, 10)[3], 0);
        assert_eq!(payload.get_pixel(2, 25), s.image().get_pixel(2, 25));
        assert_eq!(s.binary_mask().opaque_count(), s.mask().painted_pixels());
    }
}
