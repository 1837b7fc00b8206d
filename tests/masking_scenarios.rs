use image::Rgba;
use inpaint_brush::{
    DisplayMapping, EncodedImage, Image, MaskBuffer, RasterSurface, binarize, punch_out,
};
use kurbo::{Point, Size};

fn surface(w: u32, h: u32) -> RasterSurface {
    RasterSurface::new(Image::from_pixel(w, h, Rgba([40, 120, 200, 255])))
}

fn stroke(s: &mut RasterSurface, points: &[(f64, f64)], size: f64) {
    let (x, y) = points[0];
    s.begin_stroke(Point::new(x, y), size);
    for &(x, y) in &points[1..] {
        s.extend_stroke(Point::new(x, y));
    }
    s.end_stroke();
}

#[test]
fn fresh_image_has_one_clear_snapshot() {
    let s = surface(64, 48);
    assert_eq!(s.history().len(), 1);
    assert_eq!(s.history().cursor(), 0);
    assert!(!s.can_undo());
    assert!(!s.can_redo());
    assert!(s.mask().is_clear());
    assert_eq!(s.mask().dimensions(), (64, 48));
}

#[test]
fn one_stroke_is_one_history_entry_and_undo_restores_blank() {
    let mut s = surface(64, 64);
    stroke(&mut s, &[(10.0, 10.0), (20.0, 20.0)], 5.0);

    assert_eq!(s.history().len(), 2);
    assert_eq!(s.history().cursor(), 1);
    assert_eq!(s.mask().get(15, 15), Some(255));
    assert_eq!(s.mask().get(40, 40), Some(0));

    assert!(s.undo());
    assert!(s.mask().is_clear());
    assert!(s.can_redo());
    assert!(!s.can_undo());
}

#[test]
fn undo_then_redo_is_byte_identical() {
    let mut s = surface(50, 50);
    stroke(&mut s, &[(5.0, 5.0), (45.0, 8.0), (30.0, 40.0)], 9.0);
    stroke(&mut s, &[(2.0, 30.0), (20.0, 25.0)], 3.0);
    let after = s.mask().clone();

    assert!(s.undo());
    assert_ne!(s.mask(), &after);
    assert!(s.redo());
    assert_eq!(s.mask(), &after);
    assert!(!s.redo());
}

#[test]
fn new_stroke_after_undo_discards_redo() {
    let mut s = surface(32, 32);
    stroke(&mut s, &[(4.0, 4.0), (28.0, 4.0)], 4.0);
    stroke(&mut s, &[(4.0, 16.0), (28.0, 16.0)], 4.0);
    assert!(s.undo());
    assert!(s.can_redo());

    stroke(&mut s, &[(4.0, 28.0), (28.0, 28.0)], 4.0);
    assert!(!s.can_redo());
    assert_eq!(s.history().len(), 3);
    assert_eq!(s.mask().get(16, 16), Some(0));
    assert_eq!(s.mask().get(16, 28), Some(255));
}

#[test]
fn clear_is_undoable() {
    let mut s = surface(20, 20);
    stroke(&mut s, &[(2.0, 10.0), (18.0, 10.0)], 4.0);
    let painted = s.mask().clone();

    s.clear();
    assert!(s.mask().is_clear());
    assert!(s.undo());
    assert_eq!(s.mask(), &painted);
}

#[test]
fn pointer_on_a_shrunk_display_lands_on_image_pixels() {
    let mut s = surface(1000, 500);
    let mapping = s.display_mapping(Size::new(500.0, 250.0));
    assert_eq!(mapping.to_image(Point::new(100.0, 50.0)), Point::new(200.0, 100.0));
    assert_eq!(
        mapping,
        DisplayMapping::new(Size::new(1000.0, 500.0), Size::new(500.0, 250.0))
    );

    s.begin_stroke(mapping.to_image(Point::new(100.0, 50.0)), 10.0);
    s.extend_stroke(mapping.to_image(Point::new(150.0, 50.0)));
    s.end_stroke();
    assert_eq!(s.mask().get(250, 100), Some(255));
    assert_eq!(s.mask().get(125, 50), Some(0));
}

#[test]
fn binarized_region_becomes_a_transparent_hole() {
    let (w, h) = (100u32, 100u32);
    let mut alpha = vec![0u8; (w * h) as usize];
    for y in 40..50 {
        for x in 20..30 {
            alpha[(y * w + x) as usize] = 255;
        }
    }
    let mask = MaskBuffer::from_raw(w, h, alpha).unwrap();
    let image = Image::from_pixel(w, h, Rgba([10, 200, 30, 255]));

    let out = punch_out(&image, &binarize(&mask)).unwrap();
    for (x, y, px) in out.enumerate_pixels() {
        let in_hole = (20..30).contains(&x) && (40..50).contains(&y);
        if in_hole {
            assert_eq!(px[3], 0, "({x},{y}) should be a hole");
        } else {
            assert_eq!(px, image.get_pixel(x, y), "({x},{y}) should be untouched");
        }
    }
}

#[test]
fn binarize_is_idempotent_on_painted_masks() {
    let mut s = surface(40, 40);
    stroke(&mut s, &[(3.0, 3.0), (36.0, 31.0)], 7.0);
    let once = binarize(s.mask());
    let twice = binarize(&once.to_opacity());
    assert_eq!(once.as_slice(), twice.as_slice());
    assert!(once.opaque_count() > 0);
}

#[test]
fn surface_payload_is_a_png_with_the_hole() {
    let mut s = surface(30, 30);
    stroke(&mut s, &[(5.0, 15.0), (25.0, 15.0)], 6.0);

    let encoded = EncodedImage::png(&s.payload().unwrap()).unwrap();
    assert_eq!(encoded.mime_type(), "image/png");
    let back = encoded.decode().unwrap();
    assert_eq!(back.dimensions(), (30, 30));
    assert_eq!(back.get_pixel(15, 15)[3], 0);
    assert_eq!(back.get_pixel(15, 2), &Rgba([40, 120, 200, 255]));
}

#[test]
fn loading_another_image_starts_over() {
    let mut s = surface(20, 20);
    stroke(&mut s, &[(1.0, 1.0), (19.0, 19.0)], 3.0);
    s.load_image(Image::new(8, 6));
    assert_eq!(s.mask().dimensions(), (8, 6));
    assert!(s.mask().is_clear());
    assert_eq!(s.history().len(), 1);
    assert!(!s.can_undo());
}
