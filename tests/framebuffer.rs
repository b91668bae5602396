mod tests {
    use embedded_graphics::pixelcolor::Gray8;
    use embedded_graphics::prelude::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
    use myrtio_matrix_composer::canvas::luma_to_level;
    use myrtio_matrix_composer::{Framebuffer, PlaneSource, compute_line_bytes};

    const LINE_BYTES: usize = compute_line_bytes(14);
    type LolFramebuffer = Framebuffer<4, 14, 9, LINE_BYTES>;

    #[test]
    fn test_line_bytes() {
        assert_eq!(compute_line_bytes(14), 2);
        assert_eq!(compute_line_bytes(8), 1);
        assert_eq!(compute_line_bytes(9), 2);
    }

    #[test]
    fn test_set_and_get_pixel() {
        let framebuffer = LolFramebuffer::new();
        assert_eq!(framebuffer.dimensions(), (14, 9));
        assert_eq!(framebuffer.planes(), 4);

        framebuffer.set_pixel(Point::new(3, 2), 2);
        assert_eq!(framebuffer.get_pixel(Point::new(3, 2)), 2);
        assert_eq!(framebuffer.get_pixel(Point::new(2, 3)), 0);

        framebuffer.set_pixel(Point::new(3, 2), 0);
        assert_eq!(framebuffer.get_pixel(Point::new(3, 2)), 0);
    }

    #[test]
    fn test_levels_light_leading_planes() {
        let framebuffer = LolFramebuffer::new();
        framebuffer.set_pixel(Point::new(13, 8), 3);

        assert!(framebuffer.is_lit(0, 13, 8));
        assert!(framebuffer.is_lit(1, 13, 8));
        assert!(framebuffer.is_lit(2, 13, 8));
        assert!(!framebuffer.is_lit(3, 13, 8));

        framebuffer.set_pixel(Point::new(13, 8), 1);
        assert!(framebuffer.is_lit(0, 13, 8));
        assert!(!framebuffer.is_lit(1, 13, 8));
    }

    #[test]
    fn test_level_clamped() {
        let framebuffer = LolFramebuffer::new();
        framebuffer.set_pixel(Point::new(0, 0), 200);
        assert_eq!(framebuffer.get_pixel(Point::new(0, 0)), 4);
    }

    #[test]
    fn test_out_of_range_ignored() {
        let framebuffer = LolFramebuffer::new();
        framebuffer.set_pixel(Point::new(14, 0), 4);
        framebuffer.set_pixel(Point::new(-1, 0), 4);
        framebuffer.set_pixel(Point::new(0, 9), 4);

        assert_eq!(framebuffer.get_pixel(Point::new(14, 0)), 0);
        assert!(!framebuffer.is_lit(0, 14, 0));
        assert!(!framebuffer.is_lit(4, 0, 0));
        for y in 0..9 {
            for x in 0..14 {
                assert_eq!(framebuffer.get_pixel(Point::new(x, y)), 0);
            }
        }
    }

    #[test]
    fn test_neighbours_untouched() {
        let framebuffer = LolFramebuffer::new();
        framebuffer.set_pixel(Point::new(7, 4), 4);
        framebuffer.set_pixel(Point::new(8, 4), 2);

        assert_eq!(framebuffer.get_pixel(Point::new(7, 4)), 4);
        assert_eq!(framebuffer.get_pixel(Point::new(8, 4)), 2);
        assert_eq!(framebuffer.get_pixel(Point::new(6, 4)), 0);
        assert_eq!(framebuffer.get_pixel(Point::new(9, 4)), 0);
    }

    #[test]
    fn test_fill_and_clear() {
        let framebuffer = LolFramebuffer::new();
        framebuffer.fill(3);
        for y in 0..9 {
            for x in 0..14 {
                assert_eq!(framebuffer.get_pixel(Point::new(x, y)), 3);
            }
        }
        // padding bits past the last column stay clear
        assert!(!framebuffer.is_lit(0, 15, 0));

        framebuffer.clear();
        for plane in 0..4 {
            for y in 0..9 {
                for x in 0..14 {
                    assert!(!framebuffer.is_lit(plane, x, y));
                }
            }
        }
    }

    #[test]
    fn test_luma_to_level() {
        assert_eq!(luma_to_level(0, 4), 0);
        assert_eq!(luma_to_level(255, 4), 4);
        assert_eq!(luma_to_level(128, 4), 2);
        assert_eq!(luma_to_level(31, 4), 0);
        assert_eq!(luma_to_level(32, 4), 1);
        assert_eq!(luma_to_level(255, 1), 1);
    }

    #[test]
    fn test_canvas_draws_levels() {
        let framebuffer = LolFramebuffer::new();
        let mut canvas = framebuffer.canvas();
        assert_eq!(canvas.size(), Size::new(14, 9));

        Rectangle::new(Point::new(1, 1), Size::new(3, 2))
            .into_styled(PrimitiveStyle::with_fill(Gray8::new(128)))
            .draw(&mut canvas)
            .unwrap();

        assert_eq!(framebuffer.get_pixel(Point::new(1, 1)), 2);
        assert_eq!(framebuffer.get_pixel(Point::new(3, 2)), 2);
        assert_eq!(framebuffer.get_pixel(Point::new(4, 2)), 0);
        assert_eq!(framebuffer.get_pixel(Point::new(1, 3)), 0);

        canvas.clear(Gray8::WHITE).unwrap();
        assert_eq!(framebuffer.get_pixel(Point::new(13, 8)), 4);
    }

    #[test]
    fn test_static_framebuffer() {
        static FRAMEBUFFER: LolFramebuffer = LolFramebuffer::new();
        FRAMEBUFFER.set_pixel(Point::new(5, 5), 1);
        assert_eq!(FRAMEBUFFER.get_pixel(Point::new(5, 5)), 1);
    }
}
