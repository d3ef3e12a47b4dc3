use image::RgbaImage;

/// RGBA color, one byte per channel, matching the framebuffer layout.
pub type Rgba = [u8; 4];

pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

/// Read capability over a pixel surface, used for source atlases.
pub trait PixelSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Pixel at `(x, y)`, or transparent when out of bounds.
    fn pixel(&self, x: u32, y: u32) -> Rgba;
}

/// Write capability the tile engine draws into. All writes are overwrite
/// semantics with no blending, clipped to the surface bounds.
pub trait Canvas {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Overwrites one pixel; out-of-bounds coordinates are ignored.
    fn set_pixel(&mut self, x: i32, y: i32, color: Rgba);

    /// Clears pixels in `[x1, x2) x [y1, y2)` to transparent.
    fn clear_rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32);

    /// Blits `source` whole at `(x, y)`, overwriting covered pixels.
    fn draw_image(&mut self, x: i32, y: i32, source: &Framebuffer);
}

/// Owned RGBA pixel buffer. Serves as the source atlas surface, the backing
/// store of baked atlas pages, and an offscreen compositing target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Framebuffer {
    /// A `width x height` buffer of transparent pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            data: image.into_raw(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn fill(&mut self, color: Rgba) {
        for chunk in self.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    /// Raw RGBA bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }
}

impl PixelSource for Framebuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pixel(&self, x: u32, y: u32) -> Rgba {
        if x >= self.width || y >= self.height {
            return TRANSPARENT;
        }
        let offset = self.offset(x, y);
        let mut color = TRANSPARENT;
        color.copy_from_slice(&self.data[offset..offset + 4]);
        color
    }
}

impl Canvas for Framebuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let offset = self.offset(x as u32, y as u32);
        self.data[offset..offset + 4].copy_from_slice(&color);
    }

    fn clear_rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        clear_rect_rgba(&mut self.data, self.width, self.height, x1, y1, x2, y2);
    }

    fn draw_image(&mut self, x: i32, y: i32, source: &Framebuffer) {
        blit_rgba(&mut self.data, self.width, self.height, x, y, source);
    }
}

/// Borrowed RGBA frame in the renderer's `&mut [u8]` convention, so an
/// externally owned frame (e.g. a surface backbuffer) can be a draw target.
#[derive(Debug)]
pub struct FrameSlice<'a> {
    width: u32,
    height: u32,
    frame: &'a mut [u8],
}

impl<'a> FrameSlice<'a> {
    /// Wraps `frame` as a `width x height` RGBA surface. A slice shorter than
    /// `width * height * 4` yields an empty surface rather than a panic.
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        let expected = width as usize * height as usize * 4;
        if frame.len() < expected {
            return Self {
                width: 0,
                height: 0,
                frame,
            };
        }
        Self {
            width,
            height,
            frame,
        }
    }
}

impl Canvas for FrameSlice<'_> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        self.frame[offset..offset + 4].copy_from_slice(&color);
    }

    fn clear_rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        clear_rect_rgba(self.frame, self.width, self.height, x1, y1, x2, y2);
    }

    fn draw_image(&mut self, x: i32, y: i32, source: &Framebuffer) {
        blit_rgba(self.frame, self.width, self.height, x, y, source);
    }
}

fn clear_rect_rgba(frame: &mut [u8], width: u32, height: u32, x1: i32, y1: i32, x2: i32, y2: i32) {
    let left = x1.max(0);
    let top = y1.max(0);
    let right = x2.min(width as i32);
    let bottom = y2.min(height as i32);
    if left >= right || top >= bottom {
        return;
    }

    for y in top..bottom {
        let row = (y as usize * width as usize + left as usize) * 4;
        let row_end = row + (right - left) as usize * 4;
        frame[row..row_end].fill(0);
    }
}

fn blit_rgba(frame: &mut [u8], width: u32, height: u32, x: i32, y: i32, source: &Framebuffer) {
    let src_w = source.width();
    let src_h = source.height();
    if src_w == 0 || src_h == 0 || width == 0 || height == 0 {
        return;
    }

    let left = x.max(0);
    let top = y.max(0);
    let right = (x + src_w as i32).min(width as i32);
    let bottom = (y + src_h as i32).min(height as i32);
    if left >= right || top >= bottom {
        return;
    }

    let src_data = source.data();
    let copy_bytes = (right - left) as usize * 4;
    for dest_y in top..bottom {
        let src_y = (dest_y - y) as usize;
        let src_x = (left - x) as usize;
        let src_row = (src_y * src_w as usize + src_x) * 4;
        let dest_row = (dest_y as usize * width as usize + left as usize) * 4;
        frame[dest_row..dest_row + copy_bytes]
            .copy_from_slice(&src_data[src_row..src_row + copy_bytes]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = [255, 0, 0, 255];
    const BLUE: Rgba = [0, 0, 255, 255];

    #[test]
    fn set_pixel_ignores_out_of_bounds() {
        let mut fb = Framebuffer::new(4, 4);
        fb.set_pixel(-1, 0, RED);
        fb.set_pixel(0, -1, RED);
        fb.set_pixel(4, 0, RED);
        fb.set_pixel(0, 4, RED);
        assert!(fb.data().iter().all(|&byte| byte == 0));

        fb.set_pixel(2, 3, RED);
        assert_eq!(fb.pixel(2, 3), RED);
    }

    #[test]
    fn pixel_read_outside_bounds_is_transparent() {
        let fb = Framebuffer::new(2, 2);
        assert_eq!(fb.pixel(5, 0), TRANSPARENT);
        assert_eq!(fb.pixel(0, 5), TRANSPARENT);
    }

    #[test]
    fn clear_rect_clears_only_the_clamped_sub_rectangle() {
        let mut fb = Framebuffer::new(4, 4);
        fb.fill(RED);
        fb.clear_rect(1, 1, 3, 3);
        assert_eq!(fb.pixel(0, 0), RED);
        assert_eq!(fb.pixel(1, 1), TRANSPARENT);
        assert_eq!(fb.pixel(2, 2), TRANSPARENT);
        assert_eq!(fb.pixel(3, 3), RED);

        // Fully out-of-bounds rectangles are a no-op.
        fb.clear_rect(-10, -10, -1, -1);
        assert_eq!(fb.pixel(0, 0), RED);
    }

    #[test]
    fn draw_image_overwrites_without_blending() {
        let mut src = Framebuffer::new(2, 2);
        src.fill(BLUE);
        let mut dest = Framebuffer::new(4, 4);
        dest.fill(RED);

        dest.draw_image(1, 1, &src);
        assert_eq!(dest.pixel(0, 0), RED);
        assert_eq!(dest.pixel(1, 1), BLUE);
        assert_eq!(dest.pixel(2, 2), BLUE);
        assert_eq!(dest.pixel(3, 3), RED);
    }

    #[test]
    fn draw_image_clips_at_negative_offsets() {
        let mut src = Framebuffer::new(3, 3);
        src.fill(BLUE);
        let mut dest = Framebuffer::new(4, 4);
        dest.draw_image(-2, -2, &src);
        assert_eq!(dest.pixel(0, 0), BLUE);
        assert_eq!(dest.pixel(1, 0), TRANSPARENT);
        assert_eq!(dest.pixel(0, 1), TRANSPARENT);
    }

    #[test]
    fn frame_slice_matches_framebuffer_layout() {
        let mut raw = vec![0u8; 4 * 4 * 4];
        {
            let mut slice = FrameSlice::new(&mut raw, 4, 4);
            slice.set_pixel(1, 2, RED);
            slice.set_pixel(-1, 0, BLUE);
        }
        let offset = (2 * 4 + 1) * 4;
        assert_eq!(&raw[offset..offset + 4], &RED);
    }

    #[test]
    fn undersized_frame_slice_is_inert() {
        let mut raw = vec![0u8; 8];
        let mut slice = FrameSlice::new(&mut raw, 4, 4);
        assert_eq!(slice.width(), 0);
        slice.set_pixel(0, 0, RED);
        assert!(raw.iter().all(|&byte| byte == 0));
    }
}
