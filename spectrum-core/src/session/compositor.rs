use super::control::draw_order;
use crate::models::device::CaptureDevice;
use crate::models::error::CaptureError;
use crate::models::surface::Surface;
use crate::processing::waterfall::Waterfall;
use crate::processing::zeroed;
use crate::traits::text_renderer::{TextOverlay, TextRenderer};

/// Fill for the part of a quadrant no device reached.
pub const BACKGROUND_COLOR: u32 = 0x00ff_ffff;

/// Block guide lines and the pointer frequency line.
pub const GUIDE_COLOR: u32 = 0x00ff_0000;

pub const HELP_TEXT: &str = "key binds:
\tUP / DOWN : scale input wave form display
\tLEFT / RIGHT : cycle topmost audio source
\tN / M : decrease / increase spectrum width
\tCOMMA / DOT : decrease / increase spectrum amplification";

/// Everything the compositor reads to paint one frame.
pub struct Scene<'a> {
    pub devices: &'a [CaptureDevice],
    pub topmost: usize,
    pub colors: &'a [u32],
    pub sample_clamp: f32,
    pub frequency_min: f32,
    pub frequency_max: f32,
    pub amplification: f32,
    /// Number of transform blocks that fit in a device ring.
    pub guide_slices: usize,
    pub waterfall: &'a Waterfall,
    /// Pointer position in bottom-up frame coordinates.
    pub pointer: Option<(u32, u32)>,
}

impl Scene<'_> {
    fn color(&self, device_index: usize) -> u32 {
        match self.colors.len() {
            0 => BACKGROUND_COLOR,
            n => self.colors[device_index % n],
        }
    }
}

/// Width-indexed high-water marks, allocated on resize.
#[derive(Debug)]
pub struct CompositorBuffers {
    max_spectrum: Vec<u32>,
    max_sample: Vec<u32>,
}

/// Paints frames from the pipeline's current state.
///
/// Bottom-up layout for a frame of height `h`, `quad = h / 4`:
///
/// ```text
/// [3q, 4q)  oscilloscope of each device's sample ring, block guide lines
/// [2q, 3q)  spectrum bars
/// [0, 2q)   waterfall history, one position indicator row per device
/// ```
///
/// Bars and oscilloscope stack by per-column high-water marks: each device
/// only paints from the tallest height drawn so far up to its own height.
#[derive(Debug, Default)]
pub struct Compositor {
    max_spectrum: Vec<u32>,
    max_sample: Vec<u32>,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(width: usize) -> Result<CompositorBuffers, CaptureError> {
        Ok(CompositorBuffers {
            max_spectrum: zeroed(width)?,
            max_sample: zeroed(width)?,
        })
    }

    pub fn install(&mut self, buffers: CompositorBuffers) {
        self.max_spectrum = buffers.max_spectrum;
        self.max_sample = buffers.max_sample;
    }

    /// Columns the scratch buffers can serve.
    pub fn width(&self) -> usize {
        self.max_spectrum.len()
    }

    pub fn render(&mut self, scene: &Scene<'_>, surface: &mut Surface<'_>, text: &mut dyn TextRenderer) {
        if scene.devices.is_empty() {
            draw_gradient(surface);
        } else {
            self.draw_devices(scene, surface);
        }

        if let Some((x, _)) = self.pointer_column(scene, surface) {
            let height = surface.height();
            surface.fill_column(x, height / 2..height * 3 / 4, GUIDE_COLOR);
        }
        for overlay in self.overlays(scene, surface) {
            text.render_text(surface, overlay.x, overlay.y, &overlay.text);
        }
    }

    /// Text drawn on top of the frame, in draw order.
    pub fn overlays(&self, scene: &Scene<'_>, surface: &Surface<'_>) -> Vec<TextOverlay> {
        let height = surface.height();
        let mut overlays = Vec::with_capacity(5);

        if let Some((x, hz)) = self.pointer_column(scene, surface) {
            overlays.push(TextOverlay {
                x,
                y: height / 2,
                text: format!("{hz} Hz"),
            });
        }

        overlays.push(TextOverlay {
            x: 20,
            y: height.saturating_sub(20),
            text: HELP_TEXT.to_string(),
        });

        let lines = [
            format!("spectrum range min: {}Hz", scene.frequency_min as i32),
            format!("spectrum range max: {}Hz", scene.frequency_max as i32),
            format!("spectrum amplification: {}%", (scene.amplification * 100.0) as i32),
        ];
        for (line, text) in lines.into_iter().enumerate() {
            overlays.push(TextOverlay {
                x: 20,
                y: 20 * (line as u32 + 1),
                text,
            });
        }
        overlays
    }

    /// Pointer column and the frequency under it, when the pointer is
    /// over the frame below the oscilloscope.
    fn pointer_column(&self, scene: &Scene<'_>, surface: &Surface<'_>) -> Option<(u32, i32)> {
        let (x, y) = scene.pointer?;
        let (width, height) = (surface.width(), surface.height());
        if x >= width || y >= height * 3 / 4 {
            return None;
        }
        let span = scene.frequency_max - scene.frequency_min;
        let hz = scene.frequency_min + span * x as f32 / width as f32;
        Some((x, hz as i32))
    }

    fn draw_devices(&mut self, scene: &Scene<'_>, surface: &mut Surface<'_>) {
        surface.fill(0);
        self.max_spectrum.fill(0);
        self.max_sample.fill(0);

        let width = (surface.width() as usize).min(self.width());
        let height = surface.height();
        let quad = height / 4;

        draw_waterfall(scene.waterfall, surface, width);

        for index in draw_order(scene.devices.len(), scene.topmost) {
            let device = &scene.devices[index];
            let color = scene.color(index);
            self.draw_bars(device, color, surface, width, quad);
            self.draw_oscilloscope(device, color, scene.sample_clamp, surface, width, quad);
            draw_indicator(device, index, color, surface, width);
        }

        for x in 0..width {
            let column = x as u32;
            surface.fill_column(column, 2 * quad + self.max_spectrum[x]..3 * quad, BACKGROUND_COLOR);
            surface.fill_column(column, 3 * quad + self.max_sample[x]..4 * quad, BACKGROUND_COLOR);
        }

        if width > 0 {
            for slice in 0..scene.guide_slices {
                let x = slice * width / scene.guide_slices;
                surface.fill_column(x as u32, 3 * quad..4 * quad, GUIDE_COLOR);
            }
        }
    }

    fn draw_bars(&mut self, device: &CaptureDevice, color: u32, surface: &mut Surface<'_>, width: usize, quad: u32) {
        let base = 2 * quad;
        for (x, mark) in self.max_spectrum[..width].iter_mut().enumerate() {
            let intensity = device.spectrum.get(x).copied().unwrap_or(0.0);
            let loudness = ((intensity * quad as f32) as u32).min(quad);
            if loudness > *mark {
                surface.fill_column(x as u32, base + *mark..base + loudness, color);
                *mark = loudness;
            }
        }
    }

    fn draw_oscilloscope(
        &mut self,
        device: &CaptureDevice,
        color: u32,
        sample_clamp: f32,
        surface: &mut Surface<'_>,
        width: usize,
        quad: u32,
    ) {
        let samples = &device.samples;
        if samples.is_empty() || width == 0 {
            return;
        }
        let base = 3 * quad;
        let samples_per_pixel = samples.len() as f32 / width as f32;
        for (x, mark) in self.max_sample[..width].iter_mut().enumerate() {
            let index = ((x as f32 * samples_per_pixel) as usize).min(samples.len() - 1);
            let amplitude = samples[index].unsigned_abs() as f32 / sample_clamp;
            let loudness = ((amplitude * quad as f32) as u32).min(quad);
            if loudness > *mark {
                surface.fill_column(x as u32, base + *mark..base + loudness, color);
                *mark = loudness;
            }
        }
    }
}

fn draw_waterfall(waterfall: &Waterfall, surface: &mut Surface<'_>, width: usize) {
    let width = width.min(waterfall.width());
    let rows = (waterfall.rows() as u32).min(surface.height());
    for row in 0..rows {
        surface.row_mut(row)[..width].copy_from_slice(&waterfall.image_row(row as usize)[..width]);
    }
}

/// Row `2 + 5 * index`, filled up to the device's read progress.
fn draw_indicator(device: &CaptureDevice, index: usize, color: u32, surface: &mut Surface<'_>, width: usize) {
    let Some(row) = u32::try_from(2 + index * 5).ok().filter(|&row| row < surface.height()) else {
        return;
    };
    let progress = device.read_progress as f32 / device.buffer_bytes.max(1) as f32;
    let filled = ((progress * width as f32) as usize).min(width);
    let pixels = &mut surface.row_mut(row)[..width];
    pixels[..filled].fill(color);
    pixels[filled..].fill(0);
}

/// Idle pattern: blue rises left to right, green bottom to top.
fn draw_gradient(surface: &mut Surface<'_>) {
    let (width, height) = (surface.width(), surface.height());
    for y in 0..height {
        let green = (255.0 * y as f32 / height as f32) as u32;
        for (x, pixel) in surface.row_mut(y).iter_mut().enumerate() {
            let blue = (255.0 * x as f32 / width as f32) as u32;
            *pixel = (50 << 16) | (green << 8) | blue;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::audio_models::CaptureSource;
    use crate::models::config::{VisualizerConfiguration, DEFAULT_DEVICE_COLORS};
    use crate::models::surface::RowOrder;
    use crate::processing::simulated_stream::SimulatedCaptureStream;
    use crate::processing::spectrum_engine::SpectrumEngine;
    use crate::traits::text_renderer::NoText;

    const WIDTH: usize = 8;
    const HEIGHT: u32 = 40;

    fn devices(count: usize) -> Vec<CaptureDevice> {
        let mut engine = SpectrumEngine::new(&VisualizerConfiguration {
            transform_size: 4,
            ..Default::default()
        });
        (0..count)
            .map(|index| {
                let source = CaptureSource {
                    index,
                    name: format!("sim {index}"),
                    is_default: index == 0,
                    sample_rate: 44_100,
                };
                let stream = SimulatedCaptureStream::new(64);
                let mut device = CaptureDevice::new(source, Box::new(stream), engine.create_context()).unwrap();
                device.spectrum = vec![0.0; WIDTH];
                device
            })
            .collect()
    }

    fn sized_waterfall() -> Waterfall {
        let mut waterfall = Waterfall::new(2);
        waterfall.install(Waterfall::allocate(WIDTH, HEIGHT as usize).unwrap());
        waterfall
    }

    fn compositor() -> Compositor {
        let mut compositor = Compositor::new();
        compositor.install(Compositor::allocate(WIDTH).unwrap());
        compositor
    }

    fn scene<'a>(devices: &'a [CaptureDevice], waterfall: &'a Waterfall, topmost: usize) -> Scene<'a> {
        Scene {
            devices,
            topmost,
            colors: &DEFAULT_DEVICE_COLORS,
            sample_clamp: 32_767.0,
            frequency_min: 0.0,
            frequency_max: 22_048.0,
            amplification: 1.0,
            guide_slices: 0,
            waterfall,
            pointer: None,
        }
    }

    fn paint(compositor: &mut Compositor, scene: &Scene<'_>) -> Vec<u32> {
        let mut pixels = vec![0u32; WIDTH * HEIGHT as usize];
        let mut surface = Surface::packed(&mut pixels, WIDTH as u32, HEIGHT, RowOrder::BottomUp).unwrap();
        compositor.render(scene, &mut surface, &mut NoText);
        pixels
    }

    fn at(pixels: &[u32], x: usize, y: u32) -> u32 {
        pixels[y as usize * WIDTH + x]
    }

    #[test]
    fn empty_state_paints_gradient() {
        let waterfall = sized_waterfall();
        let pixels = paint(&mut compositor(), &scene(&[], &waterfall, 0));
        assert_eq!(at(&pixels, 0, 0), 50 << 16);
        assert_eq!(at(&pixels, 4, 20), (50 << 16) | (127 << 8) | 127);
        assert_eq!(at(&pixels, 7, 39), (50 << 16) | (248 << 8) | 223);
    }

    #[test]
    fn bar_height_is_clamped_intensity() {
        let waterfall = sized_waterfall();
        let mut devices = devices(1);
        devices[0].spectrum = vec![0.0, 0.5, 1.0, 3.0, -1.0, 0.25, 0.0, 0.0];
        let pixels = paint(&mut compositor(), &scene(&devices, &waterfall, 0));

        let quad = HEIGHT / 4;
        let blue = DEFAULT_DEVICE_COLORS[0];
        for (x, expected) in [(0, 0), (1, 5), (2, 10), (3, 10), (4, 0), (5, 2)] {
            for y in 0..quad {
                let want = if y < expected { blue } else { BACKGROUND_COLOR };
                assert_eq!(at(&pixels, x, 2 * quad + y), want, "column {x} row {y}");
            }
        }
    }

    #[test]
    fn later_devices_paint_only_above_high_water_mark() {
        let waterfall = sized_waterfall();
        let mut devices = devices(2);
        devices[0].spectrum = vec![0.5; WIDTH];
        devices[1].spectrum = vec![0.8; WIDTH];

        let quad = HEIGHT / 4;
        let (blue, green) = (DEFAULT_DEVICE_COLORS[0], DEFAULT_DEVICE_COLORS[1]);

        let pixels = paint(&mut compositor(), &scene(&devices, &waterfall, 0));
        assert_eq!(at(&pixels, 3, 2 * quad + 4), blue);
        assert_eq!(at(&pixels, 3, 2 * quad + 7), green);
        assert_eq!(at(&pixels, 3, 2 * quad + 8), BACKGROUND_COLOR);

        // Device 1 first: it covers everything device 0 would reach.
        let rotated = paint(&mut compositor(), &scene(&devices, &waterfall, 1));
        assert_eq!(at(&rotated, 3, 2 * quad + 4), green);
        assert_eq!(at(&rotated, 3, 2 * quad + 7), green);
    }

    #[test]
    fn oscilloscope_uses_sample_clamp() {
        let waterfall = sized_waterfall();
        let mut devices = devices(1);
        devices[0].samples.fill(i16::MIN);
        let mut scene = scene(&devices, &waterfall, 0);
        scene.sample_clamp = 65_536.0;

        let quad = HEIGHT / 4;
        let pixels = paint(&mut compositor(), &scene);
        assert_eq!(at(&pixels, 0, 3 * quad + 4), DEFAULT_DEVICE_COLORS[0]);
        assert_eq!(at(&pixels, 0, 3 * quad + 5), BACKGROUND_COLOR);
    }

    #[test]
    fn guide_lines_mark_block_boundaries() {
        let waterfall = sized_waterfall();
        let devices = devices(1);
        let mut scene = scene(&devices, &waterfall, 0);
        scene.guide_slices = 4;

        let quad = HEIGHT / 4;
        let pixels = paint(&mut compositor(), &scene);
        for x in [0, 2, 4, 6] {
            assert_eq!(at(&pixels, x, 3 * quad), GUIDE_COLOR);
        }
        assert_eq!(at(&pixels, 1, 3 * quad), BACKGROUND_COLOR);
    }

    #[test]
    fn indicator_tracks_read_progress() {
        let waterfall = sized_waterfall();
        let mut devices = devices(2);
        devices[0].read_progress = 32;
        devices[1].read_progress = 16;
        let pixels = paint(&mut compositor(), &scene(&devices, &waterfall, 0));

        let row0: Vec<u32> = (0..WIDTH).map(|x| at(&pixels, x, 2)).collect();
        let blue = DEFAULT_DEVICE_COLORS[0];
        assert_eq!(row0, vec![blue, blue, blue, blue, 0, 0, 0, 0]);

        let row1: Vec<u32> = (0..WIDTH).map(|x| at(&pixels, x, 7)).collect();
        let green = DEFAULT_DEVICE_COLORS[1];
        assert_eq!(row1, vec![green, green, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn waterfall_rows_are_copied_into_lower_half() {
        let mut waterfall = sized_waterfall();
        waterfall.begin_row();
        waterfall.contribute(0, &[1.0; WIDTH]);
        waterfall.commit();
        let devices = devices(1);
        let pixels = paint(&mut compositor(), &scene(&devices, &waterfall, 0));
        assert_eq!(at(&pixels, 5, 0), 0xff);
        assert_eq!(at(&pixels, 5, 1), 0);
    }

    #[test]
    fn pointer_readout_below_oscilloscope() {
        let waterfall = sized_waterfall();
        let devices = devices(1);
        let mut scene = scene(&devices, &waterfall, 0);
        scene.frequency_max = 8_000.0;
        scene.pointer = Some((2, 5));

        let mut pixels = vec![0u32; WIDTH * HEIGHT as usize];
        let mut surface = Surface::packed(&mut pixels, WIDTH as u32, HEIGHT, RowOrder::BottomUp).unwrap();
        let compositor = compositor();
        let overlays = compositor.overlays(&scene, &surface);
        assert_eq!(
            overlays[0],
            TextOverlay {
                x: 2,
                y: 20,
                text: "2000 Hz".into()
            }
        );

        let mut compositor = compositor;
        compositor.render(&scene, &mut surface, &mut NoText);
        assert_eq!(surface.pixel(2, 20), GUIDE_COLOR);
        assert_eq!(surface.pixel(2, 29), GUIDE_COLOR);

        scene.pointer = Some((2, 30));
        assert_eq!(compositor.overlays(&scene, &surface).len(), 4);
    }

    #[test]
    fn configuration_overlay_lines() {
        let waterfall = sized_waterfall();
        let mut scene = scene(&[], &waterfall, 0);
        scene.amplification = 0.5;
        let mut pixels = vec![0u32; WIDTH * HEIGHT as usize];
        let surface = Surface::packed(&mut pixels, WIDTH as u32, HEIGHT, RowOrder::BottomUp).unwrap();

        let overlays = compositor().overlays(&scene, &surface);
        assert_eq!(overlays[0].y, HEIGHT - 20);
        assert_eq!(overlays[0].text, HELP_TEXT);
        let lines: Vec<_> = overlays[1..].iter().map(|o| (o.y, o.text.as_str())).collect();
        assert_eq!(
            lines,
            vec![
                (20, "spectrum range min: 0Hz"),
                (40, "spectrum range max: 22048Hz"),
                (60, "spectrum amplification: 50%"),
            ]
        );
    }
}
