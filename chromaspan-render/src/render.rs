use crate::layout::{
    self, Bounds, MARGIN, STIMULUS_SIZE, hit_test, menu_rows, option_grid, swatch_row,
};
use ab_glyph::{Font, FontArc, Glyph, PxScale, ScaleFont, point};
use anyhow::{Context, Result, anyhow, bail};
use chromaspan_cache::{LabelId, intern_label, label};
use chromaspan_core::{
    Choice, MenuView, OptionView, Outcome, ReadingView, Rgb, SessionPhase, SessionView, Stimulus,
    TextCell,
};
use chromaspan_timing::{FrameTimeStats, FrameTimes};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tiny_skia::{Color, Paint, Pixmap, PixmapPaint, PremultipliedColorU8, Rect, Transform};
use tracing::{debug, trace};

const TITLE_PX: f32 = 22.0;
const HEADING_PX: f32 = 34.0;
const PROMPT_PX: f32 = 26.0;
const GLYPH_PX: f32 = 140.0;
const KEY_PX: f32 = 28.0;
const STATUS_PX: f32 = 28.0;
const BODY_PX: f32 = 22.0;
const READING_LINE_PX: f32 = 32.0;
/// Rendered labels kept before the cache is flushed.
const TEXT_CACHE_LIMIT: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TextKey {
    label: LabelId,
    size_px: u32,
    ink: Rgb,
}

struct TextCache {
    font: FontArc,
    map: HashMap<TextKey, Arc<Pixmap>>,
}

impl TextCache {
    fn new(font: FontArc) -> Self {
        Self {
            font,
            map: HashMap::new(),
        }
    }

    fn get_or_render(&mut self, text: &str, size_px: f32, ink: Rgb) -> Option<Arc<Pixmap>> {
        let key = TextKey {
            label: intern_label(text),
            size_px: size_px.round() as u32,
            ink,
        };
        if let Some(p) = self.map.get(&key) {
            return Some(Arc::clone(p));
        }
        if self.map.len() >= TEXT_CACHE_LIMIT {
            debug!(entries = self.map.len(), "text cache flushed");
            self.map.clear();
        }
        let atom = label(key.label)?;
        let pm = Arc::new(render_text_pixmap(&atom, size_px, &self.font, ink)?);
        self.map.insert(key, Arc::clone(&pm));
        Some(pm)
    }
}

/// Rasterises one line of text. The pixmap spans the full advance width and
/// the font's ascent to descent, so pieces drawn side by side share a
/// baseline.
pub fn render_text_pixmap(text: &str, font_size: f32, font: &FontArc, ink: Rgb) -> Option<Pixmap> {
    let scale = PxScale::from(font_size);
    let sf = font.as_scaled(scale);

    let mut pen_x = 0.0f32;
    let mut glyphs = Vec::<Glyph>::new();
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = glyphs.last() {
            pen_x += sf.kern(prev.id, id);
        }
        glyphs.push(Glyph {
            id,
            scale,
            position: point(pen_x, sf.ascent()),
        });
        pen_x += sf.h_advance(id);
    }

    let w = pen_x.ceil().max(1.0) as u32;
    let h = (sf.ascent() - sf.descent()).ceil().max(1.0) as u32;
    let mut pm = Pixmap::new(w, h)?;
    let stride = w as usize;
    let dst = pm.pixels_mut();
    let [ir, ig, ib] = ink.0;

    for g in glyphs {
        let Some(out) = font.outline_glyph(g) else {
            continue;
        };
        let b = out.px_bounds();
        out.draw(|x, y, cov| {
            if cov <= f32::EPSILON {
                return;
            }
            let ix = x as i32 + b.min.x.floor() as i32;
            let iy = y as i32 + b.min.y.floor() as i32;
            if ix < 0 || iy < 0 || ix >= w as i32 || iy >= h as i32 {
                return;
            }
            let i = iy as usize * stride + ix as usize;

            // Porter-Duff over in premultiplied space.
            let a = cov.clamp(0.0, 1.0);
            let sa = (a * 255.0) as u8;
            let sr = (ir as f32 * a) as u8;
            let sg = (ig as f32 * a) as u8;
            let sb = (ib as f32 * a) as u8;
            let bg = dst[i];
            let inv = 1.0 - a;
            let blended = PremultipliedColorU8::from_rgba(
                sr.saturating_add((bg.red() as f32 * inv) as u8),
                sg.saturating_add((bg.green() as f32 * inv) as u8),
                sb.saturating_add((bg.blue() as f32 * inv) as u8),
                sa.saturating_add((bg.alpha() as f32 * inv) as u8),
            );
            if let Some(px) = blended {
                dst[i] = px;
            }
        });
    }

    Some(pm)
}

/// Black or white, whichever reads better on `background`.
pub fn contrast_ink(background: Rgb) -> Rgb {
    let luma = 0.299 * background.r() as f32
        + 0.587 * background.g() as f32
        + 0.114 * background.b() as f32;
    if luma > 140.0 { Rgb::BLACK } else { Rgb::WHITE }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    pub draw: Duration,
    pub copy: Duration,
    pub total: Duration,
}

pub trait Renderer {
    fn size(&self) -> (u32, u32);
    fn resize(&mut self, width: u32, height: u32) -> Result<()>;
    fn render_session(&mut self, view: &SessionView, frame: &mut [u8]) -> Result<FrameStats>;
    fn render_menu(&mut self, view: &MenuView, frame: &mut [u8]) -> Result<FrameStats>;
    fn render_reading(&mut self, view: &ReadingView, frame: &mut [u8]) -> Result<FrameStats>;
}

pub struct SkiaRenderer {
    width: u32,
    height: u32,
    canvas: Pixmap,
    text_cache: TextCache,
    /// Where the last session frame put its options, for hit-testing.
    option_bounds: Vec<Bounds>,
    menu_bounds: Vec<Bounds>,
    frame_times: FrameTimes,
}

impl SkiaRenderer {
    pub fn new(width: u32, height: u32, font: FontArc) -> Result<Self> {
        let canvas = Pixmap::new(width.max(1), height.max(1)).context("failed to allocate canvas")?;
        Ok(Self {
            width: canvas.width(),
            height: canvas.height(),
            canvas,
            text_cache: TextCache::new(font),
            option_bounds: Vec::new(),
            menu_bounds: Vec::new(),
            frame_times: FrameTimes::default(),
        })
    }

    pub fn from_font_bytes(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self> {
        let font = FontArc::try_from_vec(bytes).map_err(|e| anyhow!("invalid font data: {e}"))?;
        Self::new(width, height, font)
    }

    /// Option index under a point of the last session frame.
    pub fn hit_option(&self, x: f32, y: f32) -> Option<usize> {
        hit_test(&self.option_bounds, x, y)
    }

    pub fn hit_menu(&self, x: f32, y: f32) -> Option<usize> {
        hit_test(&self.menu_bounds, x, y)
    }

    pub fn frame_time_stats(&self) -> FrameTimeStats {
        self.frame_times.stats()
    }

    fn clear(&mut self, colour: Rgb) {
        self.canvas
            .fill(Color::from_rgba8(colour.r(), colour.g(), colour.b(), 255));
    }

    fn fill(&mut self, bounds: Bounds, colour: Rgb) {
        let Some(rect) = Rect::from_xywh(bounds.x, bounds.y, bounds.w, bounds.h) else {
            return;
        };
        let mut paint = Paint::default();
        paint.anti_alias = false;
        paint.set_color_rgba8(colour.r(), colour.g(), colour.b(), 255);
        self.canvas
            .fill_rect(rect, &paint, Transform::identity(), None);
    }

    fn outline(&mut self, bounds: Bounds, colour: Rgb, width: f32) {
        let Bounds { x, y, w, h } = bounds;
        self.fill(Bounds::new(x, y, w, width), colour);
        self.fill(Bounds::new(x, y + h - width, w, width), colour);
        self.fill(Bounds::new(x, y, width, h), colour);
        self.fill(Bounds::new(x + w - width, y, width, h), colour);
    }

    fn blit(&mut self, pm: &Pixmap, x: f32, y: f32) {
        self.canvas.draw_pixmap(
            x.round() as i32,
            y.round() as i32,
            pm.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    /// Draws `text` centred on `(cx, cy)` and returns its size.
    fn text_centred(&mut self, text: &str, size: f32, ink: Rgb, (cx, cy): (f32, f32)) -> (f32, f32) {
        let Some(pm) = self.text_cache.get_or_render(text, size, ink) else {
            return (0.0, 0.0);
        };
        let (w, h) = (pm.width() as f32, pm.height() as f32);
        self.blit(&pm, cx - w * 0.5, cy - h * 0.5);
        (w, h)
    }

    fn text_at(&mut self, text: &str, size: f32, ink: Rgb, (x, y): (f32, f32)) -> f32 {
        let Some(pm) = self.text_cache.get_or_render(text, size, ink) else {
            return 0.0;
        };
        self.blit(&pm, x, y);
        pm.width() as f32
    }

    fn text_right(&mut self, text: &str, size: f32, ink: Rgb, (right, y): (f32, f32)) {
        if let Some(pm) = self.text_cache.get_or_render(text, size, ink) {
            self.blit(&pm, right - pm.width() as f32, y);
        }
    }

    fn swatch(&mut self, bounds: Bounds, colour: Rgb) {
        self.fill(bounds, colour);
        self.outline(bounds, Rgb::BLACK, 2.0);
    }

    fn draw_stimulus(&mut self, stimulus: &Stimulus) {
        let centre = layout::stimulus_centre(self.width, self.height);
        match stimulus {
            Stimulus::Glyph { letter, ink } => {
                self.text_centred(&letter.to_string(), GLYPH_PX, *ink, centre);
            }
            Stimulus::Swatch { colour } => {
                let b = Bounds::centred(centre.0, centre.1, STIMULUS_SIZE, STIMULUS_SIZE);
                self.swatch(b, *colour);
            }
            Stimulus::SwatchRow { colours } => {
                for (b, colour) in swatch_row(self.width, self.height, colours.len())
                    .into_iter()
                    .zip(colours)
                {
                    self.swatch(b, *colour);
                }
            }
            Stimulus::Flood { .. } => {}
        }
    }

    fn draw_option(&mut self, bounds: Bounds, option: &OptionView) {
        match option.choice {
            Choice::Swatch(colour) => self.fill(bounds, colour),
            Choice::Letter(_) => {
                let face = if option.chosen { Rgb::GREY } else { Rgb::WHITE };
                self.fill(bounds, face);
                if let Some(label) = option.choice.label() {
                    self.text_centred(&label.to_string(), KEY_PX, Rgb::BLACK, bounds.centre());
                }
            }
        }
        let (colour, width) = match (option.verdict, option.chosen) {
            (Some(true), _) => (Rgb::GREEN, 4.0),
            (Some(false), _) => (Rgb::RED, 4.0),
            (None, true) => (Rgb::BLACK, 4.0),
            (None, false) => (Rgb::BLACK, 1.0),
        };
        self.outline(bounds, colour, width);
    }

    fn present(&self, frame: &mut [u8]) -> Result<()> {
        let data = self.canvas.data();
        if frame.len() != data.len() {
            bail!(
                "frame buffer is {} bytes but the canvas is {} bytes",
                frame.len(),
                data.len()
            );
        }
        // The canvas is always opaque, so premultiplied and straight alpha agree.
        frame.copy_from_slice(data);
        Ok(())
    }

    fn finish_frame(&mut self, started: Instant, frame: &mut [u8]) -> Result<FrameStats> {
        let draw = started.elapsed();
        let copy_start = Instant::now();
        self.present(frame)?;
        let copy = copy_start.elapsed();
        let total = draw + copy;
        self.frame_times.record(total);
        trace!(?draw, ?copy, "frame rendered");
        Ok(FrameStats { draw, copy, total })
    }
}

impl Renderer for SkiaRenderer {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.canvas =
            Pixmap::new(width.max(1), height.max(1)).context("failed to resize canvas")?;
        self.width = self.canvas.width();
        self.height = self.canvas.height();
        self.option_bounds.clear();
        self.menu_bounds.clear();
        debug!(width = self.width, height = self.height, "canvas resized");
        Ok(())
    }

    fn render_session(&mut self, view: &SessionView, frame: &mut [u8]) -> Result<FrameStats> {
        let started = Instant::now();
        let (w, h) = (self.width as f32, self.height as f32);
        let background = view.effective_background();
        let ink = contrast_ink(background);
        self.clear(background);

        self.text_at(view.title, TITLE_PX, ink, (MARGIN, 16.0));
        if let Some((current, total)) = view.progress {
            self.text_right(
                &format!("Trial {current}/{total}"),
                TITLE_PX,
                ink,
                (w - MARGIN, 16.0),
            );
        }

        if let Some(stimulus) = &view.stimulus {
            self.draw_stimulus(stimulus);
        }

        let waiting = matches!(view.phase, SessionPhase::Idle | SessionPhase::Done);
        if let Some(prompt) = &view.prompt {
            let y = if waiting { h * 0.5 } else { 80.0 };
            self.text_centred(prompt, PROMPT_PX, ink, (w * 0.5, y));
        }

        let choices: Vec<Choice> = view.options.iter().map(|o| o.choice).collect();
        self.option_bounds = option_grid(self.width, self.height, &choices);
        for (bounds, option) in self.option_bounds.clone().into_iter().zip(&view.options) {
            self.draw_option(bounds, option);
        }

        if let Some(status) = &view.status {
            let y = self
                .option_bounds
                .last()
                .map_or(h * 0.8, |b| (b.y + b.h + 40.0).min(h - 30.0));
            let colour = match view.feedback {
                Some(Outcome::Correct) => Rgb::GREEN,
                Some(Outcome::Incorrect | Outcome::TimedOut) => Rgb::RED,
                _ => ink,
            };
            self.text_centred(status, STATUS_PX, colour, (w * 0.5, y));
        }

        if let Some(summary) = &view.summary {
            let mut y = h * 0.2;
            for line in summary.lines() {
                self.text_centred(&line, BODY_PX, ink, (w * 0.5, y));
                y += BODY_PX * 1.5;
            }
        }

        if let Some(setting) = view.setting {
            let text = format!("{}: {}   (Up/Down to change)", setting.label, setting.value);
            self.text_centred(&text, BODY_PX, ink, (w * 0.5, h * 0.58));
        }

        if waiting {
            self.text_centred(
                "R: restart   Esc: menu",
                BODY_PX * 0.8,
                ink,
                (w * 0.5, h - 30.0),
            );
        }

        self.finish_frame(started, frame)
    }

    fn render_menu(&mut self, view: &MenuView, frame: &mut [u8]) -> Result<FrameStats> {
        let started = Instant::now();
        let (w, h) = (self.width as f32, self.height as f32);
        self.clear(Rgb::BACKGROUND);
        self.option_bounds.clear();

        self.text_centred(view.title, HEADING_PX, Rgb::BLACK, (w * 0.5, 55.0));
        self.menu_bounds = menu_rows(self.width, view.entries.len());
        for (i, (bounds, entry)) in self
            .menu_bounds
            .clone()
            .into_iter()
            .zip(&view.entries)
            .enumerate()
        {
            if i == view.selected {
                self.fill(bounds, Rgb::PAPER);
                self.outline(bounds, Rgb::BLACK, 2.0);
            }
            let text = format!("{}. {}", (i + 1) % 10, entry);
            let (_, cy) = bounds.centre();
            self.text_at(&text, BODY_PX, Rgb::BLACK, (bounds.x + 14.0, cy - BODY_PX * 0.6));
        }
        self.text_centred(
            "Up/Down or digits to choose, Enter or click to play, Esc to quit",
            BODY_PX * 0.8,
            Rgb::BLACK,
            (w * 0.5, h - 30.0),
        );

        self.finish_frame(started, frame)
    }

    fn render_reading(&mut self, view: &ReadingView, frame: &mut [u8]) -> Result<FrameStats> {
        let started = Instant::now();
        let (w, h) = (self.width as f32, self.height as f32);
        self.clear(Rgb::PAPER);
        self.option_bounds.clear();

        self.text_at(&view.title, TITLE_PX, Rgb::BLACK, (MARGIN, 16.0));
        let block_w = BODY_PX * 0.6;
        let mut y = 64.0;
        for line in view.lines.iter().skip(view.scroll) {
            if y + READING_LINE_PX > h - 40.0 {
                break;
            }
            let mut x = MARGIN;
            for cell in line {
                if x > w - MARGIN {
                    break;
                }
                match *cell {
                    TextCell::Char { ch, ink } => {
                        x += self.text_at(&ch.to_string(), BODY_PX, ink, (x, y));
                    }
                    TextCell::Block { colour } => {
                        self.fill(Bounds::new(x, y + 4.0, block_w, BODY_PX), colour);
                        x += block_w + 1.0;
                    }
                }
            }
            y += READING_LINE_PX;
        }
        self.text_centred(
            "Up/Down to scroll, Esc to quit",
            BODY_PX * 0.8,
            Rgb::BLACK,
            (w * 0.5, h - 20.0),
        );

        self.finish_frame(started, frame)
    }
}

/// Columns of reading text that fit in a window `width` pixels wide.
pub fn reading_columns(width: u32) -> usize {
    (((width as f32 - 2.0 * MARGIN) / (BODY_PX * 0.55)).floor() as usize).max(10)
}
