//! Terminal presentation: a half-block pixel canvas fed by entity upserts.

use crate::model::EntityId;
use crate::world::{CANVAS_HEIGHT, CANVAS_WIDTH, Rect};
use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};
use std::collections::BTreeMap;
use std::io::{self, Write};

/// What an entity looks like. Geometry travels separately as a [`Rect`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sprite {
    Bird { frame: usize, rotation: f64 },
    /// The rect spans the whole column; the gap edges are world y values.
    Pipe {
        gap_top: f64,
        gap_bottom: f64,
        grouped: bool,
    },
    NoTouch,
    Gate { activated: bool },
    Cloud,
}

/// Receives entity state keyed by stable id.
pub trait RenderSink {
    fn upsert(&mut self, id: EntityId, rect: Rect, sprite: Sprite);
    fn remove(&mut self, id: EntityId);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Screen {
    Ready,
    Playing,
    GameOver {
        score: u32,
        high_score: u32,
        new_best: bool,
    },
}

/// Everything drawn on top of the entities.
#[derive(Clone, Debug, PartialEq)]
pub struct Hud {
    pub score: u32,
    pub high_score: u32,
    pub screen: Screen,
    /// 0 is day, 1 is night.
    pub night_level: f64,
    /// World distance scrolled, drives the ground stripes.
    pub scroll: f64,
    /// Pipe speed in tenths, shown after a speed change.
    pub speed_hint: Option<u32>,
}

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn lerp(a: Rgb, b: Rgb, t_256: u16) -> Rgb {
        let t = t_256 as i32;
        Rgb(
            (a.0 as i32 + (b.0 as i32 - a.0 as i32) * t / 256) as u8,
            (a.1 as i32 + (b.1 as i32 - a.1 as i32) * t / 256) as u8,
            (a.2 as i32 + (b.2 as i32 - a.2 as i32) * t / 256) as u8,
        )
    }

    const fn half(self) -> Rgb {
        Rgb(self.0 / 2, self.1 / 2, self.2 / 2)
    }
}

#[derive(Clone, Copy)]
struct Palette {
    sky_top: Rgb,
    sky_bot: Rgb,
    hill_far: Rgb,
    hill_near: Rgb,
    grass: Rgb,
    grass_light: Rgb,
    dirt: Rgb,
    dirt_dark: Rgb,
    cloud: Rgb,
}

const DAY: Palette = Palette {
    sky_top: Rgb(70, 180, 200),
    sky_bot: Rgb(190, 232, 245),
    hill_far: Rgb(120, 195, 75),
    hill_near: Rgb(95, 175, 55),
    grass: Rgb(84, 168, 55),
    grass_light: Rgb(110, 200, 70),
    dirt: Rgb(210, 185, 110),
    dirt_dark: Rgb(185, 160, 90),
    cloud: Rgb(250, 250, 250),
};

const NIGHT: Palette = Palette {
    sky_top: Rgb(12, 18, 48),
    sky_bot: Rgb(48, 62, 110),
    hill_far: Rgb(40, 70, 60),
    hill_near: Rgb(30, 58, 44),
    grass: Rgb(36, 80, 40),
    grass_light: Rgb(48, 98, 50),
    dirt: Rgb(96, 84, 60),
    dirt_dark: Rgb(80, 70, 50),
    cloud: Rgb(120, 128, 160),
};

impl Palette {
    fn blend(t_256: u16) -> Palette {
        let mix = |a: Rgb, b: Rgb| Rgb::lerp(a, b, t_256);
        Palette {
            sky_top: mix(DAY.sky_top, NIGHT.sky_top),
            sky_bot: mix(DAY.sky_bot, NIGHT.sky_bot),
            hill_far: mix(DAY.hill_far, NIGHT.hill_far),
            hill_near: mix(DAY.hill_near, NIGHT.hill_near),
            grass: mix(DAY.grass, NIGHT.grass),
            grass_light: mix(DAY.grass_light, NIGHT.grass_light),
            dirt: mix(DAY.dirt, NIGHT.dirt),
            dirt_dark: mix(DAY.dirt_dark, NIGHT.dirt_dark),
            cloud: mix(DAY.cloud, NIGHT.cloud),
        }
    }
}

const PIPE_L: Rgb = Rgb(74, 122, 26);
const PIPE_M: Rgb = Rgb(100, 170, 40);
const PIPE_R: Rgb = Rgb(115, 191, 46);
const PIPE_HI: Rgb = Rgb(145, 215, 62);
const CAP_DARK: Rgb = Rgb(60, 100, 20);
const GROUP_CAP: Rgb = Rgb(40, 80, 110);
const BIRD_Y: Rgb = Rgb(245, 200, 66);
const BIRD_HI: Rgb = Rgb(255, 225, 100);
const BIRD_WING: Rgb = Rgb(215, 165, 35);
const BIRD_EYE: Rgb = Rgb(255, 255, 255);
const BIRD_PUPIL: Rgb = Rgb(20, 20, 20);
const BIRD_BEAK: Rgb = Rgb(225, 75, 35);
const BIRD_BEAK_HI: Rgb = Rgb(240, 110, 50);
const HAZARD: Rgb = Rgb(200, 40, 50);
const HAZARD_DARK: Rgb = Rgb(120, 20, 30);
const GATE: Rgb = Rgb(170, 90, 230);
const GATE_SPENT: Rgb = Rgb(110, 110, 120);
const WHITE: Rgb = Rgb(255, 255, 255);
const SHADOW: Rgb = Rgb(30, 30, 30);

// ── Pixel buffer with half-block rendering ──────────────────────────────────

pub struct PixelBuf {
    w: usize,
    h: usize, // pixel height = terminal rows * 2
    px: Vec<Rgb>,
}

impl PixelBuf {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![DAY.sky_top; w * h],
        }
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, DAY.sky_top);
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    fn darken(&mut self) {
        for c in &mut self.px {
            *c = c.half();
        }
    }

    /// Writes the buffer as `▀` cells, top pixel in the foreground.
    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut fg: Option<Rgb> = None;
        let mut bg: Option<Rgb> = None;

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if bg != Some(bot) {
                    queue!(out, style::SetBackgroundColor(term_color(bot)))?;
                    bg = Some(bot);
                }
                if top == bot {
                    queue!(out, style::Print(' '))?;
                    continue;
                }
                if fg != Some(top) {
                    queue!(out, style::SetForegroundColor(term_color(top)))?;
                    fg = Some(top);
                }
                queue!(out, style::Print('\u{2580}'))?;
            }
            if row + 1 < rows {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                fg = None;
                bg = None;
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

fn term_color(c: Rgb) -> CColor {
    CColor::Rgb {
        r: c.0,
        g: c.1,
        b: c.2,
    }
}

// ── 3x5 bitmap digits ──────────────────────────────────────────────────────

#[rustfmt::skip]
const DIGITS: [[u8; 15]; 10] = [
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // 0
    [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1], // 1
    [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1], // 2
    [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1], // 3
    [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1], // 4
    [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1], // 5
    [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1], // 6
    [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0], // 7
    [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1], // 8
    [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1], // 9
];

fn draw_number(buf: &mut PixelBuf, cx: i32, y: i32, n: u32, fg: Rgb) {
    let digits: Vec<u8> = n.to_string().bytes().map(|b| b - b'0').collect();
    let total_w = digits.len() as i32 * 4 - 1;
    let start_x = cx - total_w / 2;
    for (i, &d) in digits.iter().enumerate() {
        let glyph = &DIGITS[d as usize];
        let x = start_x + i as i32 * 4;
        for row in 0..5 {
            for col in 0..3 {
                if glyph[row * 3 + col] == 1 {
                    let (px, py) = (x + col as i32, y + row as i32);
                    buf.set(px + 1, py + 1, SHADOW);
                    buf.set(px, py, fg);
                }
            }
        }
    }
}

// ── Canvas ──────────────────────────────────────────────────────────────────

/// Keeps the last known state of every entity and paints it on demand.
pub struct Canvas {
    buf: PixelBuf,
    entities: BTreeMap<EntityId, (Rect, Sprite)>,
}

impl RenderSink for Canvas {
    fn upsert(&mut self, id: EntityId, rect: Rect, sprite: Sprite) {
        self.entities.insert(id, (rect, sprite));
    }

    fn remove(&mut self, id: EntityId) {
        self.entities.remove(&id);
    }
}

/// Maps world units onto the pixel grid above the ground strip.
#[derive(Clone, Copy)]
struct Viewport {
    sx: f64,
    sy: f64,
    sky_h: i32,
}

impl Viewport {
    fn x(&self, wx: f64) -> i32 {
        (wx * self.sx).round() as i32
    }

    fn y(&self, wy: f64) -> i32 {
        (wy * self.sy).round() as i32
    }

    fn rect(&self, r: &Rect) -> (i32, i32, i32, i32) {
        let (x, y) = (self.x(r.x), self.y(r.y));
        (x, y, (self.x(r.right()) - x).max(1), (self.y(r.bottom()) - y).max(1))
    }
}

impl Canvas {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            buf: PixelBuf::new(cols, rows * 2),
            entities: BTreeMap::new(),
        }
    }

    pub fn resize(&mut self, cols: usize, rows: usize) {
        self.buf.resize(cols, rows * 2);
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    fn ground_h(&self) -> usize {
        (self.buf.height() / 8).max(4).min(self.buf.height())
    }

    fn viewport(&self) -> Viewport {
        let sky_h = self.buf.height() - self.ground_h();
        Viewport {
            sx: self.buf.width() as f64 / CANVAS_WIDTH,
            sy: sky_h as f64 / CANVAS_HEIGHT,
            sky_h: sky_h as i32,
        }
    }

    pub fn draw(&mut self, hud: &Hud) {
        if self.buf.width() == 0 || self.buf.height() < 2 {
            return;
        }
        let t_256 = (hud.night_level.clamp(0.0, 1.0) * 256.0) as u16;
        let palette = Palette::blend(t_256);
        let vp = self.viewport();

        self.draw_sky(&palette, vp);
        self.draw_hills(&palette, vp, hud.scroll);
        let entities: Vec<(Rect, Sprite)> = self.entities.values().copied().collect();
        for (rect, sprite) in &entities {
            if matches!(sprite, Sprite::Cloud) {
                self.draw_cloud(rect, palette.cloud, vp);
            }
        }
        for (rect, sprite) in &entities {
            match *sprite {
                Sprite::Pipe {
                    gap_top,
                    gap_bottom,
                    grouped,
                } => self.draw_pipe(rect, gap_top, gap_bottom, grouped, vp),
                Sprite::NoTouch => self.draw_hazard(rect, vp),
                Sprite::Gate { activated } => self.draw_gate(rect, activated, vp),
                _ => {}
            }
        }
        self.draw_ground(&palette, vp, hud.scroll);
        for (rect, sprite) in &entities {
            if let Sprite::Bird { frame, rotation } = *sprite {
                self.draw_bird(rect, frame, rotation, vp);
            }
        }
        self.draw_hud(hud);
    }

    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        self.buf.render(out)
    }

    fn draw_sky(&mut self, p: &Palette, vp: Viewport) {
        for y in 0..vp.sky_h {
            let t = (y as u32 * 256 / vp.sky_h.max(1) as u32) as u16;
            let c = Rgb::lerp(p.sky_top, p.sky_bot, t);
            for x in 0..self.buf.width() as i32 {
                self.buf.set(x, y, c);
            }
        }
    }

    fn draw_hills(&mut self, p: &Palette, vp: Viewport, scroll: f64) {
        let base = vp.sky_h;
        let s = vp.sy * 10.0;
        let layers = [(0.2, 0.04, 6.0, 1.7, 4.0, p.hill_far), (0.4, 0.06, 4.0, 2.3, 2.0, p.hill_near)];
        for (parallax, freq, amp, harmonic, lift, color) in layers {
            for x in 0..self.buf.width() as i32 {
                let fx = (x as f64 + scroll * vp.sx * parallax) * freq;
                let h = (fx.sin() * amp + (fx * harmonic).sin() * amp / 2.0) * s;
                let top = base - h as i32 - (lift * s) as i32;
                for y in top..base {
                    self.buf.set(x, y, color);
                }
            }
        }
    }

    fn draw_ground(&mut self, p: &Palette, vp: Viewport, scroll: f64) {
        let gy = vp.sky_h;
        let offset = scroll * vp.sx;
        for x in 0..self.buf.width() as i32 {
            let alt = ((x as f64 + offset) as i32 / 3) % 2 == 0;
            self.buf.set(x, gy, if alt { p.grass } else { p.grass_light });
            self.buf.set(x, gy + 1, p.grass);
        }
        for y in (gy + 2)..self.buf.height() as i32 {
            for x in 0..self.buf.width() as i32 {
                let stripe = ((x as f64 + offset * 0.8) as i32 + (y - gy) * 2).rem_euclid(12) < 6;
                self.buf.set(x, y, if stripe { p.dirt } else { p.dirt_dark });
            }
        }
    }

    fn draw_cloud(&mut self, rect: &Rect, color: Rgb, vp: Viewport) {
        let (x, y, w, h) = vp.rect(rect);
        let (cx, cy) = (x as f64 + w as f64 / 2.0, y as f64 + h as f64 / 2.0);
        let (rx, ry) = (w as f64 / 2.0, (h as f64 / 2.0).max(1.0));
        for py in y..y + h {
            for px in x..x + w {
                let dx = (px as f64 + 0.5 - cx) / rx;
                let dy = (py as f64 + 0.5 - cy) / ry;
                if dx * dx + dy * dy <= 1.0 {
                    self.buf.set(px, py, color);
                }
            }
        }
    }

    fn draw_pipe(&mut self, rect: &Rect, gap_top: f64, gap_bottom: f64, grouped: bool, vp: Viewport) {
        let (px, _, pw, _) = vp.rect(rect);
        let gap_top = vp.y(gap_top);
        let gap_bot = vp.y(gap_bottom);
        let cap_extra = (pw / 8).max(1);
        let cap_h = (pw / 4).max(2);
        let edge = if grouped { GROUP_CAP } else { CAP_DARK };

        for x in 0..pw {
            let c = pipe_shade(x, pw);
            for y in 0..gap_top - cap_h {
                self.buf.set(px + x, y, c);
            }
            for y in (gap_bot + cap_h)..vp.sky_h {
                self.buf.set(px + x, y, c);
            }
        }
        for x in -cap_extra..(pw + cap_extra) {
            let c = pipe_shade(x + cap_extra, pw + cap_extra * 2);
            for y in (gap_top - cap_h)..gap_top {
                self.buf.set(px + x, y, c);
            }
            for y in gap_bot..(gap_bot + cap_h) {
                self.buf.set(px + x, y, c);
            }
            self.buf.set(px + x, gap_top - cap_h, edge);
            self.buf.set(px + x, gap_top - 1, edge);
            self.buf.set(px + x, gap_bot, edge);
            self.buf.set(px + x, gap_bot + cap_h - 1, edge);
        }
    }

    fn draw_hazard(&mut self, rect: &Rect, vp: Viewport) {
        let (x, y, w, h) = vp.rect(rect);
        self.buf.fill_rect(x, y, w, h, HAZARD_DARK);
        self.buf.fill_rect(x + 1, y + 1, w - 2, h - 2, HAZARD);
        // Diagonal cross so it reads as "do not touch" at any size.
        let n = w.min(h);
        for i in 0..n {
            self.buf.set(x + i, y + i, WHITE);
            self.buf.set(x + n - 1 - i, y + i, WHITE);
        }
    }

    fn draw_gate(&mut self, rect: &Rect, activated: bool, vp: Viewport) {
        let (x, y, w, h) = vp.rect(rect);
        let c = if activated { GATE_SPENT } else { GATE };
        let t = (w / 6).max(1);
        self.buf.fill_rect(x, y, w, t, c);
        self.buf.fill_rect(x, y + h - t, w, t, c);
        self.buf.fill_rect(x, y, t, h, c);
        self.buf.fill_rect(x + w - t, y, t, h, c);
    }

    fn draw_bird(&mut self, rect: &Rect, frame: usize, rotation: f64, vp: Viewport) {
        let (x, y, w, h) = vp.rect(rect);
        let (cx, cy) = (x + w / 2, y + h / 2);
        let bw = (w / 2).max(2);
        let bh = (h / 2).max(2);
        // Nose-down rotation reads as the beak and wing sinking.
        let tilt = (rotation / 30.0).clamp(-1.0, 2.0) as i32;

        self.buf.fill_rect(cx - bw, cy - bh, bw * 2, bh * 2, BIRD_Y);
        self.buf.fill_rect(cx - bw + 1, cy - bh, bw * 2 - 2, 1, BIRD_HI);

        let wing_y = match frame {
            0 => -1,
            1 => 0,
            _ => 1,
        };
        let wing_h = (bh / 2).max(1);
        let wing_w = (bw * 2 / 3).max(1);
        self.buf
            .fill_rect(cx - bw + 1, cy + wing_y + tilt, wing_w, wing_h, BIRD_WING);

        let eye = (bh / 2).max(1);
        let ex = cx + bw - eye - 1;
        let ey = cy - bh + 1;
        self.buf.fill_rect(ex, ey, eye, eye, BIRD_EYE);
        self.buf.set(ex + eye - 1, ey + eye - 1, BIRD_PUPIL);

        let beak_w = (bw * 2 / 3).max(2);
        let beak_h = (bh / 2).max(1);
        let beak_y = cy + tilt;
        self.buf.fill_rect(cx + bw, beak_y, beak_w, beak_h, BIRD_BEAK_HI);
        self.buf.fill_rect(cx + bw, beak_y + beak_h, beak_w, 1, BIRD_BEAK);

        let tail_w = (bw / 2).max(1);
        self.buf
            .fill_rect(cx - bw - tail_w, cy - 1 - tilt, tail_w, 2, BIRD_WING);
    }

    fn draw_hud(&mut self, hud: &Hud) {
        let cx = self.buf.width() as i32 / 2;
        match hud.screen {
            Screen::Playing => draw_number(&mut self.buf, cx, 4, hud.score, WHITE),
            Screen::Ready => self.draw_title(hud.high_score),
            Screen::GameOver {
                score,
                high_score,
                new_best,
            } => self.draw_game_over(score, high_score, new_best),
        }
        if let Some(speed) = hud.speed_hint {
            let x = self.buf.width() as i32 - 12;
            let y = self.buf.height() as i32 - 8;
            draw_number(&mut self.buf, x, y, speed, Rgb(180, 255, 180));
        }
    }

    fn draw_title(&mut self, best: u32) {
        let cx = self.buf.width() as i32 / 2;
        let cy = self.buf.height() as i32 / 4;
        let text = "FLAPPY";
        let char_w = (self.buf.width() as i32 / 20).clamp(3, 8);
        let char_h = char_w * 3 / 2;
        let sx = cx - text.len() as i32 * char_w / 2;
        for i in 0..text.len() as i32 {
            let bx = sx + i * char_w;
            self.buf.fill_rect(bx, cy, char_w - 1, char_h, BIRD_Y);
            self.buf.fill_rect(bx, cy, char_w - 1, 1, BIRD_HI);
        }
        if best > 0 {
            draw_number(&mut self.buf, cx, cy + char_h + 4, best, BIRD_Y);
        }
    }

    fn draw_game_over(&mut self, score: u32, best: u32, new_best: bool) {
        let cx = self.buf.width() as i32 / 2;
        let cy = self.buf.height() as i32 / 2;
        let panel_w = (self.buf.width() as i32 / 3).max(30);
        let panel_h = 20;

        self.buf.darken();

        let px = cx - panel_w / 2;
        let py = cy - panel_h / 2;
        let frame = if new_best { BIRD_BEAK } else { SHADOW };
        self.buf.fill_rect(px - 1, py - 1, panel_w + 2, panel_h + 2, frame);
        self.buf.fill_rect(px, py, panel_w, panel_h, DAY.dirt);
        self.buf
            .fill_rect(px + 1, py + 1, panel_w - 2, panel_h - 2, Rgb(220, 195, 120));

        draw_number(&mut self.buf, cx, py + 4, score, WHITE);
        draw_number(&mut self.buf, cx, py + 12, best, BIRD_Y);
    }
}

fn pipe_shade(x: i32, total_w: i32) -> Rgb {
    if total_w <= 1 {
        return PIPE_M;
    }
    let t = (x.clamp(0, total_w - 1) as f64 / (total_w - 1) as f64 * 256.0) as u16;
    if t < 64 {
        Rgb::lerp(PIPE_L, PIPE_M, (t * 4).min(256))
    } else if t < 100 {
        Rgb::lerp(PIPE_M, PIPE_HI, ((t - 64) * 7).min(256))
    } else if t < 160 {
        Rgb::lerp(PIPE_HI, PIPE_R, ((t - 100) * 4).min(256))
    } else {
        Rgb::lerp(PIPE_R, PIPE_L, ((t - 160) * 3).min(256))
    }
}
