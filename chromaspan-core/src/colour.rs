use serde::{Deserialize, Serialize};

/// An opaque 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub [u8; 3]);

/// Corners of the RGB cube, in the order they are searched.
const CUBE_CORNERS: [Rgb; 8] = [
    Rgb([0, 0, 0]),
    Rgb([0, 0, 255]),
    Rgb([0, 255, 0]),
    Rgb([0, 255, 255]),
    Rgb([255, 0, 0]),
    Rgb([255, 0, 255]),
    Rgb([255, 255, 0]),
    Rgb([255, 255, 255]),
];

impl Rgb {
    pub const BLACK: Rgb = Rgb([0, 0, 0]);
    pub const WHITE: Rgb = Rgb([255, 255, 255]);
    /// Light beige used behind every game.
    pub const BACKGROUND: Rgb = Rgb([196, 188, 150]);
    /// Slightly lighter beige used by the canvas-style games and the menu.
    pub const PAPER: Rgb = Rgb([236, 229, 206]);
    pub const GREEN: Rgb = Rgb([0, 128, 0]);
    pub const RED: Rgb = Rgb([200, 0, 0]);
    pub const GREY: Rgb = Rgb([187, 187, 187]);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb([r, g, b])
    }

    pub fn r(self) -> u8 {
        self.0[0]
    }

    pub fn g(self) -> u8 {
        self.0[1]
    }

    pub fn b(self) -> u8 {
        self.0[2]
    }

    /// Squared euclidean distance in RGB space.
    pub fn distance_sq(self, other: Rgb) -> u32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(&a, &b)| {
                let d = a as i32 - b as i32;
                (d * d) as u32
            })
            .sum()
    }

    /// The corner of the RGB cube furthest from this colour.
    pub fn farthest_corner(self) -> Rgb {
        let mut best = CUBE_CORNERS[0];
        let mut best_dist = self.distance_sq(best);
        for corner in &CUBE_CORNERS[1..] {
            let dist = self.distance_sq(*corner);
            if dist > best_dist {
                best = *corner;
                best_dist = dist;
            }
        }
        best
    }

    /// Linear interpolation towards `to`, rounding each channel. `t` is
    /// clamped to `[0, 1]`.
    pub fn lerp(self, to: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mut out = [0u8; 3];
        for (i, slot) in out.iter_mut().enumerate() {
            let from = self.0[i] as f64;
            let target = to.0[i] as f64;
            *slot = (from + (target - from) * t).round().clamp(0.0, 255.0) as u8;
        }
        Rgb(out)
    }

    /// Distractor colour at a controlled distance from this one. A similarity
    /// of 1.0 returns the colour itself, 0.0 the farthest cube corner.
    pub fn foil(self, similarity: f64) -> Rgb {
        self.lerp(self.farthest_corner(), 1.0 - similarity)
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(value: [u8; 3]) -> Self {
        Rgb(value)
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rgb({}, {}, {})", self.0[0], self.0[1], self.0[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn farthest_corner_of_pure_red_is_cyan() {
        assert_eq!(Rgb::new(255, 0, 0).farthest_corner(), Rgb::new(0, 255, 255));
    }

    #[test]
    fn farthest_corner_of_mid_tones() {
        // Mid grey sits one step closer to white.
        assert_eq!(Rgb::new(128, 128, 128).farthest_corner(), Rgb::BLACK);
        assert_eq!(Rgb::WHITE.farthest_corner(), Rgb::BLACK);
        assert_eq!(Rgb::new(0, 128, 0).farthest_corner(), Rgb::new(255, 0, 255));
    }

    #[test]
    fn lerp_rounds_half_up() {
        let mid = Rgb::new(255, 0, 0).lerp(Rgb::new(0, 255, 255), 0.5);
        assert_eq!(mid, Rgb::new(128, 128, 128));
    }

    #[test]
    fn foil_endpoints() {
        let base = Rgb::new(0, 204, 255);
        assert_eq!(base.foil(1.0), base);
        assert_eq!(base.foil(0.0), base.farthest_corner());
    }

    #[test]
    fn foils_follow_the_walked_difficulty() {
        use crate::adaptive::DifficultyIndex;

        let e = Rgb::new(102, 255, 102);
        let r = Rgb::new(255, 0, 0);
        let walk = |steps: &[bool]| {
            let mut d = DifficultyIndex::default();
            for &correct in steps {
                d.nudge(correct);
            }
            d.value()
        };

        // 0.5 + 0.2 - 0.2 - 0.2 sits just under 0.3, so the green channel
        // rounds down where a single miss rounds up.
        assert_eq!(e.foil(walk(&[true, false, false])), Rgb::new(209, 76, 209));
        assert_eq!(e.foil(walk(&[false])), Rgb::new(209, 77, 209));
        assert_eq!(r.foil(walk(&[true, false, false])), Rgb::new(76, 179, 179));
        assert_eq!(e.foil(walk(&[true, true])), Rgb::new(117, 229, 117));
        assert_eq!(r.foil(walk(&[true, true])), Rgb::new(229, 26, 26));
        assert_eq!(e.foil(walk(&[])), Rgb::new(179, 128, 179));
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Rgb::new(153, 51, 0);
        let b = Rgb::new(102, 255, 102);
        assert_eq!(a.distance_sq(b), b.distance_sq(a));
        assert_eq!(a.distance_sq(a), 0);
    }
}
