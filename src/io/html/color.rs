//! Colour palettes for region fills and operator markers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Simple RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Rgb {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

impl fmt::Display for Rgb {
    /// Format as CSS hex: #rrggbb
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

const fn rgb(hex: u32) -> Rgb {
    Rgb { r: (hex >> 16) as u8, g: (hex >> 8) as u8, b: hex as u8 }
}

/// Fill for regions without data.
pub(crate) const NO_DATA: Rgb = rgb(0xcccccc);

/// Six-class sequential palettes (ColorBrewer).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Palette {
    YlOrRd,
    Blues,
    Greens,
    Reds,
    Purples,
    Oranges,
}

impl Palette {
    pub(crate) fn colors(self) -> [Rgb; 6] {
        match self {
            Palette::YlOrRd => [rgb(0xffffb2), rgb(0xfed976), rgb(0xfeb24c), rgb(0xfd8d3c), rgb(0xf03b20), rgb(0xbd0026)],
            Palette::Blues => [rgb(0xeff3ff), rgb(0xc6dbef), rgb(0x9ecae1), rgb(0x6baed6), rgb(0x3182bd), rgb(0x08519c)],
            Palette::Greens => [rgb(0xedf8e9), rgb(0xc7e9c0), rgb(0xa1d99b), rgb(0x74c476), rgb(0x31a354), rgb(0x006d2c)],
            Palette::Reds => [rgb(0xfee5d9), rgb(0xfcbba1), rgb(0xfc9272), rgb(0xfb6a4a), rgb(0xde2d26), rgb(0xa50f15)],
            Palette::Purples => [rgb(0xf2f0f7), rgb(0xdadaeb), rgb(0xbcbddc), rgb(0x9e9ac8), rgb(0x756bb1), rgb(0x54278f)],
            Palette::Oranges => [rgb(0xfeedde), rgb(0xfdd0a2), rgb(0xfdae6b), rgb(0xfd8d3c), rgb(0xe6550d), rgb(0xa63603)],
        }
    }
}

/// Equal-interval binning of values onto a palette.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ColorScale {
    min: f64,
    max: f64,
    colors: [Rgb; 6],
}

impl ColorScale {
    /// Scale spanning the finite values; `None` if there are none.
    pub(crate) fn new(values: impl IntoIterator<Item = f64>, palette: Palette) -> Option<Self> {
        let (min, max) = values.into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })?;
        Some(Self { min, max, colors: palette.colors() })
    }

    fn bin(&self, value: f64) -> usize {
        let n = self.colors.len();
        if !(self.max > self.min) { return n - 1 }
        let t = (value - self.min) / (self.max - self.min);
        ((t * n as f64).floor().max(0.0) as usize).min(n - 1)
    }

    pub(crate) fn color(&self, value: f64) -> Rgb {
        if !value.is_finite() { return NO_DATA }
        self.colors[self.bin(value)]
    }

    /// `(lower, upper, color)` per class, for the legend.
    pub(crate) fn classes(&self) -> Vec<(f64, f64, Rgb)> {
        if !(self.max > self.min) {
            return vec![(self.min, self.max, self.colors[self.colors.len() - 1])];
        }
        let n = self.colors.len();
        let step = (self.max - self.min) / n as f64;
        self.colors.iter().enumerate()
            .map(|(i, &c)| (self.min + step * i as f64, self.min + step * (i + 1) as f64, c))
            .collect()
    }
}

/// Categorical palette for operators (matplotlib tab20).
const TAB20: [Rgb; 20] = [
    rgb(0x1f77b4), rgb(0xaec7e8), rgb(0xff7f0e), rgb(0xffbb78), rgb(0x2ca02c),
    rgb(0x98df8a), rgb(0xd62728), rgb(0xff9896), rgb(0x9467bd), rgb(0xc5b0d5),
    rgb(0x8c564b), rgb(0xc49c94), rgb(0xe377c2), rgb(0xf7b6d2), rgb(0x7f7f7f),
    rgb(0xc7c7c7), rgb(0xbcbd22), rgb(0xdbdb8d), rgb(0x17becf), rgb(0x9edae5),
];

/// Colour of the `index`-th category, cycling through the palette.
pub(crate) fn category_color(index: usize) -> Rgb {
    TAB20[index % TAB20.len()]
}
