use std::fmt;
use std::str::FromStr;

use image::{RgbaImage, imageops};

use crate::error::SheetError;

/// One post-process step, modelled on CSS filter functions.
///
/// Amounts are unit-less (`1` = 100%), angles are degrees, blur is a
/// standard deviation in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    Grayscale(f32),
    Sepia(f32),
    Saturate(f32),
    Invert(f32),
    Brightness(f32),
    Contrast(f32),
    Opacity(f32),
    HueRotate(f32),
    Blur(f32),
}

type Matrix = [[f32; 3]; 3];

impl Effect {
    fn parse(name: &str, arg: &str) -> Result<Self, SheetError> {
        let effect = match name {
            "grayscale" => Self::Grayscale(amount(name, arg, 1.0)?.min(1.0)),
            "sepia" => Self::Sepia(amount(name, arg, 1.0)?.min(1.0)),
            "saturate" => Self::Saturate(amount(name, arg, 1.0)?),
            "invert" => Self::Invert(amount(name, arg, 1.0)?.min(1.0)),
            "brightness" => Self::Brightness(amount(name, arg, 1.0)?),
            "contrast" => Self::Contrast(amount(name, arg, 1.0)?),
            "opacity" => Self::Opacity(amount(name, arg, 1.0)?.min(1.0)),
            "hue-rotate" => Self::HueRotate(angle(name, arg)?),
            "blur" => Self::Blur(length(name, arg)?),
            _ => {
                return Err(SheetError::new("invalid-effect")
                    .with_arg("function", name)
                    .with_arg("reason", "unsupported"));
            }
        };
        Ok(effect)
    }

    fn apply(&self, img: RgbaImage) -> RgbaImage {
        match *self {
            Self::Grayscale(a) => {
                let a = 1.0 - a;
                color_matrix(
                    img,
                    [
                        [0.2126 + 0.7874 * a, 0.7152 - 0.7152 * a, 0.0722 - 0.0722 * a],
                        [0.2126 - 0.2126 * a, 0.7152 + 0.2848 * a, 0.0722 - 0.0722 * a],
                        [0.2126 - 0.2126 * a, 0.7152 - 0.7152 * a, 0.0722 + 0.9278 * a],
                    ],
                )
            }
            Self::Sepia(a) => {
                let a = 1.0 - a;
                color_matrix(
                    img,
                    [
                        [0.393 + 0.607 * a, 0.769 - 0.769 * a, 0.189 - 0.189 * a],
                        [0.349 - 0.349 * a, 0.686 + 0.314 * a, 0.168 - 0.168 * a],
                        [0.272 - 0.272 * a, 0.534 - 0.534 * a, 0.131 + 0.869 * a],
                    ],
                )
            }
            Self::Saturate(s) => color_matrix(
                img,
                [
                    [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
                    [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
                    [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
                ],
            ),
            Self::Invert(a) => map_channels(img, |c| a + c * (1.0 - 2.0 * a)),
            Self::Brightness(b) => map_channels(img, |c| c * b),
            Self::Contrast(k) => map_channels(img, |c| (c - 0.5) * k + 0.5),
            Self::Opacity(a) => {
                let mut img = img;
                for px in img.pixels_mut() {
                    px[3] = to_byte(f32::from(px[3]) / 255.0 * a);
                }
                img
            }
            Self::HueRotate(deg) => imageops::huerotate(&img, deg.round() as i32),
            Self::Blur(sigma) if sigma > 0.0 => imageops::blur(&img, sigma),
            Self::Blur(_) => img,
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grayscale(a) => write!(f, "grayscale({a})"),
            Self::Sepia(a) => write!(f, "sepia({a})"),
            Self::Saturate(a) => write!(f, "saturate({a})"),
            Self::Invert(a) => write!(f, "invert({a})"),
            Self::Brightness(a) => write!(f, "brightness({a})"),
            Self::Contrast(a) => write!(f, "contrast({a})"),
            Self::Opacity(a) => write!(f, "opacity({a})"),
            Self::HueRotate(deg) => write!(f, "hue-rotate({deg}deg)"),
            Self::Blur(px) => write!(f, "blur({px}px)"),
        }
    }
}

/// An ordered list of effects, applied left to right.
///
/// Parses from and prints to a CSS filter string. The printed form is
/// canonical: `grayscale(100%)` and `grayscale(1)` print the same.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectChain {
    effects: Vec<Effect>,
}

impl EffectChain {
    pub fn new(effects: Vec<Effect>) -> Self {
        Self { effects }
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Run the chain over a copy of `source`.
    pub fn apply(&self, source: &RgbaImage) -> RgbaImage {
        self.effects
            .iter()
            .fold(source.clone(), |img, effect| effect.apply(img))
    }
}

impl From<Effect> for EffectChain {
    fn from(effect: Effect) -> Self {
        Self::new(vec![effect])
    }
}

impl FromStr for EffectChain {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed == "none" {
            return Ok(Self::default());
        }

        let mut effects = Vec::new();
        let mut rest = trimmed;
        while !rest.is_empty() {
            let open = rest.find('(').ok_or_else(|| malformed(s))?;
            let close = rest[open..].find(')').ok_or_else(|| malformed(s))? + open;
            let name = rest[..open].trim().to_ascii_lowercase();
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(malformed(s));
            }
            effects.push(Effect::parse(&name, rest[open + 1..close].trim())?);
            rest = rest[close + 1..].trim_start();
        }

        Ok(Self { effects })
    }
}

impl fmt::Display for EffectChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.effects.is_empty() {
            return f.write_str("none");
        }
        for (i, effect) in self.effects.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{effect}")?;
        }
        Ok(())
    }
}

fn malformed(descriptor: &str) -> SheetError {
    SheetError::new("invalid-effect")
        .with_arg("descriptor", descriptor)
        .with_arg("reason", "malformed")
}

fn bad_arg(name: &str, arg: &str) -> SheetError {
    SheetError::new("invalid-effect")
        .with_arg("function", name)
        .with_arg("argument", arg)
}

fn number(name: &str, arg: &str) -> Result<f32, SheetError> {
    let value: f32 = arg.trim().parse().map_err(|_| bad_arg(name, arg))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(bad_arg(name, arg))
    }
}

/// `0.5`, `50%`, or empty for the default. Negative amounts are invalid.
fn amount(name: &str, arg: &str, default: f32) -> Result<f32, SheetError> {
    if arg.is_empty() {
        return Ok(default);
    }
    let value = match arg.strip_suffix('%') {
        Some(pct) => number(name, pct)? / 100.0,
        None => number(name, arg)?,
    };
    if value < 0.0 {
        return Err(bad_arg(name, arg));
    }
    Ok(value)
}

/// Angle in degrees; accepts `deg`, `rad`, `turn` or a bare zero.
fn angle(name: &str, arg: &str) -> Result<f32, SheetError> {
    if arg.is_empty() {
        return Ok(0.0);
    }
    if let Some(v) = arg.strip_suffix("deg") {
        number(name, v)
    } else if let Some(v) = arg.strip_suffix("rad") {
        Ok(number(name, v)?.to_degrees())
    } else if let Some(v) = arg.strip_suffix("turn") {
        Ok(number(name, v)? * 360.0)
    } else if number(name, arg)? == 0.0 {
        Ok(0.0)
    } else {
        Err(bad_arg(name, arg))
    }
}

/// Length in pixels; accepts `px` or a bare zero.
fn length(name: &str, arg: &str) -> Result<f32, SheetError> {
    if arg.is_empty() {
        return Ok(0.0);
    }
    let value = match arg.strip_suffix("px") {
        Some(v) => number(name, v)?,
        None if number(name, arg)? == 0.0 => 0.0,
        None => return Err(bad_arg(name, arg)),
    };
    if value < 0.0 {
        return Err(bad_arg(name, arg));
    }
    Ok(value)
}

fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn map_channels(mut img: RgbaImage, f: impl Fn(f32) -> f32) -> RgbaImage {
    for px in img.pixels_mut() {
        for c in 0..3 {
            px[c] = to_byte(f(f32::from(px[c]) / 255.0));
        }
    }
    img
}

fn color_matrix(mut img: RgbaImage, m: Matrix) -> RgbaImage {
    for px in img.pixels_mut() {
        let rgb = [
            f32::from(px[0]) / 255.0,
            f32::from(px[1]) / 255.0,
            f32::from(px[2]) / 255.0,
        ];
        for (c, row) in m.iter().enumerate() {
            px[c] = to_byte(row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2]);
        }
    }
    img
}
