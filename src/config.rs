//! Run-time configuration values.
//!
//! Plain structs with `Default` impls. Anything that can be out of range is
//! checked by `validate()` before a generator accepts it.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SpanError};

// ============================================================================
// FilterKind
// ============================================================================

/// Image kernel selected at run time.
///
/// Parsed from names such as `"bicubic"`, `"mitchell"` or `"lanczos:4"`.
/// The radius-parameterized kernels default to a radius of 3 when no
/// `:radius` suffix is given.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FilterKind {
    #[default]
    Bilinear,
    Hanning,
    Hamming,
    Hermite,
    Quadric,
    Bicubic,
    Kaiser,
    Catrom,
    Mitchell,
    Spline16,
    Spline36,
    Gaussian,
    Bessel,
    Sinc(f64),
    Lanczos(f64),
    Blackman(f64),
}

const DEFAULT_KERNEL_RADIUS: f64 = 3.0;

impl FilterKind {
    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::Bilinear => "bilinear",
            FilterKind::Hanning => "hanning",
            FilterKind::Hamming => "hamming",
            FilterKind::Hermite => "hermite",
            FilterKind::Quadric => "quadric",
            FilterKind::Bicubic => "bicubic",
            FilterKind::Kaiser => "kaiser",
            FilterKind::Catrom => "catrom",
            FilterKind::Mitchell => "mitchell",
            FilterKind::Spline16 => "spline16",
            FilterKind::Spline36 => "spline36",
            FilterKind::Gaussian => "gaussian",
            FilterKind::Bessel => "bessel",
            FilterKind::Sinc(_) => "sinc",
            FilterKind::Lanczos(_) => "lanczos",
            FilterKind::Blackman(_) => "blackman",
        }
    }

    /// Radius argument of the parameterized kernels.
    pub fn radius_param(&self) -> Option<f64> {
        match *self {
            FilterKind::Sinc(r) | FilterKind::Lanczos(r) | FilterKind::Blackman(r) => Some(r),
            _ => None,
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.radius_param() {
            Some(r) => write!(f, "{}:{}", self.name(), r),
            None => f.write_str(self.name()),
        }
    }
}

impl FromStr for FilterKind {
    type Err = SpanError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let (name, radius) = match lower.split_once(':') {
            Some((n, r)) => {
                let r: f64 = r.trim().parse().map_err(|_| {
                    SpanError::InvalidConfig(format!("bad filter radius in {s:?}"))
                })?;
                if !(r.is_finite() && r > 0.0) {
                    return Err(SpanError::InvalidConfig(format!(
                        "filter radius must be positive, got {r}"
                    )));
                }
                (n.trim(), Some(r))
            }
            None => (lower.as_str(), None),
        };

        let fixed = match name {
            "bilinear" => Some(FilterKind::Bilinear),
            "hanning" => Some(FilterKind::Hanning),
            "hamming" => Some(FilterKind::Hamming),
            "hermite" => Some(FilterKind::Hermite),
            "quadric" => Some(FilterKind::Quadric),
            "bicubic" => Some(FilterKind::Bicubic),
            "kaiser" => Some(FilterKind::Kaiser),
            "catrom" | "catmull-rom" => Some(FilterKind::Catrom),
            "mitchell" => Some(FilterKind::Mitchell),
            "spline16" => Some(FilterKind::Spline16),
            "spline36" => Some(FilterKind::Spline36),
            "gaussian" => Some(FilterKind::Gaussian),
            "bessel" => Some(FilterKind::Bessel),
            _ => None,
        };
        if let Some(kind) = fixed {
            if radius.is_some() {
                return Err(SpanError::InvalidConfig(format!(
                    "filter {name} has a fixed radius"
                )));
            }
            return Ok(kind);
        }

        let r = radius.unwrap_or(DEFAULT_KERNEL_RADIUS);
        match name {
            "sinc" => Ok(FilterKind::Sinc(r)),
            "lanczos" => Ok(FilterKind::Lanczos(r)),
            "blackman" => Ok(FilterKind::Blackman(r)),
            _ => Err(SpanError::UnknownFilter(s.to_string())),
        }
    }
}

// ============================================================================
// ResampleConfig
// ============================================================================

/// Footprint limits for the resampling generators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResampleConfig {
    /// Upper bound on the product of the X and Y scales.
    pub scale_limit: f64,
    /// Kernel widening along X; values above 1 soften the result.
    pub blur_x: f64,
    pub blur_y: f64,
}

impl Default for ResampleConfig {
    fn default() -> Self {
        Self {
            scale_limit: 200.0,
            blur_x: 1.0,
            blur_y: 1.0,
        }
    }
}

impl ResampleConfig {
    pub fn new(scale_limit: f64, blur_x: f64, blur_y: f64) -> Result<Self> {
        let c = Self {
            scale_limit,
            blur_x,
            blur_y,
        };
        c.validate()?;
        Ok(c)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(SpanError::InvalidConfig(format!("{name} must be positive, got {v}")))
            }
        };
        positive("scale_limit", self.scale_limit)?;
        positive("blur_x", self.blur_x)?;
        positive("blur_y", self.blur_y)
    }
}

// ============================================================================
// GradientConfig
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradientConfig {
    /// Number of entries in the gradient color table.
    pub lut_size: usize,
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self { lut_size: 256 }
    }
}

impl GradientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.lut_size == 0 {
            return Err(SpanError::InvalidConfig("lut_size must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fixed_kernels() {
        assert_eq!("bicubic".parse::<FilterKind>().unwrap(), FilterKind::Bicubic);
        assert_eq!(" Mitchell ".parse::<FilterKind>().unwrap(), FilterKind::Mitchell);
        assert_eq!("catmull-rom".parse::<FilterKind>().unwrap(), FilterKind::Catrom);
    }

    #[test]
    fn test_parse_radius_kernels() {
        assert_eq!("lanczos:4".parse::<FilterKind>().unwrap(), FilterKind::Lanczos(4.0));
        assert_eq!("sinc".parse::<FilterKind>().unwrap(), FilterKind::Sinc(3.0));
        assert_eq!(FilterKind::Blackman(2.5).to_string(), "blackman:2.5");
        let k: FilterKind = FilterKind::Lanczos(6.0).to_string().parse().unwrap();
        assert_eq!(k, FilterKind::Lanczos(6.0));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "box".parse::<FilterKind>(),
            Err(SpanError::UnknownFilter("box".into()))
        );
        assert!(matches!(
            "lanczos:x".parse::<FilterKind>(),
            Err(SpanError::InvalidConfig(_))
        ));
        assert!(matches!(
            "bicubic:2".parse::<FilterKind>(),
            Err(SpanError::InvalidConfig(_))
        ));
        assert!(matches!(
            "sinc:-1".parse::<FilterKind>(),
            Err(SpanError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_resample_config() {
        let c = ResampleConfig::default();
        assert_eq!((c.scale_limit, c.blur_x, c.blur_y), (200.0, 1.0, 1.0));
        assert!(c.validate().is_ok());
        assert!(ResampleConfig::new(0.0, 1.0, 1.0).is_err());
        assert!(ResampleConfig::new(20.0, 1.0, f64::NAN).is_err());
        assert!(ResampleConfig::new(20.0, 2.0, 1.5).is_ok());
    }

    #[test]
    fn test_gradient_config() {
        assert_eq!(GradientConfig::default().lut_size, 256);
        assert!(GradientConfig { lut_size: 0 }.validate().is_err());
    }
}
