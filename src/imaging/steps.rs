//! Filter steps wrapping each grid operation for use in a [`Pipeline`].
//!
//! [`FilterSpec`] is the CLI-facing form: a parsed filter name with its
//! parameters, turned into a boxed step once any side inputs (the second
//! image of a concat) have been loaded.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;

use crate::imaging::{
    DEFAULT_BLUR_LEVEL, DEFAULT_PEPPER_PROB, DEFAULT_SALT_PROB, Direction, Img,
};
use crate::pipeline::{FilterStep, Pipeline, PipelineContext};

/// Box-blur downsampling
pub struct BlurStep {
    pub level: usize,
}

impl FilterStep for BlurStep {
    fn apply(&self, img: &mut Img, _context: &PipelineContext) -> Result<()> {
        img.blur(self.level)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "Box Blur"
    }
}

/// Per-row edge contour
pub struct ContourStep;

impl FilterStep for ContourStep {
    fn apply(&self, img: &mut Img, _context: &PipelineContext) -> Result<()> {
        img.contour()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "Contour"
    }
}

/// 90-degree clockwise rotation
pub struct RotateStep;

impl FilterStep for RotateStep {
    fn apply(&self, img: &mut Img, _context: &PipelineContext) -> Result<()> {
        img.rotate()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "Rotate"
    }
}

/// Salt-and-pepper noise injection. Draws from the process entropy source;
/// deterministic behavior is only available by calling
/// [`Img::salt_n_pepper`] directly with a seeded generator.
pub struct SaltPepperStep {
    pub salt_prob: f64,
    pub pepper_prob: f64,
}

impl FilterStep for SaltPepperStep {
    fn apply(&self, img: &mut Img, _context: &PipelineContext) -> Result<()> {
        img.salt_n_pepper(&mut rand::rng(), self.salt_prob, self.pepper_prob);
        Ok(())
    }

    fn name(&self) -> &str {
        "Salt and Pepper"
    }
}

/// Global threshold binarization
pub struct SegmentStep;

impl FilterStep for SegmentStep {
    fn apply(&self, img: &mut Img, _context: &PipelineContext) -> Result<()> {
        img.segment()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "Segment"
    }
}

/// Concatenation with a second, already-loaded image
pub struct ConcatStep {
    pub other: Img,
    pub direction: Direction,
}

impl FilterStep for ConcatStep {
    fn apply(&self, img: &mut Img, _context: &PipelineContext) -> Result<()> {
        img.concat(&self.other, self.direction)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "Concat"
    }
}

/// A filter request parsed from the command line.
///
/// Accepted forms: `blur`, `blur=LEVEL`, `contour`, `rotate`,
/// `salt_n_pepper`, `salt_n_pepper=SALT,PEPPER`, `segment`,
/// `concat=PATH:DIRECTION`.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterSpec {
    Blur { level: usize },
    Contour,
    Rotate,
    SaltPepper { salt_prob: f64, pepper_prob: f64 },
    Segment,
    Concat { other: PathBuf, direction: Direction },
}

impl FromStr for FilterSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, args) = match s.split_once('=') {
            Some((name, args)) => (name, Some(args)),
            None => (s, None),
        };

        match (name.to_lowercase().as_str(), args) {
            ("blur", None) => Ok(FilterSpec::Blur {
                level: DEFAULT_BLUR_LEVEL,
            }),
            ("blur", Some(level)) => {
                let level = level
                    .parse()
                    .map_err(|_| format!("Invalid blur level: {level}"))?;
                Ok(FilterSpec::Blur { level })
            }
            ("contour", None) => Ok(FilterSpec::Contour),
            ("rotate", None) => Ok(FilterSpec::Rotate),
            ("salt_n_pepper", None) => Ok(FilterSpec::SaltPepper {
                salt_prob: DEFAULT_SALT_PROB,
                pepper_prob: DEFAULT_PEPPER_PROB,
            }),
            ("salt_n_pepper", Some(probs)) => {
                let (salt, pepper) = probs
                    .split_once(',')
                    .ok_or_else(|| format!("Expected salt_n_pepper=SALT,PEPPER, got: {probs}"))?;
                let salt_prob = salt
                    .parse()
                    .map_err(|_| format!("Invalid salt probability: {salt}"))?;
                let pepper_prob = pepper
                    .parse()
                    .map_err(|_| format!("Invalid pepper probability: {pepper}"))?;
                Ok(FilterSpec::SaltPepper {
                    salt_prob,
                    pepper_prob,
                })
            }
            ("segment", None) => Ok(FilterSpec::Segment),
            ("concat", Some(args)) => {
                let (path, direction) = args
                    .rsplit_once(':')
                    .ok_or_else(|| format!("Expected concat=PATH:DIRECTION, got: {args}"))?;
                let direction = direction.parse().map_err(|e| format!("{e}"))?;
                Ok(FilterSpec::Concat {
                    other: PathBuf::from(path),
                    direction,
                })
            }
            ("concat", None) => Err("concat requires arguments: concat=PATH:DIRECTION".to_string()),
            (name @ ("contour" | "rotate" | "segment"), Some(_)) => {
                Err(format!("Filter {name} takes no arguments"))
            }
            (other, _) => Err(format!("Unknown filter: {other}")),
        }
    }
}

impl FilterSpec {
    /// Turn the spec into a runnable step, loading any side inputs.
    pub fn into_step(self) -> Result<Box<dyn FilterStep>> {
        Ok(match self {
            FilterSpec::Blur { level } => Box::new(BlurStep { level }),
            FilterSpec::Contour => Box::new(ContourStep),
            FilterSpec::Rotate => Box::new(RotateStep),
            FilterSpec::SaltPepper {
                salt_prob,
                pepper_prob,
            } => Box::new(SaltPepperStep {
                salt_prob,
                pepper_prob,
            }),
            FilterSpec::Segment => Box::new(SegmentStep),
            FilterSpec::Concat { other, direction } => Box::new(ConcatStep {
                other: Img::open(&other)?,
                direction,
            }),
        })
    }
}

/// Build a pipeline from parsed filter specs.
pub fn build_pipeline(specs: Vec<FilterSpec>, verbose: bool) -> Result<Pipeline> {
    let mut pipeline = Pipeline::new().with_verbose(verbose);
    for spec in specs {
        pipeline = pipeline.add_step(spec.into_step()?);
    }
    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_filters() {
        assert_eq!("contour".parse(), Ok(FilterSpec::Contour));
        assert_eq!("rotate".parse(), Ok(FilterSpec::Rotate));
        assert_eq!("segment".parse(), Ok(FilterSpec::Segment));
        assert_eq!("blur".parse(), Ok(FilterSpec::Blur { level: 16 }));
        assert_eq!(
            "salt_n_pepper".parse(),
            Ok(FilterSpec::SaltPepper {
                salt_prob: 0.05,
                pepper_prob: 0.05
            })
        );
    }

    #[test]
    fn test_parse_parameterized_filters() {
        assert_eq!("blur=4".parse(), Ok(FilterSpec::Blur { level: 4 }));
        assert_eq!(
            "salt_n_pepper=0.1,0.2".parse(),
            Ok(FilterSpec::SaltPepper {
                salt_prob: 0.1,
                pepper_prob: 0.2
            })
        );
        assert_eq!(
            "concat=side.png:horizontal".parse(),
            Ok(FilterSpec::Concat {
                other: PathBuf::from("side.png"),
                direction: Direction::Horizontal,
            })
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("sharpen".parse::<FilterSpec>().is_err());
        assert!("blur=sixteen".parse::<FilterSpec>().is_err());
        assert!("rotate=90".parse::<FilterSpec>().is_err());
        assert!("concat".parse::<FilterSpec>().is_err());
        assert!("concat=side.png:diagonal".parse::<FilterSpec>().is_err());
    }
}
