use std::path::PathBuf;

use anyhow::Result;

use crate::imaging::Img;

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
    /// Whether debug mode is enabled
    pub enabled: bool,
}

/// Context available to all filter steps
#[derive(Clone)]
pub struct PipelineContext {
    pub verbose: bool,
    pub debug: Option<DebugConfig>,
}

/// Trait that all filter steps must implement
pub trait FilterStep {
    /// Transform the grid in place. A step either succeeds and leaves the
    /// grid in its next valid state, or fails and leaves it untouched.
    fn apply(&self, img: &mut Img, context: &PipelineContext) -> Result<()>;

    /// Human-readable name for this step (used in verbose and debug output)
    fn name(&self) -> &str;
}

/// Composable filter chain builder
pub struct Pipeline {
    steps: Vec<Box<dyn FilterStep>>,
    context: PipelineContext,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            context: PipelineContext {
                verbose: false,
                debug: None,
            },
        }
    }

    /// Enable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.context.verbose = verbose;
        self
    }

    /// Enable debug mode with output directory.
    /// The directory must be empty or non-existent.
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig {
            output_dir,
            enabled: true,
        });

        Ok(self)
    }

    /// Add a filter step to the pipeline
    pub fn add_step(mut self, step: Box<dyn FilterStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Run every step in order against the image
    pub fn run(&self, img: &mut Img) -> Result<()> {
        self.save_debug_snapshot(img, 0, "input")?;

        for (step_idx, step) in self.steps.iter().enumerate() {
            if self.context.verbose {
                println!(
                    "Running step: {} ({}x{})",
                    step.name(),
                    img.height(),
                    img.width()
                );
            }

            step.apply(img, &self.context)?;
            self.save_debug_snapshot(img, step_idx + 1, step.name())?;

            if self.context.verbose {
                println!("  → {}x{}", img.height(), img.width());
            }
        }

        Ok(())
    }

    /// Save the grid after a step when debug mode is on, using numbered
    /// step directories (e.g. `02_box_blur/grid.png`).
    fn save_debug_snapshot(&self, img: &Img, step_idx: usize, step_name: &str) -> Result<()> {
        let Some(debug_config) = &self.context.debug else {
            return Ok(());
        };
        if !debug_config.enabled {
            return Ok(());
        }

        let step_dir_name = format!(
            "{:02}_{}",
            step_idx,
            step_name.to_lowercase().replace(" ", "_")
        );
        let step_dir = debug_config.output_dir.join(&step_dir_name);
        std::fs::create_dir_all(&step_dir)?;

        let output_path = step_dir.join("grid.png");
        img.save_to(&output_path)
            .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;

        if self.context.verbose {
            println!("  Debug: saved {}/grid.png", step_dir_name);
        }

        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
