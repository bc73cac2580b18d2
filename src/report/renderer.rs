//! Output renderers for best-solution reports.
//!
//! The driver walks the experiment hierarchy once and hands every group to a
//! [`Renderer`]. Renderers only turn a selection into text; they never select.

use crate::results::format_noise;
use crate::selection::Selection;

/// Identity of one experiment group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupContext {
    pub model: String,
    pub noise: f64,
    pub estimator: String,
    pub interpolator: Option<String>,
    /// Number of groups rendered earlier in the same report with the same [`slug`].
    ///
    /// [`slug`]: GroupContext::slug
    pub repeat: usize,
}

impl GroupContext {
    /// Noise level as printed in captions and headings
    pub fn noise_label(&self) -> String {
        format_noise(self.noise)
    }

    /// Model, estimator, interpolator and noise joined by underscores.
    ///
    /// Names that contain underscores themselves can make two groups share a slug,
    /// e.g. model `a_b` with estimator `c` and model `a` with estimator `b_c`.
    /// [`repeat`](GroupContext::repeat) tells those groups apart.
    pub fn slug(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.model,
            self.estimator,
            self.interpolator.as_deref().unwrap_or(""),
            self.noise_label().replace('.', "")
        )
    }
}

/// A level of the experiment hierarchy that is about to be entered
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Section<'a> {
    Model(&'a str),
    Noise(f64),
    Estimator(&'a str),
    Interpolator(Option<&'a str>),
}

/// Turns selections into text
pub trait Renderer {
    /// Heading emitted when the driver enters a new level of the hierarchy.
    fn section(&self, _section: Section<'_>) -> String {
        String::new()
    }

    /// Renders one group. `None` means the group had no rows.
    fn table(&self, selection: Option<&Selection>, context: &GroupContext) -> String;

    /// Wraps the concatenated group output.
    fn document(&self, body: &str) -> String {
        body.to_string()
    }
}
