use crate::error::BundleError;
use derive_builder::Builder;

/// Tunables of one bundling pass.
///
/// ```
/// use tabane::settings::BundlingSettingsBuilder;
///
/// let settings = BundlingSettingsBuilder::default()
///     .spacing(6.0)
///     .clearance(3.0)
///     .build()
///     .unwrap();
/// assert_eq!(settings.spacing, 6.0);
/// assert_eq!(settings.min_spacing, 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(default, build_fn(validate = "Self::validate"))]
pub struct BundlingSettings {
    /// Distance between neighbouring members of a bundle.
    pub spacing: f64,
    /// Lower bound for `spacing` where curvature forces it to shrink.
    pub min_spacing: f64,
    /// Padding between the tight and the loose boundary curve.
    pub clearance: f64,
    /// Largest tangent turn (radians) tolerated at a junction of an assembled curve.
    pub smoothing_tolerance: f64,
    /// Candidate swap positions examined per component. `None` scales with the squared member
    /// count.
    #[builder(setter(strip_option))]
    pub max_iterations: Option<usize>,
    /// Cubic pieces per leg of an assembled curve.
    pub samples_per_leg: usize,
    /// Samples along each boundary rail.
    pub boundary_samples: usize,
    /// Fraction of a leg, measured from the hub, covered by a base's boundary curves.
    pub boundary_extent: f64,
    /// Length trimmed off each leg at an intermediate hub to make room for the junction.
    pub junction_radius: f64,
    /// Tangent angles closer than this are treated as equal when seeding an order.
    pub angle_epsilon: f64,
    /// Largest distance between a leg's curve end and its attachment.
    pub attach_tolerance: f64,
    /// Process independent parts of the network on the rayon thread pool.
    pub parallel: bool,
}

impl Default for BundlingSettings {
    fn default() -> Self {
        Self {
            spacing: 4.0,
            min_spacing: 1.0,
            clearance: 2.0,
            smoothing_tolerance: 1e-3,
            max_iterations: None,
            samples_per_leg: 8,
            boundary_samples: 16,
            boundary_extent: 0.5,
            junction_radius: 8.0,
            angle_epsilon: 1e-6,
            attach_tolerance: 1e-3,
            parallel: true,
        }
    }
}

impl BundlingSettings {
    /// Iteration budget for a component with `members` oriented segments.
    pub fn iteration_budget(&self, members: usize) -> usize {
        self.max_iterations
            .unwrap_or_else(|| 4 * members * members)
            .max(1)
    }
}

impl BundlingSettingsBuilder {
    fn validate(&self) -> Result<(), String> {
        let defaults = BundlingSettings::default();
        let spacing = self.spacing.unwrap_or(defaults.spacing);
        let min_spacing = self.min_spacing.unwrap_or(defaults.min_spacing);

        if !(spacing > 0.0) {
            return Err(format!("spacing must be positive, got {}", spacing));
        }
        if !(min_spacing > 0.0) || min_spacing > spacing {
            return Err(format!(
                "min_spacing must be in (0, {}], got {}",
                spacing, min_spacing
            ));
        }
        if let Some(clearance) = self.clearance {
            if !(clearance >= 0.0) {
                return Err(format!("clearance must not be negative, got {}", clearance));
            }
        }
        if let Some(tolerance) = self.smoothing_tolerance {
            if !(tolerance > 0.0) {
                return Err(format!(
                    "smoothing_tolerance must be positive, got {}",
                    tolerance
                ));
            }
        }
        if let Some(extent) = self.boundary_extent {
            if !(extent > 0.0 && extent <= 1.0) {
                return Err(format!("boundary_extent must be in (0, 1], got {}", extent));
            }
        }
        if self.samples_per_leg == Some(0) || self.boundary_samples == Some(0) {
            return Err("sample counts must be positive".into());
        }
        if let Some(radius) = self.junction_radius {
            if !(radius >= 0.0) {
                return Err(format!("junction_radius must not be negative, got {}", radius));
            }
        }
        Ok(())
    }
}

impl From<BundlingSettingsBuilderError> for BundleError {
    fn from(err: BundlingSettingsBuilderError) -> Self {
        BundleError::InvalidSettings(err.to_string())
    }
}
