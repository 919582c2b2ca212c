//! Debug control panel.
//!
//! Binds named controls with a numeric range and step to [`Settings`] fields.
//! The panel only writes settings; the owning [`crate::App`] applies them.

use crate::settings::{ParamId, Settings};

/// Errors returned when setting a parameter through the panel.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PanelError {
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),
    #[error("Parameter {name} has no control")]
    NoControl { name: &'static str },
    #[error("Non-finite value for {name}: {value}")]
    NonFinite { name: &'static str, value: f32 },
}

/// A slider bound to one setting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Control {
    pub param: ParamId,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl Control {
    pub const fn new(param: ParamId, min: f32, max: f32, step: f32) -> Self {
        Self {
            param,
            min,
            max,
            step,
        }
    }

    pub fn name(&self) -> &'static str {
        self.param.name()
    }

    /// Clamp to the range and snap to the nearest step above `min`.
    pub fn sanitize(&self, value: f32) -> f32 {
        let clamped = value.clamp(self.min, self.max);
        if self.step <= 0.0 {
            return clamped;
        }
        let (min, step) = (self.min as f64, self.step as f64);
        let snapped = min + ((clamped as f64 - min) / step).round() * step;
        // Values already on the grid are kept bit-for-bit.
        if (snapped - clamped as f64).abs() < step * 1e-3 {
            return clamped;
        }
        (snapped as f32).clamp(self.min, self.max)
    }
}

/// A parameter change made through the panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamChange {
    pub param: ParamId,
    pub previous: f32,
    pub value: f32,
}

impl ParamChange {
    pub fn changed(&self) -> bool {
        self.previous != self.value
    }
}

/// The set of registered controls.
#[derive(Debug, Clone)]
pub struct ControlPanel {
    controls: Vec<Control>,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            controls: vec![
                Control::new(ParamId::Progress, 0.0, 1.0, 0.01),
                Control::new(ParamId::Freq, 0.0, 10.0, 0.01),
                Control::new(ParamId::Amp, 0.0, 1.0, 0.01),
                Control::new(ParamId::FontSize, 0.1, 10.0, 0.01),
                Control::new(ParamId::LineHeight, 0.1, 1.0, 0.01),
                Control::new(ParamId::OffsetY, 0.01, 2.0, 0.01),
                Control::new(ParamId::BloomStrength, 0.0, 2.0, 0.01),
                Control::new(ParamId::BloomRadius, 0.0, 2.0, 0.01),
                Control::new(ParamId::BloomThreshold, 0.0, 2.0, 0.01),
                Control::new(ParamId::NoiseAmount, 0.0, 2.0, 0.01),
                Control::new(ParamId::CamX, -100.0, 100.0, 0.1),
                Control::new(ParamId::CamY, -100.0, 100.0, 0.1),
                Control::new(ParamId::CamZ, -100.0, 100.0, 0.1),
            ],
        }
    }
}

impl ControlPanel {
    pub fn new(controls: Vec<Control>) -> Self {
        Self { controls }
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn control(&self, param: ParamId) -> Option<&Control> {
        self.controls.iter().find(|c| c.param == param)
    }

    /// Set a parameter by name, returning what changed.
    pub fn set(&self, settings: &mut Settings, name: &str, value: f32) -> Result<ParamChange, PanelError> {
        let param =
            ParamId::from_str(name).ok_or_else(|| PanelError::UnknownParameter(name.to_string()))?;
        self.set_param(settings, param, value)
    }

    pub fn set_param(
        &self,
        settings: &mut Settings,
        param: ParamId,
        value: f32,
    ) -> Result<ParamChange, PanelError> {
        let control = self
            .control(param)
            .ok_or(PanelError::NoControl { name: param.name() })?;
        if !value.is_finite() {
            return Err(PanelError::NonFinite {
                name: param.name(),
                value,
            });
        }

        let previous = settings.get(param);
        let value = control.sanitize(value);
        settings.set(param, value);
        Ok(ParamChange {
            param,
            previous,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_every_control_is_a_known_param() {
        let panel = ControlPanel::default();
        for control in panel.controls() {
            assert!(control.min < control.max, "{}", control.name());
            assert!(control.step > 0.0);
        }
        assert_eq!(panel.controls().len(), ParamId::all().len());
    }

    #[test]
    fn test_set_clamps_to_range() {
        let panel = ControlPanel::default();
        let mut settings = Settings::default();
        let change = panel.set(&mut settings, "amp", 4.0).unwrap();
        assert_eq!(change.value, 1.0);
        assert_eq!(settings.amp, 1.0);
        assert_eq!(change.previous, 0.25);

        panel.set(&mut settings, "offsetY", -1.0).unwrap();
        assert_relative_eq!(settings.offset_y, 0.01);
    }

    #[test]
    fn test_set_snaps_to_step() {
        let panel = ControlPanel::default();
        let mut settings = Settings::default();
        panel.set(&mut settings, "freq", 3.14159).unwrap();
        assert_relative_eq!(settings.freq, 3.14, epsilon = 1e-5);
    }

    #[test]
    fn test_on_grid_values_are_unchanged() {
        let panel = ControlPanel::default();
        let mut settings = Settings::default();
        let change = panel.set(&mut settings, "fontSize", 5.8).unwrap();
        assert_eq!(change.value, 5.8);
        assert!(!change.changed());
    }

    #[test]
    fn test_unknown_and_non_finite_values_rejected() {
        let panel = ControlPanel::default();
        let mut settings = Settings::default();
        assert_eq!(
            panel.set(&mut settings, "speed", 1.0),
            Err(PanelError::UnknownParameter("speed".into()))
        );
        assert!(matches!(
            panel.set(&mut settings, "amp", f32::NAN),
            Err(PanelError::NonFinite { .. })
        ));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_missing_control() {
        let panel = ControlPanel::new(vec![Control::new(ParamId::Amp, 0.0, 1.0, 0.1)]);
        let mut settings = Settings::default();
        assert_eq!(
            panel.set(&mut settings, "freq", 1.0),
            Err(PanelError::NoControl { name: "freq" })
        );
    }
}
