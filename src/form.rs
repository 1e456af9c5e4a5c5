use crate::config::ElevationRule;
use crate::error::ValidationError;
use crate::types::{Coords, Workout, WorkoutId, WorkoutType};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Raw text of the workout form, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub kind: WorkoutType,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Distance,
    Duration,
    Cadence,
    Elevation,
}

/// CSS `display` of the form element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    #[default]
    Grid,
    None,
}

#[derive(Debug, Clone)]
pub struct FormController {
    input: FormInput,
    visible: bool,
    display: Display,
    pending: Option<Coords>,
    focused: Option<Field>,
    hide_delay: Duration,
    elevation_rule: ElevationRule,
}

/// Number coercion of a text input: surrounding whitespace is ignored and an
/// empty field reads as zero.
fn coerce(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

fn finite(field: &'static str, v: f64) -> Result<f64, ValidationError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(ValidationError::NotANumber { field })
    }
}

fn positive(field: &'static str, v: f64) -> Result<(), ValidationError> {
    if v > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NotPositive { field })
    }
}

impl FormController {
    pub fn new(hide_delay: Duration, elevation_rule: ElevationRule) -> Self {
        Self {
            input: FormInput::default(),
            visible: false,
            display: Display::Grid,
            pending: None,
            focused: None,
            hide_delay,
            elevation_rule,
        }
    }

    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    pub const fn display(&self) -> Display {
        self.display
    }

    pub const fn pending(&self) -> Option<Coords> {
        self.pending
    }

    pub const fn focused(&self) -> Option<Field> {
        self.focused
    }

    pub const fn kind(&self) -> WorkoutType {
        self.input.kind
    }

    pub const fn input(&self) -> &FormInput {
        &self.input
    }

    /// Whether the row of `field` is shown for the current type.
    pub const fn is_field_visible(&self, field: Field) -> bool {
        match field {
            Field::Distance | Field::Duration => true,
            Field::Cadence => matches!(self.input.kind, WorkoutType::Running),
            Field::Elevation => matches!(self.input.kind, WorkoutType::Cycling),
        }
    }

    pub fn show(&mut self, at: Coords) {
        self.pending = Some(at);
        self.visible = true;
        self.focused = Some(Field::Distance);
    }

    /// Clears the numeric fields and hides the form. The caller restores the
    /// display after the returned delay.
    pub fn hide(&mut self) -> Duration {
        self.input.distance.clear();
        self.input.duration.clear();
        self.input.cadence.clear();
        self.input.elevation.clear();
        self.display = Display::None;
        self.visible = false;
        self.pending = None;
        self.focused = None;
        self.hide_delay
    }

    pub fn restore_display(&mut self) {
        self.display = Display::Grid;
    }

    pub fn toggle_fields_for_type(&mut self, kind: WorkoutType) {
        self.input.kind = kind;
    }

    /// Validates `input` and builds a workout at the pending position. On
    /// failure the entered values stay in the form.
    pub fn submit(
        &mut self,
        input: FormInput,
        id: WorkoutId,
        created: DateTime<Utc>,
    ) -> Result<Workout, ValidationError> {
        self.input = input;
        let at = self.pending.ok_or(ValidationError::NoPosition)?;

        let distance = finite("distance", coerce(&self.input.distance))?;
        let duration = finite("duration", coerce(&self.input.duration))?;

        match self.input.kind {
            WorkoutType::Running => {
                let cadence = finite("cadence", coerce(&self.input.cadence))?;
                positive("distance", distance)?;
                positive("duration", duration)?;
                positive("cadence", cadence)?;
                Workout::running(id, created, at, distance, duration, cadence)
            }
            WorkoutType::Cycling => {
                let elevation = finite("elevation", coerce(&self.input.elevation))?;
                positive("distance", distance)?;
                positive("duration", duration)?;
                if self.elevation_rule == ElevationRule::NonNegative && elevation < 0.0 {
                    return Err(ValidationError::Negative { field: "elevation" });
                }
                Workout::cycling(id, created, at, distance, duration, elevation)
            }
        }
    }
}
