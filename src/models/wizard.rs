use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{Gender, Style};

/// Pages of the recommendation wizard, in order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Intro1,
    Intro2,
    SelectGender,
    SelectStyle,
    SelectTemp,
    Result,
}

impl WizardStep {
    /// The following page, `None` on the last one
    pub fn next(self) -> Option<Self> {
        match self {
            WizardStep::Intro1 => Some(WizardStep::Intro2),
            WizardStep::Intro2 => Some(WizardStep::SelectGender),
            WizardStep::SelectGender => Some(WizardStep::SelectStyle),
            WizardStep::SelectStyle => Some(WizardStep::SelectTemp),
            WizardStep::SelectTemp => Some(WizardStep::Result),
            WizardStep::Result => None,
        }
    }

    /// The preceding page; the first page is its own predecessor
    pub fn prev(self) -> Self {
        match self {
            WizardStep::Intro1 | WizardStep::Intro2 => WizardStep::Intro1,
            WizardStep::SelectGender => WizardStep::Intro2,
            WizardStep::SelectStyle => WizardStep::SelectGender,
            WizardStep::SelectTemp => WizardStep::SelectStyle,
            WizardStep::Result => WizardStep::SelectTemp,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::Intro1 => "intro1",
            WizardStep::Intro2 => "intro2",
            WizardStep::SelectGender => "select_gender",
            WizardStep::SelectStyle => "select_style",
            WizardStep::SelectTemp => "select_temp",
            WizardStep::Result => "result",
        }
    }
}

impl Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Range and starting point of the temperature slider
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TemperatureBounds {
    pub min: i32,
    pub max: i32,
    pub default: i32,
}

impl Default for TemperatureBounds {
    fn default() -> Self {
        Self {
            min: -10,
            max: 35,
            default: 15,
        }
    }
}

impl TemperatureBounds {
    /// Validated constructor: `min <= default <= max`
    pub fn new(min: i32, max: i32, default: i32) -> Result<Self, String> {
        if min > max {
            return Err(format!("temperature minimum {} exceeds maximum {}", min, max));
        }
        if default < min || default > max {
            return Err(format!(
                "default temperature {} is outside [{}, {}]",
                default, min, max
            ));
        }
        Ok(Self { min, max, default })
    }

    pub fn contains(&self, temperature: i32) -> bool {
        self.min <= temperature && temperature <= self.max
    }
}

/// Rejected wizard transitions
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("Cannot {action} on step '{step}'")]
    WrongStep { action: &'static str, step: WizardStep },
    #[error("A gender must be selected first")]
    MissingGender,
    #[error("A style must be selected first")]
    MissingStyle,
    #[error("Style {style} is not offered for gender {gender}")]
    StyleNotOffered { style: Style, gender: Gender },
    #[error("Temperature {value} is outside the range [{min}, {max}]")]
    TemperatureOutOfRange { value: i32, min: i32, max: i32 },
    #[error("The wizard is already on its last step")]
    AtEnd,
}

/// One user's walk through the wizard
///
/// All navigation goes through the transition methods below; each one either
/// applies completely or leaves the session untouched and returns an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WizardSession {
    pub id: Uuid,
    pub step: WizardStep,
    pub gender: Option<Gender>,
    pub style: Option<Style>,
    pub temperature: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    bounds: TemperatureBounds,
}

impl WizardSession {
    /// Creates a session on the first intro page
    pub fn new(bounds: TemperatureBounds) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            step: WizardStep::Intro1,
            gender: None,
            style: None,
            temperature: bounds.default,
            created_at: now,
            updated_at: now,
            bounds,
        }
    }

    pub fn bounds(&self) -> TemperatureBounds {
        self.bounds
    }

    /// Moves to the next page once the current page's selection is made
    pub fn advance(&mut self) -> Result<WizardStep, WizardError> {
        match self.step {
            WizardStep::SelectGender if self.gender.is_none() => {
                return Err(WizardError::MissingGender)
            }
            WizardStep::SelectStyle if self.style.is_none() => {
                return Err(WizardError::MissingStyle)
            }
            _ => {}
        }

        let next = self.step.next().ok_or(WizardError::AtEnd)?;
        self.step = next;
        self.touch();
        Ok(next)
    }

    /// Moves to the previous page, keeping selections
    pub fn back(&mut self) -> WizardStep {
        self.step = self.step.prev();
        self.touch();
        self.step
    }

    /// Back to the first page with all selections cleared
    pub fn reset(&mut self) {
        self.step = WizardStep::Intro1;
        self.gender = None;
        self.style = None;
        self.temperature = self.bounds.default;
        self.touch();
    }

    /// Selects a gender; a previously chosen style the new gender does not offer is dropped
    pub fn select_gender(&mut self, gender: Gender) -> Result<(), WizardError> {
        self.require_step(WizardStep::SelectGender, "select a gender")?;

        self.gender = Some(gender);
        if self.style.is_some_and(|s| !s.is_offered_for(gender)) {
            self.style = None;
        }
        self.touch();
        Ok(())
    }

    pub fn select_style(&mut self, style: Style) -> Result<(), WizardError> {
        self.require_step(WizardStep::SelectStyle, "select a style")?;

        let gender = self.gender.ok_or(WizardError::MissingGender)?;
        if !style.is_offered_for(gender) {
            return Err(WizardError::StyleNotOffered { style, gender });
        }
        self.style = Some(style);
        self.touch();
        Ok(())
    }

    pub fn set_temperature(&mut self, temperature: i32) -> Result<(), WizardError> {
        self.require_step(WizardStep::SelectTemp, "set the temperature")?;

        if !self.bounds.contains(temperature) {
            return Err(WizardError::TemperatureOutOfRange {
                value: temperature,
                min: self.bounds.min,
                max: self.bounds.max,
            });
        }
        self.temperature = temperature;
        self.touch();
        Ok(())
    }

    /// Redirects a session whose page requires selections it does not have.
    ///
    /// Style page without gender goes to the gender page, temperature page
    /// without style goes to the style page, and a result page missing either
    /// selection resets the wizard. Returns whether anything changed.
    pub fn normalize(&mut self) -> bool {
        let before = self.step;
        match self.step {
            WizardStep::SelectStyle if self.gender.is_none() => {
                self.step = WizardStep::SelectGender;
            }
            WizardStep::SelectTemp if self.gender.is_none() => {
                self.step = WizardStep::SelectGender;
            }
            WizardStep::SelectTemp if self.style.is_none() => {
                self.step = WizardStep::SelectStyle;
            }
            WizardStep::Result if self.gender.is_none() || self.style.is_none() => {
                self.reset();
                return true;
            }
            _ => {}
        }

        let changed = before != self.step;
        if changed {
            self.touch();
        }
        changed
    }

    /// The recommendation query, available once the wizard reaches its result page
    pub fn query(&self) -> Option<(Gender, Style, i32)> {
        if self.step != WizardStep::Result {
            return None;
        }
        Some((self.gender?, self.style?, self.temperature))
    }

    fn require_step(&self, expected: WizardStep, action: &'static str) -> Result<(), WizardError> {
        if self.step != expected {
            return Err(WizardError::WrongStep {
                action,
                step: self.step,
            });
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_at(step: WizardStep) -> WizardSession {
        let mut session = WizardSession::new(TemperatureBounds::default());
        session.step = step;
        session
    }

    #[test]
    fn test_new_session_starts_on_intro() {
        let session = WizardSession::new(TemperatureBounds::default());
        assert_eq!(session.step, WizardStep::Intro1);
        assert_eq!(session.gender, None);
        assert_eq!(session.style, None);
        assert_eq!(session.temperature, 15);
        assert_eq!(session.query(), None);
    }

    #[test]
    fn test_full_walk_reaches_result() {
        let mut session = WizardSession::new(TemperatureBounds::default());
        assert_eq!(session.advance(), Ok(WizardStep::Intro2));
        assert_eq!(session.advance(), Ok(WizardStep::SelectGender));
        session.select_gender(Gender::Female).unwrap();
        assert_eq!(session.advance(), Ok(WizardStep::SelectStyle));
        session.select_style(Style::Lovely).unwrap();
        assert_eq!(session.advance(), Ok(WizardStep::SelectTemp));
        session.set_temperature(22).unwrap();
        assert_eq!(session.advance(), Ok(WizardStep::Result));

        assert_eq!(session.query(), Some((Gender::Female, Style::Lovely, 22)));
        assert_eq!(session.advance(), Err(WizardError::AtEnd));
    }

    #[test]
    fn test_advance_requires_selection() {
        let mut session = session_at(WizardStep::SelectGender);
        assert_eq!(session.advance(), Err(WizardError::MissingGender));
        assert_eq!(session.step, WizardStep::SelectGender);

        let mut session = session_at(WizardStep::SelectStyle);
        session.gender = Some(Gender::Male);
        assert_eq!(session.advance(), Err(WizardError::MissingStyle));
    }

    #[test]
    fn test_selection_on_wrong_step_is_rejected() {
        let mut session = session_at(WizardStep::Intro1);
        let err = session.select_gender(Gender::Male).unwrap_err();
        assert_eq!(
            err,
            WizardError::WrongStep {
                action: "select a gender",
                step: WizardStep::Intro1
            }
        );
        assert_eq!(session.gender, None);
    }

    #[test]
    fn test_style_must_be_offered_for_gender() {
        let mut session = session_at(WizardStep::SelectStyle);
        session.gender = Some(Gender::Male);
        assert_eq!(
            session.select_style(Style::Lovely),
            Err(WizardError::StyleNotOffered {
                style: Style::Lovely,
                gender: Gender::Male
            })
        );
        assert!(session.select_style(Style::Minimal).is_ok());
    }

    #[test]
    fn test_changing_gender_drops_unoffered_style() {
        let mut session = session_at(WizardStep::SelectGender);
        session.gender = Some(Gender::Female);
        session.style = Some(Style::Lovely);
        session.select_gender(Gender::Male).unwrap();
        assert_eq!(session.style, None);

        session.style = Some(Style::Casual);
        session.select_gender(Gender::Female).unwrap();
        assert_eq!(session.style, Some(Style::Casual));
    }

    #[test]
    fn test_temperature_bounds_enforced() {
        let mut session = session_at(WizardStep::SelectTemp);
        assert_eq!(
            session.set_temperature(36),
            Err(WizardError::TemperatureOutOfRange {
                value: 36,
                min: -10,
                max: 35
            })
        );
        assert_eq!(session.temperature, 15);
        assert!(session.set_temperature(-10).is_ok());
        assert!(session.set_temperature(35).is_ok());
    }

    #[test]
    fn test_back_keeps_selections() {
        let mut session = session_at(WizardStep::Result);
        session.gender = Some(Gender::Male);
        session.style = Some(Style::Office);
        assert_eq!(session.back(), WizardStep::SelectTemp);
        assert_eq!(session.back(), WizardStep::SelectStyle);
        assert_eq!(session.gender, Some(Gender::Male));
        assert_eq!(session.style, Some(Style::Office));

        let mut first = session_at(WizardStep::Intro1);
        assert_eq!(first.back(), WizardStep::Intro1);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = session_at(WizardStep::Result);
        session.gender = Some(Gender::Male);
        session.style = Some(Style::Office);
        session.temperature = 30;
        session.reset();
        assert_eq!(session.step, WizardStep::Intro1);
        assert_eq!(session.gender, None);
        assert_eq!(session.style, None);
        assert_eq!(session.temperature, 15);
    }

    #[test]
    fn test_normalize_redirects_incomplete_pages() {
        let mut session = session_at(WizardStep::SelectStyle);
        assert!(session.normalize());
        assert_eq!(session.step, WizardStep::SelectGender);

        let mut session = session_at(WizardStep::SelectTemp);
        session.gender = Some(Gender::Female);
        assert!(session.normalize());
        assert_eq!(session.step, WizardStep::SelectStyle);

        let mut session = session_at(WizardStep::Result);
        session.gender = Some(Gender::Female);
        session.temperature = 30;
        assert!(session.normalize());
        assert_eq!(session.step, WizardStep::Intro1);
        assert_eq!(session.temperature, 15);

        let mut session = session_at(WizardStep::Intro2);
        assert!(!session.normalize());
        assert_eq!(session.step, WizardStep::Intro2);
    }

    #[test]
    fn test_bounds_validation() {
        assert!(TemperatureBounds::new(10, 0, 5).is_err());
        assert!(TemperatureBounds::new(0, 10, 11).is_err());
        assert_eq!(
            TemperatureBounds::new(-5, 30, 0),
            Ok(TemperatureBounds {
                min: -5,
                max: 30,
                default: 0
            })
        );
    }

    #[test]
    fn test_step_serialization() {
        assert_eq!(
            serde_json::to_string(&WizardStep::SelectGender).unwrap(),
            "\"select_gender\""
        );
        assert_eq!(WizardStep::SelectTemp.to_string(), "select_temp");
    }
}
