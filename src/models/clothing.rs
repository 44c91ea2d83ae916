use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

/// Gender a catalog entry is styled for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String")]
pub enum Gender {
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "M")]
    Male,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Female, Gender::Male];

    /// Single-letter token used in the catalog and on the wire
    pub fn code(&self) -> &'static str {
        match self {
            Gender::Female => "F",
            Gender::Male => "M",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Gender::Female => "Female",
            Gender::Male => "Male",
        }
    }

    /// Label shown by the original Korean front-end
    pub fn label_ko(&self) -> &'static str {
        match self {
            Gender::Female => "여",
            Gender::Male => "남",
        }
    }
}

impl Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Gender {
    type Err = String;

    /// Accepts `F`/`M` (or `FEMALE`/`MALE`) in any case, surrounding whitespace ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "F" | "FEMALE" => Ok(Gender::Female),
            "M" | "MALE" => Ok(Gender::Male),
            other => Err(format!("Unknown gender: {}", other)),
        }
    }
}

impl TryFrom<String> for Gender {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Style category of an outfit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Style {
    Casual,
    Office,
    Street,
    Lovely,
    Minimal,
}

const FEMALE_STYLES: [Style; 4] = [Style::Casual, Style::Office, Style::Street, Style::Lovely];
const MALE_STYLES: [Style; 4] = [Style::Casual, Style::Office, Style::Street, Style::Minimal];

impl Style {
    /// Styles offered for the given gender, in display order
    pub fn offered_for(gender: Gender) -> &'static [Style] {
        match gender {
            Gender::Female => &FEMALE_STYLES,
            Gender::Male => &MALE_STYLES,
        }
    }

    pub fn is_offered_for(&self, gender: Gender) -> bool {
        Self::offered_for(gender).contains(self)
    }

    pub fn code(&self) -> &'static str {
        match self {
            Style::Casual => "CASUAL",
            Style::Office => "OFFICE",
            Style::Street => "STREET",
            Style::Lovely => "LOVELY",
            Style::Minimal => "MINIMAL",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Style::Casual => "Casual",
            Style::Office => "Office",
            Style::Street => "Street",
            Style::Lovely => "Lovely",
            Style::Minimal => "Minimal",
        }
    }

    pub fn label_ko(&self) -> &'static str {
        match self {
            Style::Casual => "캐쥬얼",
            Style::Office => "오피스",
            Style::Street => "스트릿",
            Style::Lovely => "러블리",
            Style::Minimal => "미니멀",
        }
    }
}

impl Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Style {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CASUAL" => Ok(Style::Casual),
            "OFFICE" => Ok(Style::Office),
            "STREET" => Ok(Style::Street),
            "LOVELY" => Ok(Style::Lovely),
            "MINIMAL" => Ok(Style::Minimal),
            other => Err(format!("Unknown style: {}", other)),
        }
    }
}

impl TryFrom<String> for Style {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Inclusive temperature interval, `low <= high` always holds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TempBand {
    pub low: i32,
    pub high: i32,
}

impl TempBand {
    /// Builds a band from two bounds given in either order
    pub fn new(a: i32, b: i32) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    pub fn contains(&self, temperature: i32) -> bool {
        self.low <= temperature && temperature <= self.high
    }
}

/// One catalog entry: an outfit image recommended for a gender, style and temperature band
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClothingRecord {
    pub gender: Gender,
    pub style: Style,
    /// Lowest temperature (inclusive) the outfit is suited for
    pub temp_low: i32,
    /// Highest temperature (inclusive) the outfit is suited for
    pub temp_high: i32,
    /// Image file name, basename only
    pub image_ref: String,
}

impl ClothingRecord {
    pub fn new(gender: Gender, style: Style, band: TempBand, image_ref: impl Into<String>) -> Self {
        Self {
            gender,
            style,
            temp_low: band.low,
            temp_high: band.high,
            image_ref: image_ref.into(),
        }
    }

    pub fn band(&self) -> TempBand {
        TempBand {
            low: self.temp_low,
            high: self.temp_high,
        }
    }

    /// Whether this record answers a (gender, style, temperature) query
    pub fn matches(&self, gender: Gender, style: Style, temperature: i32) -> bool {
        self.gender == gender && self.style == style && self.band().contains(temperature)
    }
}
