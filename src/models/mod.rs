mod clothing;
mod wizard;

pub use clothing::{ClothingRecord, Gender, Style, TempBand};
pub use wizard::{TemperatureBounds, WizardError, WizardSession, WizardStep};
