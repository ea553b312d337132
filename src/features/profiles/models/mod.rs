mod profile;

pub use profile::{Profile, SupportedLanguage, UserRole, PROFILE_COLUMNS};
