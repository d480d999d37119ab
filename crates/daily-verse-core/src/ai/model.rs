/// Gemini models used for explanations, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeminiModel {
    Pro,
    Flash,
}

impl GeminiModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeminiModel::Pro => "gemini-2.5-pro",
            GeminiModel::Flash => "gemini-2.5-flash",
        }
    }

    /// Priority order: primary first, then the fallback.
    pub fn all() -> Vec<GeminiModel> {
        vec![GeminiModel::Pro, GeminiModel::Flash]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_names() {
        let names: Vec<&str> = GeminiModel::all().iter().map(GeminiModel::as_str).collect();
        assert_eq!(names, ["gemini-2.5-pro", "gemini-2.5-flash"]);
    }

    #[test]
    fn test_primary_comes_first() {
        assert_eq!(GeminiModel::all().first(), Some(&GeminiModel::Pro));
    }
}
