//! Derived candidate fields: contact details, skills and an experience estimate.

use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::models::candidate::DerivedFields;
use crate::scoring::text::estimate_years;

pub const MAX_YEARS_EXPERIENCE: f64 = 30.0;

/// Substring-matched when the profile parser yields no skills.
const FALLBACK_SKILLS: &[&str] = &[
    "python",
    "sql",
    "pytorch",
    "tensorflow",
    "aws",
    "gcp",
    "azure",
    "airflow",
    "spark",
    "kubernetes",
    "docker",
];

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn email_re() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email regex")
    })
}

fn phone_re() -> &'static Regex {
    PHONE_RE.get_or_init(|| Regex::new(r"\+?\d[\d\-() ]{8,}\d").expect("valid phone regex"))
}

/// Name and skills recovered from the CV layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub name: Option<String>,
    pub skills: Vec<String>,
}

/// Optional structured-profile collaborator.
///
/// `Disabled` skips it entirely; `derive_fields` then relies on the regex fallback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProfileParser {
    Disabled,
    #[default]
    Heuristic,
}

impl FromStr for ProfileParser {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disabled" | "off" | "none" => Ok(ProfileParser::Disabled),
            "heuristic" | "on" => Ok(ProfileParser::Heuristic),
            other => Err(format!("unknown profile parser '{other}'")),
        }
    }
}

impl ProfileParser {
    pub fn parse(&self, text: &str) -> Option<Profile> {
        match self {
            ProfileParser::Disabled => None,
            ProfileParser::Heuristic => Some(Profile {
                name: heading_name(text),
                skills: skills_line(text),
            }),
        }
    }
}

/// First non-empty line, if it reads like a 2–4 word personal name.
fn heading_name(text: &str) -> Option<String> {
    let line = text.lines().map(str::trim).find(|l| !l.is_empty())?;
    let words: Vec<&str> = line.split_whitespace().collect();
    if !(2..=4).contains(&words.len()) {
        return None;
    }
    let looks_like_name = words.iter().all(|w| {
        w.chars().next().is_some_and(char::is_uppercase)
            && w
                .chars()
                .all(|c| c.is_alphabetic() || matches!(c, '-' | '\'' | '.'))
    });
    looks_like_name.then(|| words.join(" "))
}

/// Items from a `Skills: a, b; c` line.
fn skills_line(text: &str) -> Vec<String> {
    for line in text.lines() {
        let trimmed = line.trim();
        let Some((label, rest)) = trimmed.split_once(':') else {
            continue;
        };
        if label.trim().eq_ignore_ascii_case("skills") {
            return rest
                .split([',', ';', '|'])
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
        }
    }
    Vec::new()
}

pub fn derive_fields(text: &str, parser: ProfileParser) -> DerivedFields {
    let lower = text.to_lowercase();

    let profile = parser.parse(text);
    if profile.is_none() {
        debug!("Profile parser disabled; using regex fallback for skills");
    }
    let profile = profile.unwrap_or_default();

    let skills = if profile.skills.is_empty() {
        FALLBACK_SKILLS
            .iter()
            .filter(|s| lower.contains(*s))
            .map(|s| s.to_string())
            .collect()
    } else {
        profile.skills
    };

    DerivedFields {
        name: profile.name,
        email: email_re().find(text).map(|m| m.as_str().to_string()),
        phone: phone_re().find(text).map(|m| m.as_str().to_string()),
        skills,
        years_experience: estimate_years(&lower).min(MAX_YEARS_EXPERIENCE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_details() {
        let fields = derive_fields(
            "Reach me: a.b+cv@mail.example.org or +44 (20) 7946-0958",
            ProfileParser::Disabled,
        );
        assert_eq!(fields.email.as_deref(), Some("a.b+cv@mail.example.org"));
        assert_eq!(fields.phone.as_deref(), Some("+44 (20) 7946-0958"));
    }

    #[test]
    fn test_fallback_skills_when_disabled() {
        let fields = derive_fields("Skills: Rust\nUsed Docker and PySpark", ProfileParser::Disabled);
        assert_eq!(fields.name, None);
        // substring match: "pyspark" contains "spark"
        assert_eq!(fields.skills, vec!["spark", "docker"]);
    }

    #[test]
    fn test_profile_skills_take_precedence() {
        let fields = derive_fields("Skills: Rust; Go | Kafka\nDocker", ProfileParser::Heuristic);
        assert_eq!(fields.skills, vec!["rust", "go", "kafka"]);
    }

    #[test]
    fn test_heading_name_rules() {
        assert_eq!(heading_name("\n  Ada Lovelace \nx"), Some("Ada Lovelace".to_string()));
        assert_eq!(heading_name("Jean-Luc O'Neil"), Some("Jean-Luc O'Neil".to_string()));
        assert_eq!(heading_name("Curriculum Vitae of a person here"), None);
        assert_eq!(heading_name("ada lovelace"), None);
        assert_eq!(heading_name("Resume"), None);
        assert_eq!(heading_name("John Smith 2024"), None);
    }

    #[test]
    fn test_years_capped() {
        let text = "2000-2001 ".repeat(40);
        let fields = derive_fields(&text, ProfileParser::Disabled);
        assert_eq!(fields.years_experience, MAX_YEARS_EXPERIENCE);
    }

    #[test]
    fn test_profile_parser_from_str() {
        assert_eq!("Disabled".parse(), Ok(ProfileParser::Disabled));
        assert_eq!(" heuristic ".parse(), Ok(ProfileParser::Heuristic));
        assert!("magic".parse::<ProfileParser>().is_err());
    }
}
