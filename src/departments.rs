use serde::Serialize;
use std::{fmt, str::FromStr};

/// Every department slug the upstream feed publishes, `live` first.
static SLUGS: [&str; 28] = [
    "live",
    "agency-international-development",
    "agriculture",
    "commerce",
    "defense",
    "education",
    "energy",
    "health-human-services",
    "homeland-security",
    "housing-urban-development",
    "justice",
    "labor",
    "state",
    "transportation",
    "veterans-affairs",
    "interior",
    "treasury",
    "environmental-protection-agency",
    "executive-office-president",
    "general-services-administration",
    "national-aeronautics-space-administration",
    "national-archives-records-administration",
    "national-science-foundation",
    "nuclear-regulatory-commission",
    "office-personnel-management",
    "postal-service",
    "small-business-administration",
    "social-security-administration",
];

/// A validated department slug. Only values from the fixed table can be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Department(&'static str);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown department '{0}'")]
pub struct UnknownDepartment(pub String);

#[derive(Debug, Serialize)]
pub struct DepartmentOption {
    pub label: String,
    pub value: &'static str,
}

impl Department {
    pub const LIVE: Department = Department("live");

    pub fn all() -> impl Iterator<Item = Department> {
        SLUGS.iter().map(|slug| Department(*slug))
    }

    pub fn slug(&self) -> &'static str {
        self.0
    }

    pub fn is_live(&self) -> bool {
        self.0 == Self::LIVE.0
    }

    /// Dropdown label: "health-human-services" -> "Health Human Services", "live" -> "All".
    pub fn label(&self) -> String {
        if self.is_live() {
            return "All".to_string();
        }
        title_case(&self.0.replace('-', " "))
    }

    /// Label used inside card captions, where the aggregate reads "all".
    pub fn card_label(&self) -> String {
        if self.is_live() {
            "all".to_string()
        } else {
            self.label()
        }
    }
}

impl Default for Department {
    fn default() -> Self {
        Self::LIVE
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl FromStr for Department {
    type Err = UnknownDepartment;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(Self::LIVE);
        }
        SLUGS
            .iter()
            .find(|slug| **slug == value)
            .map(|slug| Department(*slug))
            .ok_or_else(|| UnknownDepartment(value.to_string()))
    }
}

pub fn options() -> Vec<DepartmentOption> {
    Department::all()
        .map(|dept| DepartmentOption {
            label: dept.label(),
            value: dept.slug(),
        })
        .collect()
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_starts_with_live_and_has_no_duplicates() {
        let slugs: Vec<_> = Department::all().map(|d| d.slug()).collect();
        assert_eq!(slugs.first(), Some(&"live"));
        let mut sorted = slugs.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), slugs.len());
    }

    #[test]
    fn parses_known_slugs_and_rejects_others() {
        assert_eq!("commerce".parse::<Department>().unwrap().slug(), "commerce");
        assert_eq!("".parse::<Department>().unwrap(), Department::LIVE);
        assert!("Commerce".parse::<Department>().is_err());

        let err = "../commerce".parse::<Department>().unwrap_err();
        assert_eq!(err, UnknownDepartment("../commerce".to_string()));
        assert_eq!(err.to_string(), "unknown department '../commerce'");
    }

    #[test]
    fn labels() {
        let dept: Department = "health-human-services".parse().unwrap();
        assert_eq!(dept.label(), "Health Human Services");
        assert_eq!(dept.card_label(), "Health Human Services");
        assert_eq!(Department::LIVE.label(), "All");
        assert_eq!(Department::LIVE.card_label(), "all");
    }

    #[test]
    fn options_cover_every_slug() {
        let options = options();
        assert_eq!(options.len(), 28);
        assert_eq!(options[0].label, "All");
        assert_eq!(options[0].value, "live");
    }
}
