//! Weekly plan - exercises per weekday

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::Datelike;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Plan partition key. Ordered Monday first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    #[serde(alias = "segunda")]
    Monday,
    #[serde(alias = "terça", alias = "terca")]
    Tuesday,
    #[serde(alias = "quarta")]
    Wednesday,
    #[serde(alias = "quinta")]
    Thursday,
    #[serde(alias = "sexta")]
    Friday,
    #[serde(alias = "sábado", alias = "sabado")]
    Saturday,
    #[serde(alias = "domingo")]
    Sunday,
}

impl Weekday {
    pub fn all() -> &'static [Weekday] {
        &[
            Weekday::Monday,
            Weekday::Tuesday,
            Weekday::Wednesday,
            Weekday::Thursday,
            Weekday::Friday,
            Weekday::Saturday,
            Weekday::Sunday,
        ]
    }

    /// Key used in documents and URLs
    pub fn key(&self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    pub fn today() -> Self {
        chrono::Local::now().weekday().into()
    }

    pub fn next(&self) -> Self {
        let days = Self::all();
        let idx = days.iter().position(|d| d == self).unwrap_or(0);
        days[(idx + 1) % days.len()]
    }

    pub fn prev(&self) -> Self {
        let days = Self::all();
        let idx = days.iter().position(|d| d == self).unwrap_or(0);
        days[(idx + days.len() - 1) % days.len()]
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownWeekday(pub String);

impl fmt::Display for UnknownWeekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown weekday: {}", self.0)
    }
}

impl std::error::Error for UnknownWeekday {}

impl FromStr for Weekday {
    type Err = UnknownWeekday;

    /// Accepts English and Portuguese names, any case
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let day = match s.trim().to_lowercase().as_str() {
            "monday" | "mon" | "segunda" => Weekday::Monday,
            "tuesday" | "tue" | "terça" | "terca" => Weekday::Tuesday,
            "wednesday" | "wed" | "quarta" => Weekday::Wednesday,
            "thursday" | "thu" | "quinta" => Weekday::Thursday,
            "friday" | "fri" | "sexta" => Weekday::Friday,
            "saturday" | "sat" | "sábado" | "sabado" => Weekday::Saturday,
            "sunday" | "sun" | "domingo" => Weekday::Sunday,
            _ => return Err(UnknownWeekday(s.to_string())),
        };
        Ok(day)
    }
}

/// Planned exercise
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exercise {
    #[serde(rename = "exercicio")]
    pub name: String,
    #[serde(rename = "series")]
    pub sets_reps: String, // free-form, "4x12"
    #[serde(rename = "video", default)]
    pub video_url: String,
}

/// Plan document: weekday -> ordered exercises
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Plan(BTreeMap<Weekday, Vec<Exercise>>);

impl<'de> Deserialize<'de> for Plan {
    /// Keys naming the same day ("segunda" and "monday") are merged in
    /// document order instead of the later one replacing the earlier.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct PlanVisitor;

        impl<'de> Visitor<'de> for PlanVisitor {
            type Value = Plan;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from weekday to exercises")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Plan, A::Error> {
                let mut days: BTreeMap<Weekday, Vec<Exercise>> = BTreeMap::new();
                while let Some((day, exercises)) = map.next_entry::<Weekday, Vec<Exercise>>()? {
                    days.entry(day).or_default().extend(exercises);
                }
                Ok(Plan(days))
            }
        }

        deserializer.deserialize_map(PlanVisitor)
    }
}

impl Default for Plan {
    fn default() -> Self {
        Self(Weekday::all().iter().map(|&d| (d, Vec::new())).collect())
    }
}

impl Plan {
    /// Append an exercise to `day`. Duplicates are allowed.
    pub fn add_exercise(
        &mut self,
        day: Weekday,
        name: &str,
        sets_reps: &str,
        video_url: &str,
    ) -> Result<&Exercise> {
        let name = name.trim();
        let sets_reps = sets_reps.trim();
        if name.is_empty() {
            return Err(Error::Validation { field: "name" });
        }
        if sets_reps.is_empty() {
            return Err(Error::Validation { field: "sets_reps" });
        }

        let exercises = self.0.entry(day).or_default();
        exercises.push(Exercise {
            name: name.to_string(),
            sets_reps: sets_reps.to_string(),
            video_url: video_url.trim().to_string(),
        });
        Ok(&exercises[exercises.len() - 1])
    }

    pub fn list_exercises(&self, day: Weekday) -> &[Exercise] {
        self.0.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn total_exercises(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_all_weekdays_empty() {
        let plan = Plan::default();
        for &day in Weekday::all() {
            assert!(plan.list_exercises(day).is_empty());
        }
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 7);
        assert_eq!(json["monday"], serde_json::json!([]));
    }

    #[test]
    fn test_add_squat_to_monday() {
        let mut plan = Plan::default();
        plan.add_exercise(Weekday::Monday, "Squat", "4x10", "").unwrap();

        let monday = plan.list_exercises(Weekday::Monday);
        assert_eq!(
            monday,
            &[Exercise {
                name: "Squat".into(),
                sets_reps: "4x10".into(),
                video_url: String::new(),
            }]
        );
        for day in Weekday::all().iter().filter(|&&d| d != Weekday::Monday) {
            assert!(plan.list_exercises(*day).is_empty());
        }
    }

    #[test]
    fn test_weekday_isolation() {
        let mut plan = Plan::default();
        plan.add_exercise(Weekday::Friday, "Deadlift", "3x5", "").unwrap();
        let before = plan.clone();

        plan.add_exercise(Weekday::Monday, "Bench", "4x8", "https://youtu.be/x").unwrap();

        for day in Weekday::all().iter().filter(|&&d| d != Weekday::Monday) {
            assert_eq!(plan.list_exercises(*day), before.list_exercises(*day));
        }
    }

    #[test]
    fn test_insertion_order_and_duplicates() {
        let mut plan = Plan::default();
        plan.add_exercise(Weekday::Tuesday, "Row", "4x12", "").unwrap();
        plan.add_exercise(Weekday::Tuesday, "Curl", "3x10", "").unwrap();
        plan.add_exercise(Weekday::Tuesday, "Row", "4x12", "").unwrap();

        let names: Vec<_> = plan
            .list_exercises(Weekday::Tuesday)
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, ["Row", "Curl", "Row"]);
    }

    #[test]
    fn test_missing_fields_rejected_without_mutation() {
        let mut plan = Plan::default();
        let err = plan.add_exercise(Weekday::Monday, "  ", "4x10", "").unwrap_err();
        assert!(matches!(err, Error::Validation { field: "name" }));
        let err = plan.add_exercise(Weekday::Monday, "Squat", "", "").unwrap_err();
        assert!(matches!(err, Error::Validation { field: "sets_reps" }));
        assert_eq!(plan.total_exercises(), 0);
    }

    #[test]
    fn test_document_shape() {
        let mut plan = Plan::default();
        plan.add_exercise(Weekday::Monday, "Squat", "4x10", "https://v").unwrap();
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(
            json["monday"],
            serde_json::json!([{"exercicio": "Squat", "series": "4x10", "video": "https://v"}])
        );
    }

    #[test]
    fn test_portuguese_keys_load() {
        let text = r#"{"segunda": [{"exercicio": "Agachamento", "series": "4x12", "video": ""}],
                       "terça": [], "quarta": [], "quinta": [], "sexta": [], "sábado": [], "domingo": []}"#;
        let plan: Plan = serde_json::from_str(text).unwrap();
        assert_eq!(plan.list_exercises(Weekday::Monday)[0].name, "Agachamento");
        assert!(plan.list_exercises(Weekday::Saturday).is_empty());
    }

    #[test]
    fn test_aliased_keys_are_merged() {
        let text = r#"{"segunda": [{"exercicio": "Agachamento", "series": "4x12", "video": ""}],
                       "monday": [{"exercicio": "Squat", "series": "4x10", "video": ""}]}"#;
        let plan: Plan = serde_json::from_str(text).unwrap();
        let names: Vec<_> = plan
            .list_exercises(Weekday::Monday)
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, ["Agachamento", "Squat"]);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(serde_json::from_str::<Plan>(r#"{"funday": []}"#).is_err());
    }

    #[test]
    fn test_populated_plan_survives_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("treinos.json");
        let mut plan = Plan::default();
        plan.add_exercise(Weekday::Monday, "Squat", "4x10", "https://youtu.be/abc").unwrap();
        plan.add_exercise(Weekday::Monday, "Bench", "3x8", "").unwrap();
        plan.add_exercise(Weekday::Saturday, "Corrida", "30min", "").unwrap();

        crate::store::save(&path, &plan).unwrap();
        assert_eq!(crate::store::load::<Plan>(&path, Plan::default()).unwrap(), plan);
    }

    #[test]
    fn test_partial_document_lists_empty() {
        let plan: Plan = serde_json::from_str(r#"{"monday": []}"#).unwrap();
        assert!(plan.list_exercises(Weekday::Sunday).is_empty());
    }

    #[test]
    fn test_weekday_parse_and_cycle() {
        assert_eq!("Segunda".parse::<Weekday>().unwrap(), Weekday::Monday);
        assert_eq!("SUNDAY".parse::<Weekday>().unwrap(), Weekday::Sunday);
        assert!("funday".parse::<Weekday>().is_err());
        assert_eq!(Weekday::Sunday.next(), Weekday::Monday);
        assert_eq!(Weekday::Monday.prev(), Weekday::Sunday);
    }
}
