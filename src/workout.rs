//! Structured workout routines as produced by the extraction service

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use crate::Result;

/// Where a set/rep/rest value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transparency {
    /// Stated in the video, its transcript or the comments
    Present,
    /// Not found in the source; the value is absent or an estimate
    Missing,
}

impl fmt::Display for Transparency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transparency::Present => f.write_str("present"),
            Transparency::Missing => f.write_str("missing"),
        }
    }
}

/// Only `present` (any case) counts as stated; every other flag the model
/// produced is treated as an estimate
impl<'de> Deserialize<'de> for Transparency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let flag = Value::deserialize(deserializer)?;
        match flag.as_str().map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("present") => Ok(Transparency::Present),
            _ => Ok(Transparency::Missing),
        }
    }
}

/// One exercise in an extracted routine
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "loose_text")]
    pub sets: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub reps: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub rest: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub emoji: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub sets_transparency: Option<Transparency>,
    #[serde(default)]
    pub reps_transparency: Option<Transparency>,
    #[serde(default)]
    pub rest_transparency: Option<Transparency>,
}

impl Exercise {
    /// Provenance of the sets value; a blank or unflagged value is missing
    pub fn sets_source(&self) -> Transparency {
        source_of(&self.sets, self.sets_transparency)
    }

    pub fn reps_source(&self) -> Transparency {
        source_of(&self.reps, self.reps_transparency)
    }

    pub fn rest_source(&self) -> Transparency {
        source_of(&self.rest, self.rest_transparency)
    }

    /// True when any of sets, reps or rest was not taken from the video
    pub fn has_estimates(&self) -> bool {
        [self.sets_source(), self.reps_source(), self.rest_source()]
            .contains(&Transparency::Missing)
    }
}

fn source_of(value: &Option<String>, flag: Option<Transparency>) -> Transparency {
    match (value, flag) {
        (None, _) => Transparency::Missing,
        (Some(_), Some(flag)) => flag,
        (Some(_), None) => Transparency::Missing,
    }
}

/// Typed view of a workout's `workoutData`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlan {
    #[serde(default, deserialize_with = "null_as_default")]
    pub equipment: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub exercises: Vec<Exercise>,
    #[serde(default, deserialize_with = "loose_text")]
    pub workout_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_muscles: Vec<String>,
}

impl WorkoutPlan {
    /// Parse `workoutData`, which the service returns either as an object
    /// or as a JSON-encoded string of one
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::String(raw) if raw.trim().is_empty() => Ok(Self::default()),
            Value::String(raw) => Ok(serde_json::from_str(raw)?),
            other => Ok(Self::deserialize(other)?),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Number of exercises with at least one value not taken from the video
    pub fn estimated_count(&self) -> usize {
        self.exercises.iter().filter(|e| e.has_estimates()).count()
    }
}

/// Treat an explicit `null` the same as an absent key
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept strings or numbers; blank, "null" and "undefined" mean absent
fn loose_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let text = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    };

    let trimmed = text.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("undefined")
    {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "equipment": ["Dumbbells", "Mat"],
            "exercises": [
                {
                    "name": "Goblet Squat",
                    "sets": 3,
                    "reps": "12",
                    "rest": "60s",
                    "emoji": "🏋️",
                    "notes": "Keep the chest up",
                    "difficulty": "Medium",
                    "sets_transparency": "present",
                    "reps_transparency": "present",
                    "rest_transparency": "missing"
                },
                {
                    "name": "Plank",
                    "sets": null,
                    "reps": "undefined",
                    "rest": " "
                }
            ],
            "workoutType": "Strength",
            "targetMuscles": ["Quads", "Core"]
        })
    }

    #[test]
    fn test_parses_object_form() {
        let plan = WorkoutPlan::from_value(&sample()).unwrap();

        assert_eq!(plan.equipment, vec!["Dumbbells", "Mat"]);
        assert_eq!(plan.workout_type.as_deref(), Some("Strength"));
        assert_eq!(plan.target_muscles, vec!["Quads", "Core"]);
        assert_eq!(plan.exercises.len(), 2);

        let squat = &plan.exercises[0];
        assert_eq!(squat.sets.as_deref(), Some("3"));
        assert_eq!(squat.reps.as_deref(), Some("12"));
        assert_eq!(squat.sets_source(), Transparency::Present);
        assert_eq!(squat.rest_source(), Transparency::Missing);
        assert!(squat.has_estimates());
    }

    #[test]
    fn test_null_like_values_are_missing() {
        let plan = WorkoutPlan::from_value(&sample()).unwrap();
        let plank = &plan.exercises[1];

        assert_eq!(plank.sets, None);
        assert_eq!(plank.reps, None);
        assert_eq!(plank.rest, None);
        assert_eq!(plank.reps_source(), Transparency::Missing);
        assert_eq!(plan.estimated_count(), 2);
    }

    #[test]
    fn test_unflagged_values_count_as_estimates() {
        let plan = WorkoutPlan::from_value(&json!({
            "exercises": [{ "name": "Burpee", "sets": "3", "reps": "15" }]
        }))
        .unwrap();

        let burpee = &plan.exercises[0];
        assert_eq!(burpee.sets_source(), Transparency::Missing);
        assert_eq!(burpee.reps_source(), Transparency::Missing);
        assert!(burpee.has_estimates());
    }

    #[test]
    fn test_flags_are_read_leniently() {
        let plan = WorkoutPlan::from_value(&json!({
            "exercises": [{
                "name": null,
                "sets": "4",
                "reps": "8",
                "rest": "90s",
                "sets_transparency": "Present",
                "reps_transparency": "estimated",
                "rest_transparency": 1
            }]
        }))
        .unwrap();

        let exercise = &plan.exercises[0];
        assert_eq!(exercise.name, "");
        assert_eq!(exercise.sets_source(), Transparency::Present);
        assert_eq!(exercise.reps_source(), Transparency::Missing);
        assert_eq!(exercise.rest_source(), Transparency::Missing);
    }

    #[test]
    fn test_parses_string_encoded_form() {
        let encoded = Value::String(sample().to_string());
        let plan = WorkoutPlan::from_value(&encoded).unwrap();
        assert_eq!(plan.exercises[0].name, "Goblet Squat");
    }

    #[test]
    fn test_empty_and_null_data() {
        assert!(WorkoutPlan::from_value(&Value::Null).unwrap().is_empty());
        assert!(WorkoutPlan::from_value(&json!("")).unwrap().is_empty());
        assert!(WorkoutPlan::from_value(&json!({ "exercises": null })).unwrap().is_empty());
        assert!(WorkoutPlan::from_value(&json!("not json")).is_err());
    }
}
