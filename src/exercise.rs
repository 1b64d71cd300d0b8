use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{format_human, format_repetitions};

/// One unit of work inside a routine.
///
/// Serialized internally tagged by `__type__`, which keeps routine files
/// readable by hand:
///
/// ```json
/// {"__type__": "DurationExercise", "name": "Plank", "duration": 60}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "__type__")]
pub enum Exercise {
    /// Completed when its countdown reaches zero
    #[serde(rename = "DurationExercise")]
    Timed {
        name: String,
        #[serde(rename = "duration")]
        duration_secs: u64,
    },
    /// Completed by an explicit "finished" signal from the user
    #[serde(rename = "RepetitionExercise")]
    RepCount { name: String, repetitions: u32 },
}

impl Exercise {
    pub fn timed(name: impl Into<String>, duration_secs: u64) -> Self {
        Exercise::Timed {
            name: name.into(),
            duration_secs,
        }
    }

    pub fn reps(name: impl Into<String>, repetitions: u32) -> Self {
        Exercise::RepCount {
            name: name.into(),
            repetitions,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Exercise::Timed { name, .. } | Exercise::RepCount { name, .. } => name,
        }
    }

    pub fn is_timed(&self) -> bool {
        matches!(self, Exercise::Timed { .. })
    }

    /// Target shown next to the name in lists: `1min 30s` or `12 times`
    pub fn target_label(&self) -> String {
        match self {
            Exercise::Timed { duration_secs, .. } => format_human(*duration_secs),
            Exercise::RepCount { repetitions, .. } => format_repetitions(*repetitions),
        }
    }

    /// Checks that hold for every stored exercise
    pub fn validate(&self) -> Result<()> {
        if self.name().trim().is_empty() {
            return Err(Error::EmptyName);
        }
        Ok(())
    }
}

/// A named, ordered list of exercises. Order is execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    pub name: String,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

impl Routine {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::EmptyName);
        }
        Ok(Self {
            name,
            exercises: Vec::new(),
        })
    }

    pub fn with_exercises(name: impl Into<String>, exercises: Vec<Exercise>) -> Result<Self> {
        let mut routine = Self::new(name)?;
        routine.exercises = exercises;
        Ok(routine)
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Sum of timed exercise durations, breaks excluded
    pub fn timed_secs(&self) -> u64 {
        self.exercises
            .iter()
            .map(|e| match e {
                Exercise::Timed { duration_secs, .. } => *duration_secs,
                Exercise::RepCount { .. } => 0,
            })
            .fold(0, u64::saturating_add)
    }

    pub fn add_exercise(&mut self, exercise: Exercise) {
        self.exercises.push(exercise);
    }

    pub fn replace_exercise(&mut self, idx: usize, exercise: Exercise) -> bool {
        match self.exercises.get_mut(idx) {
            Some(slot) => {
                *slot = exercise;
                true
            }
            None => false,
        }
    }

    pub fn remove_exercise(&mut self, idx: usize) -> Option<Exercise> {
        if idx < self.exercises.len() {
            Some(self.exercises.remove(idx))
        } else {
            None
        }
    }

    /// Moves the exercise at `from` so it ends up at `to`. Returns false
    /// when either index is out of range or nothing moves.
    pub fn move_exercise(&mut self, from: usize, to: usize) -> bool {
        let len = self.exercises.len();
        if from >= len || to >= len || from == to {
            return false;
        }
        let exercise = self.exercises.remove(from);
        self.exercises.insert(to, exercise);
        true
    }

    pub fn move_up(&mut self, idx: usize) -> bool {
        idx > 0 && self.move_exercise(idx, idx - 1)
    }

    pub fn move_down(&mut self, idx: usize) -> bool {
        self.move_exercise(idx, idx + 1)
    }

    pub fn move_to_top(&mut self, idx: usize) -> bool {
        self.move_exercise(idx, 0)
    }

    pub fn move_to_bottom(&mut self, idx: usize) -> bool {
        match self.exercises.len() {
            0 => false,
            len => self.move_exercise(idx, len - 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(routine: &Routine) -> Vec<&str> {
        routine.exercises.iter().map(|e| e.name()).collect()
    }

    fn sample() -> Routine {
        Routine::with_exercises(
            "Morning",
            vec![
                Exercise::timed("Plank", 60),
                Exercise::reps("Push-ups", 15),
                Exercise::timed("Wall sit", 45),
                Exercise::reps("Squats", 20),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_exercise_serialization_shape() {
        let json = serde_json::to_value(Exercise::timed("Plank", 60)).unwrap();
        assert_eq!(json["__type__"], "DurationExercise");
        assert_eq!(json["duration"], 60);

        let json = serde_json::to_value(Exercise::reps("Push-ups", 15)).unwrap();
        assert_eq!(json["__type__"], "RepetitionExercise");
        assert_eq!(json["repetitions"], 15);
    }

    #[test]
    fn test_routine_reads_hand_written_file() {
        let raw = r#"{
            "__type__": "Routine",
            "name": "Evening",
            "exercises": [
                {"__type__": "RepetitionExercise", "name": "Jump Rope", "repetitions": 30},
                {"__type__": "DurationExercise", "name": "Stretch", "duration": 120}
            ]
        }"#;
        let routine: Routine = serde_json::from_str(raw).unwrap();
        assert_eq!(routine.name, "Evening");
        assert_eq!(
            routine.exercises,
            vec![Exercise::reps("Jump Rope", 30), Exercise::timed("Stretch", 120)]
        );
    }

    #[test]
    fn test_target_label() {
        assert_eq!(Exercise::timed("Plank", 90).target_label(), "1min 30s");
        assert_eq!(Exercise::reps("Dips", 1).target_label(), "1 time");
    }

    #[test]
    fn test_routine_requires_name() {
        assert!(matches!(Routine::new("  "), Err(Error::EmptyName)));
        assert!(Exercise::timed("", 10).validate().is_err());
    }

    #[test]
    fn test_timed_secs_ignores_rep_exercises() {
        assert_eq!(sample().timed_secs(), 105);
    }

    #[test]
    fn test_timed_secs_saturates() {
        let routine = Routine::with_exercises(
            "Marathon",
            vec![
                Exercise::timed("Forever", u64::MAX),
                Exercise::timed("And more", 10),
            ],
        )
        .unwrap();
        assert_eq!(routine.timed_secs(), u64::MAX);
    }

    #[test]
    fn test_replace_and_remove() {
        let mut routine = sample();
        assert!(routine.replace_exercise(1, Exercise::timed("Burpees", 30)));
        assert_eq!(routine.exercises[1], Exercise::timed("Burpees", 30));
        assert!(!routine.replace_exercise(9, Exercise::reps("x", 1)));

        assert_eq!(routine.remove_exercise(0), Some(Exercise::timed("Plank", 60)));
        assert_eq!(routine.len(), 3);
        assert_eq!(routine.remove_exercise(3), None);
    }

    #[test]
    fn test_reorder_moves() {
        let mut routine = sample();

        assert!(routine.move_down(0));
        assert_eq!(names(&routine), ["Push-ups", "Plank", "Wall sit", "Squats"]);

        assert!(routine.move_to_top(3));
        assert_eq!(names(&routine), ["Squats", "Push-ups", "Plank", "Wall sit"]);

        assert!(routine.move_to_bottom(0));
        assert_eq!(names(&routine), ["Push-ups", "Plank", "Wall sit", "Squats"]);

        assert!(routine.move_up(2));
        assert_eq!(names(&routine), ["Push-ups", "Wall sit", "Plank", "Squats"]);
    }

    #[test]
    fn test_reorder_edges_are_noops() {
        let mut routine = sample();
        let before = routine.clone();

        assert!(!routine.move_up(0));
        assert!(!routine.move_down(3));
        assert!(!routine.move_to_top(0));
        assert!(!routine.move_to_bottom(3));
        assert!(!routine.move_exercise(7, 0));
        assert_eq!(routine, before);

        let mut empty = Routine::new("Empty").unwrap();
        assert!(!empty.move_to_bottom(0));
    }
}
