use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(AnswerValue {
    Yes => "yes",
    No => "no",
});

str_enum!(SessionPhase {
    CollectingSymptoms => "collecting_symptoms",
    EvaluatingInitial => "evaluating_initial",
    AwaitingFollowUp => "awaiting_follow_up",
    EvaluatingRefined => "evaluating_refined",
    ResultsReady => "results_ready",
    NoMatch => "no_match",
});

impl SessionPhase {
    /// Terminal phases render a final outcome; nothing further runs on them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ResultsReady | Self::NoMatch)
    }
}
