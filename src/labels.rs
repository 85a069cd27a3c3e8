//! Fixed display labels for the two supported languages.

use serde::Serialize;

use crate::config::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LabelSet {
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub final_grade: &'static str,
    pub teacher: &'static str,
    pub subject: &'static str,
    pub class: &'static str,
    pub level: &'static str,
}

pub const ENGLISH: LabelSet = LabelSet {
    first_name: "First Name",
    last_name: "Last Name",
    final_grade: "Final Grade",
    teacher: "Teacher",
    subject: "Subject",
    class: "Class",
    level: "Level",
};

pub const SPANISH: LabelSet = LabelSet {
    first_name: "Nombre",
    last_name: "Apellidos",
    final_grade: "Nota Final",
    teacher: "Profesor",
    subject: "Asignatura",
    class: "Clase",
    level: "Nivel",
};

/// All label sets, used where a header must be recognized in any language.
pub const ALL: [&LabelSet; 2] = [&ENGLISH, &SPANISH];

impl LabelSet {
    pub fn for_language(language: Language) -> &'static LabelSet {
        match language {
            Language::En => &ENGLISH,
            Language::Es => &SPANISH,
        }
    }
}
