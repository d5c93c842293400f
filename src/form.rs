use crate::error::{Field, FieldError, ValidationErrors};
use crate::models::{Candidate, CandidateFields, Status, parse_skills};
use validator::Validate;

/// Editable fields, in the order the form shows them.
pub const FIELDS: [Field; 9] = [
    Field::Name,
    Field::Email,
    Field::Phone,
    Field::Position,
    Field::Status,
    Field::Experience,
    Field::Skills,
    Field::Notes,
    Field::ResumeUrl,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    New,
    Edit(String),
}

/// What a successful submit asks the store to do.
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    Create(CandidateFields),
    Update { id: String, fields: CandidateFields },
}

/// The fields every candidate must carry, trimmed.
#[derive(Debug, Validate)]
struct RequiredFields {
    #[validate(length(min = 1))]
    name: String,
    #[validate(length(min = 1), email)]
    email: String,
    #[validate(length(min = 1))]
    position: String,
}

impl From<&CandidateFields> for RequiredFields {
    fn from(fields: &CandidateFields) -> Self {
        Self {
            name: fields.name.trim().to_string(),
            email: fields.email.trim().to_string(),
            position: fields.position.trim().to_string(),
        }
    }
}

/// Checks the fields every candidate must carry.
pub fn validate(fields: &CandidateFields) -> Result<(), ValidationErrors> {
    let Err(report) = RequiredFields::from(fields).validate() else {
        return Ok(());
    };

    let field_errors = report.field_errors();
    let errors: Vec<FieldError> = [
        (Field::Name, "name"),
        (Field::Email, "email"),
        (Field::Position, "position"),
    ]
    .into_iter()
    .filter_map(|(field, key)| {
        let failed = field_errors.get(key)?;
        if failed.iter().any(|e| e.code == "length") {
            Some(FieldError::Required(field))
        } else {
            Some(FieldError::InvalidEmail(field))
        }
    })
    .collect();

    Err(ValidationErrors(errors))
}

/// Modal create/edit form state.
#[derive(Debug, Clone)]
pub struct CandidateForm {
    pub mode: FormMode,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
    pub status: Status,
    pub experience: String,
    pub skills: String,
    pub notes: String,
    pub resume_url: String,
    pub focus: usize,
    pub errors: ValidationErrors,
}

impl CandidateForm {
    pub fn new() -> Self {
        Self {
            mode: FormMode::New,
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            position: String::new(),
            status: Status::New,
            experience: String::new(),
            skills: String::new(),
            notes: String::new(),
            resume_url: String::new(),
            focus: 0,
            errors: ValidationErrors::default(),
        }
    }

    pub fn edit(candidate: &Candidate) -> Self {
        Self {
            mode: FormMode::Edit(candidate.id.clone()),
            name: candidate.name.clone(),
            email: candidate.email.clone(),
            phone: candidate.phone.clone(),
            position: candidate.position.clone(),
            status: candidate.status,
            experience: candidate.experience.clone(),
            skills: candidate.skills.join(", "),
            notes: candidate.notes.clone(),
            resume_url: candidate.resume_url.clone().unwrap_or_default(),
            focus: 0,
            errors: ValidationErrors::default(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::New => " Add Candidate ",
            FormMode::Edit(_) => " Edit Candidate ",
        }
    }

    pub fn focused(&self) -> Field {
        FIELDS[self.focus]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % FIELDS.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + FIELDS.len() - 1) % FIELDS.len();
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::Position => &self.position,
            Field::Status => self.status.label(),
            Field::Experience => &self.experience,
            Field::Skills => &self.skills,
            Field::Notes => &self.notes,
            Field::ResumeUrl => &self.resume_url,
        }
    }

    fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Name => Some(&mut self.name),
            Field::Email => Some(&mut self.email),
            Field::Phone => Some(&mut self.phone),
            Field::Position => Some(&mut self.position),
            Field::Status => None,
            Field::Experience => Some(&mut self.experience),
            Field::Skills => Some(&mut self.skills),
            Field::Notes => Some(&mut self.notes),
            Field::ResumeUrl => Some(&mut self.resume_url),
        }
    }

    pub fn input(&mut self, ch: char) {
        let field = self.focused();
        if let Some(text) = self.text_mut(field) {
            text.push(ch);
        }
    }

    pub fn backspace(&mut self) {
        let field = self.focused();
        if let Some(text) = self.text_mut(field) {
            text.pop();
        }
    }

    /// Left/right on the status field steps through the six stages.
    pub fn cycle_status(&mut self, forward: bool) {
        if self.focused() == Field::Status {
            self.status = if forward { self.status.next() } else { self.status.prev() };
        }
    }

    pub fn fields(&self) -> CandidateFields {
        let resume_url = self.resume_url.trim();
        CandidateFields {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            position: self.position.trim().to_string(),
            status: self.status,
            experience: self.experience.trim().to_string(),
            skills: parse_skills(&self.skills),
            notes: self.notes.trim().to_string(),
            resume_url: (!resume_url.is_empty()).then(|| resume_url.to_string()),
        }
    }

    /// Validates and produces the event to apply. On failure the errors are
    /// kept on the form for inline display and nothing is emitted.
    pub fn submit(&mut self) -> Option<FormEvent> {
        let fields = self.fields();
        match validate(&fields) {
            Ok(()) => {
                self.errors = ValidationErrors::default();
                Some(match &self.mode {
                    FormMode::New => FormEvent::Create(fields),
                    FormMode::Edit(id) => FormEvent::Update {
                        id: id.clone(),
                        fields,
                    },
                })
            }
            Err(errors) => {
                if let Some(first) = errors.0.first() {
                    if let Some(pos) = FIELDS.iter().position(|f| *f == first.field()) {
                        self.focus = pos;
                    }
                }
                self.errors = errors;
                None
            }
        }
    }
}

impl Default for CandidateForm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::seed_candidates;
    use chrono::Utc;

    fn type_str(form: &mut CandidateForm, s: &str) {
        for ch in s.chars() {
            form.input(ch);
        }
    }

    #[test]
    fn test_empty_form_reports_required_fields() {
        let mut form = CandidateForm::new();
        assert!(form.submit().is_none());
        assert!(form.errors.for_field(Field::Name).is_some());
        assert!(form.errors.for_field(Field::Email).is_some());
        assert!(form.errors.for_field(Field::Position).is_some());
        assert!(form.errors.for_field(Field::Phone).is_none());
        assert_eq!(form.focused(), Field::Name);
        assert_eq!(form.errors.to_string(), "Name is required; Email is required; Position is required");
    }

    #[test]
    fn test_new_form_emits_create() {
        let mut form = CandidateForm::new();
        type_str(&mut form, "  Ada Lovelace ");
        form.focus_next();
        type_str(&mut form, "ada@example.com");
        form.focus_next();
        form.focus_next();
        type_str(&mut form, "Engineer");
        form.focus_next();
        form.cycle_status(true);
        form.focus_next();
        form.focus_next();
        type_str(&mut form, "Rust, SQL,, ");

        match form.submit() {
            Some(FormEvent::Create(fields)) => {
                assert_eq!(fields.name, "Ada Lovelace");
                assert_eq!(fields.status, Status::Screening);
                assert_eq!(fields.skills, vec!["Rust", "SQL"]);
                assert_eq!(fields.resume_url, None);
            }
            other => panic!("expected create, got {:?}", other),
        }
        assert!(form.errors.is_empty());
    }

    #[test]
    fn test_invalid_email_blocks_submit() {
        let mut form = CandidateForm::new();
        form.name = "Ada".to_string();
        form.email = "ada.example.com".to_string();
        form.position = "Engineer".to_string();
        assert!(form.submit().is_none());
        assert_eq!(
            form.errors.for_field(Field::Email),
            Some(&FieldError::InvalidEmail(Field::Email))
        );
        assert_eq!(form.focused(), Field::Email);
    }

    #[test]
    fn test_validate_rejects_malformed_emails() {
        let mut fields = CandidateFields {
            name: "Ada".to_string(),
            position: "Engineer".to_string(),
            ..CandidateFields::default()
        };
        for email in ["ada lovelace@example", "a@ b", "x@.", "<script>@x"] {
            fields.email = email.to_string();
            let errors = validate(&fields).unwrap_err();
            assert_eq!(errors.0, vec![FieldError::InvalidEmail(Field::Email)], "{email}");
        }

        fields.email = "  ada+cv@example.co.uk ".to_string();
        assert!(validate(&fields).is_ok());
    }

    #[test]
    fn test_edit_form_prefills_and_emits_update() {
        let seeds = seed_candidates(Utc::now());
        let mut form = CandidateForm::edit(&seeds[0]);
        assert_eq!(form.value(Field::Skills), "React, Node.js, TypeScript, AWS");
        assert_eq!(form.value(Field::Status), "Interview");

        form.focus_prev();
        type_str(&mut form, "https://cv.example/sarah");

        match form.submit() {
            Some(FormEvent::Update { id, fields }) => {
                assert_eq!(id, "1");
                assert_eq!(fields.resume_url.as_deref(), Some("https://cv.example/sarah"));
                assert_eq!(fields.skills.len(), 4);
            }
            other => panic!("expected update, got {:?}", other),
        }
    }

    #[test]
    fn test_status_field_ignores_typing() {
        let mut form = CandidateForm::new();
        form.focus = FIELDS.iter().position(|f| *f == Field::Status).unwrap();
        form.input('x');
        form.backspace();
        assert_eq!(form.status, Status::New);
        form.cycle_status(false);
        assert_eq!(form.status, Status::Rejected);
    }
}
