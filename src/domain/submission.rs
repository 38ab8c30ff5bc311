use std::fmt;

/// The three fields of the contact form as typed by the visitor.
#[derive(serde::Deserialize, serde::Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SubmissionDraft {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl SubmissionDraft {
    pub fn is_blank(&self) -> bool {
        self.name.is_empty() && self.email.is_empty() && self.message.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Message => "message",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("{0} must not be empty")]
    EmptyField(Field),
}

fn required(value: &str, field: Field) -> Result<String, SubmissionError> {
    if value.trim().is_empty() {
        return Err(SubmissionError::EmptyField(field));
    }
    Ok(value.to_owned())
}

macro_rules! required_field {
    ($name:ident, $field:expr) => {
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $name(String);

        impl $name {
            pub fn parse(value: &str) -> Result<Self, SubmissionError> {
                required(value, $field).map(Self)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

required_field!(ContactName, Field::Name);
// Presence only; the address is never checked against RFC 5322.
required_field!(ContactEmail, Field::Email);
required_field!(ContactMessage, Field::Message);

/// A submission whose three fields are known to be non-empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    pub name: ContactName,
    pub email: ContactEmail,
    pub message: ContactMessage,
}

impl Submission {
    pub fn parse(draft: &SubmissionDraft) -> Result<Self, SubmissionError> {
        Ok(Self {
            name: ContactName::parse(&draft.name)?,
            email: ContactEmail::parse(&draft.email)?,
            message: ContactMessage::parse(&draft.message)?,
        })
    }
}

impl TryFrom<SubmissionDraft> for Submission {
    type Error = SubmissionError;

    fn try_from(value: SubmissionDraft) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}
