//! Field rules that gate every write.
//!
//! All checks are pure and run before any store or auth call is made. A
//! failing check short-circuits the operation.
//!
//! Student fields:
//! - `nim`, `nama`, `jurusan`: required, non-empty after trimming. `nim` is at
//!   most 20 characters.
//! - `angkatan`: optional, 0 to 4 ASCII digits. Callers strip other characters
//!   with [`sanitize_angkatan`] before validating.
//! - `email`: optional, `local@domain.tld`.
//! - `telepon`: optional, at most 15 characters of digits, spaces, `+`, `-`
//!   and parentheses.
//!
//! Auth fields:
//! - sign-in: email and password both required, reported as one message.
//! - registration: every field required, reported as one message.
//! - password: at least 6 characters.
//! - registration: `password == confirm_password`.
//!
//! Messages are in Indonesian, the language of the app's users.

use crate::model::{Registration, StudentInput, StudentPatch};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use thiserror::Error;

pub const NIM_MAX_LEN: usize = 20;
pub const ANGKATAN_MAX_LEN: usize = 4;
pub const TELEPON_MAX_LEN: usize = 15;
pub const PASSWORD_MIN_LEN: usize = 6;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));
static TELEPON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9+\-\s()]*$").expect("phone pattern compiles"));

/// The form field a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Nim,
    Nama,
    Jurusan,
    Angkatan,
    Email,
    Telepon,
    Password,
    ConfirmPassword,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Nim => "NIM",
            Field::Nama => "Nama",
            Field::Jurusan => "Jurusan",
            Field::Angkatan => "Angkatan",
            Field::Email => "Email",
            Field::Telepon => "Telepon",
            Field::Password => "Password",
            Field::ConfirmPassword => "Konfirmasi password",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{}", required_message(.0))]
    Required(Field),

    /// Sign-in form with an empty email or password.
    #[error("Email dan password harus diisi")]
    MissingCredentials(Field),

    /// Registration form with any empty field.
    #[error("Semua field harus diisi")]
    MissingFields(Field),

    #[error("{field} maksimal {max} karakter")]
    TooLong { field: Field, max: usize },

    #[error("Angkatan harus berupa angka (maksimal 4 digit)")]
    InvalidAngkatan,

    #[error("Format email tidak valid")]
    InvalidEmail,

    #[error("Nomor telepon hanya boleh berisi angka, spasi, +, -, dan tanda kurung")]
    InvalidTelepon,

    #[error("Password minimal 6 karakter")]
    PasswordTooShort,

    #[error("Password tidak cocok")]
    PasswordMismatch,
}

fn required_message(field: &Field) -> String {
    match field {
        Field::Jurusan => "Jurusan harus dipilih".to_string(),
        other => format!("{} harus diisi", other),
    }
}

impl ValidationError {
    /// The field that failed.
    pub fn field(&self) -> Field {
        match self {
            ValidationError::Required(field)
            | ValidationError::MissingCredentials(field)
            | ValidationError::MissingFields(field)
            | ValidationError::TooLong { field, .. } => *field,
            ValidationError::InvalidAngkatan => Field::Angkatan,
            ValidationError::InvalidEmail => Field::Email,
            ValidationError::InvalidTelepon => Field::Telepon,
            ValidationError::PasswordTooShort => Field::Password,
            ValidationError::PasswordMismatch => Field::ConfirmPassword,
        }
    }
}

pub type Validation = Result<(), ValidationError>;

fn required(field: Field, value: &str) -> Validation {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(())
}

/// Present means non-empty; `None` and `Some("")` both skip optional rules.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

pub fn validate_nim(nim: &str) -> Validation {
    required(Field::Nim, nim)?;
    if nim.chars().count() > NIM_MAX_LEN {
        return Err(ValidationError::TooLong {
            field: Field::Nim,
            max: NIM_MAX_LEN,
        });
    }
    Ok(())
}

pub fn validate_nama(nama: &str) -> Validation {
    required(Field::Nama, nama)
}

pub fn validate_jurusan(jurusan: &str) -> Validation {
    required(Field::Jurusan, jurusan)
}

pub fn validate_angkatan(angkatan: Option<&str>) -> Validation {
    let Some(angkatan) = present(angkatan) else {
        return Ok(());
    };
    if angkatan.len() > ANGKATAN_MAX_LEN || !angkatan.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidAngkatan);
    }
    Ok(())
}

/// Drops every non-digit and keeps at most four digits, the input step that
/// precedes [`validate_angkatan`].
pub fn sanitize_angkatan(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit())
        .take(ANGKATAN_MAX_LEN)
        .collect()
}

pub fn validate_email(email: Option<&str>) -> Validation {
    match present(email) {
        Some(email) if !is_valid_email(email) => Err(ValidationError::InvalidEmail),
        _ => Ok(()),
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn validate_telepon(telepon: Option<&str>) -> Validation {
    let Some(telepon) = present(telepon) else {
        return Ok(());
    };
    if !TELEPON_RE.is_match(telepon) {
        return Err(ValidationError::InvalidTelepon);
    }
    if telepon.chars().count() > TELEPON_MAX_LEN {
        return Err(ValidationError::TooLong {
            field: Field::Telepon,
            max: TELEPON_MAX_LEN,
        });
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Validation {
    if password.is_empty() {
        return Err(ValidationError::Required(Field::Password));
    }
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// Runs every record rule in form order and reports the first failure.
pub fn validate_student(input: &StudentInput) -> Validation {
    validate_nim(&input.nim)?;
    validate_nama(&input.nama)?;
    validate_jurusan(&input.jurusan)?;
    validate_angkatan(input.angkatan.as_deref())?;
    validate_email(input.email.as_deref())?;
    validate_telepon(input.telepon.as_deref())?;
    Ok(())
}

/// Like [`validate_student`], restricted to the fields the patch supplies.
/// A supplied required field must still be non-empty.
pub fn validate_patch(patch: &StudentPatch) -> Validation {
    if let Some(nim) = &patch.nim {
        validate_nim(nim)?;
    }
    if let Some(nama) = &patch.nama {
        validate_nama(nama)?;
    }
    if let Some(jurusan) = &patch.jurusan {
        validate_jurusan(jurusan)?;
    }
    validate_angkatan(patch.angkatan.as_deref())?;
    validate_email(patch.email.as_deref())?;
    validate_telepon(patch.telepon.as_deref())?;
    Ok(())
}

pub fn validate_sign_in(email: &str, password: &str) -> Validation {
    if email.is_empty() {
        return Err(ValidationError::MissingCredentials(Field::Email));
    }
    if password.is_empty() {
        return Err(ValidationError::MissingCredentials(Field::Password));
    }
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    validate_password(password)
}

pub fn validate_registration(registration: &Registration) -> Validation {
    let fields = [
        (Field::Nama, registration.nama.trim()),
        (Field::Email, registration.email.as_str()),
        (Field::Password, registration.password.as_str()),
        (Field::ConfirmPassword, registration.confirm_password.as_str()),
    ];
    if let Some((field, _)) = fields.iter().find(|(_, value)| value.is_empty()) {
        return Err(ValidationError::MissingFields(*field));
    }
    if !is_valid_email(&registration.email) {
        return Err(ValidationError::InvalidEmail);
    }
    validate_password(&registration.password)?;
    if registration.password != registration.confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}
