use crate::store::DocumentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A persisted student record as read back from the `students` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: DocumentId,
    pub nim: String,
    pub nama: String,
    pub jurusan: String,
    pub angkatan: Option<String>,
    pub email: Option<String>,
    pub telepon: Option<String>,
    pub alamat: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudentRecord {
    /// The writable part of the record.
    pub fn input(&self) -> StudentInput {
        StudentInput {
            nim: self.nim.clone(),
            nama: self.nama.clone(),
            jurusan: self.jurusan.clone(),
            angkatan: self.angkatan.clone(),
            email: self.email.clone(),
            telepon: self.telepon.clone(),
            alamat: self.alamat.clone(),
        }
    }
}

/// Fields supplied when creating a student.
///
/// Optional fields holding an empty string are stored as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentInput {
    pub nim: String,
    pub nama: String,
    pub jurusan: String,
    pub angkatan: Option<String>,
    pub email: Option<String>,
    pub telepon: Option<String>,
    pub alamat: Option<String>,
}

impl StudentInput {
    pub fn new(
        nim: impl Into<String>,
        nama: impl Into<String>,
        jurusan: impl Into<String>,
    ) -> Self {
        Self {
            nim: nim.into(),
            nama: nama.into(),
            jurusan: jurusan.into(),
            ..Default::default()
        }
    }

    pub fn with_angkatan(mut self, angkatan: impl Into<String>) -> Self {
        self.angkatan = Some(angkatan.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_telepon(mut self, telepon: impl Into<String>) -> Self {
        self.telepon = Some(telepon.into());
        self
    }

    pub fn with_alamat(mut self, alamat: impl Into<String>) -> Self {
        self.alamat = Some(alamat.into());
        self
    }
}

/// A partial update: only `Some` fields are merged into the stored document.
///
/// For the optional fields, `Some("")` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentPatch {
    pub nim: Option<String>,
    pub nama: Option<String>,
    pub jurusan: Option<String>,
    pub angkatan: Option<String>,
    pub email: Option<String>,
    pub telepon: Option<String>,
    pub alamat: Option<String>,
}

impl StudentPatch {
    pub fn is_empty(&self) -> bool {
        self.nim.is_none()
            && self.nama.is_none()
            && self.jurusan.is_none()
            && self.angkatan.is_none()
            && self.email.is_none()
            && self.telepon.is_none()
            && self.alamat.is_none()
    }
}

impl From<StudentInput> for StudentPatch {
    fn from(input: StudentInput) -> Self {
        Self {
            nim: Some(input.nim),
            nama: Some(input.nama),
            jurusan: Some(input.jurusan),
            angkatan: Some(input.angkatan.unwrap_or_default()),
            email: Some(input.email.unwrap_or_default()),
            telepon: Some(input.telepon.unwrap_or_default()),
            alamat: Some(input.alamat.unwrap_or_default()),
        }
    }
}

/// Study programs offered by the campus.
///
/// `jurusan` is free text in storage; this list is what clients offer as choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Program {
    TeknikInformatika,
    SistemInformasi,
    TeknikKomputer,
    ManajemenInformatika,
    IlmuKomputer,
    TeknologiInformasi,
}

impl Program {
    pub const ALL: [Program; 6] = [
        Program::TeknikInformatika,
        Program::SistemInformasi,
        Program::TeknikKomputer,
        Program::ManajemenInformatika,
        Program::IlmuKomputer,
        Program::TeknologiInformasi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Program::TeknikInformatika => "Teknik Informatika",
            Program::SistemInformasi => "Sistem Informasi",
            Program::TeknikKomputer => "Teknik Komputer",
            Program::ManajemenInformatika => "Manajemen Informatika",
            Program::IlmuKomputer => "Ilmu Komputer",
            Program::TeknologiInformasi => "Teknologi Informasi",
        }
    }

    pub fn is_known(jurusan: &str) -> bool {
        jurusan.parse::<Program>().is_ok()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Program {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Program::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown program: {}", s))
    }
}

/// Snapshot of the signed-in user, persisted under `user_data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentity {
    pub uid: String,
    pub email: String,
    pub display_name: String,
}

/// The "remember me" pair. Each half can be missing on its own because the
/// two keys are written independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RememberedCredential {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl RememberedCredential {
    /// Both halves, only when both are present.
    pub fn complete(&self) -> Option<(&str, &str)> {
        match (&self.email, &self.password) {
            (Some(email), Some(password)) => Some((email, password)),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none()
    }
}

/// Profile document written to `users/{uid}` after registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub nama: String,
    pub email: String,
    pub role: String,
}

impl UserProfile {
    pub const DEFAULT_ROLE: &'static str = "user";

    pub fn new(nama: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            nama: nama.into(),
            email: email.into(),
            role: Self::DEFAULT_ROLE.to_string(),
        }
    }
}

/// Sign-up form contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    pub nama: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}
