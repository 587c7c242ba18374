use super::STUDENTS;
use crate::error::StoreError;
use crate::model::{StudentInput, StudentPatch, StudentRecord};
use crate::store::{Document, FieldValue, Fields};
use chrono::{DateTime, Utc};

pub(super) const NIM: &str = "nim";
pub(super) const NAMA: &str = "nama";
pub(super) const JURUSAN: &str = "jurusan";
pub(super) const ANGKATAN: &str = "angkatan";
pub(super) const EMAIL: &str = "email";
pub(super) const TELEPON: &str = "telepon";
pub(super) const ALAMAT: &str = "alamat";
pub(super) const CREATED_AT: &str = "createdAt";
pub(super) const UPDATED_AT: &str = "updatedAt";

/// Empty optional values are stored as null.
fn optional(value: &Option<String>) -> FieldValue {
    match value.as_deref() {
        None | Some("") => FieldValue::Null,
        Some(v) => FieldValue::from(v),
    }
}

pub(super) fn encode_input(input: &StudentInput) -> Fields {
    Fields::from([
        (NIM.to_string(), FieldValue::from(input.nim.as_str())),
        (NAMA.to_string(), FieldValue::from(input.nama.as_str())),
        (JURUSAN.to_string(), FieldValue::from(input.jurusan.as_str())),
        (ANGKATAN.to_string(), optional(&input.angkatan)),
        (EMAIL.to_string(), optional(&input.email)),
        (TELEPON.to_string(), optional(&input.telepon)),
        (ALAMAT.to_string(), optional(&input.alamat)),
    ])
}

pub(super) fn encode_patch(patch: &StudentPatch) -> Fields {
    let required = [(NIM, &patch.nim), (NAMA, &patch.nama), (JURUSAN, &patch.jurusan)];
    let optionals = [
        (ANGKATAN, &patch.angkatan),
        (EMAIL, &patch.email),
        (TELEPON, &patch.telepon),
        (ALAMAT, &patch.alamat),
    ];

    let mut fields = Fields::new();
    for (name, value) in required {
        if let Some(v) = value {
            fields.insert(name.to_string(), FieldValue::from(v.as_str()));
        }
    }
    for (name, value) in optionals {
        if value.is_some() {
            fields.insert(name.to_string(), optional(value));
        }
    }
    fields
}

pub(super) fn decode(doc: Document) -> Result<StudentRecord, StoreError> {
    let location = format!("{}/{}", STUDENTS, doc.id);

    let required = |name: &str| -> Result<String, StoreError> {
        doc.get_str(name)
            .map(str::to_string)
            .ok_or_else(|| StoreError::corrupt(&location, format!("missing field `{}`", name)))
    };
    let timestamp = |name: &str| -> Result<DateTime<Utc>, StoreError> {
        doc.get_timestamp(name)
            .ok_or_else(|| StoreError::corrupt(&location, format!("missing timestamp `{}`", name)))
    };
    let optional = |name: &str| -> Option<String> {
        doc.get_str(name)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    Ok(StudentRecord {
        nim: required(NIM)?,
        nama: required(NAMA)?,
        jurusan: required(JURUSAN)?,
        angkatan: optional(ANGKATAN),
        email: optional(EMAIL),
        telepon: optional(TELEPON),
        alamat: optional(ALAMAT),
        created_at: timestamp(CREATED_AT)?,
        updated_at: timestamp(UPDATED_AT)?,
        id: doc.id.clone(),
    })
}
