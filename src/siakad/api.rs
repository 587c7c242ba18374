//! # API Facade
//!
//! [`SiakadApi`] is the single entry point for every UI. It is a thin facade:
//! it validates input, dispatches to the directory repository, the session
//! cache and the auth provider, and returns structured types. It prints
//! nothing.
//!
//! ## Generic Over Capabilities
//!
//! `SiakadApi<S, K, A>` owns its three capabilities:
//! - `S: DocumentStore` backs the student directory and user profiles
//! - `K: KeyValueStore` backs the session cache
//! - `A: AuthProvider` issues identities
//!
//! Production wires file-backed stores and [`LocalAuthProvider`]; tests use
//! the in-memory stores and a scripted provider.
//!
//! ## Flows
//!
//! - **Sign-in**: validate, ask the provider, store the identity (display name
//!   defaults to `"User"`), then store the remembered pair when requested.
//!   A provider failure writes nothing.
//! - **Register**: validate, register, set the display name, write the
//!   `users/{uid}` profile, then store the identity. A failed profile write
//!   leaves the session signed out.
//! - **Sign-out**: sign out at the provider, then clear the session cache.
//!   Clearing also forgets the remembered pair.
//!
//! [`LocalAuthProvider`]: crate::auth::LocalAuthProvider

use crate::auth::{AuthError, AuthFlow, AuthProvider};
use crate::directory::users::{save_profile, USERS};
use crate::directory::DirectoryRepository;
use crate::error::{CacheError, Result, SiakadError, StoreError};
use crate::kv::KeyValueStore;
use crate::model::{
    Registration, RememberedCredential, SessionIdentity, StudentInput, StudentPatch,
    StudentRecord, UserProfile,
};
use crate::session::SessionCache;
use crate::store::{DocumentId, DocumentStore};
use crate::validation::{self, Validation};
use tracing::{debug, warn};

pub const DEFAULT_DISPLAY_NAME: &str = "User";

pub struct SiakadApi<S: DocumentStore, K: KeyValueStore, A: AuthProvider> {
    directory: DirectoryRepository<S>,
    session: SessionCache<K>,
    auth: A,
}

fn gate(what: &str, result: Validation) -> Result<()> {
    result.map_err(|e| {
        debug!(field = %e.field(), error = %e, "{} rejected", what);
        SiakadError::from(e)
    })
}

impl<S: DocumentStore, K: KeyValueStore, A: AuthProvider> SiakadApi<S, K, A> {
    pub fn new(store: S, kv: K, auth: A) -> Self {
        Self {
            directory: DirectoryRepository::new(store),
            session: SessionCache::new(kv),
            auth,
        }
    }

    pub fn directory(&self) -> &DirectoryRepository<S> {
        &self.directory
    }

    pub fn session(&self) -> &SessionCache<K> {
        &self.session
    }

    pub fn auth(&self) -> &A {
        &self.auth
    }

    // --- Directory ---

    pub async fn add_student(&self, input: &StudentInput) -> Result<DocumentId> {
        gate("student", validation::validate_student(input))?;
        Ok(self.directory.create(input).await?)
    }

    pub async fn edit_student(&self, id: &DocumentId, patch: &StudentPatch) -> Result<()> {
        gate("student patch", validation::validate_patch(patch))?;
        Ok(self.directory.update(id, patch).await?)
    }

    pub async fn remove_student(&self, id: &DocumentId) -> Result<()> {
        Ok(self.directory.delete(id).await?)
    }

    pub async fn student(&self, id: &DocumentId) -> Result<StudentRecord> {
        Ok(self.directory.get(id).await?)
    }

    pub async fn list_students(&self) -> Result<Vec<StudentRecord>> {
        Ok(self.directory.list_all().await?)
    }

    pub async fn search_students(&self, prefix: &str) -> Result<Vec<StudentRecord>> {
        Ok(self.directory.search_by_name_prefix(prefix).await?)
    }

    /// Resolves a full id or a unique id prefix, the way the CLI accepts ids.
    pub async fn resolve_student(&self, key: &str) -> Result<DocumentId> {
        let key = key.trim();
        if key.is_empty() {
            return Err(SiakadError::Api("Student id is empty".to_string()));
        }
        let records = self.directory.list_all().await?;
        if let Some(exact) = records.iter().find(|r| r.id.as_str() == key) {
            return Ok(exact.id.clone());
        }
        let mut matches = records.into_iter().filter(|r| r.id.as_str().starts_with(key));
        match (matches.next(), matches.next()) {
            (Some(record), None) => Ok(record.id),
            (None, _) => Err(StoreError::not_found(crate::directory::STUDENTS, key).into()),
            (Some(_), Some(_)) => Err(SiakadError::Api(format!(
                "Id prefix `{}` matches more than one student",
                key
            ))),
        }
    }

    // --- Session ---

    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
        remember: bool,
    ) -> Result<SessionIdentity> {
        gate("sign-in", validation::validate_sign_in(email, password))?;

        let user = self
            .auth
            .sign_in(email, password)
            .await
            .map_err(|code| AuthError::new(AuthFlow::SignIn, code))?;

        let identity = SessionIdentity {
            uid: user.uid,
            email: user.email.unwrap_or_else(|| email.to_string()),
            display_name: user
                .display_name
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
        };
        self.session.set_identity(&identity).await?;
        if remember {
            self.session.set_remembered_credential(email, password).await?;
        }
        Ok(identity)
    }

    pub async fn register(&self, registration: &Registration) -> Result<SessionIdentity> {
        gate("registration", validation::validate_registration(registration))?;
        let auth_err = |code| AuthError::new(AuthFlow::Register, code);

        let user = self
            .auth
            .register(&registration.email, &registration.password)
            .await
            .map_err(auth_err)?;
        let user = self
            .auth
            .update_display_name(&user, &registration.nama)
            .await
            .map_err(auth_err)?;

        let profile = UserProfile::new(&registration.nama, &registration.email);
        save_profile(self.directory.store(), &user.uid, &profile)
            .await
            .map_err(|e| {
                warn!(collection = USERS, uid = %user.uid, error = %e, "profile write failed after registration");
                e
            })?;

        let identity = SessionIdentity {
            uid: user.uid,
            email: registration.email.clone(),
            display_name: registration.nama.clone(),
        };
        self.session.set_identity(&identity).await?;
        Ok(identity)
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.auth
            .sign_out()
            .await
            .map_err(|code| AuthError::new(AuthFlow::SignOut, code))?;

        match self.session.get_remembered_credential().await {
            Ok(remembered) if !remembered.is_empty() => {
                warn!("sign-out erases the remembered credential")
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "unreadable session cache, clearing it"),
        }
        self.session.clear_all().await?;
        Ok(())
    }

    /// The cached identity. A value that no longer decodes counts as signed
    /// out.
    pub async fn current_identity(&self) -> Result<Option<SessionIdentity>> {
        match self.session.get_identity().await {
            Ok(identity) => Ok(identity),
            Err(CacheError::Corrupt { key, reason }) => {
                warn!(%key, %reason, "ignoring corrupt session identity");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn remembered_credential(&self) -> Result<RememberedCredential> {
        Ok(self.session.get_remembered_credential().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthErrorCode, ProviderUser};
    use crate::kv::memory::MemoryKeyValueStore;
    use crate::session::USER_DATA_KEY;
    use crate::store::memory::MemoryDocumentStore;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Provider that succeeds with a fixed user unless told to fail.
    #[derive(Default)]
    struct ScriptedAuth {
        failure: Mutex<Option<AuthErrorCode>>,
        display_name: Mutex<Option<String>>,
        sign_outs: Mutex<usize>,
    }

    impl ScriptedAuth {
        fn fail_with(&self, code: &str) {
            *self.failure.lock() = Some(AuthErrorCode::from_code(code));
        }

        fn check(&self) -> std::result::Result<(), AuthErrorCode> {
            match self.failure.lock().clone() {
                Some(code) => Err(code),
                None => Ok(()),
            }
        }

        fn user(&self, email: &str) -> ProviderUser {
            ProviderUser {
                uid: "uid-1".into(),
                email: Some(email.to_string()),
                display_name: self.display_name.lock().clone(),
            }
        }
    }

    #[async_trait]
    impl AuthProvider for ScriptedAuth {
        async fn sign_in(
            &self,
            email: &str,
            _password: &str,
        ) -> std::result::Result<ProviderUser, AuthErrorCode> {
            self.check()?;
            Ok(self.user(email))
        }

        async fn register(
            &self,
            email: &str,
            _password: &str,
        ) -> std::result::Result<ProviderUser, AuthErrorCode> {
            self.check()?;
            Ok(self.user(email))
        }

        async fn update_display_name(
            &self,
            user: &ProviderUser,
            display_name: &str,
        ) -> std::result::Result<ProviderUser, AuthErrorCode> {
            *self.display_name.lock() = Some(display_name.to_string());
            Ok(ProviderUser {
                display_name: Some(display_name.to_string()),
                ..user.clone()
            })
        }

        async fn sign_out(&self) -> std::result::Result<(), AuthErrorCode> {
            *self.sign_outs.lock() += 1;
            Ok(())
        }
    }

    type TestApi = SiakadApi<MemoryDocumentStore, MemoryKeyValueStore, ScriptedAuth>;

    fn api() -> TestApi {
        SiakadApi::new(
            MemoryDocumentStore::new(),
            MemoryKeyValueStore::new(),
            ScriptedAuth::default(),
        )
    }

    fn calls(api: &TestApi) -> usize {
        api.directory().store().call_count()
    }

    #[tokio::test]
    async fn invalid_student_never_reaches_store() {
        let api = api();
        let blank_name = StudentInput::new("2021001", "", "Teknik Informatika");
        let no_program = StudentInput::new("2021001", "Adi", "");

        let err = api.add_student(&blank_name).await.unwrap_err();
        assert_eq!(err.to_string(), "Nama harus diisi");
        let err = api.add_student(&no_program).await.unwrap_err();
        assert_eq!(err.to_string(), "Jurusan harus dipilih");

        let patch = StudentPatch {
            nama: Some(String::new()),
            ..Default::default()
        };
        assert!(api.edit_student(&"any".into(), &patch).await.is_err());
        assert_eq!(calls(&api), 0);
    }

    #[tokio::test]
    async fn add_then_resolve_by_prefix() {
        let api = api();
        let id = api
            .add_student(&StudentInput::new("2021001", "Adi", "Teknik Informatika"))
            .await
            .unwrap();

        assert_eq!(api.resolve_student(&id.as_str()[..6]).await.unwrap(), id);
        assert_eq!(api.resolve_student(id.as_str()).await.unwrap(), id);
        assert!(matches!(
            api.resolve_student("zzzz").await,
            Err(SiakadError::Store(StoreError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn empty_patch_still_bumps_updated_at() {
        let api = api();
        let id = api
            .add_student(&StudentInput::new("2021001", "Adi", "Teknik Informatika"))
            .await
            .unwrap();
        let before = api.student(&id).await.unwrap();

        api.edit_student(&id, &StudentPatch::default()).await.unwrap();

        let after = api.student(&id).await.unwrap();
        assert!(after.updated_at > before.updated_at);
        assert_eq!(after.input(), before.input());
    }

    #[tokio::test]
    async fn blank_jurusan_blocks_update_before_store() {
        let api = api();
        for jurusan in ["", "  "] {
            let patch = StudentPatch {
                jurusan: Some(jurusan.to_string()),
                ..Default::default()
            };
            let err = api.edit_student(&"any".into(), &patch).await.unwrap_err();
            assert_eq!(err.to_string(), "Jurusan harus dipilih");
        }
        assert_eq!(calls(&api), 0);
    }

    #[tokio::test]
    async fn failed_profile_write_leaves_session_signed_out() {
        let api = api();
        api.directory()
            .store()
            .set_failure(Some(StoreError::permission("rules deny write")));
        let registration = Registration {
            nama: "Adi".into(),
            email: "adi@kampus.ac.id".into(),
            password: "rahasia1".into(),
            confirm_password: "rahasia1".into(),
        };

        let err = api.register(&registration).await.unwrap_err();
        assert!(matches!(err, SiakadError::Store(StoreError::Permission { .. })));
        assert_eq!(api.current_identity().await.unwrap(), None);
        assert!(api.session().store().keys().is_empty());
    }

    #[tokio::test]
    async fn sign_in_defaults_display_name_and_skips_remember() {
        let api = api();
        let identity = api.sign_in("adi@kampus.ac.id", "rahasia1", false).await.unwrap();
        assert_eq!(identity.display_name, "User");
        assert_eq!(api.current_identity().await.unwrap(), Some(identity));
        assert!(api.remembered_credential().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sign_in_with_remember_stores_pair() {
        let api = api();
        api.sign_in("adi@kampus.ac.id", "rahasia1", true).await.unwrap();
        let remembered = api.remembered_credential().await.unwrap();
        assert_eq!(remembered.complete(), Some(("adi@kampus.ac.id", "rahasia1")));
    }

    #[tokio::test]
    async fn failed_sign_in_leaves_cache_untouched() {
        let api = api();
        api.auth().fail_with("auth/wrong-password");

        let err = api.sign_in("adi@kampus.ac.id", "rahasia1", true).await.unwrap_err();
        assert_eq!(err.to_string(), "Password salah");
        assert!(api.session().store().keys().is_empty());
    }

    #[tokio::test]
    async fn invalid_sign_in_input_is_local() {
        let api = api();
        let err = api.sign_in("bukan-email", "rahasia1", false).await.unwrap_err();
        assert!(matches!(err, SiakadError::Validation(_)));
    }

    #[tokio::test]
    async fn register_sets_identity_and_profile() {
        let api = api();
        let registration = Registration {
            nama: "Adi Nugroho".into(),
            email: "adi@kampus.ac.id".into(),
            password: "rahasia1".into(),
            confirm_password: "rahasia1".into(),
        };
        let identity = api.register(&registration).await.unwrap();
        assert_eq!(identity.display_name, "Adi Nugroho");
        assert_eq!(api.current_identity().await.unwrap(), Some(identity));

        let profile = crate::directory::users::load_profile(api.directory().store(), "uid-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.role, "user");
        assert_eq!(profile.nama, "Adi Nugroho");
    }

    #[tokio::test]
    async fn register_failure_uses_register_messages() {
        let api = api();
        api.auth().fail_with("email-already-in-use");
        let registration = Registration {
            nama: "Adi".into(),
            email: "adi@kampus.ac.id".into(),
            password: "rahasia1".into(),
            confirm_password: "rahasia1".into(),
        };
        let err = api.register(&registration).await.unwrap_err();
        assert_eq!(err.to_string(), "Email sudah terdaftar");
        assert_eq!(api.current_identity().await.unwrap(), None);
    }

    #[tokio::test]
    async fn sign_out_clears_identity_and_remembered_pair() {
        let api = api();
        api.sign_in("adi@kampus.ac.id", "rahasia1", true).await.unwrap();
        api.sign_out().await.unwrap();

        assert_eq!(*api.auth().sign_outs.lock(), 1);
        assert_eq!(api.current_identity().await.unwrap(), None);
        assert!(api.remembered_credential().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_identity_reads_as_signed_out() {
        let api = api();
        api.session()
            .store()
            .set_item(USER_DATA_KEY, "{broken")
            .await
            .unwrap();
        assert_eq!(api.current_identity().await.unwrap(), None);
    }
}
