//! Backup and recovery tests
//!
//! End-to-end tests for `BackupService`: backing up the running profile,
//! recovering archives into new profile directories, and the registry
//! changes each kind of recovery makes.

use ferry_core::archive::{read_archive, ArchiveError};
use ferry_core::backup::{DeleteRecord, KeepRecord, ProfileRetirement, RecoveryError};
use ferry_core::host::HostSession;
use ferry_core::profile::{Avatar, Profile, Theme};
use ferry_core::provider::{
    staged_path, DirectoryProvider, Payload, ProfileDataProvider, ProviderError, ResourceKind,
};
use ferry_core::{BackupService, Database, FerryConfig, ProfileStore, RecoverOptions};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;
use uuid::Uuid;

/// Records session signals instead of acting on them
#[derive(Default)]
struct RecordingHost {
    events: Mutex<Vec<(&'static str, PathBuf)>>,
}

impl RecordingHost {
    fn events(&self) -> Vec<(&'static str, PathBuf)> {
        self.events.lock().unwrap().clone()
    }
}

impl HostSession for RecordingHost {
    fn quit_and_replace(&self, new_profile_dir: &Path) {
        self.events
            .lock()
            .unwrap()
            .push(("quit_and_replace", new_profile_dir.to_path_buf()));
    }

    fn launch(&self, profile_dir: &Path) {
        self.events
            .lock()
            .unwrap()
            .push(("launch", profile_dir.to_path_buf()));
    }
}

/// Imports one file, then fails
struct FailingImport;

impl ProfileDataProvider for FailingImport {
    fn export(&self, staging_dir: &Path) -> Result<Payload, ProviderError> {
        Ok(Payload::new(staging_dir.to_path_buf()))
    }

    fn import(&self, _payload: &Payload, target_dir: &Path) -> Result<(), ProviderError> {
        fs::write(target_dir.join("prefs.js"), "partial")?;
        Err(ProviderError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk full",
        )))
    }
}

/// Stages into a directory it owns and removes the one it was given
struct ExternalStaging {
    dir: TempDir,
}

impl ProfileDataProvider for ExternalStaging {
    fn export(&self, staging_dir: &Path) -> Result<Payload, ProviderError> {
        fs::remove_dir(staging_dir)?;
        let mut payload = Payload::new(self.dir.path().to_path_buf());
        let prefs = staged_path(self.dir.path(), ResourceKind::Preferences, Path::new("prefs.js"));
        fs::create_dir_all(prefs.parent().unwrap())?;
        fs::write(&prefs, "user_pref(\"a\", 1);\n")?;
        payload.add_file(ResourceKind::Preferences, Path::new("prefs.js"))?;
        Ok(payload)
    }

    fn import(&self, _payload: &Payload, _target_dir: &Path) -> Result<(), ProviderError> {
        Ok(())
    }
}

struct Site {
    _temp: TempDir,
    current_dir: PathBuf,
    backups_dir: PathBuf,
    recovery_dir: PathBuf,
    profile_root: PathBuf,
}

impl Site {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        // Recovered paths come back canonical
        let base = temp.path().canonicalize().unwrap();
        let current_dir = base.join("profiles").join("x1y2z3w4.default");
        fs::create_dir_all(current_dir.join("cache2")).unwrap();
        fs::create_dir_all(current_dir.join("bookmarkbackups")).unwrap();
        fs::write(current_dir.join("prefs.js"), "user_pref(\"browser.startup.page\", 3);\n").unwrap();
        fs::write(current_dir.join("places.sqlite"), "history").unwrap();
        fs::write(current_dir.join("places.sqlite-wal"), "wal").unwrap();
        fs::write(current_dir.join("bookmarkbackups").join("b.jsonlz4"), "bookmarks").unwrap();
        fs::write(current_dir.join("cache2").join("entry"), "cached").unwrap();
        fs::write(current_dir.join("parent.lock"), "").unwrap();

        Self {
            backups_dir: base.join("backups"),
            recovery_dir: base.join("recovery"),
            profile_root: base.join("recovered"),
            current_dir,
            _temp: temp,
        }
    }

    fn service<'a>(&self, db: &'a Database) -> BackupService<'a> {
        BackupService::new(
            db,
            DirectoryProvider::new(self.current_dir.clone()),
            self.current_dir.clone(),
            FerryConfig::default(),
        )
    }

    fn options(&self) -> RecoverOptions {
        RecoverOptions::new(self.recovery_dir.clone(), self.profile_root.clone())
    }

    fn register_current(&self, db: &Database, name: &str, avatar: Avatar, theme: &Theme) -> Uuid {
        ProfileStore::new(db.connection())
            .insert(&self.current_dir, name, avatar, theme)
            .unwrap()
    }

    fn recovered_dirs(&self) -> Vec<PathBuf> {
        match fs::read_dir(&self.profile_root) {
            Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
            Err(_) => Vec::new(),
        }
    }
}

fn custom_theme() -> Theme {
    Theme::new("#ff5500", "#ffffff").unwrap()
}

fn profile_by_path(db: &Database, path: &Path) -> Option<Profile> {
    ProfileStore::new(db.connection()).get_by_path(path).unwrap()
}

// =============================================================================
// Backup Tests
// =============================================================================

#[test]
fn test_backup_of_selectable_profile_embeds_metadata() {
    let site = Site::new();
    let db = Database::in_memory().unwrap();
    site.register_current(&db, "Work", Avatar::Briefcase, &custom_theme());

    let archive = site.service(&db).create_backup(&site.backups_dir, None).unwrap();

    let name = archive.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("ProfileBackup_Work_"), "{name}");
    assert!(name.ends_with(".zip"));

    let reader = read_archive(&archive).unwrap();
    let metadata = reader.source().metadata().expect("selectable archive");
    assert_eq!(metadata.name, "Work");
    assert_eq!(metadata.avatar, Avatar::Briefcase);
    assert_eq!(metadata.theme, custom_theme());
}

#[test]
fn test_backup_skips_caches_and_session_files() {
    let site = Site::new();
    let db = Database::in_memory().unwrap();

    let archive = site.service(&db).create_backup(&site.backups_dir, None).unwrap();
    let reader = read_archive(&archive).unwrap();
    let paths: Vec<&str> = reader
        .manifest()
        .entries
        .iter()
        .map(|e| e.path.as_str())
        .collect();

    assert!(paths.contains(&"prefs.js"));
    assert!(paths.contains(&"places.sqlite"));
    assert!(paths.contains(&"bookmarkbackups/b.jsonlz4"));
    assert!(!paths.iter().any(|p| p.starts_with("cache2")));
    assert!(!paths.contains(&"parent.lock"));
    assert!(!paths.contains(&"places.sqlite-wal"));
}

#[test]
fn test_backup_of_legacy_profile() {
    let site = Site::new();
    let db = Database::in_memory().unwrap();

    let archive = site.service(&db).create_backup(&site.backups_dir, None).unwrap();

    let name = archive.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("ProfileBackup_default_"), "{name}");
    assert!(!read_archive(&archive).unwrap().source().is_selectable());
}

#[test]
fn test_backup_leaves_only_the_archive() {
    let site = Site::new();
    let db = Database::in_memory().unwrap();

    let archive = site.service(&db).create_backup(&site.backups_dir, None).unwrap();

    let entries: Vec<_> = fs::read_dir(&site.backups_dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries, vec![archive]);
}

#[test]
fn test_backup_survives_failed_staging_cleanup() {
    let site = Site::new();
    let db = Database::in_memory().unwrap();
    let service = BackupService::new(
        &db,
        ExternalStaging {
            dir: TempDir::new().unwrap(),
        },
        site.current_dir.clone(),
        FerryConfig::default(),
    );

    let archive = service.create_backup(&site.backups_dir, None).unwrap();

    let reader = read_archive(&archive).unwrap();
    assert_eq!(reader.manifest().entries.len(), 1);
    assert_eq!(reader.manifest().entries[0].path, "prefs.js");
}

#[test]
fn test_backup_with_selectable_profiles_disabled_is_legacy() {
    let site = Site::new();
    let db = Database::in_memory().unwrap();
    site.register_current(&db, "Work", Avatar::Briefcase, &custom_theme());

    let config = FerryConfig {
        selectable_profiles_enabled: false,
        ..FerryConfig::default()
    };
    let service = BackupService::new(
        &db,
        DirectoryProvider::new(site.current_dir.clone()),
        site.current_dir.clone(),
        config,
    );
    let archive = service.create_backup(&site.backups_dir, None).unwrap();

    assert!(!read_archive(&archive).unwrap().source().is_selectable());
}

// =============================================================================
// Recovery From Selectable Archives
// =============================================================================

#[test]
fn test_recover_selectable_without_replace() {
    let site = Site::new();
    let db = Database::in_memory().unwrap();
    let current_id = site.register_current(&db, "Work", Avatar::Briefcase, &custom_theme());
    let host = RecordingHost::default();
    let service = site.service(&db).with_host(&host);

    let archive = service.create_backup(&site.backups_dir, None).unwrap();
    let recovered = service
        .recover_from_backup_archive(&archive, &site.options())
        .unwrap();

    assert_eq!(site.recovered_dirs(), vec![recovered.clone()]);
    assert_eq!(
        fs::read_to_string(recovered.join("prefs.js")).unwrap(),
        "user_pref(\"browser.startup.page\", 3);\n"
    );
    assert_eq!(
        fs::read_to_string(recovered.join("bookmarkbackups").join("b.jsonlz4")).unwrap(),
        "bookmarks"
    );
    assert!(!recovered.join("cache2").exists());

    let record = profile_by_path(&db, &recovered).expect("new record");
    assert_eq!(record.name, "Work");
    assert_eq!(record.avatar, Avatar::Briefcase);
    assert_eq!(record.theme, custom_theme());
    assert_ne!(record.id, current_id);

    let store = ProfileStore::new(db.connection());
    assert!(store.get(current_id).unwrap().is_some());
    assert_eq!(store.list_all().unwrap().len(), 2);
    assert!(host.events().is_empty());
}

#[test]
fn test_recover_launches_browser_when_asked() {
    let site = Site::new();
    let db = Database::in_memory().unwrap();
    site.register_current(&db, "Work", Avatar::Briefcase, &custom_theme());
    let host = RecordingHost::default();
    let service = site.service(&db).with_host(&host);

    let archive = service.create_backup(&site.backups_dir, None).unwrap();
    let recovered = service
        .recover_from_backup_archive(&archive, &site.options().launch_browser(true))
        .unwrap();

    assert_eq!(host.events(), vec![("launch", recovered)]);
}

#[test]
fn test_recover_selectable_with_replace() {
    let site = Site::new();
    let db = Database::in_memory().unwrap();
    let current_id = site.register_current(&db, "Work", Avatar::Briefcase, &custom_theme());
    let host = RecordingHost::default();
    let service = site.service(&db).with_host(&host);

    let archive = service.create_backup(&site.backups_dir, None).unwrap();
    let recovered = service
        .recover_from_backup_archive(
            &archive,
            &site
                .options()
                .replace_current_profile(true)
                .launch_browser(true),
        )
        .unwrap();

    let store = ProfileStore::new(db.connection());
    assert!(store.get(current_id).unwrap().is_none());
    let profiles = store.list_all().unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].name, "Work");
    assert_eq!(profiles[0].path, recovered);

    // Replacing never also launches
    assert_eq!(host.events(), vec![("quit_and_replace", recovered)]);
}

#[test]
fn test_recover_selectable_into_legacy_site() {
    let site = Site::new();
    let source_db = Database::in_memory().unwrap();
    site.register_current(&source_db, "Work", Avatar::Heart, &custom_theme());
    let archive = site
        .service(&source_db)
        .create_backup(&site.backups_dir, None)
        .unwrap();

    let db = Database::in_memory().unwrap();
    let recovered = site
        .service(&db)
        .recover_from_backup_archive(&archive, &site.options().replace_current_profile(true))
        .unwrap();

    let record = profile_by_path(&db, &recovered).expect("selectable archives always register");
    assert_eq!(record.name, "Work");
    assert_eq!(record.avatar, Avatar::Heart);
}

// =============================================================================
// Recovery From Legacy Archives
// =============================================================================

#[test]
fn test_recover_legacy_without_replace_uses_defaults() {
    let site = Site::new();
    let db = Database::in_memory().unwrap();
    let archive = site.service(&db).create_backup(&site.backups_dir, None).unwrap();

    let current_id = site.register_current(&db, "Mine", Avatar::Flower, &custom_theme());
    let recovered = site
        .service(&db)
        .recover_from_backup_archive(&archive, &site.options())
        .unwrap();

    let defaults = FerryConfig::default().default_profile.metadata();
    let record = profile_by_path(&db, &recovered).expect("new record");
    assert_eq!(record.metadata(), defaults);

    let store = ProfileStore::new(db.connection());
    assert!(store.get(current_id).unwrap().is_some());
}

#[test]
fn test_recover_legacy_with_replace_inherits_current_metadata() {
    let site = Site::new();
    let db = Database::in_memory().unwrap();
    let archive = site.service(&db).create_backup(&site.backups_dir, None).unwrap();

    let current_id =
        site.register_current(&db, "My Custom Profile", Avatar::Book, &custom_theme());
    let host = RecordingHost::default();
    let recovered = site
        .service(&db)
        .with_host(&host)
        .recover_from_backup_archive(&archive, &site.options().replace_current_profile(true))
        .unwrap();

    let store = ProfileStore::new(db.connection());
    assert!(store.get(current_id).unwrap().is_none());

    let record = profile_by_path(&db, &recovered).expect("new record");
    assert_eq!(record.name, "My Custom Profile");
    assert_eq!(record.avatar, Avatar::Book);
    assert_eq!(record.theme.background, "#ff5500");
    assert_eq!(record.theme.foreground, "#ffffff");
    assert_ne!(record.id, current_id);

    assert_eq!(host.events(), vec![("quit_and_replace", recovered)]);
}

#[test]
fn test_recover_legacy_into_legacy_site_creates_no_record() {
    let site = Site::new();
    let db = Database::in_memory().unwrap();
    let service = site.service(&db);

    let archive = service.create_backup(&site.backups_dir, None).unwrap();
    let recovered = service
        .recover_from_backup_archive(&archive, &site.options().replace_current_profile(true))
        .unwrap();

    assert!(recovered.join("prefs.js").exists());
    assert!(ProfileStore::new(db.connection())
        .list_all()
        .unwrap()
        .is_empty());
}

#[test]
fn test_recover_uses_configured_defaults() {
    let site = Site::new();
    let db = Database::in_memory().unwrap();
    let archive = site.service(&db).create_backup(&site.backups_dir, None).unwrap();
    site.register_current(&db, "Mine", Avatar::Flower, &custom_theme());

    let mut config = FerryConfig::default();
    config.default_profile.name = "Restored".to_string();
    config.default_profile.avatar = Avatar::Shopping;
    let service = BackupService::new(
        &db,
        DirectoryProvider::new(site.current_dir.clone()),
        site.current_dir.clone(),
        config,
    );
    let recovered = service
        .recover_from_backup_archive(&archive, &site.options())
        .unwrap();

    let record = profile_by_path(&db, &recovered).unwrap();
    assert_eq!(record.name, "Restored");
    assert_eq!(record.avatar, Avatar::Shopping);
}

// =============================================================================
// Retirement Strategies
// =============================================================================

#[test]
fn test_keep_record_leaves_current_profile() {
    let site = Site::new();
    let db = Database::in_memory().unwrap();
    let current_id = site.register_current(&db, "Work", Avatar::Star, &custom_theme());
    let service = site.service(&db).with_retirement(KeepRecord);

    let archive = service.create_backup(&site.backups_dir, None).unwrap();
    service
        .recover_from_backup_archive(&archive, &site.options().replace_current_profile(true))
        .unwrap();

    let store = ProfileStore::new(db.connection());
    assert!(store.get(current_id).unwrap().is_some());
    assert_eq!(store.list_all().unwrap().len(), 2);
}

#[test]
fn test_delete_record_tolerates_missing_record() {
    let db = Database::in_memory().unwrap();
    let store = ProfileStore::new(db.connection());
    let id = store
        .insert(Path::new("/profiles/gone"), "Gone", Avatar::Star, &Theme::default())
        .unwrap();
    let profile = store.get(id).unwrap().unwrap();
    store.delete(id).unwrap();

    DeleteRecord.retire(&store, &profile).unwrap();
}

// =============================================================================
// Failure Handling
// =============================================================================

#[test]
fn test_corrupt_archive_changes_nothing() {
    let site = Site::new();
    let db = Database::in_memory().unwrap();
    site.register_current(&db, "Work", Avatar::Star, &custom_theme());
    let host = RecordingHost::default();
    let service = site.service(&db).with_host(&host);

    fs::create_dir_all(&site.backups_dir).unwrap();
    let archive = site.backups_dir.join("broken.zip");
    fs::write(&archive, "not an archive").unwrap();

    let err = service
        .recover_from_backup_archive(&archive, &site.options().replace_current_profile(true))
        .unwrap_err();

    assert!(matches!(err, RecoveryError::Archive(ArchiveError::Corrupt(_))));
    assert!(site.recovered_dirs().is_empty());
    assert_eq!(
        ProfileStore::new(db.connection()).list_all().unwrap().len(),
        1
    );
    assert!(host.events().is_empty());
}

#[test]
fn test_failed_import_removes_partial_profile() {
    let site = Site::new();
    let db = Database::in_memory().unwrap();
    let current_id = site.register_current(&db, "Work", Avatar::Star, &custom_theme());
    let archive = site.service(&db).create_backup(&site.backups_dir, None).unwrap();

    let host = RecordingHost::default();
    let service = BackupService::new(
        &db,
        FailingImport,
        site.current_dir.clone(),
        FerryConfig::default(),
    )
    .with_host(&host);
    let err = service
        .recover_from_backup_archive(&archive, &site.options().replace_current_profile(true))
        .unwrap_err();

    assert!(matches!(err, RecoveryError::Provider(_)));
    assert!(site.recovered_dirs().is_empty());

    let store = ProfileStore::new(db.connection());
    assert!(store.get(current_id).unwrap().is_some());
    assert_eq!(store.list_all().unwrap().len(), 1);
    assert!(host.events().is_empty());
}

#[test]
fn test_encrypted_recovery() {
    let site = Site::new();
    let db = Database::in_memory().unwrap();
    site.register_current(&db, "Work", Avatar::Star, &custom_theme());
    let service = site.service(&db);

    let archive = service
        .create_backup(&site.backups_dir, Some("correct horse"))
        .unwrap();

    let err = service
        .recover_from_backup_archive(&archive, &site.options())
        .unwrap_err();
    assert!(matches!(
        err,
        RecoveryError::Archive(ArchiveError::PasswordRequired)
    ));
    assert!(site.recovered_dirs().is_empty());

    let recovered = service
        .recover_from_backup_archive(&archive, &site.options().with_password("correct horse"))
        .unwrap();
    assert_eq!(
        fs::read_to_string(recovered.join("places.sqlite")).unwrap(),
        "history"
    );
}

#[test]
fn test_recovery_dir_is_cleaned_up() {
    let site = Site::new();
    let db = Database::in_memory().unwrap();
    let service = site.service(&db);

    let archive = service.create_backup(&site.backups_dir, None).unwrap();
    service
        .recover_from_backup_archive(&archive, &site.options())
        .unwrap();

    assert_eq!(fs::read_dir(&site.recovery_dir).unwrap().count(), 0);
}

#[test]
fn test_second_recovery_into_same_root_is_rejected() {
    let site = Site::new();
    let db = Database::in_memory().unwrap();
    site.register_current(&db, "Work", Avatar::Star, &custom_theme());
    let host = RecordingHost::default();
    let service = site.service(&db).with_host(&host);

    let archive = service.create_backup(&site.backups_dir, None).unwrap();
    let first = service
        .recover_from_backup_archive(&archive, &site.options())
        .unwrap();
    let err = service
        .recover_from_backup_archive(&archive, &site.options().launch_browser(true))
        .unwrap_err();

    assert!(matches!(err, RecoveryError::TargetExists(ref root) if *root == site.profile_root));
    assert_eq!(site.recovered_dirs(), vec![first]);
    assert_eq!(
        ProfileStore::new(db.connection()).list_all().unwrap().len(),
        2
    );
    assert!(host.events().is_empty());
}

#[test]
fn test_recovery_into_root_with_existing_profile_is_rejected() {
    let site = Site::new();
    let db = Database::in_memory().unwrap();
    let current_id = site.register_current(&db, "Work", Avatar::Star, &custom_theme());
    let host = RecordingHost::default();
    let service = site.service(&db).with_host(&host);
    let archive = service.create_backup(&site.backups_dir, None).unwrap();

    let existing = site.profile_root.join("existing.default");
    fs::create_dir_all(&existing).unwrap();
    fs::write(existing.join("prefs.js"), "user_pref(\"keep\", true);\n").unwrap();

    let err = service
        .recover_from_backup_archive(&archive, &site.options().replace_current_profile(true))
        .unwrap_err();

    assert!(matches!(err, RecoveryError::TargetExists(_)));
    assert_eq!(site.recovered_dirs(), vec![existing.clone()]);
    assert_eq!(
        fs::read_to_string(existing.join("prefs.js")).unwrap(),
        "user_pref(\"keep\", true);\n"
    );

    let store = ProfileStore::new(db.connection());
    assert!(store.get(current_id).unwrap().is_some());
    assert_eq!(store.list_all().unwrap().len(), 1);
    assert!(host.events().is_empty());
    assert_eq!(fs::read_dir(&site.recovery_dir).map_or(0, Iterator::count), 0);
}

#[test]
fn test_failed_registration_keeps_recovered_profile() {
    let site = Site::new();
    let db = Database::in_memory().unwrap();
    let current_id = site.register_current(&db, "Work", Avatar::Star, &custom_theme());
    let host = RecordingHost::default();
    let service = site.service(&db).with_host(&host);
    let archive = service.create_backup(&site.backups_dir, None).unwrap();

    db.connection()
        .execute_batch(
            r"
            CREATE TRIGGER reject_profiles BEFORE INSERT ON profiles
            BEGIN
                SELECT RAISE(ABORT, 'registry is read-only');
            END;
            ",
        )
        .unwrap();

    let err = service
        .recover_from_backup_archive(&archive, &site.options().replace_current_profile(true))
        .unwrap_err();

    let RecoveryError::Registration { path, .. } = &err else {
        panic!("expected a registration error, got {err:?}");
    };
    assert_eq!(site.recovered_dirs(), vec![path.clone()]);
    assert_eq!(
        fs::read_to_string(path.join("prefs.js")).unwrap(),
        "user_pref(\"browser.startup.page\", 3);\n"
    );

    // Nothing after registration ran
    let store = ProfileStore::new(db.connection());
    assert!(store.get(current_id).unwrap().is_some());
    assert_eq!(store.list_all().unwrap().len(), 1);
    assert!(host.events().is_empty());
}

// =============================================================================
// Live SQLite Databases
// =============================================================================

#[test]
fn test_backup_captures_uncheckpointed_sqlite_writes() {
    let site = Site::new();
    let db = Database::in_memory().unwrap();
    site.register_current(&db, "Work", Avatar::Star, &custom_theme());

    // The browser keeps its databases open in WAL mode while we back up
    let live = rusqlite::Connection::open(site.current_dir.join("formhistory.sqlite")).unwrap();
    live.pragma_update(None, "journal_mode", "WAL").unwrap();
    live.pragma_update(None, "wal_autocheckpoint", 0).unwrap();
    live.execute_batch(
        r"
        CREATE TABLE moz_formhistory (fieldname TEXT, value TEXT);
        INSERT INTO moz_formhistory VALUES ('q', 'rust');
        INSERT INTO moz_formhistory VALUES ('q', 'sqlite');
        INSERT INTO moz_formhistory VALUES ('email', 'me@example.com');
        ",
    )
    .unwrap();
    assert!(site.current_dir.join("formhistory.sqlite-wal").exists());

    let service = site.service(&db);
    let archive = service.create_backup(&site.backups_dir, None).unwrap();
    let recovered = service
        .recover_from_backup_archive(&archive, &site.options())
        .unwrap();
    drop(live);

    let restored = rusqlite::Connection::open(recovered.join("formhistory.sqlite")).unwrap();
    let rows: i64 = restored
        .query_row("SELECT COUNT(*) FROM moz_formhistory", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 3);

    // Files that only look like databases by name are copied as-is
    assert_eq!(
        fs::read_to_string(recovered.join("places.sqlite")).unwrap(),
        "history"
    );
}
