//! Installing and removing the URL handler registration.
//!
//! `register` writes every entry that makes the handler a candidate default
//! for `http`/`https`. `unregister` removes them deepest-first, keeps going
//! past individual failures, then verifies nothing is left behind.

use std::path::Path;

use tracing::{debug, info};

use crate::config::{
    APPLICATION_DESCRIPTION, APPLICATION_NAME, CAPABILITIES_KEY, CLIENT_KEY, CLIENT_NAME,
    HANDLER_APPLICATION_KEY, HANDLER_COMMAND_KEY, HANDLER_DESCRIPTION, HANDLER_ID, HANDLER_KEY,
    HANDLER_OPEN_KEY, HANDLER_SHELL_KEY, REGISTERED_APPLICATIONS_KEY,
    REGISTERED_CAPABILITIES_PATH, RegistrationOptions, URL_ASSOCIATIONS_KEY, URL_SCHEMES, values,
};
use crate::error::{Error, Result, UnregisterFailure};
use crate::store::{ConfigStore, describe_value};

/// Keys owned by the handler, children before parents.
pub const OWNED_KEYS: [&str; 8] = [
    HANDLER_COMMAND_KEY,
    HANDLER_OPEN_KEY,
    HANDLER_SHELL_KEY,
    HANDLER_APPLICATION_KEY,
    HANDLER_KEY,
    URL_ASSOCIATIONS_KEY,
    CAPABILITIES_KEY,
    CLIENT_KEY,
];

/// A single string value written by `register`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub key: &'static str,
    pub name: &'static str,
    pub value: String,
}

impl RegistryEntry {
    fn new(key: &'static str, name: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            name,
            value: value.into(),
        }
    }
}

/// Shell open command that runs `executable` on the invoked URL.
pub fn open_command(executable: &Path) -> String {
    format!("\"{}\" \"%1\"", executable.display())
}

/// Every value `register` writes, in write order.
pub fn registration_entries(
    executable: &Path,
    options: &RegistrationOptions,
) -> Vec<RegistryEntry> {
    let mut entries = vec![
        RegistryEntry::new(HANDLER_KEY, "", HANDLER_DESCRIPTION),
        RegistryEntry::new(
            HANDLER_APPLICATION_KEY,
            values::APPLICATION_NAME,
            APPLICATION_NAME,
        ),
        RegistryEntry::new(
            HANDLER_APPLICATION_KEY,
            values::APPLICATION_DESCRIPTION,
            APPLICATION_DESCRIPTION,
        ),
        RegistryEntry::new(
            HANDLER_APPLICATION_KEY,
            values::DEFAULT_BROWSER,
            options.default_browser.as_str(),
        ),
        RegistryEntry::new(
            HANDLER_APPLICATION_KEY,
            values::NON_DEFAULT_HOSTS,
            options.non_default_hosts.as_str(),
        ),
    ];
    if let Some(policy) = options.policy {
        entries.push(RegistryEntry::new(
            HANDLER_APPLICATION_KEY,
            values::ROUTING_POLICY,
            policy.to_string(),
        ));
    }
    entries.extend([
        RegistryEntry::new(HANDLER_COMMAND_KEY, "", open_command(executable)),
        RegistryEntry::new(CLIENT_KEY, "", APPLICATION_NAME),
        RegistryEntry::new(CAPABILITIES_KEY, values::APPLICATION_NAME, APPLICATION_NAME),
        RegistryEntry::new(
            CAPABILITIES_KEY,
            values::APPLICATION_DESCRIPTION,
            APPLICATION_DESCRIPTION,
        ),
    ]);
    entries.extend(
        URL_SCHEMES
            .into_iter()
            .map(|scheme| RegistryEntry::new(URL_ASSOCIATIONS_KEY, scheme, HANDLER_ID)),
    );
    entries.push(RegistryEntry::new(
        REGISTERED_APPLICATIONS_KEY,
        CLIENT_NAME,
        REGISTERED_CAPABILITIES_PATH,
    ));
    entries
}

/// Install the handler registration. Safe to repeat.
pub fn register(
    store: &mut impl ConfigStore,
    executable: &Path,
    options: &RegistrationOptions,
) -> Result<()> {
    for entry in registration_entries(executable, options) {
        store.create_key(entry.key)?;
        store.set_string(entry.key, entry.name, &entry.value)?;
        debug!("Set {} = {}", describe_value(entry.key, entry.name), entry.value);
    }
    info!("Registered {} for {}", executable.display(), URL_SCHEMES.join(", "));
    Ok(())
}

/// Remove the handler registration.
///
/// Missing entries are not errors. Any entry still present afterwards is
/// reported, together with every deletion error, as `PartialUnregister`.
pub fn unregister(store: &mut impl ConfigStore) -> Result<()> {
    let mut failures = Vec::new();

    let pointer = describe_value(REGISTERED_APPLICATIONS_KEY, CLIENT_NAME);
    record(
        &mut failures,
        &pointer,
        store.delete_value(REGISTERED_APPLICATIONS_KEY, CLIENT_NAME),
    );
    for key in OWNED_KEYS {
        record(&mut failures, key, store.delete_key(key));
    }

    check_removed(
        &mut failures,
        &pointer,
        store.value_exists(REGISTERED_APPLICATIONS_KEY, CLIENT_NAME),
    );
    for key in OWNED_KEYS {
        check_removed(&mut failures, key, store.key_exists(key));
    }

    if !failures.is_empty() {
        return Err(Error::PartialUnregister { failures });
    }
    info!("Unregistered URL handler");
    Ok(())
}

fn record(failures: &mut Vec<UnregisterFailure>, target: &str, result: Result<()>) {
    match result {
        Ok(()) => debug!("Removed {}", target),
        Err(e) if e.is_not_found() => debug!("{} already absent", target),
        Err(e) => failures.push(UnregisterFailure {
            target: target.to_string(),
            reason: e.to_string(),
        }),
    }
}

fn check_removed(failures: &mut Vec<UnregisterFailure>, target: &str, exists: Result<bool>) {
    if failures.iter().any(|f| f.target == target) {
        return;
    }
    let reason = match exists {
        Ok(false) => return,
        Ok(true) => "still present".to_string(),
        Err(e) => e.to_string(),
    };
    failures.push(UnregisterFailure {
        target: target.to_string(),
        reason,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyKind;
    use crate::store::MemoryStore;

    fn exe() -> &'static Path {
        Path::new(r"C:\Program Files\SelectBrowser\selectbrowser.exe")
    }

    #[test]
    fn open_command_quotes_path_and_placeholder() {
        assert_eq!(
            open_command(exe()),
            r#""C:\Program Files\SelectBrowser\selectbrowser.exe" "%1""#
        );
    }

    #[test]
    fn register_writes_every_entry() {
        let mut store = MemoryStore::new();
        register(&mut store, exe(), &RegistrationOptions::default()).unwrap();

        assert_eq!(
            store.get_string(HANDLER_KEY, "").unwrap(),
            HANDLER_DESCRIPTION
        );
        assert_eq!(
            store
                .get_string(HANDLER_APPLICATION_KEY, values::DEFAULT_BROWSER)
                .unwrap(),
            "IE"
        );
        assert!(
            store
                .get_string(HANDLER_APPLICATION_KEY, values::NON_DEFAULT_HOSTS)
                .unwrap()
                .starts_with("www.office.com,")
        );
        assert!(
            store
                .get_string(HANDLER_COMMAND_KEY, "")
                .unwrap()
                .ends_with(r#"selectbrowser.exe" "%1""#)
        );
        assert_eq!(store.get_string(URL_ASSOCIATIONS_KEY, "http").unwrap(), "SBUrl");
        assert_eq!(store.get_string(URL_ASSOCIATIONS_KEY, "https").unwrap(), "SBUrl");
        assert_eq!(
            store
                .get_string(REGISTERED_APPLICATIONS_KEY, CLIENT_NAME)
                .unwrap(),
            REGISTERED_CAPABILITIES_PATH
        );
        assert!(
            !store
                .value_exists(HANDLER_APPLICATION_KEY, values::ROUTING_POLICY)
                .unwrap()
        );
    }

    #[test]
    fn register_stores_policy_override() {
        let mut store = MemoryStore::new();
        let options = RegistrationOptions {
            policy: Some(PolicyKind::StaticList),
            ..RegistrationOptions::default()
        };
        register(&mut store, exe(), &options).unwrap();
        assert_eq!(
            store
                .get_string(HANDLER_APPLICATION_KEY, values::ROUTING_POLICY)
                .unwrap(),
            "static-list"
        );
    }

    #[test]
    fn register_surfaces_access_denied() {
        let mut store = MemoryStore::new().deny_writes_under(r"SOFTWARE\Classes");
        let err = register(&mut store, exe(), &RegistrationOptions::default()).unwrap_err();
        assert!(matches!(err, Error::AccessDenied(_)));
    }

    #[test]
    fn unregister_on_empty_store_succeeds() {
        let mut store = MemoryStore::new();
        unregister(&mut store).unwrap();
    }

    #[test]
    fn unregister_keeps_unrelated_entries() {
        let mut store = MemoryStore::new()
            .with_value(REGISTERED_APPLICATIONS_KEY, "Other", "x")
            .with_value(r"SOFTWARE\Clients\StartMenuInternet\Google Chrome", "", "Chrome");
        register(&mut store, exe(), &RegistrationOptions::default()).unwrap();
        unregister(&mut store).unwrap();

        assert_eq!(
            store.get_string(REGISTERED_APPLICATIONS_KEY, "Other").unwrap(),
            "x"
        );
        assert!(
            store
                .key_exists(r"SOFTWARE\Clients\StartMenuInternet\Google Chrome")
                .unwrap()
        );
        assert!(store.key_exists(r"SOFTWARE\Classes").unwrap());
    }

    #[test]
    fn unregister_reports_every_failure() {
        let mut seeded = MemoryStore::new();
        register(&mut seeded, exe(), &RegistrationOptions::default()).unwrap();
        let mut store = seeded
            .deny_writes_under(HANDLER_APPLICATION_KEY)
            .deny_writes_under(CAPABILITIES_KEY);

        let err = unregister(&mut store).unwrap_err();
        let failures = match err {
            Error::PartialUnregister { failures } => failures,
            other => panic!("Expected PartialUnregister, got {other:?}"),
        };
        let targets: Vec<&str> = failures.iter().map(|f| f.target.as_str()).collect();

        assert!(targets.contains(&HANDLER_APPLICATION_KEY));
        assert!(targets.contains(&HANDLER_KEY));
        assert!(targets.contains(&URL_ASSOCIATIONS_KEY));
        assert!(targets.contains(&CAPABILITIES_KEY));
        assert!(targets.contains(&CLIENT_KEY));
        assert_eq!(failures.len(), 5);

        // Everything not blocked is gone.
        assert!(!store.key_exists(HANDLER_COMMAND_KEY).unwrap());
        assert!(
            !store
                .value_exists(REGISTERED_APPLICATIONS_KEY, CLIENT_NAME)
                .unwrap()
        );
    }
}
