use std::fs;
use std::path::PathBuf;

use scan_profiles::cli::{CopyArgs, CreateArgs, DraftArgs, IdArgs, ShareArgs, UpdateArgs};
use scan_profiles::commands;
use scan_profiles::config::AppPaths;
use scan_profiles::context::AppContext;
use scan_profiles::error::AppError;
use scan_profiles::store::ProfileStore;
use serde_json::json;

struct Workspace {
    dir: tempfile::TempDir,
    paths: AppPaths,
    catalog: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let paths =
            AppPaths::rooted(dir.path().join("config"), dir.path().join("data")).unwrap();
        let catalog = dir.path().join("catalog.json");
        let registry = json!({
            "plugins": {
                "autothrottle": {"default": true},
                "discovery": {"description": "crawl extra paths"}
            },
            "modules": ["xss", "sqli"]
        });
        fs::write(&catalog, registry.to_string()).unwrap();

        Self {
            dir,
            paths,
            catalog,
        }
    }

    fn as_user(&self, owner: &str) -> AppContext {
        AppContext::with_paths(
            self.paths.clone(),
            Some(owner.to_string()),
            Some(self.catalog.display().to_string()),
            false,
        )
        .unwrap()
    }

    fn draft(&self, file: &str, value: serde_json::Value) -> PathBuf {
        let path = self.dir.path().join(file);
        fs::write(&path, value.to_string()).unwrap();
        path
    }
}

async fn create(ctx: &AppContext, file: PathBuf) -> Result<(), AppError> {
    let args = CreateArgs {
        file: Some(file),
        from_default: false,
        name: None,
    };
    commands::create::run(ctx, args).await
}

#[tokio::test]
async fn create_stores_a_normalized_profile() {
    let workspace = Workspace::new();
    let alice = workspace.as_user("alice");
    let file = workspace.draft(
        "staging.json",
        json!({
            "name": "staging",
            "cookies": "session=abc",
            "plugins": "default",
            "modules": "all"
        }),
    );

    create(&alice, file).await.unwrap();

    let profiles = alice.store.load().unwrap();
    let stored = profiles.get(1).unwrap();
    assert_eq!(stored.owner, "alice");
    assert_eq!(stored.cookies["session"], "abc");
    assert!(stored.plugins.contains_key("autothrottle"));
    assert_eq!(stored.modules, ["sqli", "xss"]);
}

#[tokio::test]
async fn invalid_draft_is_not_stored() {
    let workspace = Workspace::new();
    let alice = workspace.as_user("alice");
    let file = workspace.draft(
        "broken.json",
        json!({"name": "broken", "redundant": "calendar:zero", "modules": ["rootkit"]}),
    );

    match create(&alice, file).await {
        Err(AppError::Validation(errors)) => assert_eq!(errors.len(), 2),
        other => panic!("expected validation errors, got {other:?}"),
    }
    assert!(alice.store.load().unwrap().profiles().is_empty());
}

#[tokio::test]
async fn validate_does_not_touch_the_store() {
    let workspace = Workspace::new();
    let alice = workspace.as_user("alice");
    let file = workspace.draft("draft.json", json!({"name": "dry run"}));

    commands::validate::run(&alice, DraftArgs { file }).await.unwrap();
    assert!(alice.store.load().unwrap().profiles().is_empty());
}

#[tokio::test]
async fn create_from_default_copies_the_template() {
    let workspace = Workspace::new();
    let alice = workspace.as_user("alice");
    let bob = workspace.as_user("bob");
    let file = workspace.draft(
        "baseline.json",
        json!({"name": "baseline", "exclude": "logout", "global": true}),
    );
    create(&alice, file).await.unwrap();
    commands::default::run(&alice, IdArgs { id: 1 }).unwrap();

    let args = CreateArgs {
        file: None,
        from_default: true,
        name: Some("mine".to_string()),
    };
    commands::create::run(&bob, args).await.unwrap();

    let profiles = bob.store.load().unwrap();
    let copy = profiles.get(2).unwrap();
    assert_eq!(copy.owner, "bob");
    assert_eq!(copy.exclude, ["logout"]);
    assert!(!copy.default);
    assert!(!copy.global);
    assert_eq!(profiles.default_profile().map(|profile| profile.id), Some(1));
}

#[tokio::test]
async fn create_from_default_needs_a_default() {
    let workspace = Workspace::new();
    let alice = workspace.as_user("alice");
    let args = CreateArgs {
        file: None,
        from_default: true,
        name: Some("mine".to_string()),
    };

    assert!(matches!(
        commands::create::run(&alice, args).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn only_the_owner_may_update_and_update_keeps_flags() {
    let workspace = Workspace::new();
    let alice = workspace.as_user("alice");
    let bob = workspace.as_user("bob");
    create(&alice, workspace.draft("v1.json", json!({"name": "v1"})))
        .await
        .unwrap();
    commands::default::run(&alice, IdArgs { id: 1 }).unwrap();

    let file = workspace.draft("v2.json", json!({"name": "v2", "owner": "mallory"}));
    let denied = commands::update::run(&bob, UpdateArgs { id: 1, file: file.clone() }).await;
    assert!(matches!(denied, Err(AppError::InvalidInput(_))));

    commands::update::run(&alice, UpdateArgs { id: 1, file })
        .await
        .unwrap();
    let profiles = alice.store.load().unwrap();
    let updated = profiles.get(1).unwrap();
    assert_eq!(updated.name, "v2");
    assert_eq!(updated.owner, "alice");
    assert!(updated.default);
}

#[tokio::test]
async fn copy_requires_visibility() {
    let workspace = Workspace::new();
    let alice = workspace.as_user("alice");
    let bob = workspace.as_user("bob");
    create(&alice, workspace.draft("scan.json", json!({"name": "scan"})))
        .await
        .unwrap();

    let hidden = commands::copy::run(&bob, CopyArgs { id: 1, name: None }).await;
    assert!(matches!(hidden, Err(AppError::NotFound(_))));

    let share = ShareArgs {
        id: 1,
        users: vec!["bob".to_string()],
    };
    commands::share::run(&alice, share).unwrap();
    commands::copy::run(&bob, CopyArgs { id: 1, name: None })
        .await
        .unwrap();

    let profiles = bob.store.load().unwrap();
    let copy = profiles.get(2).unwrap();
    assert_eq!(copy.name, "Copy of scan");
    assert_eq!(copy.owner, "bob");
    assert!(copy.shared_with.is_empty());
}

#[tokio::test]
async fn import_is_all_or_nothing() {
    let workspace = Workspace::new();
    let alice = workspace.as_user("alice");

    let mixed = workspace.draft(
        "mixed.json",
        json!([{"name": "good"}, {"name": "bad", "description": "<script>x</script>"}]),
    );
    let rejected = commands::import::run(&alice, DraftArgs { file: mixed }).await;
    assert!(matches!(rejected, Err(AppError::InvalidInput(_))));
    assert!(alice.store.load().unwrap().profiles().is_empty());

    let duplicate = workspace.draft("duplicate.json", json!([{"name": "same"}, {"name": "same"}]));
    assert!(
        commands::import::run(&alice, DraftArgs { file: duplicate })
            .await
            .is_err()
    );
    assert!(alice.store.load().unwrap().profiles().is_empty());

    let clean = workspace.draft("clean.json", json!([{"name": "one"}, {"name": "two"}]));
    commands::import::run(&alice, DraftArgs { file: clean })
        .await
        .unwrap();
    assert_eq!(alice.store.load().unwrap().profiles().len(), 2);
}

#[tokio::test]
async fn delete_removes_only_owned_profiles() {
    let workspace = Workspace::new();
    let alice = workspace.as_user("alice");
    let bob = workspace.as_user("bob");
    create(&alice, workspace.draft("scan.json", json!({"name": "scan"})))
        .await
        .unwrap();

    assert!(commands::delete::run(&bob, IdArgs { id: 1 }).is_err());
    commands::delete::run(&alice, IdArgs { id: 1 }).unwrap();
    assert!(matches!(
        commands::delete::run(&alice, IdArgs { id: 1 }),
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn create_never_moves_the_default() {
    let workspace = Workspace::new();
    let alice = workspace.as_user("alice");
    create(&alice, workspace.draft("base.json", json!({"name": "base"})))
        .await
        .unwrap();
    commands::default::run(&alice, IdArgs { id: 1 }).unwrap();

    let file = workspace.draft("claims.json", json!({"name": "claims", "default": true}));
    create(&alice, file).await.unwrap();

    let profiles = alice.store.load().unwrap();
    assert_eq!(profiles.default_profile().map(|profile| profile.id), Some(1));
    assert!(!profiles.get(2).unwrap().default);
}
