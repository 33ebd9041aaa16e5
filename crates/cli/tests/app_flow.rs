use clap::Parser;
use tempfile::TempDir;

use labinv_cli::cli::Cli;
use labinv_cli::config::LabConfig;
use labinv_cli::{AppConfig, LabApp, commands};
use labinv_core::{ItemId, ItemType};
use labinv_inventory::{ItemFields, RecordUsage};
use labinv_observability::LogFormat;
use labinv_store::StoreError;

fn config(dir: &TempDir) -> AppConfig {
    AppConfig {
        data_dir: dir.path().to_path_buf(),
        lab: LabConfig::default(),
        low_stock_threshold: 10,
        log_format: LogFormat::Pretty,
    }
}

async fn open_app() -> (TempDir, LabApp) {
    let dir = tempfile::tempdir().unwrap();
    let app = LabApp::open(config(&dir)).await.unwrap();
    (dir, app)
}

async fn run(app: &mut LabApp, args: &[&str]) -> anyhow::Result<String> {
    let cli = Cli::try_parse_from(std::iter::once("labinv").chain(args.iter().copied()))?;
    let mut out = Vec::new();
    commands::execute(app, cli.command, &mut out).await?;
    Ok(String::from_utf8(out)?)
}

#[tokio::test]
async fn committed_usage_reaches_the_chain_log() {
    let (_dir, mut app) = open_app().await;
    let id = app
        .add_item(ItemType::Chemical, ItemFields::new("Ethanol", 50))
        .await
        .unwrap();

    app.record_usage(RecordUsage::new(id.clone(), "alice", 20))
        .await
        .unwrap();
    let rejected = app
        .record_usage(RecordUsage::new(id.clone(), "bob", 40))
        .await
        .unwrap_err();
    assert!(
        rejected
            .downcast_ref::<StoreError>()
            .is_some_and(StoreError::is_insufficient_stock)
    );

    let chain = app.chain();
    assert_eq!(chain.blocks().len(), 1);
    assert_eq!(chain.transaction_count(), 1);
    let tx = &chain.blocks()[0].transactions[0];
    assert_eq!(tx.user, "alice");
    assert_eq!(tx.quantity_changed, 20);
}

#[tokio::test]
async fn low_stock_skips_equipment() {
    let (_dir, app) = open_app().await;
    app.add_item(ItemType::Equipment, ItemFields::new("Centrifuge", 1))
        .await
        .unwrap();
    app.add_item(ItemType::Chemical, ItemFields::new("Ethanol", 5))
        .await
        .unwrap();
    app.add_item(ItemType::Consumable, ItemFields::new("Gloves", 200))
        .await
        .unwrap();

    let result = app.low_stock(None).await.unwrap();
    assert_eq!(result.score, 1.0);
    assert_eq!(
        result.explanation.as_deref(),
        Some("Low stock items:\nEthanol - 5 left\n")
    );

    let none = app.low_stock(Some(3)).await.unwrap();
    assert_eq!(none.score, 0.0);

    assert!(app.low_stock(Some(0)).await.is_err());
}

#[tokio::test]
async fn documents_require_an_existing_item() {
    let (_dir, app) = open_app().await;
    let id = app
        .add_item(ItemType::Equipment, ItemFields::new("PCR Machine", 1))
        .await
        .unwrap();

    assert_eq!(
        app.qr_payload(&id).await.unwrap(),
        "Item ID: EQ0001\nProperty of DNA Virology Lab-ICGEB China RRC"
    );
    assert_eq!(app.cover_sheet(&id).await.unwrap().title, "PCR Machine");

    let missing = ItemId::compose(ItemType::Equipment, 9);
    let err = app.qr_payload(&missing).await.unwrap_err();
    assert!(
        err.downcast_ref::<StoreError>()
            .is_some_and(StoreError::is_not_found)
    );
}

#[tokio::test]
async fn commands_drive_the_full_workflow() {
    let (dir, mut app) = open_app().await;

    let id = run(
        &mut app,
        &["item", "add", "chemical", "--name", "Ethanol", "--quantity", "50", "--unit", "mL"],
    )
    .await
    .unwrap();
    assert_eq!(id.trim(), "CHE0001");

    let entry = run(
        &mut app,
        &["usage", "record", "CHE0001", "--user", "alice", "--quantity", "20"],
    )
    .await
    .unwrap();
    assert_eq!(entry.trim(), "1");

    let listing = run(&mut app, &["item", "search", "chemical", "ETH"]).await.unwrap();
    assert!(listing.contains("Ethanol"));
    assert!(listing.contains("30"));

    let report = run(&mut app, &["report"]).await.unwrap();
    assert!(report.lines().any(|l| l.starts_with("chemical")));
    let chemicals = report.find("Chemicals Inventory").unwrap();
    assert!(report.find("Equipment Inventory").unwrap() < chemicals);
    assert!(report[chemicals..].lines().any(|l| l.starts_with("Ethanol")));

    let exported = run(&mut app, &["export", "usage"]).await.unwrap();
    assert!(exported.starts_with("Exported 1 usage entries"));
    let exports: Vec<_> = std::fs::read_dir(dir.path().join("exports"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(exports.len(), 1);
    assert!(exports[0].starts_with("usage_log_") && exports[0].ends_with(".csv"));

    let backup = run(&mut app, &["backup"]).await.unwrap();
    assert!(backup.starts_with("Backup written to"));
    assert_eq!(
        std::fs::read_dir(dir.path().join("data").join("backups"))
            .unwrap()
            .count(),
        1
    );

    let shown = run(&mut app, &["item", "show", "CHE0001"]).await.unwrap();
    assert!(shown.contains("Usage history"));

    let deleted = run(&mut app, &["item", "delete", "CHE0001"]).await.unwrap();
    assert_eq!(deleted.trim(), "Deleted CHE0001 (1 usage entries removed)");

    let err = run(&mut app, &["item", "show", "CHE0001"]).await.unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
async fn store_is_released_after_failed_and_successful_commands() {
    let (_dir, mut app) = open_app().await;

    let cli = Cli::try_parse_from(["labinv", "item", "show", "CHE0009"]).unwrap();
    let mut out = Vec::new();
    let err = commands::execute_and_close(&mut app, cli.command, &mut out)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
    assert!(!app.store().is_open().await);

    let cli = Cli::try_parse_from(["labinv", "report"]).unwrap();
    commands::execute_and_close(&mut app, cli.command, &mut out)
        .await
        .unwrap();
    assert!(!app.store().is_open().await);
    assert!(String::from_utf8(out).unwrap().contains("No items"));
}
