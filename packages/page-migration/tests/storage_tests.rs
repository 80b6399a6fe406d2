mod common;

use pretty_assertions::assert_eq;

use page_migration::field::FieldValue;
use page_migration::gateway::PageGateway;
use page_migration::migrator::{MigrationOptions, MigrationOutcome, MigrationSummary, Migrator};
use page_migration::repository::{ContentRepository, ContentType};
use page_migration::storage::{MySqlContentRepository, MySqlPageGateway};

use common::{
    landing_page_converter, page_xml, tag_block, ScriptedOperator, TestDb, ARTICLE_TYPE_ID,
    LANDING_PAGE_TYPE_ID,
};

async fn seeded_db() -> TestDb {
    let db = TestDb::new().await;
    db.add_content_type(LANDING_PAGE_TYPE_ID, "landing_page", &["ezstring", "ezlandingpage"])
        .await;
    db.add_content_type(ARTICLE_TYPE_ID, "article", &["ezstring", "ezrichtext"])
        .await;
    db
}

#[tokio::test]
async fn test_page_graph_rows() {
    let db = TestDb::new().await;
    let mut gateway = MySqlPageGateway::new(db.pool.clone());

    let page_id = gateway.insert_page(10, 2, "eng-GB", "default").await.unwrap();
    let zone_id = gateway.insert_zone("Main").await.unwrap();
    let block_id = gateway.insert_block("tag", "Intro", "default").await.unwrap();
    gateway
        .insert_block_design(block_id, "", "", "wide")
        .await
        .unwrap();
    gateway
        .insert_block_visibility(block_id, Some(1_500_000_000), None)
        .await
        .unwrap();
    let attribute_id = gateway.insert_attribute("content", "Hello").await.unwrap();
    gateway
        .assign_attribute_to_block(attribute_id, block_id)
        .await
        .unwrap();
    gateway.assign_block_to_zone(block_id, zone_id).await.unwrap();
    gateway.assign_zone_to_page(zone_id, page_id).await.unwrap();

    let row = sqlx::query_as::<_, (i64, i32, String, String, String, String, String)>(
        r#"
        SELECT p.content_id, p.version_no, p.language_code, p.layout, z.name, b.type, a.value
        FROM ezpage_pages p
        INNER JOIN ezpage_map_zones_pages zp ON zp.page_id = p.id
        INNER JOIN ezpage_zones z ON z.id = zp.zone_id
        INNER JOIN ezpage_map_blocks_zones bz ON bz.zone_id = z.id
        INNER JOIN ezpage_blocks b ON b.id = bz.block_id
        INNER JOIN ezpage_map_attributes_blocks ab ON ab.block_id = b.id
        INNER JOIN ezpage_attributes a ON a.id = ab.attribute_id
        WHERE p.id = ?
        "#,
    )
    .bind(page_id)
    .fetch_one(&db.pool)
    .await
    .unwrap();

    assert_eq!(
        row,
        (
            10,
            2,
            "eng-GB".to_string(),
            "default".to_string(),
            "Main".to_string(),
            "tag".to_string(),
            "Hello".to_string(),
        )
    );

    let (class, since, till) = sqlx::query_as::<_, (Option<String>, Option<i64>, Option<i64>)>(
        r#"
        SELECT d.class, v.since, v.till
        FROM ezpage_blocks_design d
        INNER JOIN ezpage_blocks_visibility v ON v.block_id = d.block_id
        WHERE d.block_id = ?
        "#,
    )
    .bind(block_id)
    .fetch_one(&db.pool)
    .await
    .unwrap();
    assert_eq!(class.as_deref(), Some("wide"));
    assert_eq!(since, Some(1_500_000_000));
    assert_eq!(till, None);
}

#[tokio::test]
async fn test_page_exists() {
    let db = TestDb::new().await;
    let mut gateway = MySqlPageGateway::new(db.pool.clone());

    assert!(!gateway.page_exists(10, 1, "eng-GB").await.unwrap());

    gateway.insert_page(10, 1, "eng-GB", "default").await.unwrap();

    assert!(gateway.page_exists(10, 1, "eng-GB").await.unwrap());
    assert!(!gateway.page_exists(10, 1, "ger-DE").await.unwrap());
    assert!(!gateway.page_exists(10, 2, "eng-GB").await.unwrap());
}

#[tokio::test]
async fn test_page_exists_sees_own_transaction_only() {
    let db = TestDb::new().await;
    let mut gateway = MySqlPageGateway::new(db.pool.clone());
    let mut outside = MySqlPageGateway::new(db.pool.clone());

    gateway.begin().await.unwrap();
    gateway.insert_page(10, 1, "eng-GB", "default").await.unwrap();

    assert!(gateway.page_exists(10, 1, "eng-GB").await.unwrap());
    assert!(!outside.page_exists(10, 1, "eng-GB").await.unwrap());

    gateway.commit().await.unwrap();
    assert!(outside.page_exists(10, 1, "eng-GB").await.unwrap());
}

#[tokio::test]
async fn test_rollback_discards_rows() {
    let db = TestDb::new().await;
    let mut gateway = MySqlPageGateway::new(db.pool.clone());

    gateway.begin().await.unwrap();
    let page_id = gateway.insert_page(10, 1, "eng-GB", "default").await.unwrap();
    let zone_id = gateway.insert_zone("Main").await.unwrap();
    gateway.assign_zone_to_page(zone_id, page_id).await.unwrap();
    gateway.rollback().await.unwrap();

    assert_eq!(db.count("ezpage_pages").await, 0);
    assert_eq!(db.count("ezpage_zones").await, 0);
    assert_eq!(db.count("ezpage_map_zones_pages").await, 0);
}

#[tokio::test]
async fn test_transaction_state_errors() {
    let db = TestDb::new().await;
    let mut gateway = MySqlPageGateway::new(db.pool.clone());

    assert!(gateway.commit().await.is_err());
    assert!(gateway.rollback().await.is_err());

    gateway.begin().await.unwrap();
    assert!(gateway.begin().await.is_err());
    gateway.rollback().await.unwrap();
}

#[tokio::test]
async fn test_discovery() {
    let db = seeded_db().await;
    let home = page_xml("Main", &tag_block("b-1", "Hello"));
    db.add_landing_page_version(10, LANDING_PAGE_TYPE_ID, 1, &[("eng-GB", "Home", Some(home.as_str()))])
        .await;
    db.add_landing_page_version(30, LANDING_PAGE_TYPE_ID, 1, &[("eng-GB", "About", None)])
        .await;
    let repository = MySqlContentRepository::new(db.pool.clone());

    let types = repository
        .list_content_types_with_field_type("ezlandingpage")
        .await
        .unwrap();
    assert_eq!(
        types,
        vec![ContentType {
            id: LANDING_PAGE_TYPE_ID,
            identifier: "landing_page".to_string(),
        }]
    );
    assert!(repository
        .list_content_types_with_field_type("ezimage")
        .await
        .unwrap()
        .is_empty());

    assert_eq!(
        repository
            .find_content_ids_by_type(LANDING_PAGE_TYPE_ID)
            .await
            .unwrap(),
        vec![10, 30]
    );
    assert!(repository
        .find_content_ids_by_type(ARTICLE_TYPE_ID)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_list_versions() {
    let db = seeded_db().await;
    let home = page_xml("Main", &tag_block("b-1", "Hello"));
    db.add_landing_page_version(10, LANDING_PAGE_TYPE_ID, 1, &[("eng-GB", "Home", Some(home.as_str()))])
        .await;
    db.add_landing_page_version(
        10,
        LANDING_PAGE_TYPE_ID,
        2,
        &[
            ("eng-GB", "Home", Some(home.as_str())),
            ("ger-DE", "Startseite", Some(home.as_str())),
        ],
    )
    .await;
    let repository = MySqlContentRepository::new(db.pool.clone());

    let versions = repository.list_versions(10).await.unwrap();

    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0].version_no, 1);
    assert_eq!(versions[0].language_codes, vec!["eng-GB"]);
    assert_eq!(versions[1].version_no, 2);
    assert_eq!(versions[1].language_codes, vec!["eng-GB", "ger-DE"]);
    assert_eq!(versions[1].names.get("ger-DE").map(String::as_str), Some("Startseite"));
    assert_eq!(versions[1].display_name(), "Home");

    assert!(repository.list_versions(99).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_load_version_filters_languages() {
    let db = seeded_db().await;
    let home = page_xml("Main", &tag_block("b-1", "Hello"));
    let home_de = page_xml("Haupt", &tag_block("b-1", "Hallo"));
    db.add_landing_page_version(
        10,
        LANDING_PAGE_TYPE_ID,
        1,
        &[
            ("eng-GB", "Home", Some(home.as_str())),
            ("ger-DE", "Startseite", Some(home_de.as_str())),
        ],
    )
    .await;
    let repository = MySqlContentRepository::new(db.pool.clone());
    repository
        .field_converters()
        .register("ezlandingpage", landing_page_converter());

    let content = repository
        .load_version(10, 1, &["ger-DE".to_string()])
        .await
        .unwrap();

    assert_eq!(content.fields.len(), 2);
    assert!(content.fields.iter().all(|f| f.language_code == "ger-DE"));
    assert_eq!(
        content.fields[0].value,
        FieldValue::Text(Some("Startseite".to_string()))
    );
    let page = content.fields[1].value.as_page().unwrap();
    assert_eq!(page.zones[0].name, "Haupt");
}

#[tokio::test]
async fn test_load_missing_version() {
    let db = seeded_db().await;
    let repository = MySqlContentRepository::new(db.pool.clone());

    let err = repository
        .load_version(10, 1, &["eng-GB".to_string()])
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Content 10 has no version 1");
}

#[tokio::test]
async fn test_migration_run() {
    let db = seeded_db().await;
    let home = page_xml("Main", &tag_block("b-1", "Hello"));
    db.add_landing_page_version(
        10,
        LANDING_PAGE_TYPE_ID,
        1,
        &[
            ("eng-GB", "Home", Some(home.as_str())),
            ("ger-DE", "Startseite", Some(r#"<page layout="#)),
        ],
    )
    .await;
    db.add_landing_page_version(30, LANDING_PAGE_TYPE_ID, 1, &[("eng-GB", "About", None)])
        .await;

    let repository = MySqlContentRepository::new(db.pool.clone());
    let mut gateway = MySqlPageGateway::new(db.pool.clone());
    let mut operator = ScriptedOperator::answering([true]);

    let outcome = Migrator::new(
        &repository,
        &mut gateway,
        &mut operator,
        landing_page_converter(),
        MigrationOptions::default(),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(
        outcome,
        MigrationOutcome::Completed(MigrationSummary {
            candidates: 2,
            versions: 2,
            migrated: 2,
            failed: 1,
            ..MigrationSummary::default()
        })
    );

    let pages = sqlx::query_as::<_, (i64, String, String)>(
        r#"SELECT content_id, language_code, layout FROM ezpage_pages ORDER BY content_id"#,
    )
    .fetch_all(&db.pool)
    .await
    .unwrap();
    assert_eq!(
        pages,
        vec![
            (10, "eng-GB".to_string(), "default".to_string()),
            (30, "eng-GB".to_string(), String::new()),
        ]
    );
    assert_eq!(db.count("ezpage_blocks").await, 1);
    assert_eq!(db.count("ezpage_attributes").await, 1);
    assert!(repository.field_converters().get("ezlandingpage").is_none());

    let mut rerun = ScriptedOperator::answering([true]);
    let outcome = Migrator::new(
        &repository,
        &mut gateway,
        &mut rerun,
        landing_page_converter(),
        MigrationOptions::default(),
    )
    .run()
    .await
    .unwrap();

    let MigrationOutcome::Completed(summary) = outcome else {
        panic!("expected a completed run, got {outcome:?}");
    };
    assert_eq!(summary.migrated, 0);
    assert_eq!(summary.skipped, 2);
    assert_eq!(db.count("ezpage_pages").await, 2);
}
